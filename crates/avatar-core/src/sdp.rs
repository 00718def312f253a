//! Restrict one media section of an SDP offer to a single codec.

/// Keep only `codec` (e.g. `"opus/48000/2"`) and its RTX payloads in the
/// `m=<kind>` section of `sdp`.
///
/// Attribute lines (`a=rtpmap`, `a=fmtp`, `a=rtcp-fb`) for other payload types
/// in that section are dropped and the media line's payload list is rewritten.
/// Everything outside the section is passed through. Each input line is
/// emitted followed by `\n`.
pub fn filter_codec(kind: &str, codec: &str, sdp: &str) -> String {
    let media_prefix = format!("m={kind} ");
    let allowed = allowed_payloads(&media_prefix, codec, sdp);
    let payload_list = allowed
        .iter()
        .map(|pt| pt.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::with_capacity(sdp.len());
    let mut in_section = false;
    for line in sdp.split('\n') {
        in_section = section_state(line, &media_prefix, in_section);
        if in_section {
            if let Some(pt) = attribute_payload(line) {
                if !allowed.contains(&pt) {
                    continue;
                }
            } else if let Some(head) = media_line_head(line, &media_prefix) {
                out.push_str(head);
                out.push(' ');
                out.push_str(&payload_list);
                out.push('\n');
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn allowed_payloads(media_prefix: &str, codec: &str, sdp: &str) -> Vec<u32> {
    let mut allowed = Vec::new();
    let mut in_section = false;
    for line in sdp.split('\n') {
        in_section = section_state(line, media_prefix, in_section);
        if !in_section {
            continue;
        }
        if let Some(pt) = rtpmap_for_codec(line, codec) {
            allowed.push(pt);
        }
        if let Some((pt, apt)) = rtx_association(line) {
            if allowed.contains(&apt) {
                allowed.push(pt);
            }
        }
    }
    allowed
}

#[inline]
fn section_state(line: &str, media_prefix: &str, current: bool) -> bool {
    if line.starts_with(media_prefix) {
        true
    } else if line.starts_with("m=") {
        false
    } else {
        current
    }
}

/// Split a leading run of ASCII digits off `s`.
fn leading_number(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let n = s[..end].parse().ok()?;
    Some((n, &s[end..]))
}

/// `a=rtpmap:<pt> <codec>` anywhere in the line.
fn rtpmap_for_codec(line: &str, codec: &str) -> Option<u32> {
    let mut rest = line;
    while let Some(idx) = rest.find("a=rtpmap:") {
        rest = &rest[idx + "a=rtpmap:".len()..];
        if let Some((pt, tail)) = leading_number(rest) {
            if tail.strip_prefix(' ').is_some_and(|t| t.starts_with(codec)) {
                return Some(pt);
            }
        }
    }
    None
}

/// `a=fmtp:<pt> apt=<apt>\r` at the end of the line.
fn rtx_association(line: &str) -> Option<(u32, u32)> {
    let body = line.strip_suffix('\r')?;
    let idx = body.rfind("a=fmtp:")?;
    let (pt, tail) = leading_number(&body[idx + "a=fmtp:".len()..])?;
    let (apt, tail) = leading_number(tail.strip_prefix(" apt=")?)?;
    tail.is_empty().then_some((pt, apt))
}

/// Payload type of the first `a=fmtp|rtcp-fb|rtpmap:<pt>` attribute in the line.
fn attribute_payload(line: &str) -> Option<u32> {
    ["a=fmtp:", "a=rtcp-fb:", "a=rtpmap:"]
        .iter()
        .filter_map(|prefix| {
            let mut offset = 0;
            while let Some(idx) = line[offset..].find(prefix) {
                let start = offset + idx;
                if let Some((pt, _)) = leading_number(&line[start + prefix.len()..]) {
                    return Some((start, pt));
                }
                offset = start + prefix.len();
            }
            None
        })
        .min_by_key(|&(start, _)| start)
        .map(|(_, pt)| pt)
}

/// For the media line, everything up to (not including) the trailing payload
/// list and whitespace. `None` for any other line.
fn media_line_head<'a>(line: &'a str, media_prefix: &str) -> Option<&'a str> {
    let start = line.find(media_prefix)?;
    let min_len = start + media_prefix.len();
    let mut head = line.trim_end();
    loop {
        let digits = head.len() - head.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            break;
        }
        let cut = head.len() - digits;
        if cut == 0 || cut - 1 < min_len || !head[..cut].ends_with(' ') {
            break;
        }
        head = &head[..cut - 1];
    }
    if head.len() < min_len {
        head = &line[..min_len];
    }
    Some(head)
}
