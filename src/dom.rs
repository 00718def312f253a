use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[dom] no #{} to bind click handler", element_id);
    }
}

pub fn input(document: &web::Document, element_id: &str) -> Option<web::HtmlInputElement> {
    document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
}

pub fn input_value(document: &web::Document, element_id: &str) -> Option<String> {
    input(document, element_id).map(|el| el.value())
}

pub fn set_input_value(document: &web::Document, element_id: &str, value: &str) {
    if let Some(el) = input(document, element_id) {
        el.set_value(value);
    }
}

pub fn is_checked(document: &web::Document, element_id: &str) -> bool {
    input(document, element_id).is_some_and(|el| el.checked())
}

pub fn select_value(document: &web::Document, element_id: &str) -> Option<String> {
    document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlSelectElement>().ok())
        .map(|el| el.value())
}

pub fn set_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        el.set_text_content(Some(text));
    }
}

pub fn append_text(document: &web::Document, element_id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let mut cur = el.text_content().unwrap_or_default();
        cur.push_str(text);
        el.set_text_content(Some(&cur));
    }
}

#[inline]
pub fn set_visible(document: &web::Document, element_id: &str, display: Option<&str>) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let style = match display {
            Some(d) => format!("display:{}", d),
            None => "display:none".to_owned(),
        };
        _ = el.set_attribute("style", &style);
    }
}

pub fn set_media_stream(document: &web::Document, element_id: &str, stream: &web::MediaStream) {
    if let Some(el) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlMediaElement>().ok())
    {
        el.set_src_object(Some(stream));
    }
}

pub fn alert(message: &str) {
    if let Some(w) = web::window() {
        _ = w.alert_with_message(message);
    }
}
