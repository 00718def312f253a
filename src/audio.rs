use avatar_core::{AvatarController, ANALYSER_SMOOTHING, FFT_SIZE, PROCESSOR_BUFFER_SIZE};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// WebAudio graph that samples a remote audio stream:
/// source -> analyser -> script processor -> destination.
///
/// Dropping the tap detaches the processing callback and closes the context.
pub struct AudioTap {
    audio_ctx: web::AudioContext,
    source: web::MediaStreamAudioSourceNode,
    analyser: web::AnalyserNode,
    processor: web::ScriptProcessorNode,
    tracks: Vec<web::MediaStreamTrack>,
    _on_process: Closure<dyn FnMut()>,
    _on_ended: Closure<dyn FnMut()>,
}

// Create analyser configured for loudness sampling
pub fn create_analyser(audio_ctx: &web::AudioContext) -> anyhow::Result<web::AnalyserNode> {
    let analyser = web::AnalyserNode::new(audio_ctx)
        .map_err(|e| anyhow::anyhow!("AnalyserNode error: {:?}", e))?;
    analyser.set_fft_size(FFT_SIZE);
    analyser.set_smoothing_time_constant(ANALYSER_SMOOTHING);
    Ok(analyser)
}

impl AudioTap {
    /// Start feeding `controller` one loudness sample per processing tick.
    /// `level_meter` mirrors the sample if present.
    pub fn attach(
        stream: &web::MediaStream,
        controller: Rc<RefCell<AvatarController>>,
        level_meter: Option<web::HtmlInputElement>,
    ) -> anyhow::Result<Self> {
        let audio_ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        _ = audio_ctx.resume();
        let source = audio_ctx
            .create_media_stream_source(stream)
            .map_err(|e| anyhow::anyhow!("MediaStreamSource error: {:?}", e))?;
        let analyser = create_analyser(&audio_ctx)?;
        #[allow(deprecated)]
        let processor = audio_ctx
            .create_script_processor_with_buffer_size_and_number_of_input_channels_and_number_of_output_channels(
                PROCESSOR_BUFFER_SIZE,
                1,
                1,
            )
            .map_err(|e| anyhow::anyhow!("ScriptProcessorNode error: {:?}", e))?;

        _ = source.connect_with_audio_node(&analyser);
        _ = analyser.connect_with_audio_node(&processor);
        _ = processor.connect_with_audio_node(&audio_ctx.destination());

        let analyser_cb = analyser.clone();
        let mut bins = vec![0u8; analyser.frequency_bin_count() as usize];
        let on_process = Closure::wrap(Box::new(move || {
            analyser_cb.get_byte_frequency_data(&mut bins);
            let now_ms = js_sys::Date::now();
            let Ok(mut ctl) = controller.try_borrow_mut() else {
                log::warn!("[audio] controller busy; dropping tick");
                return;
            };
            match ctl.on_audio_frame(now_ms, &bins) {
                Ok(level) => {
                    if let Some(meter) = &level_meter {
                        meter.set_value(&format!("{:.0}", level));
                    }
                }
                Err(e) => log::error!("[audio] tick failed: {}", e),
            }
        }) as Box<dyn FnMut()>);
        #[allow(deprecated)]
        processor.set_onaudioprocess(Some(on_process.as_ref().unchecked_ref()));

        // A remote track that ends just stops the processing callback; say so.
        let on_ended = Closure::wrap(Box::new(move || {
            log::warn!("[audio] remote audio track ended");
        }) as Box<dyn FnMut()>);
        let tracks: Vec<web::MediaStreamTrack> = stream
            .get_audio_tracks()
            .iter()
            .map(|t| t.unchecked_into::<web::MediaStreamTrack>())
            .collect();
        for track in &tracks {
            track.set_onended(Some(on_ended.as_ref().unchecked_ref()));
        }

        log::info!(
            "[audio] tap attached: fft={} bins={} buffer={} sr={}",
            FFT_SIZE,
            analyser.frequency_bin_count(),
            PROCESSOR_BUFFER_SIZE,
            audio_ctx.sample_rate()
        );

        Ok(Self {
            audio_ctx,
            source,
            analyser,
            processor,
            tracks,
            _on_process: on_process,
            _on_ended: on_ended,
        })
    }
}

impl Drop for AudioTap {
    fn drop(&mut self) {
        #[allow(deprecated)]
        self.processor.set_onaudioprocess(None);
        for track in &self.tracks {
            track.set_onended(None);
        }
        _ = self.source.disconnect();
        _ = self.analyser.disconnect();
        _ = self.processor.disconnect();
        _ = self.audio_ctx.close();
        log::info!("[audio] tap detached");
    }
}
