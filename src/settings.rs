use crate::dom;
use avatar_core::{
    save_config, AnimationConfig, AvatarController, AvatarError, SettingsStore,
    KEY_BODY_MOTION, KEY_BODY_THRESHOLD, KEY_EXPRESSION, KEY_MOUTH_BOOST, KEY_MOUTH_THRESHOLD,
};
use web_sys as web;

/// `window.localStorage` as a settings store.
pub struct LocalStorageStore {
    storage: web::Storage,
}

impl LocalStorageStore {
    pub fn open() -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let storage = window
            .local_storage()
            .map_err(|e| anyhow::anyhow!("localStorage error: {:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("localStorage unavailable"))?;
        Ok(Self { storage })
    }
}

impl SettingsStore for LocalStorageStore {
    fn get(&self, key: &str) -> avatar_core::Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| AvatarError::Settings(format!("{:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> avatar_core::Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| AvatarError::Settings(format!("{:?}", e)))
    }
}

// Slider ids match the storage keys.
const SLIDERS: [&str; 5] = [
    KEY_MOUTH_THRESHOLD,
    KEY_MOUTH_BOOST,
    KEY_BODY_THRESHOLD,
    KEY_BODY_MOTION,
    KEY_EXPRESSION,
];

pub fn write_sliders(document: &web::Document, config: &AnimationConfig) {
    let values = [
        config.mouth_threshold,
        config.mouth_boost,
        config.body_threshold,
        config.body_motion,
        config.expression_bias,
    ];
    for (id, value) in SLIDERS.iter().zip(values) {
        dom::set_input_value(document, id, &value.to_string());
    }
}

/// Read the sliders over `base`; unreadable sliders keep the base value.
pub fn read_sliders(document: &web::Document, base: &AnimationConfig) -> AnimationConfig {
    let read = |id: &str, fallback: f32| {
        dom::input_value(document, id)
            .and_then(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(fallback)
    };
    AnimationConfig {
        mouth_threshold: read(KEY_MOUTH_THRESHOLD, base.mouth_threshold),
        mouth_boost: read(KEY_MOUTH_BOOST, base.mouth_boost),
        body_threshold: read(KEY_BODY_THRESHOLD, base.body_threshold),
        body_motion: read(KEY_BODY_MOTION, base.body_motion),
        expression_bias: read(KEY_EXPRESSION, base.expression_bias),
        expression_intensity: base.expression_intensity,
    }
}

/// Copy the sliders into the controller and persist them.
pub fn apply_from_sliders<S: SettingsStore + ?Sized>(
    document: &web::Document,
    controller: &mut AvatarController,
    store: &mut S,
) -> avatar_core::Result<()> {
    let config = read_sliders(document, controller.config());
    controller.apply_config(config);
    save_config(store, &config)
}
