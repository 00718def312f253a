use crate::constants::EXPRESSION_INTENSITY;
use crate::error::Result;
use fnv::FnvHashMap;

pub const KEY_MARKER: &str = "localvalues";
pub const KEY_MOUTH_THRESHOLD: &str = "mouththreshold";
pub const KEY_MOUTH_BOOST: &str = "mouthboost";
pub const KEY_BODY_THRESHOLD: &str = "bodythreshold";
pub const KEY_BODY_MOTION: &str = "bodymotion";
pub const KEY_EXPRESSION: &str = "expression";

/// User-tunable animation parameters. Values are 0..=100 by convention.
///
/// `body_threshold` and `body_motion` are persisted and shown in the settings
/// panel but nothing in the animation reads them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    pub mouth_threshold: f32,
    pub mouth_boost: f32,
    pub body_threshold: f32,
    pub body_motion: f32,
    pub expression_bias: f32,
    pub expression_intensity: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            mouth_threshold: 10.0,
            mouth_boost: 10.0,
            body_threshold: 10.0,
            body_motion: 10.0,
            expression_bias: 80.0,
            expression_intensity: EXPRESSION_INTENSITY,
        }
    }
}

/// Upper bounds for the two drift channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftCeilings {
    pub positive: f32,
    pub negative: f32,
}

impl AnimationConfig {
    pub fn drift_ceilings(&self) -> DriftCeilings {
        let bias = self.expression_bias / 100.0;
        DriftCeilings {
            positive: bias * self.expression_intensity,
            negative: (1.0 - bias) * self.expression_intensity,
        }
    }

    /// Fields exposed to the settings surface, paired with their storage keys.
    fn persisted_fields(&self) -> [(&'static str, f32); 5] {
        [
            (KEY_MOUTH_THRESHOLD, self.mouth_threshold),
            (KEY_MOUTH_BOOST, self.mouth_boost),
            (KEY_BODY_THRESHOLD, self.body_threshold),
            (KEY_BODY_MOTION, self.body_motion),
            (KEY_EXPRESSION, self.expression_bias),
        ]
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut f32> {
        match key {
            KEY_MOUTH_THRESHOLD => Some(&mut self.mouth_threshold),
            KEY_MOUTH_BOOST => Some(&mut self.mouth_boost),
            KEY_BODY_THRESHOLD => Some(&mut self.body_threshold),
            KEY_BODY_MOTION => Some(&mut self.body_motion),
            KEY_EXPRESSION => Some(&mut self.expression_bias),
            _ => None,
        }
    }
}

/// Flat string key/value persistence, e.g. browser localStorage.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    entries: FnvHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Load persisted settings. Returns `None` when nothing was ever saved.
///
/// Values are taken as stored; a key that is missing or does not parse as a
/// number keeps its default.
pub fn load_config<S: SettingsStore + ?Sized>(store: &S) -> Result<Option<AnimationConfig>> {
    if store.get(KEY_MARKER)?.is_none() {
        return Ok(None);
    }
    let mut config = AnimationConfig::default();
    let keys = config.persisted_fields().map(|(k, _)| k);
    for key in keys {
        let Some(raw) = store.get(key)? else {
            continue;
        };
        match raw.trim().parse::<f32>() {
            Ok(v) if v.is_finite() => {
                if let Some(field) = config.field_mut(key) {
                    *field = v;
                }
            }
            _ => log::warn!("[settings] ignoring unparsable {}={:?}", key, raw),
        }
    }
    Ok(Some(config))
}

pub fn save_config<S: SettingsStore + ?Sized>(store: &mut S, config: &AnimationConfig) -> Result<()> {
    store.set(KEY_MARKER, "1")?;
    for (key, value) in config.persisted_fields() {
        store.set(key, &value.to_string())?;
    }
    Ok(())
}

/// Startup settings: what was saved, verbatim, or else `seed()` (e.g. the
/// panel's initial values), which is then persisted.
pub fn restore_or_seed<S: SettingsStore + ?Sized>(
    store: &mut S,
    seed: impl FnOnce() -> AnimationConfig,
) -> Result<AnimationConfig> {
    if let Some(saved) = load_config(store)? {
        return Ok(saved);
    }
    let config = seed();
    save_config(store, &config)?;
    Ok(config)
}
