//! Game settings and preferences
//!
//! Persisted separately from the best score in LocalStorage.

use serde::{Deserialize, Serialize};

/// Default generative model for level content
pub const DEFAULT_ORACLE_MODEL: &str = "gemini-2.5-flash";

/// Where level content comes from
///
/// With no endpoint configured the oracle counts as disconnected and every
/// level uses the local fallback layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    /// Base URL of the generative API, e.g. `https://generativelanguage.googleapis.com/v1beta`
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: DEFAULT_ORACLE_MODEL.to_string(),
        }
    }
}

impl OracleSettings {
    pub fn is_configured(&self) -> bool {
        self.endpoint
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty())
    }

    /// Full `generateContent` URL, or None when no endpoint is set
    pub fn request_url(&self) -> Option<String> {
        if !self.is_configured() {
            return None;
        }
        let endpoint = self.endpoint.as_deref()?.trim().trim_end_matches('/');
        let model = if self.model.trim().is_empty() {
            DEFAULT_ORACLE_MODEL
        } else {
            self.model.trim()
        };
        let mut url = format!("{endpoint}/models/{model}:generateContent");
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            url.push_str("?key=");
            url.push_str(key);
        }
        Some(url)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Oracle ===
    pub oracle: OracleSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            mute_on_blur: true,
            oracle: OracleSettings::default(),
        }
    }
}

impl Settings {
    /// Effective music gain multiplier (0 when muted)
    pub fn music_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective sound effect gain multiplier (0 when muted)
    pub fn sfx_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "crypto_breakout_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native: defaults, with the oracle endpoint/key taken from the environment
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let mut settings = Self::default();
        settings.oracle.endpoint = std::env::var("CRYPTO_BREAKOUT_ORACLE_URL").ok();
        settings.oracle.api_key = std::env::var("CRYPTO_BREAKOUT_API_KEY").ok();
        if let Ok(model) = std::env::var("CRYPTO_BREAKOUT_MODEL") {
            settings.oracle.model = model;
        }
        settings
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
