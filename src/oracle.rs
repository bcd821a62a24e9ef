//! Market oracle: generated level content
//!
//! Levels come from a generative model behind a `generateContent` style JSON
//! API. This module builds the request, unwraps the response envelope and
//! turns the model's JSON into a validated `LevelDescriptor`. Transport only
//! exists on wasm32; everything else is plain data and is tested natively.
//!
//! Failures surface as `OracleError`. The session decides what to do with
//! them (it substitutes the offline fallback level).

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::consts::*;
use crate::sim::{LevelDescriptor, LevelError, Sentiment};

/// Why no usable level came back
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OracleError {
    /// No endpoint configured
    NotConfigured,
    /// Network or browser API failure
    Transport(String),
    /// Non-2xx HTTP status
    Status(u16),
    /// Envelope had no candidate text
    EmptyResponse,
    /// Body or candidate text was not the expected JSON
    Parse(String),
    /// JSON parsed but describes an unusable level
    Invalid(LevelError),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "oracle endpoint not configured"),
            Self::Transport(msg) => write!(f, "oracle request failed: {msg}"),
            Self::Status(code) => write!(f, "oracle returned HTTP {code}"),
            Self::EmptyResponse => write!(f, "no response from oracle"),
            Self::Parse(msg) => write!(f, "malformed oracle response: {msg}"),
            Self::Invalid(e) => write!(f, "oracle level rejected: {e}"),
        }
    }
}

impl std::error::Error for OracleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LevelError> for OracleError {
    fn from(e: LevelError) -> Self {
        Self::Invalid(e)
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// The model's structured answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleResponse {
    pub level_name: String,
    #[serde(default)]
    pub market_analysis: String,
    pub market_sentiment: String,
    pub grid: Vec<i64>,
    /// Models sometimes emit `90.0` for an integer field, so accept any number
    #[serde(default)]
    pub target_time_seconds: Option<f64>,
}

impl OracleResponse {
    /// Par time, with missing or non-positive values replaced by the default
    pub fn par_secs(&self) -> u32 {
        match self.target_time_seconds {
            Some(t) if t.is_finite() && t >= 1.0 => t.round().min(u32::MAX as f64) as u32,
            _ => DEFAULT_PAR_SECONDS,
        }
    }

    /// Convert to a validated 10x8 descriptor
    pub fn into_descriptor(self) -> Result<LevelDescriptor, OracleError> {
        let par = self.par_secs();
        let sentiment = Sentiment::parse(&self.market_sentiment).unwrap_or_else(|| {
            log::warn!(
                "Unknown market sentiment {:?}, treating as volatile",
                self.market_sentiment
            );
            Sentiment::Volatile
        });
        let descriptor = LevelDescriptor {
            name: self.level_name,
            description: self.market_analysis,
            sentiment,
            grid: self.grid,
            columns: BRICK_COLS,
            rows: BRICK_ROWS,
            target_time_secs: par,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

/// Prompt text for a level
pub fn level_prompt(level: u32) -> String {
    format!(
        "Generate a crypto-themed breakout game level for LEVEL {level}.\n\
         Context:\n\
         - Level 1: Standard market.\n\
         - Level 2: Volatility increases (BTC/ETH blocks will move in game logic).\n\
         - Level 3+: High volatility (SOL blocks also move).\n\
         \n\
         Based on imaginary market sentiment for Level {level}:\n\
         1. Create a {cols} columns by {rows} rows grid ({cells} items total). \
         Use 0 (empty), 1 (BTC), 2 (ETH), 3 (SOL), 4 (USDT).\n\
         2. Determine a 'targetTimeSeconds' (integer between 60 and 300) which is a \
         challenging but achievable time to clear the level. Harder levels or denser \
         grids should have more time.",
        cols = BRICK_COLS,
        rows = BRICK_ROWS,
        cells = BRICK_COLS * BRICK_ROWS,
    )
}

/// JSON schema the model must answer with
fn response_schema(level: u32) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "levelName": {
                "type": "STRING",
                "description": format!(
                    "A creative name for Level {level} market condition (e.g. 'The Flippening', 'Whale Alert')"
                ),
            },
            "marketAnalysis": {
                "type": "STRING",
                "description": "A short, witty description of the market vibe (max 1 sentence).",
            },
            "marketSentiment": {
                "type": "STRING",
                "enum": ["BULLISH", "BEARISH", "VOLATILE"],
                "description": "The overall sentiment affecting game physics.",
            },
            "grid": {
                "type": "ARRAY",
                "items": { "type": "INTEGER" },
                "description": format!(
                    "A flat array of exactly {} integers representing the {}x{} grid. Values 0-4.",
                    BRICK_COLS * BRICK_ROWS, BRICK_COLS, BRICK_ROWS
                ),
            },
            "targetTimeSeconds": {
                "type": "INTEGER",
                "description": "The par time in seconds to complete this level for bonus points.",
            },
        },
        "required": ["levelName", "marketAnalysis", "marketSentiment", "grid", "targetTimeSeconds"],
    })
}

/// Full `generateContent` request body
pub fn request_body(level: u32) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": level_prompt(level) }],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(level),
        },
    })
}

/// Pull the first candidate's text out of a response envelope
pub fn extract_text(envelope: &Value) -> Result<&str, OracleError> {
    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .ok_or(OracleError::EmptyResponse)
}

/// Parse the model's JSON text into a descriptor
pub fn parse_level_text(text: &str) -> Result<LevelDescriptor, OracleError> {
    let response: OracleResponse = serde_json::from_str(text.trim())?;
    response.into_descriptor()
}

/// Parse a raw HTTP response body into a descriptor
pub fn parse_level(body: &str) -> Result<LevelDescriptor, OracleError> {
    let envelope: Value = serde_json::from_str(body)?;
    parse_level_text(extract_text(&envelope)?)
}

#[cfg(target_arch = "wasm32")]
mod transport {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::{OracleError, parse_level, request_body};
    use crate::settings::OracleSettings;
    use crate::sim::LevelDescriptor;

    fn js_err(e: JsValue) -> OracleError {
        OracleError::Transport(format!("{e:?}"))
    }

    /// Ask the oracle for a level
    pub async fn fetch_level(
        settings: &OracleSettings,
        level: u32,
    ) -> Result<LevelDescriptor, OracleError> {
        let url = settings.request_url().ok_or(OracleError::NotConfigured)?;
        let body = serde_json::to_string(&request_body(level))?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;

        let window = web_sys::window().ok_or_else(|| OracleError::Transport("no window".into()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;

        if !response.ok() {
            return Err(OracleError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .ok_or(OracleError::EmptyResponse)?;

        log::debug!("Oracle answered level {} ({} bytes)", level, text.len());
        parse_level(&text)
    }
}

#[cfg(target_arch = "wasm32")]
pub use transport::fetch_level;

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(grid: &[i64], sentiment: &str, par: Value) -> String {
        json!({
            "levelName": "Whale Alert",
            "marketAnalysis": "Big wallets are moving.",
            "marketSentiment": sentiment,
            "grid": grid,
            "targetTimeSeconds": par,
        })
        .to_string()
    }

    fn envelope(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP",
            }]
        })
        .to_string()
    }

    #[test]
    fn test_parse_well_formed_level() {
        let mut grid = vec![0; 80];
        grid[0] = 1;
        grid[79] = 3;
        let body = envelope(&answer(&grid, "BULLISH", json!(90)));

        let d = parse_level(&body).unwrap();
        assert_eq!(d.name, "Whale Alert");
        assert_eq!(d.description, "Big wallets are moving.");
        assert_eq!(d.sentiment, Sentiment::Bullish);
        assert_eq!(d.columns, 10);
        assert_eq!(d.rows, 8);
        assert_eq!(d.target_time_secs, 90);
        assert_eq!(d.brick_count(), 2);
    }

    #[test]
    fn test_par_defaults() {
        let grid = vec![4; 80];
        for par in [json!(0), json!(-30), json!(null)] {
            let d = parse_level_text(&answer(&grid, "BEARISH", par)).unwrap();
            assert_eq!(d.target_time_secs, DEFAULT_PAR_SECONDS);
        }
        let d = parse_level_text(&answer(&grid, "BEARISH", json!(150.0))).unwrap();
        assert_eq!(d.target_time_secs, 150);
    }

    #[test]
    fn test_unknown_sentiment_is_volatile() {
        let d = parse_level_text(&answer(&[2; 80], "sideways", json!(100))).unwrap();
        assert_eq!(d.sentiment, Sentiment::Volatile);
        let d = parse_level_text(&answer(&[2; 80], "bearish", json!(100))).unwrap();
        assert_eq!(d.sentiment, Sentiment::Bearish);
    }

    #[test]
    fn test_short_grid_rejected() {
        let err = parse_level_text(&answer(&[1; 79], "BULLISH", json!(90))).unwrap_err();
        assert_eq!(
            err,
            OracleError::Invalid(LevelError::GridLengthMismatch {
                expected: 80,
                actual: 79
            })
        );
    }

    #[test]
    fn test_unknown_code_keeps_level() {
        let mut grid = vec![1; 80];
        grid[5] = 9;
        let d = parse_level_text(&answer(&grid, "BULLISH", json!(90))).unwrap();
        assert_eq!(d.name, "Whale Alert");
        assert_eq!(d.grid[5], 9);
        assert_eq!(d.brick_count(), 80);
    }

    #[test]
    fn test_envelope_errors() {
        assert_eq!(
            parse_level(r#"{"candidates":[]}"#).unwrap_err(),
            OracleError::EmptyResponse
        );
        assert_eq!(
            parse_level(&envelope("  ")).unwrap_err(),
            OracleError::EmptyResponse
        );
        assert!(matches!(
            parse_level("<html>busy</html>"),
            Err(OracleError::Parse(_))
        ));
        assert!(matches!(
            parse_level(&envelope("not json")),
            Err(OracleError::Parse(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body(3);
        let text = body
            .pointer("/contents/0/parts/0/text")
            .and_then(Value::as_str)
            .unwrap();
        assert!(text.contains("LEVEL 3"));
        assert!(text.contains("10 columns by 8 rows grid (80 items total)"));
        assert_eq!(
            body.pointer("/generationConfig/responseMimeType"),
            Some(&json!("application/json"))
        );
        assert_eq!(
            body.pointer("/generationConfig/responseSchema/required")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(5)
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(OracleError::Status(503).to_string(), "oracle returned HTTP 503");
        assert_eq!(
            OracleError::from(LevelError::NoBricks).to_string(),
            "oracle level rejected: grid contains no bricks"
        );
    }
}
