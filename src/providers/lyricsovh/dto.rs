//! Lyrics.ovh API Data Transfer Objects
//!
//! The whole API is one endpoint returning a single field.

use serde::{Deserialize, Serialize};

/// `GET /v1/{artist}/{title}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LyricsResponse {
    #[serde(default)]
    pub lyrics: String,
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_lyrics() {
        let json = r#"{"lyrics": "Is this the real life?\nIs this just fantasy?"}"#;
        let response: LyricsResponse = serde_json::from_str(json).expect("Should parse lyrics");
        assert!(response.lyrics.starts_with("Is this the real life?"));
    }

    #[test]
    fn test_parse_empty_object() {
        let response: LyricsResponse = serde_json::from_str("{}").expect("Should parse");
        assert!(response.lyrics.is_empty());
    }
}
