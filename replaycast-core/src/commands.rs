//! Command vendor protocol.
//!
//! The external command transport delivers vendor-scoped requests with
//! a JSON payload and expects a JSON response. The types here pin the
//! wire shape; dispatch lives with the engine.

use serde::{Deserialize, Serialize};

/// Vendor namespace the engine registers with the command transport
pub const VENDOR_NAME: &str = "replay-plugin";

/// Request name: replay one scene's cached frames on the program
pub const REQUEST_REPLAY_SCENE: &str = "ReplayScene";

/// Request name: save every populated ring to a file
pub const REQUEST_SAVE_ALL_REPLAYS: &str = "SaveAllReplays";

/// Response string for a `ReplayScene` request without a scene name
pub const ERROR_NO_SCENE_NAME: &str = "No scene name provided";

/// Payload of a `ReplayScene` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaySceneRequest {
    /// Scene whose ring should be replayed
    #[serde(default)]
    pub scene: Option<String>,
}

/// Response payload shared by all vendor requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Whether the request was accepted
    pub success: bool,
    /// Short human-readable error, present on failure only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    /// Successful response
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed response with a short error string
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_scene_request_roundtrip() {
        let request: ReplaySceneRequest =
            serde_json::from_str(r#"{"scene":"Game"}"#).unwrap();
        assert_eq!(request.scene.as_deref(), Some("Game"));

        let request: ReplaySceneRequest = serde_json::from_str("{}").unwrap();
        assert!(request.scene.is_none());
    }

    #[test]
    fn test_response_wire_shape() {
        let ok = serde_json::to_value(CommandResponse::ok()).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true}));

        let failed = serde_json::to_value(CommandResponse::failure(ERROR_NO_SCENE_NAME)).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"success": false, "error": "No scene name provided"})
        );
    }
}
