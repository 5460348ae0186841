//! Defines the WebSocket message protocol between the browser client and the API server.

use crate::models::{FailureResponse, PlanResponse};
use learnpath_core::ProgressEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Starts a run. This must be the first message.
    Start { topic: String },
    /// Stops the run in progress.
    Cancel,
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The run was accepted.
    Started { run_id: Uuid, topic: String },
    /// One pipeline transition.
    Progress { event: ProgressEvent },
    /// The finished plan. Terminal.
    Plan { plan: PlanResponse },
    /// The run stopped at a stage. Terminal.
    Failed { failure: FailureResponse },
    /// The run was cancelled. Terminal.
    Cancelled,
    /// The request could not be processed. Terminal.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_parse() {
        let start: ClientMessage =
            serde_json::from_str(r#"{"type":"start","topic":"Rust"}"#).unwrap();
        assert_eq!(
            start,
            ClientMessage::Start {
                topic: "Rust".to_string()
            }
        );
        let cancel: ClientMessage = serde_json::from_str(r#"{"type":"cancel"}"#).unwrap();
        assert_eq!(cancel, ClientMessage::Cancel);
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"init"}"#).is_err());
    }

    #[test]
    fn test_progress_message_nests_event() {
        let msg = ServerMessage::Progress {
            event: ProgressEvent::ModulesReady { count: 5 },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["event"]["event"], "modules_ready");
        assert_eq!(json["event"]["count"], 5);

        let json = serde_json::to_value(ServerMessage::Cancelled).unwrap();
        assert_eq!(json, serde_json::json!({"type": "cancelled"}));
    }
}
