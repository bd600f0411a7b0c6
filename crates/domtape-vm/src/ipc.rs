use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use serde_json::json;
use smol_str::SmolStr;

/// Envelope posted to the host process: a method name plus a JSON params
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcMessage {
    pub method: SmolStr,
    pub params: serde_json::Value,
}

impl IpcMessage {
    /// One-time signal that an interpreter stood up against a root.
    pub fn initialize() -> Self {
        Self {
            method: "initialize".into(),
            params: json!({}),
        }
    }

    /// A dispatched input event that resolved to a known node id.
    pub fn user_event(event: &str, mounted_dom_id: u64, contents: serde_json::Value) -> Self {
        Self {
            method: "user_event".into(),
            params: json!({
                "event": event,
                "mounted_dom_id": mounted_dom_id,
                "contents": contents,
            }),
        }
    }

    /// A link navigation redirected to host-level handling.
    pub fn browser_open(href: &str) -> Self {
        Self {
            method: "browser_open".into(),
            params: json!({ "href": href }),
        }
    }
}

/// Fire-and-forget outbound channel to the host. Posting never blocks and
/// never fails the caller; a dropped receiver only logs.
#[derive(Debug, Clone)]
pub struct IpcSender {
    tx: Sender<IpcMessage>,
}

impl IpcSender {
    pub fn channel() -> (Self, Receiver<IpcMessage>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    pub fn post(&self, message: IpcMessage) {
        if self.tx.send(message).is_err() {
            tracing::warn!("host receiver dropped, discarding outbound ipc message");
        }
    }
}
