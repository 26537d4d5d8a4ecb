//! The mutation events surfaced by the service facade's `Events` stream.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordEvent {
    RecordPushed { cid: String },
    RecordDeleted { cid: String },
    RecordPublished { cid: String },
    RecordUnpublished { cid: String },
    RecordSigned { cid: String },
}

impl RecordEvent {
    pub fn cid(&self) -> &str {
        match self {
            RecordEvent::RecordPushed { cid }
            | RecordEvent::RecordDeleted { cid }
            | RecordEvent::RecordPublished { cid }
            | RecordEvent::RecordUnpublished { cid }
            | RecordEvent::RecordSigned { cid } => cid,
        }
    }
}
