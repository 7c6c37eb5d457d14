//! Session state for one dialogue: messages, topic graph, notes, selection.
//!
//! Everything is memory-resident. State changes go through
//! [`SessionState::apply`], one [`Action`] at a time.

mod driver;
mod state;

pub use driver::{Dialogue, TurnReport};
pub use state::{Action, Applied, SessionState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::{ChatMessage, Role};

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Unique, strictly increasing ids derived from creation time (milliseconds).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Next id for something created at `at`
    pub fn next(&mut self, at: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        self.last = millis.max(self.last + 1);
        self.last
    }
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Wire form sent to the gateway
    pub fn to_chat(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A user-curated snapshot of selected messages plus a reflection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: u64,
    /// Copies taken at synthesis time, in transcript order.
    pub selected_messages: Vec<Message>,
    pub reflection: String,
    pub timestamp: DateTime<Utc>,
}
