//! Room-scoped fan-out of playback-control messages.
//!
//! [`ControlHub`] tracks connected participants and the rooms they belong to.
//! Every participant joins [`DEFAULT_ROOM`] on connect. A control message is
//! relayed verbatim to every *other* member of its room; the payload is
//! opaque apart from the `action` field and the optional `room` selector.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tokio::sync::mpsc;

use crate::ids::ParticipantId;

/// Room used when a message or join request names none.
pub const DEFAULT_ROOM: &str = "default";

/// Outbound queue depth per participant.
const PARTICIPANT_QUEUE: usize = 64;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A playback-control message such as `play`, `pause`, or `seek`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub action: String,
    /// Room scope; [`DEFAULT_ROOM`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// Everything else the sender attached, relayed untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ControlMessage {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            room: None,
            extra: Map::new(),
        }
    }

    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The room this message is scoped to.
    pub fn room(&self) -> &str {
        self.room.as_deref().unwrap_or(DEFAULT_ROOM)
    }
}

/// Request to subscribe to a named room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoom {
    #[serde(default)]
    pub room: Option<String>,
}

/// Events a client sends over the real-time channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Control(ControlMessage),
    JoinRoom(JoinRoom),
}

/// Events the server pushes to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Control(ControlMessage),
    /// Acknowledgement sent only to the participant that joined.
    Joined { room: String },
}

// ---------------------------------------------------------------------------
// ControlHub
// ---------------------------------------------------------------------------

/// Registry of connected participants and their room memberships.
pub struct ControlHub {
    participants: DashMap<ParticipantId, mpsc::Sender<ServerEvent>>,
    rooms: DashMap<String, HashSet<ParticipantId>>,
}

impl ControlHub {
    pub fn new() -> Self {
        Self {
            participants: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    /// Register a new participant in the default room.
    ///
    /// The returned receiver yields every event addressed to the participant.
    pub fn connect(&self) -> (ParticipantId, mpsc::Receiver<ServerEvent>) {
        let id = ParticipantId::new();
        let (tx, rx) = mpsc::channel(PARTICIPANT_QUEUE);
        self.participants.insert(id, tx);
        self.rooms
            .entry(DEFAULT_ROOM.to_string())
            .or_default()
            .insert(id);
        tracing::debug!(participant = %id, "Control participant connected");
        (id, rx)
    }

    /// Subscribe `id` to `room` and acknowledge the join to it alone.
    ///
    /// Returns `false` if the participant is not connected.
    pub fn join(&self, id: ParticipantId, room: Option<&str>) -> bool {
        if !self.participants.contains_key(&id) {
            return false;
        }

        let room = room
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROOM)
            .to_string();

        self.rooms.entry(room.clone()).or_default().insert(id);
        tracing::info!(participant = %id, room = %room, "Participant joined room");

        self.deliver(id, ServerEvent::Joined { room });
        true
    }

    /// Relay `message` to every other member of its room.
    ///
    /// Only members of the room may publish into it. Returns the number of
    /// participants the message was queued for.
    pub fn broadcast(&self, from: ParticipantId, message: ControlMessage) -> usize {
        let room = message.room().to_string();

        // Snapshot membership so no map guard is held while sending.
        let members: Vec<ParticipantId> = match self.rooms.get(&room) {
            Some(members) if members.contains(&from) => {
                members.iter().copied().filter(|m| *m != from).collect()
            }
            _ => {
                tracing::warn!(
                    participant = %from,
                    room = %room,
                    "Sender is not a member of the room; dropping control message"
                );
                return 0;
            }
        };

        let event = ServerEvent::Control(message);
        members
            .into_iter()
            .filter(|member| self.deliver(*member, event.clone()))
            .count()
    }

    /// Forget a participant and drop it from all rooms.
    pub fn disconnect(&self, id: ParticipantId) {
        self.participants.remove(&id);
        self.rooms.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });
        tracing::debug!(participant = %id, "Control participant disconnected");
    }

    /// Number of participants currently subscribed to `room`.
    pub fn room_size(&self, room: &str) -> usize {
        self.rooms.get(room).map(|m| m.len()).unwrap_or(0)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    fn deliver(&self, to: ParticipantId, event: ServerEvent) -> bool {
        let Some(tx) = self.participants.get(&to).map(|tx| tx.clone()) else {
            return false;
        };

        match tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(participant = %to, "Control queue full; dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(participant = %to, "Control receiver closed");
                false
            }
        }
    }
}

impl Default for ControlHub {
    fn default() -> Self {
        Self::new()
    }
}
