//! In-process fan-out of state changes to WebSocket clients.
//!
//! Services publish [`RealtimeEvent`]s to the [`RealtimeHub`]; each connection holds a
//! [`Subscription`] that decides which events it forwards. Publishing never fails: with
//! no connected clients the event is dropped.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize, Serializer};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Audience of an event within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    /// Everyone connected to the tenant.
    Tenant,
    /// Clients that joined a task's detail view.
    Task(i32),
    /// A single user's connections.
    User(i32),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Tenant => write!(f, "tenant"),
            Room::Task(id) => write!(f, "task:{}", id),
            Room::User(id) => write!(f, "user:{}", id),
        }
    }
}

impl Serialize for Room {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEvent {
    pub tenant_id: i32,
    pub room: Room,
    /// Dotted event name, e.g. `task.moved`.
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Clone)]
pub struct RealtimeHub {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Serializes `payload` and broadcasts it to `room` of `tenant_id`.
    pub fn publish<T: Serialize>(&self, tenant_id: i32, room: Room, event: &str, payload: &T) {
        let payload = match serde_json::to_value(payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize realtime event {}: {}", event, e);
                return;
            }
        };

        tracing::debug!(
            tenant_id,
            room = %room,
            event,
            subscribers = self.sender.receiver_count(),
            "Realtime publish"
        );

        let _ = self.sender.send(RealtimeEvent {
            tenant_id,
            room,
            event: event.to_string(),
            payload,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }
}

/// Rooms a single connection listens to. Always includes its tenant and user rooms.
#[derive(Debug, Clone)]
pub struct Subscription {
    tenant_id: i32,
    rooms: HashSet<Room>,
}

impl Subscription {
    pub fn new(tenant_id: i32, user_id: i32) -> Self {
        Self {
            tenant_id,
            rooms: HashSet::from([Room::Tenant, Room::User(user_id)]),
        }
    }

    pub fn join(&mut self, room: Room) {
        self.rooms.insert(room);
    }

    /// Leaves a task room. Tenant and user rooms cannot be left.
    pub fn leave_task(&mut self, task_id: i32) {
        self.rooms.remove(&Room::Task(task_id));
    }

    pub fn accepts(&self, event: &RealtimeEvent) -> bool {
        event.tenant_id == self.tenant_id && self.rooms.contains(&event.room)
    }
}

/// Message a client sends over the socket.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    Join { task_id: i32 },
    Leave { task_id: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(tenant_id: i32, room: Room) -> RealtimeEvent {
        RealtimeEvent {
            tenant_id,
            room,
            event: "task.updated".to_string(),
            payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn serializes_rooms_as_strings() {
        let json = serde_json::to_value(event(1, Room::Task(7))).unwrap();

        assert_eq!(json["room"], "task:7");
        assert_eq!(Room::Tenant.to_string(), "tenant");
        assert_eq!(Room::User(3).to_string(), "user:3");
    }

    /// Tests subscription filtering by tenant and room.
    ///
    /// Expected: only the connection's tenant, user and joined task rooms pass
    #[test]
    fn filters_by_tenant_and_room() {
        let mut sub = Subscription::new(1, 10);

        assert!(sub.accepts(&event(1, Room::Tenant)));
        assert!(sub.accepts(&event(1, Room::User(10))));
        assert!(!sub.accepts(&event(1, Room::User(11))));
        assert!(!sub.accepts(&event(2, Room::Tenant)));
        assert!(!sub.accepts(&event(1, Room::Task(5))));

        sub.join(Room::Task(5));
        assert!(sub.accepts(&event(1, Room::Task(5))));

        sub.leave_task(5);
        assert!(!sub.accepts(&event(1, Room::Task(5))));
    }

    #[test]
    fn parses_client_commands() {
        let join: ClientCommand = serde_json::from_str(r#"{"action":"join","task_id":4}"#).unwrap();
        let leave: ClientCommand =
            serde_json::from_str(r#"{"action":"leave","task_id":4}"#).unwrap();

        assert_eq!(join, ClientCommand::Join { task_id: 4 });
        assert_eq!(leave, ClientCommand::Leave { task_id: 4 });
    }

    #[tokio::test]
    async fn delivers_published_events() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe();

        hub.publish(1, Room::Tenant, "task.created", &serde_json::json!({ "id": 9 }));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, "task.created");
        assert_eq!(received.payload["id"], 9);
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        RealtimeHub::new().publish(1, Room::Tenant, "task.deleted", &5);
    }
}
