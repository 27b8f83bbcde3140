use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;
use tokio::sync::mpsc;

use gridlock_core::events::GameEvent;
use gridlock_core::player::PlayerId;

/// Per-player sender for outbound WebSocket text frames. Bounded so a slow
/// client backs up its own channel instead of the whole room.
pub type PlayerSender = mpsc::Sender<Bytes>;

/// Where an event produced by a command or tick should go.
#[derive(Debug)]
pub enum Outbound {
    /// Only the player who issued the command.
    Caller(GameEvent),
    /// Every member of one room.
    Room(String, GameEvent),
    /// Every connected client, regardless of room.
    Global(GameEvent),
}

/// Fan-out table from rooms to connected player channels. Events are
/// serialized once and the `Bytes` handle cloned per recipient.
#[derive(Default)]
pub struct Dispatcher {
    rooms: Mutex<HashMap<String, HashMap<PlayerId, PlayerSender>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, room_id: &str, player_id: PlayerId, sender: PlayerSender) {
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(player_id, sender);
    }

    pub fn unregister(&self, room_id: &str, player_id: PlayerId) {
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(members) = rooms.get_mut(room_id) {
            members.remove(&player_id);
            if members.is_empty() {
                rooms.remove(room_id);
            }
        }
    }

    /// Drop a room's entire sender table, e.g. after an idle sweep.
    pub fn drop_room(&self, room_id: &str) {
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        rooms.remove(room_id);
    }

    pub fn broadcast_room(&self, room_id: &str, event: &GameEvent) {
        let Some(frame) = encode(event) else { return };
        let rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(members) = rooms.get(room_id) {
            for (player_id, sender) in members {
                if sender.try_send(frame.clone()).is_err() {
                    tracing::warn!(room = %room_id, player_id, event = event.name(),
                        "Dropping event for backed-up client");
                }
            }
        }
    }

    pub fn broadcast_all(&self, event: &GameEvent) {
        let Some(frame) = encode(event) else { return };
        let rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        for members in rooms.values() {
            for sender in members.values() {
                let _ = sender.try_send(frame.clone());
            }
        }
    }

    pub fn send_to(&self, room_id: &str, player_id: PlayerId, event: &GameEvent) {
        let Some(frame) = encode(event) else { return };
        let rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = rooms.get(room_id).and_then(|m| m.get(&player_id)) {
            let _ = sender.try_send(frame);
        }
    }
}

fn encode(event: &GameEvent) -> Option<Bytes> {
    match serde_json::to_vec(event) {
        Ok(data) => Some(Bytes::from(data)),
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "Failed to encode event");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (PlayerSender, mpsc::Receiver<Bytes>) {
        mpsc::channel(8)
    }

    #[tokio::test]
    async fn room_broadcast_reaches_all_members() {
        let dispatcher = Dispatcher::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        dispatcher.register("ROOM01", 1, tx1);
        dispatcher.register("ROOM01", 2, tx2);

        dispatcher.broadcast_room("ROOM01", &GameEvent::TimerUpdate { timer: 5 });
        let frame = rx1.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&frame).unwrap();
        assert_eq!(parsed["name"], "timer-update");
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn broadcasts_stay_inside_the_room() {
        let dispatcher = Dispatcher::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        dispatcher.register("ROOM01", 1, tx1);
        dispatcher.register("ROOM02", 2, tx2);

        dispatcher.broadcast_room("ROOM01", &GameEvent::TimerUpdate { timer: 5 });
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_stops_delivery() {
        let dispatcher = Dispatcher::new();
        let (tx, mut rx) = channel();
        dispatcher.register("ROOM01", 1, tx);
        dispatcher.unregister("ROOM01", 1);
        dispatcher.broadcast_room("ROOM01", &GameEvent::TimerUpdate { timer: 5 });
        assert!(rx.try_recv().is_err());
    }
}
