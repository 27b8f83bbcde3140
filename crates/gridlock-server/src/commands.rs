use serde::Deserialize;

use gridlock_core::events::GameEvent;
use gridlock_core::grid::GridPos;
use gridlock_core::maze::MazeDifficulty;
use gridlock_core::player::PlayerId;
use gridlock_core::room::GameMode;
use gridlock_core::time;

use crate::dispatcher::Outbound;
use crate::state::AppState;

/// A client request, decoded from a JSON text frame of the form
/// `{"type": ..., "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
pub enum Command {
    CreateRoom {
        user: String,
        #[serde(default)]
        game_mode: GameMode,
    },
    JoinRoom {
        room_id: String,
        user: String,
    },
    SetGameMode {
        game_mode: GameMode,
    },
    SetMazeDifficulty {
        difficulty: MazeDifficulty,
    },
    StartGame,
    PlayerMove {
        new_pos: GridPos,
    },
    PlayerAbility,
    PlayerGuess {
        guess: String,
    },
    PlayerHeistGuess {
        pad_id: u32,
    },
    GetAvailableRooms,
    LeaveRoom,
}

/// Route an in-room command through the registry and label each resulting
/// event with its audience. Create and join never reach here; the socket
/// handshake consumes them.
pub async fn handle_command(
    state: &AppState,
    room_id: &str,
    player_id: PlayerId,
    cmd: Command,
) -> Vec<Outbound> {
    let now = time::now_ms();
    let mut registry = state.registry.write().await;
    match cmd {
        Command::CreateRoom { .. } | Command::JoinRoom { .. } => {
            tracing::debug!(room = %room_id, player_id, "Duplicate handshake command ignored");
            Vec::new()
        },
        Command::SetGameMode { game_mode } => {
            let events = registry.set_game_mode(room_id, player_id, game_mode);
            let mut out = room_scoped(room_id, events);
            if !out.is_empty() {
                out.push(lobby_update(&registry));
            }
            out
        },
        Command::SetMazeDifficulty { difficulty } => {
            room_scoped(room_id, registry.set_maze_difficulty(room_id, player_id, difficulty))
        },
        Command::StartGame => {
            let events = registry.start_game(room_id, player_id, now);
            let mut out = room_scoped(room_id, events);
            if !out.is_empty() {
                // The room just left the lobby list.
                out.push(lobby_update(&registry));
            }
            out
        },
        Command::PlayerMove { new_pos } => {
            room_scoped(room_id, registry.player_move(room_id, player_id, new_pos, now))
        },
        Command::PlayerAbility => {
            room_scoped(room_id, registry.player_ability(room_id, player_id, now))
        },
        Command::PlayerGuess { guess } => {
            room_scoped(room_id, registry.player_guess(room_id, player_id, &guess, now))
        },
        Command::PlayerHeistGuess { pad_id } => {
            room_scoped(room_id, registry.player_pad_attempt(room_id, player_id, pad_id, now))
        },
        Command::GetAvailableRooms => {
            vec![Outbound::Caller(GameEvent::AvailableRoomsUpdate {
                rooms: registry.available_rooms(),
            })]
        },
        Command::LeaveRoom => {
            let mut out = room_scoped(room_id, registry.leave_room(room_id, player_id, now));
            out.push(lobby_update(&registry));
            out
        },
    }
}

fn room_scoped(room_id: &str, events: Vec<GameEvent>) -> Vec<Outbound> {
    events
        .into_iter()
        .map(|e| Outbound::Room(room_id.to_string(), e))
        .collect()
}

pub fn lobby_update(registry: &crate::registry::RoomRegistry) -> Outbound {
    Outbound::Global(GameEvent::AvailableRoomsUpdate {
        rooms: registry.available_rooms(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_decode_from_wire_frames() {
        let cmd: Command = serde_json::from_str(
            r#"{"type": "player-move", "data": {"newPos": {"x": 3, "y": 4}}}"#,
        )
        .unwrap();
        assert!(matches!(cmd, Command::PlayerMove { new_pos } if new_pos == GridPos::new(3, 4)));

        let cmd: Command = serde_json::from_str(r#"{"type": "start-game"}"#).unwrap();
        assert!(matches!(cmd, Command::StartGame));

        let cmd: Command = serde_json::from_str(
            r#"{"type": "create-room", "data": {"user": "alice", "gameMode": "hide-seek"}}"#,
        )
        .unwrap();
        assert!(matches!(
            cmd,
            Command::CreateRoom { game_mode: GameMode::HideSeek, .. }
        ));
    }

    #[test]
    fn unknown_commands_fail_to_decode() {
        assert!(serde_json::from_str::<Command>(r#"{"type": "shutdown"}"#).is_err());
    }
}
