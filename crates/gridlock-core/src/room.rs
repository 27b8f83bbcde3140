use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::constants::ROOM_CODE_LEN;
use crate::grid::GridPos;
use crate::maze::MazeDifficulty;
use crate::player::{Player, PlayerColor, PlayerId};
use crate::state::{GameState, GameStatus};

/// The eight supported rule-sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    Tag,
    Territory,
    MazeRace,
    Infection,
    TrapRush,
    SpyDecode,
    Heist,
    HideSeek,
}

impl GameMode {
    pub const ALL: [GameMode; 8] = [
        GameMode::Tag,
        GameMode::Territory,
        GameMode::MazeRace,
        GameMode::Infection,
        GameMode::TrapRush,
        GameMode::SpyDecode,
        GameMode::Heist,
        GameMode::HideSeek,
    ];
}

/// One isolated multiplayer session. Exclusively owns its players and game
/// state; nothing here is shared across rooms.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub host_id: PlayerId,
    pub game_mode: GameMode,
    pub maze_difficulty: MazeDifficulty,
    pub players: Vec<Player>,
    pub game_state: GameState,
    #[serde(skip)]
    pub rng: StdRng,
    #[serde(skip)]
    pub last_activity: Instant,
}

impl Room {
    pub fn new(id: String, host: Player, mode: GameMode, rng: StdRng) -> Self {
        Self {
            id,
            host_id: host.id,
            game_mode: mode,
            maze_difficulty: MazeDifficulty::default(),
            players: vec![host],
            game_state: GameState::scaffold(mode),
            rng,
            last_activity: Instant::now(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= PlayerColor::PALETTE.len()
    }

    pub fn is_playing(&self) -> bool {
        self.game_state.status == GameStatus::Playing
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Ids of all players standing on `pos`, excluding `except`.
    pub fn players_at(&self, pos: GridPos, except: PlayerId) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.id != except && p.pos() == pos)
            .map(|p| p.id)
            .collect()
    }

    /// First palette color not held by a current member. Join order fills
    /// the palette front to back; leavers free their slot for reuse.
    pub fn next_color(&self) -> Option<PlayerColor> {
        PlayerColor::PALETTE
            .iter()
            .find(|c| !self.players.iter().any(|p| p.color == **c))
            .copied()
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Lobby-discovery summary of a joinable room.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub game_mode: GameMode,
    pub player_count: usize,
    pub max_players: usize,
}

impl RoomSummary {
    pub fn of(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            game_mode: room.game_mode,
            player_count: room.players.len(),
            max_players: PlayerColor::PALETTE.len(),
        }
    }
}

const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a 6-character uppercase base-36 room code.
pub fn generate_room_code(rng: &mut StdRng) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn room_code_format() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let code = generate_room_code(&mut rng);
            assert!(is_valid_room_code(&code), "Invalid room code: {code}");
        }
    }

    #[test]
    fn rejects_bad_codes() {
        assert!(!is_valid_room_code("abc123"));
        assert!(!is_valid_room_code("ABCDE"));
        assert!(!is_valid_room_code("ABCDEFG"));
        assert!(!is_valid_room_code("ABC 12"));
    }

    #[test]
    fn colors_assigned_by_join_order() {
        let rng = StdRng::seed_from_u64(1);
        let host = Player::new(1, "host", PlayerColor::PALETTE[0]);
        let mut room = Room::new("AAAAAA".into(), host, GameMode::Tag, rng);
        assert_eq!(room.next_color(), Some(PlayerColor::PALETTE[1]));
        room.players
            .push(Player::new(2, "p2", PlayerColor::PALETTE[1]));
        assert_eq!(room.next_color(), Some(PlayerColor::PALETTE[2]));
        // A leaver frees their color for the next joiner
        room.players.retain(|p| p.id != 2);
        assert_eq!(room.next_color(), Some(PlayerColor::PALETTE[1]));
    }

    #[test]
    fn full_at_palette_size() {
        let rng = StdRng::seed_from_u64(1);
        let host = Player::new(1, "host", PlayerColor::PALETTE[0]);
        let mut room = Room::new("AAAAAA".into(), host, GameMode::Tag, rng);
        for i in 1..PlayerColor::PALETTE.len() {
            let color = room.next_color().unwrap();
            room.players
                .push(Player::new(i as PlayerId + 1, format!("p{i}"), color));
        }
        assert!(room.is_full());
        assert_eq!(room.next_color(), None);
    }
}
