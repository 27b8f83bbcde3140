use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use gridlock_core::events::GameEvent;
use gridlock_core::grid::GridPos;
use gridlock_core::maze::MazeDifficulty;
use gridlock_core::player::{Player, PlayerColor, PlayerId};
use gridlock_core::room::{GameMode, Room, RoomSummary, generate_room_code};

/// Why a join or create attempt was refused. Sent back verbatim in the
/// join response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    RoomNotFound,
    RoomFull,
    GameInProgress,
    InvalidName,
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::RoomNotFound => write!(f, "Room not found"),
            JoinError::RoomFull => write!(f, "Room is full"),
            JoinError::GameInProgress => write!(f, "Game already in progress"),
            JoinError::InvalidName => write!(f, "Invalid player name"),
        }
    }
}

impl std::error::Error for JoinError {}

const MAX_NAME_LEN: usize = 24;

/// Owns every live room. All game logic runs synchronously under the
/// registry lock; the transport layer only ever sees emitted events.
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    next_player_id: PlayerId,
    rng: StdRng,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            next_player_id: 1,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic registry for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rooms: HashMap::new(),
            next_player_id: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn alloc_player_id(&mut self) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        id
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Create a room with the caller as host. Returns the room id and the
    /// host's player id.
    pub fn create_room(
        &mut self,
        name: &str,
        mode: GameMode,
    ) -> Result<(String, PlayerId), JoinError> {
        let name = valid_name(name)?;
        let id = loop {
            let candidate = generate_room_code(&mut self.rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let player_id = self.alloc_player_id();
        let room_rng = StdRng::from_rng(&mut self.rng);
        let host = Player::new(player_id, name, PlayerColor::PALETTE[0]);
        let room = Room::new(id.clone(), host, mode, room_rng);
        tracing::info!(room = %id, player_id, "Room created");
        self.rooms.insert(id.clone(), room);
        Ok((id, player_id))
    }

    /// Join an existing waiting room. Emits `player-joined` to the room.
    pub fn join_room(
        &mut self,
        room_id: &str,
        name: &str,
    ) -> Result<(PlayerId, Vec<GameEvent>), JoinError> {
        let name = valid_name(name)?;
        let player_id = self.next_player_id;
        let room = self.rooms.get_mut(room_id).ok_or(JoinError::RoomNotFound)?;
        if room.is_full() {
            return Err(JoinError::RoomFull);
        }
        if room.is_playing() {
            return Err(JoinError::GameInProgress);
        }
        let color = room.next_color().ok_or(JoinError::RoomFull)?;
        self.next_player_id += 1;
        let player = Player::new(player_id, name, color);
        room.players.push(player.clone());
        room.touch();
        tracing::info!(room = %room_id, player_id, "Player joined");
        Ok((player_id, vec![GameEvent::PlayerJoined { player }]))
    }

    /// Remove a player. The room dissolves when the last member leaves;
    /// otherwise the host role migrates to the longest-standing member and
    /// a playing room gets its mode state repaired (an orphaned role is
    /// reassigned, or the end condition re-checked).
    pub fn leave_room(&mut self, room_id: &str, player_id: PlayerId, now: u64) -> Vec<GameEvent> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        let before = room.players.len();
        room.players.retain(|p| p.id != player_id);
        if room.players.len() == before {
            return Vec::new();
        }
        tracing::info!(room = %room_id, player_id, "Player left");

        if room.players.is_empty() {
            self.rooms.remove(room_id);
            tracing::info!(room = %room_id, "Room dissolved");
            return Vec::new();
        }

        let mut events = vec![GameEvent::PlayerLeft { player_id }];
        if room.host_id == player_id {
            room.host_id = room.players[0].id;
            events.push(GameEvent::HostChanged {
                host_id: room.host_id,
            });
        }
        events.extend(gridlock_modes::handle_leave(room, player_id, now));
        room.touch();
        events
    }

    /// Switch the mode of a waiting room, rebuilding the mode scaffolding.
    pub fn set_game_mode(
        &mut self,
        room_id: &str,
        player_id: PlayerId,
        mode: GameMode,
    ) -> Vec<GameEvent> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        if room.is_playing() || room.player(player_id).is_none() {
            return Vec::new();
        }
        room.game_mode = mode;
        room.game_state = gridlock_core::state::GameState::scaffold(mode);
        room.touch();
        vec![GameEvent::GameModeChanged { game_mode: mode }]
    }

    /// Host-only maze difficulty selection for maze-based modes.
    pub fn set_maze_difficulty(
        &mut self,
        room_id: &str,
        player_id: PlayerId,
        difficulty: MazeDifficulty,
    ) -> Vec<GameEvent> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        if room.is_playing() || room.host_id != player_id {
            return Vec::new();
        }
        room.maze_difficulty = difficulty;
        room.touch();
        vec![GameEvent::MazeDifficultyChanged { difficulty }]
    }

    /// Host-only game start.
    pub fn start_game(&mut self, room_id: &str, player_id: PlayerId, now: u64) -> Vec<GameEvent> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        if room.host_id != player_id {
            return Vec::new();
        }
        room.touch();
        gridlock_modes::start_game(room, now)
    }

    pub fn player_move(
        &mut self,
        room_id: &str,
        player_id: PlayerId,
        pos: GridPos,
        now: u64,
    ) -> Vec<GameEvent> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        room.touch();
        gridlock_modes::handle_move(room, player_id, pos, now)
    }

    pub fn player_ability(
        &mut self,
        room_id: &str,
        player_id: PlayerId,
        now: u64,
    ) -> Vec<GameEvent> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        room.touch();
        gridlock_modes::handle_ability(room, player_id, now)
    }

    pub fn player_guess(
        &mut self,
        room_id: &str,
        player_id: PlayerId,
        guess: &str,
        now: u64,
    ) -> Vec<GameEvent> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        room.touch();
        gridlock_modes::handle_guess(room, player_id, guess, now)
    }

    pub fn player_pad_attempt(
        &mut self,
        room_id: &str,
        player_id: PlayerId,
        pad_id: u32,
        now: u64,
    ) -> Vec<GameEvent> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        room.touch();
        gridlock_modes::handle_pad_attempt(room, player_id, pad_id, now)
    }

    /// Lobby discovery: rooms that can currently accept a join.
    pub fn available_rooms(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .values()
            .filter(|r| !r.is_playing() && !r.is_full())
            .map(RoomSummary::of)
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Advance every playing room by one tick, collecting per-room events.
    pub fn tick_all(&mut self, now: u64) -> Vec<(String, Vec<GameEvent>)> {
        let mut out = Vec::new();
        for (id, room) in &mut self.rooms {
            if !room.is_playing() {
                continue;
            }
            let events = gridlock_modes::tick(room, now);
            if !events.is_empty() {
                out.push((id.clone(), events));
            }
        }
        out
    }

    /// Drop rooms that have seen no activity for `max_idle`. Returns the
    /// ids of the rooms removed.
    pub fn cleanup_idle_rooms(&mut self, max_idle: Duration) -> Vec<String> {
        let stale: Vec<String> = self
            .rooms
            .iter()
            .filter(|(_, r)| r.last_activity.elapsed() >= max_idle)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            self.rooms.remove(id);
            tracing::info!(room = %id, "Idle room removed");
        }
        stale
    }
}

fn valid_name(name: &str) -> Result<&str, JoinError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_NAME_LEN {
        return Err(JoinError::InvalidName);
    }
    Ok(trimmed)
}
