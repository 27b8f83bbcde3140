pub mod common;
pub mod heist;
pub mod hide_seek;
pub mod infection;
pub mod maze_race;
pub mod spy;
pub mod tag;
pub mod territory;
pub mod trap_rush;
pub mod validator;

use gridlock_core::events::GameEvent;
use gridlock_core::grid::GridPos;
use gridlock_core::player::PlayerId;
use gridlock_core::room::{GameMode, Room};
use gridlock_core::state::{GameState, GameStatus, Winner};

/// Uniform contract every game mode implements. All handlers mutate the room
/// synchronously and return the events to broadcast; illegal actions are
/// silent no-ops returning an empty list.
pub trait ModeSim: Send + Sync {
    /// Set up mode sub-state, spawns, roles, and timers. The caller has
    /// already reset players and re-scaffolded the game state.
    fn start(&self, room: &mut Room, now: u64);

    /// Apply a validated move and any domain consequences.
    fn handle_move(&self, room: &mut Room, player_id: PlayerId, pos: GridPos, now: u64)
    -> Vec<GameEvent>;

    fn handle_ability(&self, _room: &mut Room, _player_id: PlayerId, _now: u64) -> Vec<GameEvent> {
        Vec::new()
    }

    fn handle_guess(
        &self,
        _room: &mut Room,
        _player_id: PlayerId,
        _guess: &str,
        _now: u64,
    ) -> Vec<GameEvent> {
        Vec::new()
    }

    fn handle_pad_attempt(
        &self,
        _room: &mut Room,
        _player_id: PlayerId,
        _pad_id: u32,
        _now: u64,
    ) -> Vec<GameEvent> {
        Vec::new()
    }

    /// Repair mode state after a player left a playing room: reassign an
    /// orphaned role or re-evaluate the win condition. The leaver is already
    /// gone from the roster.
    fn handle_leave(&self, _room: &mut Room, _player_id: PlayerId, _now: u64) -> Vec<GameEvent> {
        Vec::new()
    }

    /// One fixed-rate scheduler tick: timers, effect expiry, conversions.
    fn tick(&self, room: &mut Room, now: u64) -> Vec<GameEvent>;

    /// Finalize the game. Idempotent; a finished room stays finished.
    fn end_game(&self, room: &mut Room, winner: Winner) -> Vec<GameEvent> {
        common::end_game(room, winner)
    }
}

/// Static dispatch table over the closed mode enum, so the scheduler and
/// command router never special-case modes.
pub fn sim_for(mode: GameMode) -> &'static dyn ModeSim {
    match mode {
        GameMode::Tag => &tag::TagSim,
        GameMode::Territory => &territory::TerritorySim,
        GameMode::MazeRace => &maze_race::MazeRaceSim,
        GameMode::Infection => &infection::InfectionSim,
        GameMode::TrapRush => &trap_rush::TrapRushSim,
        GameMode::SpyDecode => &spy::SpySim,
        GameMode::Heist => &heist::HeistSim,
        GameMode::HideSeek => &hide_seek::HideSeekSim,
    }
}

/// Start (or restart) the room's game. Rejected while a game is in progress.
pub fn start_game(room: &mut Room, now: u64) -> Vec<GameEvent> {
    if room.game_state.status == GameStatus::Playing {
        return Vec::new();
    }
    for p in &mut room.players {
        p.reset_for_start();
    }
    room.game_state = GameState::scaffold(room.game_mode);
    room.game_state.status = GameStatus::Playing;
    sim_for(room.game_mode).start(room, now);
    tracing::debug!(room = %room.id, mode = ?room.game_mode, "Game started");
    vec![GameEvent::GameStarted { room: room.clone() }]
}

/// The full move pipeline: the five-step validator, then the active mode's
/// move handler. Any rejection is silent.
pub fn handle_move(
    room: &mut Room,
    player_id: PlayerId,
    pos: GridPos,
    now: u64,
) -> Vec<GameEvent> {
    if !validator::validate_move(room, player_id, pos, now) {
        return Vec::new();
    }
    sim_for(room.game_mode).handle_move(room, player_id, pos, now)
}

pub fn handle_ability(room: &mut Room, player_id: PlayerId, now: u64) -> Vec<GameEvent> {
    if !room.is_playing() {
        return Vec::new();
    }
    sim_for(room.game_mode).handle_ability(room, player_id, now)
}

pub fn handle_guess(room: &mut Room, player_id: PlayerId, guess: &str, now: u64) -> Vec<GameEvent> {
    if !room.is_playing() {
        return Vec::new();
    }
    sim_for(room.game_mode).handle_guess(room, player_id, guess, now)
}

pub fn handle_pad_attempt(
    room: &mut Room,
    player_id: PlayerId,
    pad_id: u32,
    now: u64,
) -> Vec<GameEvent> {
    if !room.is_playing() {
        return Vec::new();
    }
    sim_for(room.game_mode).handle_pad_attempt(room, player_id, pad_id, now)
}

/// Mode cleanup after a roster removal. No-op unless the room is playing.
pub fn handle_leave(room: &mut Room, player_id: PlayerId, now: u64) -> Vec<GameEvent> {
    if !room.is_playing() {
        return Vec::new();
    }
    sim_for(room.game_mode).handle_leave(room, player_id, now)
}

/// One scheduler tick for a room. No-op unless the room is playing.
pub fn tick(room: &mut Room, now: u64) -> Vec<GameEvent> {
    if !room.is_playing() {
        return Vec::new();
    }
    sim_for(room.game_mode).tick(room, now)
}
