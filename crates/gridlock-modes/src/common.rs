use rand::Rng;

use gridlock_core::events::{GameEvent, ScoreEntry};
use gridlock_core::grid::{GRID_SIZE, GridPos};
use gridlock_core::player::{Player, PlayerId};
use gridlock_core::room::Room;
use gridlock_core::state::{GameStatus, Winner};

/// Scatter every player to a uniformly random grid cell.
pub fn random_spawns(room: &mut Room) {
    let rng = &mut room.rng;
    for p in &mut room.players {
        p.x = rng.random_range(0..GRID_SIZE);
        p.y = rng.random_range(0..GRID_SIZE);
    }
}

/// Pick one random roster index, for single-role assignment (it, infected,
/// spy, seeker).
pub fn random_role_index(room: &mut Room) -> usize {
    let len = room.players.len();
    room.rng.random_range(0..len)
}

/// Apply a validated position and emit `player-moved`.
pub fn apply_move(room: &mut Room, player_id: PlayerId, pos: GridPos) -> Vec<GameEvent> {
    match room.player_mut(player_id) {
        Some(p) => {
            p.set_pos(pos);
            vec![GameEvent::PlayerMoved {
                player_id,
                x: pos.x,
                y: pos.y,
            }]
        },
        None => Vec::new(),
    }
}

/// Current scoreboard in roster order.
pub fn scores(room: &Room) -> Vec<ScoreEntry> {
    room.players
        .iter()
        .map(|p| ScoreEntry {
            player_id: p.id,
            score: p.score,
        })
        .collect()
}

/// Finalize a game: set the winner, move to finished, emit `game-over`.
/// Calling again on a finished room changes nothing and emits nothing.
pub fn end_game(room: &mut Room, winner: Winner) -> Vec<GameEvent> {
    if room.game_state.status == GameStatus::Finished {
        return Vec::new();
    }
    room.game_state.status = GameStatus::Finished;
    room.game_state.winner = winner.clone();
    room.game_state.ends_at = None;
    tracing::debug!(room = %room.id, "Game over");
    vec![GameEvent::GameOver {
        winner,
        scores: scores(room),
    }]
}

/// Result of advancing a room's countdown on one tick.
pub struct TimerStep {
    /// Whole-second boundaries crossed since the last tick (usually 0 or 1).
    pub seconds_elapsed: u32,
    pub expired: bool,
    /// `timer-update` to broadcast when the displayed value changed.
    pub event: Option<GameEvent>,
}

/// Derive whole seconds remaining from the armed deadline. Untimed modes
/// (no deadline) report nothing.
pub fn advance_timer(room: &mut Room, now: u64) -> TimerStep {
    let Some(ends_at) = room.game_state.ends_at else {
        return TimerStep {
            seconds_elapsed: 0,
            expired: false,
            event: None,
        };
    };
    let remaining = ends_at.saturating_sub(now).div_ceil(1000) as u32;
    let mut step = TimerStep {
        seconds_elapsed: 0,
        expired: now >= ends_at,
        event: None,
    };
    if remaining < room.game_state.timer {
        step.seconds_elapsed = room.game_state.timer - remaining;
        room.game_state.timer = remaining;
        step.event = Some(GameEvent::TimerUpdate { timer: remaining });
    }
    step
}

/// The player with the highest score, ties going to roster order.
pub fn highest_scorer(room: &Room) -> Winner {
    let mut best: Option<&Player> = None;
    for p in &room.players {
        // Strict comparison keeps the earliest roster member on ties.
        if best.is_none_or(|b| p.score > b.score) {
            best = Some(p);
        }
    }
    best.cloned().map_or(Winner::None, Winner::Player)
}
