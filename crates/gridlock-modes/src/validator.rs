use gridlock_core::constants::{
    BASE_MOVE_COOLDOWN_MS, SLOWED_MOVE_COOLDOWN_MS, SPRINT_MOVE_COOLDOWN_MS,
};
use gridlock_core::grid::GridPos;
use gridlock_core::player::PlayerId;
use gridlock_core::room::Room;

/// Gate a requested move. Returns true only when every check passes, in
/// which case the player's move timestamp is stamped; any failure is a
/// silent rejection with no state change beyond that stamp ordering:
///
/// 1. room must be playing
/// 2. player must exist, not be eliminated, and not be frozen
/// 3. target must be on the grid
/// 4. the move cooldown must have elapsed (stamps on pass)
/// 5. maze modes reject wall cells
pub fn validate_move(room: &mut Room, player_id: PlayerId, pos: GridPos, now: u64) -> bool {
    if !room.is_playing() {
        return false;
    }

    let Some(player) = room.player_mut(player_id) else {
        return false;
    };
    if player.is_caught || player.is_frozen(now) {
        return false;
    }

    if !pos.in_bounds() {
        return false;
    }

    let cooldown = if player.is_infected && player.is_sprinting(now) {
        SPRINT_MOVE_COOLDOWN_MS
    } else if player.is_slowed(now) {
        SLOWED_MOVE_COOLDOWN_MS
    } else {
        BASE_MOVE_COOLDOWN_MS
    };
    if now.saturating_sub(player.last_move_ms) < cooldown {
        return false;
    }
    player.last_move_ms = now;

    if let Some(maze) = room.game_state.maze()
        && maze.is_wall(pos)
    {
        return false;
    }

    true
}
