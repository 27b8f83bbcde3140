//! Trap Rush: sprint from the top row to the bottom row across a field of
//! hidden traps. Each trap fires once, revealing itself: freeze, slow, or a
//! teleport back up the board. First to the finish row wins.

use rand::Rng;

use gridlock_core::events::GameEvent;
use gridlock_core::grid::{GRID_SIZE, GridPos};
use gridlock_core::player::{EffectKind, PlayerId};
use gridlock_core::room::Room;
use gridlock_core::state::{ModeState, Trap, TrapKind, Winner};

use crate::ModeSim;
use crate::common;

const TRAP_DENSITY: f64 = 0.2;
const FREEZE_MS: u64 = 2_000;
const SLOW_MS: u64 = 3_000;
const TELEPORT_ROWS: i32 = 5;

pub struct TrapRushSim;

impl ModeSim for TrapRushSim {
    fn start(&self, room: &mut Room, _now: u64) {
        // Evenly spaced starting line across the top row.
        let n = room.players.len();
        for (i, p) in room.players.iter_mut().enumerate() {
            let x = ((i as i32 + 1) * GRID_SIZE) / (n as i32 + 1);
            p.set_pos(GridPos::new(x, 0));
        }

        let size = GRID_SIZE as usize;
        let mut traps = vec![vec![None; size]; size];
        let rng = &mut room.rng;
        // Rows 0-1 give a clean launch; the finish row stays clear too.
        for row in traps.iter_mut().take(size - 1).skip(2) {
            for cell in row.iter_mut() {
                if rng.random_bool(TRAP_DENSITY) {
                    let kind = match rng.random_range(0..3) {
                        0 => TrapKind::Freeze,
                        1 => TrapKind::Slow,
                        _ => TrapKind::Teleport,
                    };
                    *cell = Some(Trap {
                        kind,
                        revealed: false,
                    });
                }
            }
        }
        room.game_state.mode_state = ModeState::TrapRush { traps };
    }

    fn handle_move(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        pos: GridPos,
        now: u64,
    ) -> Vec<GameEvent> {
        let mut events = common::apply_move(room, player_id, pos);
        if let Some(trap) = spring_trap(room, pos) {
            events.push(GameEvent::TrapTriggered {
                player_id,
                x: pos.x,
                y: pos.y,
                trap: trap.kind,
            });
            match trap.kind {
                TrapKind::Freeze => {
                    let expires = now + FREEZE_MS;
                    if let Some(p) = room.player_mut(player_id) {
                        p.add_effect(EffectKind::Frozen, expires);
                    }
                    events.push(GameEvent::PlayerEffect {
                        player_id,
                        effect: EffectKind::Frozen,
                        expires,
                    });
                },
                TrapKind::Slow => {
                    let expires = now + SLOW_MS;
                    if let Some(p) = room.player_mut(player_id) {
                        p.add_effect(EffectKind::Slow, expires);
                    }
                    events.push(GameEvent::PlayerEffect {
                        player_id,
                        effect: EffectKind::Slow,
                        expires,
                    });
                },
                TrapKind::Teleport => {
                    // Knocked back toward the start; does not chain into
                    // whatever trap sits on the landing cell.
                    let back = GridPos::new(pos.x, (pos.y - TELEPORT_ROWS).max(0));
                    if let Some(p) = room.player_mut(player_id) {
                        p.set_pos(back);
                    }
                    events.push(GameEvent::PlayerMoved {
                        player_id,
                        x: back.x,
                        y: back.y,
                    });
                },
            }
        }

        let finished = room
            .player(player_id)
            .is_some_and(|p| p.y == GRID_SIZE - 1);
        if finished && let Some(winner) = room.player(player_id).cloned() {
            events.extend(common::end_game(room, Winner::Player(winner)));
        }
        events
    }

    fn tick(&self, room: &mut Room, now: u64) -> Vec<GameEvent> {
        for p in &mut room.players {
            p.prune_effects(now);
        }
        Vec::new()
    }
}

/// Fire and reveal the trap under `pos`, if it is still hidden.
fn spring_trap(room: &mut Room, pos: GridPos) -> Option<Trap> {
    let ModeState::TrapRush { traps } = &mut room.game_state.mode_state else {
        return None;
    };
    let cell = traps[pos.y as usize][pos.x as usize].as_mut()?;
    if cell.revealed {
        return None;
    }
    cell.revealed = true;
    Some(*cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlock_core::room::GameMode;
    use gridlock_core::state::GameStatus;
    use gridlock_core::test_helpers::make_room;

    fn playing_room(n: usize, seed: u64) -> Room {
        let mut room = make_room(GameMode::TrapRush, n, seed);
        crate::start_game(&mut room, 0);
        room
    }

    fn plant(room: &mut Room, pos: GridPos, kind: TrapKind) {
        let ModeState::TrapRush { traps } = &mut room.game_state.mode_state else {
            panic!("wrong mode state");
        };
        traps[pos.y as usize][pos.x as usize] = Some(Trap {
            kind,
            revealed: false,
        });
    }

    fn clear(room: &mut Room, pos: GridPos) {
        let ModeState::TrapRush { traps } = &mut room.game_state.mode_state else {
            panic!("wrong mode state");
        };
        traps[pos.y as usize][pos.x as usize] = None;
    }

    #[test]
    fn players_line_up_on_the_top_row() {
        let room = playing_room(3, 4);
        for p in &room.players {
            assert_eq!(p.y, 0);
        }
        let xs: Vec<i32> = room.players.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![5, 10, 15]);
    }

    #[test]
    fn launch_and_finish_rows_have_no_traps() {
        let room = playing_room(2, 4);
        let ModeState::TrapRush { traps } = &room.game_state.mode_state else {
            panic!("wrong mode state");
        };
        let last = GRID_SIZE as usize - 1;
        for (y, row) in traps.iter().enumerate() {
            if y < 2 || y == last {
                assert!(row.iter().all(Option::is_none), "trap on clear row {y}");
            }
        }
    }

    #[test]
    fn freeze_trap_fires_once() {
        let mut room = playing_room(2, 4);
        let pos = GridPos::new(7, 5);
        plant(&mut room, pos, TrapKind::Freeze);

        let events = TrapRushSim.handle_move(&mut room, 1, pos, 1_000);
        assert!(events.iter().any(|e| e.name() == "trap-triggered"));
        assert!(room.player(1).unwrap().is_frozen(2_999));
        assert!(!room.player(1).unwrap().is_frozen(3_000));

        // Already revealed: the second visitor passes through.
        let events = TrapRushSim.handle_move(&mut room, 2, pos, 1_000);
        assert!(!events.iter().any(|e| e.name() == "trap-triggered"));
    }

    #[test]
    fn teleport_knocks_back_without_chaining() {
        let mut room = playing_room(2, 4);
        let pos = GridPos::new(6, 8);
        plant(&mut room, pos, TrapKind::Teleport);
        // A trap on the landing cell must not fire.
        plant(&mut room, GridPos::new(6, 3), TrapKind::Freeze);

        let events = TrapRushSim.handle_move(&mut room, 1, pos, 1_000);
        assert_eq!(room.player(1).unwrap().pos(), GridPos::new(6, 3));
        assert!(!room.player(1).unwrap().is_frozen(1_001));
        let moves = events
            .iter()
            .filter(|e| e.name() == "player-moved")
            .count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn teleport_clamps_at_the_top() {
        let mut room = playing_room(2, 4);
        let pos = GridPos::new(6, 3);
        plant(&mut room, pos, TrapKind::Teleport);
        TrapRushSim.handle_move(&mut room, 1, pos, 1_000);
        assert_eq!(room.player(1).unwrap().y, 0);
    }

    #[test]
    fn reaching_the_finish_row_wins() {
        let mut room = playing_room(2, 4);
        let finish = GridPos::new(9, GRID_SIZE - 1);
        clear(&mut room, finish);
        let events = TrapRushSim.handle_move(&mut room, 1, finish, 1_000);
        assert!(events.iter().any(|e| e.name() == "game-over"));
        assert_eq!(room.game_state.status, GameStatus::Finished);
    }
}
