//! Territory: every tile a player steps on becomes theirs, and claims can be
//! stolen. Score is the live tile count; most tiles at the buzzer wins.

use gridlock_core::events::GameEvent;
use gridlock_core::grid::GridPos;
use gridlock_core::player::PlayerId;
use gridlock_core::room::Room;
use gridlock_core::state::ModeState;

use crate::ModeSim;
use crate::common;

const ROUND_SECS: u32 = 60;

pub struct TerritorySim;

impl ModeSim for TerritorySim {
    fn start(&self, room: &mut Room, now: u64) {
        common::random_spawns(room);
        room.game_state.arm_timer(ROUND_SECS, now);
    }

    fn handle_move(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        pos: GridPos,
        _now: u64,
    ) -> Vec<GameEvent> {
        let mut events = common::apply_move(room, player_id, pos);
        let ModeState::Territory { tiles } = &mut room.game_state.mode_state else {
            return events;
        };
        let tile = &mut tiles[pos.y as usize][pos.x as usize];
        if *tile != Some(player_id) {
            *tile = Some(player_id);
            recount(room);
            events.push(GameEvent::TileClaimed {
                player_id,
                x: pos.x,
                y: pos.y,
            });
            events.push(GameEvent::ScoresUpdate {
                scores: common::scores(room),
            });
        }
        events
    }

    fn tick(&self, room: &mut Room, now: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let step = common::advance_timer(room, now);
        events.extend(step.event);
        if step.expired {
            let winner = common::highest_scorer(room);
            events.extend(common::end_game(room, winner));
        }
        events
    }
}

/// Rebuild every score from the tile grid. Steals make incremental updates
/// fiddly; a full recount over a 20x20 grid is trivial.
fn recount(room: &mut Room) {
    let ModeState::Territory { tiles } = &room.game_state.mode_state else {
        return;
    };
    let mut counts: Vec<(PlayerId, i32)> = room.players.iter().map(|p| (p.id, 0)).collect();
    for row in tiles {
        for owner in row.iter().flatten() {
            if let Some(entry) = counts.iter_mut().find(|(id, _)| id == owner) {
                entry.1 += 1;
            }
        }
    }
    for (id, count) in counts {
        if let Some(p) = room.player_mut(id) {
            p.score = count;
        }
    }
}
