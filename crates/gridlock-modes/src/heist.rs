//! Heist: code pads are scattered on the floor and exactly one opens the
//! vault. Guessing wrong stuns you for three seconds. Crack it before the
//! clock runs out or the vault wins.

use rand::Rng;

use gridlock_core::events::GameEvent;
use gridlock_core::grid::{GRID_SIZE, GridPos};
use gridlock_core::player::{EffectKind, PlayerId};
use gridlock_core::room::Room;
use gridlock_core::state::{CodePad, ModeState, Winner};

use crate::ModeSim;
use crate::common;

const ROUND_SECS: u32 = 90;
const STUN_MS: u64 = 3_000;
const EXTRA_PADS: usize = 3;

pub struct HeistSim;

impl ModeSim for HeistSim {
    fn start(&self, room: &mut Room, now: u64) {
        common::random_spawns(room);

        let count = EXTRA_PADS + room.players.len();
        let rng = &mut room.rng;
        let mut cells: Vec<GridPos> = Vec::with_capacity(count);
        while cells.len() < count {
            let pos = GridPos::new(rng.random_range(0..GRID_SIZE), rng.random_range(0..GRID_SIZE));
            if !cells.contains(&pos) {
                cells.push(pos);
            }
        }
        let pads: Vec<CodePad> = cells
            .into_iter()
            .enumerate()
            .map(|(i, pos)| CodePad {
                id: i as u32,
                x: pos.x,
                y: pos.y,
            })
            .collect();
        let correct_pad = pads[rng.random_range(0..pads.len())].id;

        if let ModeState::Heist {
            pads: p,
            correct_pad: c,
        } = &mut room.game_state.mode_state
        {
            *p = pads;
            *c = correct_pad;
        }
        room.game_state.arm_timer(ROUND_SECS, now);
    }

    fn handle_move(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        pos: GridPos,
        _now: u64,
    ) -> Vec<GameEvent> {
        common::apply_move(room, player_id, pos)
    }

    fn handle_pad_attempt(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        pad_id: u32,
        now: u64,
    ) -> Vec<GameEvent> {
        let Some(player) = room.player(player_id) else {
            return Vec::new();
        };
        if player.is_frozen(now) {
            return Vec::new();
        }
        let player_pos = player.pos();

        let ModeState::Heist { pads, correct_pad } = &room.game_state.mode_state else {
            return Vec::new();
        };
        // Pads only respond to someone standing on them.
        let Some(pad) = pads.iter().find(|p| p.id == pad_id) else {
            return Vec::new();
        };
        if GridPos::new(pad.x, pad.y) != player_pos {
            return Vec::new();
        }
        let correct = pad_id == *correct_pad;

        let mut events = Vec::new();
        if correct {
            events.push(GameEvent::PadGuessed {
                player_id,
                pad_id,
                correct: true,
            });
            if let Some(winner) = room.player(player_id).cloned() {
                events.extend(common::end_game(room, Winner::Player(winner)));
            }
        } else {
            let expires = now + STUN_MS;
            if let Some(p) = room.player_mut(player_id) {
                p.add_effect(EffectKind::Frozen, expires);
            }
            events.push(GameEvent::PlayerEffect {
                player_id,
                effect: EffectKind::Frozen,
                expires,
            });
            events.push(GameEvent::PadGuessed {
                player_id,
                pad_id,
                correct: false,
            });
        }
        events
    }

    fn tick(&self, room: &mut Room, now: u64) -> Vec<GameEvent> {
        for p in &mut room.players {
            p.prune_effects(now);
        }
        let mut events = Vec::new();
        let step = common::advance_timer(room, now);
        events.extend(step.event);
        if step.expired {
            events.extend(common::end_game(room, Winner::team("The Vault")));
        }
        events
    }
}
