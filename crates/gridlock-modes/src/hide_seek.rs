//! Hide & Seek: one seeker hunts hiders through a maze. Moving hiders leave
//! fading footprints, caught hiders join the seeking side after a short
//! delay, and in the last ten seconds every surviving hider is revealed.

use gridlock_core::events::{GameEvent, HiderPos};
use gridlock_core::grid::GridPos;
use gridlock_core::maze;
use gridlock_core::player::{EffectKind, PlayerId};
use gridlock_core::room::Room;
use gridlock_core::state::{Footprint, ModeState, Winner};
use rand::Rng;

use crate::ModeSim;
use crate::common;

const ROUND_SECS: u32 = 90;
const HEADSTART_MS: u64 = 5_000;
const CONVERT_DELAY_MS: u64 = 3_000;
const FOOTPRINT_TTL_MS: u64 = 5_000;
const REVEAL_AT_SECS: u32 = 10;

pub struct HideSeekSim;

impl ModeSim for HideSeekSim {
    fn start(&self, room: &mut Room, now: u64) {
        let maze = maze::generate(room.maze_difficulty, &mut room.rng);

        let seeker = common::random_role_index(room);
        let seeker_pos = maze::random_path_cell(&maze.grid, &mut room.rng);
        let freeze_until = now + HEADSTART_MS;
        {
            let p = &mut room.players[seeker];
            p.is_seeker = true;
            p.set_pos(seeker_pos);
            p.add_effect(EffectKind::Frozen, freeze_until);
        }

        // Hiders start in the cells hardest for the seeker to reach.
        let hider_count = room.players.len() - 1;
        let spawns = maze::farthest_cells(&maze.grid, seeker_pos, hider_count);
        let mut spawn_iter = spawns.into_iter();
        for p in room.players.iter_mut().filter(|p| !p.is_seeker) {
            if let Some(pos) = spawn_iter.next() {
                p.set_pos(pos);
            }
        }

        room.game_state.mode_state = ModeState::HideSeek {
            maze: Some(maze),
            footprints: Vec::new(),
            seeker_freeze_until: freeze_until,
            hiders_revealed: false,
        };
        room.game_state.arm_timer(ROUND_SECS, now);
    }

    fn handle_move(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        pos: GridPos,
        now: u64,
    ) -> Vec<GameEvent> {
        let mut events = common::apply_move(room, player_id, pos);
        let mover_seeks = room.player(player_id).is_some_and(|p| p.is_seeker);

        if !mover_seeks {
            if let ModeState::HideSeek { footprints, .. } = &mut room.game_state.mode_state {
                footprints.push(Footprint {
                    player_id,
                    x: pos.x,
                    y: pos.y,
                    ts: now,
                });
                events.push(GameEvent::FootprintsUpdate {
                    footprints: footprints.clone(),
                });
            }
        }

        // Contact works both ways: a seeker stepping onto a hider, or a
        // hider blundering into a seeker.
        let occupants = room.players_at(pos, player_id);
        if mover_seeks {
            for id in occupants {
                events.extend(catch(room, id, player_id, now));
            }
        } else if let Some(&seeker) = occupants
            .iter()
            .find(|&&id| room.player(id).is_some_and(|p| p.is_seeker))
        {
            events.extend(catch(room, player_id, seeker, now));
        }

        if active_hiders(room) == 0 {
            events.extend(common::end_game(room, Winner::team("Seekers")));
        }
        events
    }

    fn handle_leave(&self, room: &mut Room, _player_id: PlayerId, _now: u64) -> Vec<GameEvent> {
        if room.players.is_empty() {
            return Vec::new();
        }
        if active_hiders(room) == 0 {
            return common::end_game(room, Winner::team("Seekers"));
        }
        if room.players.iter().any(|p| p.is_seeker) {
            return Vec::new();
        }
        // The seeker quit: promote a random hider immediately, no delay.
        let candidates: Vec<usize> = room
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_caught)
            .map(|(i, _)| i)
            .collect();
        let pick = candidates[room.rng.random_range(0..candidates.len())];
        let p = &mut room.players[pick];
        p.is_seeker = true;
        p.convert_at = None;
        let player_id = p.id;
        tracing::debug!(room = %room.id, player_id, "Seeker reassigned after leave");
        vec![GameEvent::PlayerConverted { player_id }]
    }

    fn tick(&self, room: &mut Room, now: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for p in &mut room.players {
            p.prune_effects(now);
        }

        // Caught hiders switch sides once their conversion delay elapses.
        let converts: Vec<PlayerId> = room
            .players
            .iter()
            .filter(|p| p.convert_at.is_some_and(|at| at <= now))
            .map(|p| p.id)
            .collect();
        for id in converts {
            if let Some(p) = room.player_mut(id) {
                p.is_seeker = true;
                p.is_caught = false;
                p.convert_at = None;
            }
            events.push(GameEvent::PlayerConverted { player_id: id });
        }
        if active_hiders(room) == 0 {
            events.extend(common::end_game(room, Winner::team("Seekers")));
            return events;
        }

        if let ModeState::HideSeek { footprints, .. } = &mut room.game_state.mode_state {
            let before = footprints.len();
            footprints.retain(|f| f.ts + FOOTPRINT_TTL_MS > now);
            if footprints.len() != before {
                events.push(GameEvent::FootprintsUpdate {
                    footprints: footprints.clone(),
                });
            }
        }

        let step = common::advance_timer(room, now);
        events.extend(step.event);

        if room.game_state.timer <= REVEAL_AT_SECS {
            let pending = matches!(
                &room.game_state.mode_state,
                ModeState::HideSeek {
                    hiders_revealed: false,
                    ..
                }
            );
            if pending {
                if let ModeState::HideSeek {
                    hiders_revealed, ..
                } = &mut room.game_state.mode_state
                {
                    *hiders_revealed = true;
                }
                let hiders = room
                    .players
                    .iter()
                    .filter(|p| !p.is_seeker && !p.is_caught)
                    .map(|p| HiderPos {
                        player_id: p.id,
                        x: p.x,
                        y: p.y,
                    })
                    .collect();
                events.push(GameEvent::HidersRevealed { hiders });
            }
        }

        if step.expired {
            let winner = if active_hiders(room) > 0 {
                Winner::team("Hiders")
            } else {
                Winner::team("Seekers")
            };
            events.extend(common::end_game(room, winner));
        }
        events
    }
}

fn active_hiders(room: &Room) -> usize {
    room.players
        .iter()
        .filter(|p| !p.is_seeker && !p.is_caught)
        .count()
}

/// Mark a hider as caught and schedule the side switch. Already-caught
/// hiders and fellow seekers are left alone.
fn catch(room: &mut Room, hider: PlayerId, by: PlayerId, now: u64) -> Vec<GameEvent> {
    let Some(p) = room.player_mut(hider) else {
        return Vec::new();
    };
    if p.is_seeker || p.is_caught {
        return Vec::new();
    }
    p.is_caught = true;
    p.convert_at = Some(now + CONVERT_DELAY_MS);
    tracing::debug!(room = %room.id, hider, by, "Hider caught");
    vec![GameEvent::PlayerCaught {
        player_id: hider,
        by,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlock_core::room::GameMode;
    use gridlock_core::state::GameStatus;
    use gridlock_core::test_helpers::make_room;

    fn playing_room(n: usize, seed: u64) -> Room {
        let mut room = make_room(GameMode::HideSeek, n, seed);
        crate::start_game(&mut room, 0);
        room
    }

    fn seeker_id(room: &Room) -> PlayerId {
        room.players.iter().find(|p| p.is_seeker).unwrap().id
    }

    fn a_hider(room: &Room) -> PlayerId {
        room.players.iter().find(|p| !p.is_seeker).unwrap().id
    }

    #[test]
    fn seeker_starts_frozen_for_the_head_start() {
        let room = playing_room(3, 8);
        let seeker = room.player(seeker_id(&room)).unwrap();
        assert!(seeker.is_frozen(4_999));
        assert!(!seeker.is_frozen(5_000));
    }

    #[test]
    fn everyone_spawns_on_path_cells() {
        let room = playing_room(4, 8);
        let maze = room.game_state.maze().unwrap();
        for p in &room.players {
            assert!(!maze.is_wall(p.pos()));
        }
    }

    #[test]
    fn hiders_leave_footprints_and_seekers_do_not() {
        let mut room = playing_room(2, 8);
        let hider = a_hider(&room);
        let seeker = seeker_id(&room);
        let open = room.game_state.maze().unwrap().start;

        let events = HideSeekSim.handle_move(&mut room, hider, open, 6_000);
        assert!(events.iter().any(|e| e.name() == "footprints-update"));

        // Move the hider away so the seeker's step lands on an empty cell.
        let away = GridPos::new(open.x + 1, open.y);
        room.player_mut(hider).unwrap().set_pos(away);
        let events = HideSeekSim.handle_move(&mut room, seeker, open, 7_000);
        assert!(!events.iter().any(|e| e.name() == "footprints-update"));
    }

    #[test]
    fn footprints_fade_after_five_seconds() {
        let mut room = playing_room(2, 8);
        let hider = a_hider(&room);
        let open = room.game_state.maze().unwrap().start;
        HideSeekSim.handle_move(&mut room, hider, open, 6_000);

        assert!(crate::tick(&mut room, 10_000)
            .iter()
            .all(|e| e.name() != "footprints-update"));
        let events = crate::tick(&mut room, 11_000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::FootprintsUpdate { footprints } if footprints.is_empty()
        )));
    }

    #[test]
    fn caught_hiders_convert_after_the_delay() {
        let mut room = playing_room(3, 8);
        let seeker = seeker_id(&room);
        let hider = a_hider(&room);
        let target = room.player(hider).unwrap().pos();

        let events = HideSeekSim.handle_move(&mut room, seeker, target, 6_000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PlayerCaught { player_id, by } if *player_id == hider && *by == seeker
        )));
        assert!(room.player(hider).unwrap().is_caught);

        assert!(crate::tick(&mut room, 8_000)
            .iter()
            .all(|e| e.name() != "player-converted"));
        let events = crate::tick(&mut room, 9_000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PlayerConverted { player_id } if *player_id == hider
        )));
        assert!(room.player(hider).unwrap().is_seeker);
    }

    #[test]
    fn seekers_win_when_the_last_hider_falls() {
        let mut room = playing_room(2, 8);
        let seeker = seeker_id(&room);
        let hider = a_hider(&room);
        let target = room.player(hider).unwrap().pos();

        let events = HideSeekSim.handle_move(&mut room, seeker, target, 6_000);
        assert!(events.iter().any(|e| e.name() == "game-over"));
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "Seekers"
        ));
    }

    #[test]
    fn survivors_are_revealed_in_the_final_stretch() {
        let mut room = playing_room(3, 8);
        let events = crate::tick(&mut room, 80_000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::HidersRevealed { hiders } if hiders.len() == 2
        )));
        // Only announced once
        assert!(crate::tick(&mut room, 81_000)
            .iter()
            .all(|e| e.name() != "hiders-revealed"));
    }

    #[test]
    fn a_hider_is_promoted_when_the_seeker_leaves() {
        let mut room = playing_room(3, 8);
        let seeker = seeker_id(&room);
        room.players.retain(|p| p.id != seeker);

        let events = crate::handle_leave(&mut room, seeker, 6_000);
        assert!(events.iter().any(|e| e.name() == "player-converted"));
        assert_eq!(room.game_state.status, GameStatus::Playing);
        assert_eq!(room.players.iter().filter(|p| p.is_seeker).count(), 1);
    }

    #[test]
    fn seekers_win_when_the_last_hider_leaves() {
        let mut room = playing_room(2, 8);
        let hider = a_hider(&room);
        room.players.retain(|p| p.id != hider);

        let events = crate::handle_leave(&mut room, hider, 6_000);
        assert!(events.iter().any(|e| e.name() == "game-over"));
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "Seekers"
        ));
    }

    #[test]
    fn hiders_win_by_outlasting_the_clock() {
        let mut room = playing_room(3, 8);
        crate::tick(&mut room, 90_000);
        assert_eq!(room.game_state.status, GameStatus::Finished);
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "Hiders"
        ));
    }
}
