//! Spy & Decode: one hidden spy knows which of three code words is real and
//! tries to signal it through movement during the signaling phase. The other
//! agents then lock in guesses. If strictly more agents guess wrong than
//! right, the spy failed to communicate and wins the round.

use rand::Rng;
use rand::seq::SliceRandom;

use gridlock_core::events::GameEvent;
use gridlock_core::grid::GridPos;
use gridlock_core::player::PlayerId;
use gridlock_core::room::Room;
use gridlock_core::state::{ModeState, SpyPhase, Winner};

use crate::ModeSim;
use crate::common;

const SIGNAL_SECS: u32 = 30;
const GUESS_SECS: u32 = 15;

const CODE_POOL: &[&str] = &[
    "falcon", "ember", "quartz", "willow", "cobalt", "sierra", "nimbus", "onyx", "harbor",
    "lantern", "velvet", "cinder",
];

pub struct SpySim;

impl ModeSim for SpySim {
    fn start(&self, room: &mut Room, now: u64) {
        common::random_spawns(room);
        let spy = common::random_role_index(room);
        room.players[spy].is_spy = true;

        let rng = &mut room.rng;
        let mut pool: Vec<&str> = CODE_POOL.to_vec();
        pool.shuffle(rng);
        let codes: Vec<String> = pool.iter().take(3).map(|s| s.to_string()).collect();
        let correct = rng.random_range(0..codes.len());

        if let ModeState::SpyDecode {
            codes: c,
            correct: idx,
            phase,
            phase_ends_at,
            ..
        } = &mut room.game_state.mode_state
        {
            *c = codes;
            *idx = correct;
            *phase = SpyPhase::Signaling;
            *phase_ends_at = now + u64::from(SIGNAL_SECS) * 1000;
        }
        room.game_state.arm_timer(SIGNAL_SECS, now);
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

    fn handle_guess(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        guess: &str,
        _now: u64,
    ) -> Vec<GameEvent> {
        let is_spy = match room.player(player_id) {
            Some(p) => p.is_spy,
            None => return Vec::new(),
        };
        let ModeState::SpyDecode {
            codes,
            guesses,
            phase,
            ..
        } = &mut room.game_state.mode_state
        else {
            return Vec::new();
        };
        // The spy already knows; everyone else gets exactly one guess, and
        // only while the guessing window is open.
        if *phase != SpyPhase::Guessing
            || is_spy
            || guesses.contains_key(&player_id)
            || !codes.iter().any(|c| c == guess)
        {
            return Vec::new();
        }
        guesses.insert(player_id, guess.to_string());
        vec![GameEvent::PlayerGuessed { player_id }]
    }

    fn handle_leave(&self, room: &mut Room, _player_id: PlayerId, _now: u64) -> Vec<GameEvent> {
        // Without a spy there is nothing left to decode.
        if !room.players.is_empty() && room.players.iter().all(|p| !p.is_spy) {
            return common::end_game(room, Winner::team("The Agents"));
        }
        Vec::new()
    }

    fn tick(&self, room: &mut Room, now: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let step = common::advance_timer(room, now);
        events.extend(step.event);
        if !step.expired {
            return events;
        }

        let current = match &room.game_state.mode_state {
            ModeState::SpyDecode { phase, .. } => *phase,
            _ => return events,
        };
        match current {
            SpyPhase::Signaling => {
                if let ModeState::SpyDecode {
                    phase,
                    phase_ends_at,
                    ..
                } = &mut room.game_state.mode_state
                {
                    *phase = SpyPhase::Guessing;
                    *phase_ends_at = now + u64::from(GUESS_SECS) * 1000;
                }
                room.game_state.arm_timer(GUESS_SECS, now);
                events.push(GameEvent::PhaseChanged {
                    phase: SpyPhase::Guessing,
                });
            },
            SpyPhase::Guessing => {
                if let ModeState::SpyDecode { phase, .. } = &mut room.game_state.mode_state {
                    *phase = SpyPhase::Reveal;
                }
                events.push(GameEvent::PhaseChanged {
                    phase: SpyPhase::Reveal,
                });
                let winner = resolve(room);
                events.extend(common::end_game(room, winner));
            },
            SpyPhase::Reveal => {},
        }
        events
    }
}

/// Tally the guessing phase over the players still in the room. Agents who
/// never guessed count as wrong; guesses left behind by departed players
/// are ignored.
fn resolve(room: &Room) -> Winner {
    let ModeState::SpyDecode {
        codes,
        correct,
        guesses,
        ..
    } = &room.game_state.mode_state
    else {
        return Winner::None;
    };
    let answer = &codes[*correct];
    let mut right = 0usize;
    let mut wrong = 0usize;
    for p in room.players.iter().filter(|p| !p.is_spy) {
        match guesses.get(&p.id) {
            Some(g) if g == answer => right += 1,
            _ => wrong += 1,
        }
    }
    if wrong > right {
        Winner::team("The Spy")
    } else {
        Winner::team("The Agents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlock_core::room::GameMode;
    use gridlock_core::state::GameStatus;
    use gridlock_core::test_helpers::make_room;

    fn playing_room(n: usize, seed: u64) -> Room {
        let mut room = make_room(GameMode::SpyDecode, n, seed);
        crate::start_game(&mut room, 0);
        room
    }

    fn codes_and_answer(room: &Room) -> (Vec<String>, String) {
        let ModeState::SpyDecode { codes, correct, .. } = &room.game_state.mode_state else {
            panic!("wrong mode state");
        };
        (codes.clone(), codes[*correct].clone())
    }

    fn spy_id(room: &Room) -> PlayerId {
        room.players.iter().find(|p| p.is_spy).unwrap().id
    }

    fn to_guessing(room: &mut Room) {
        let events = crate::tick(room, 30_000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PhaseChanged {
                phase: SpyPhase::Guessing
            }
        )));
    }

    #[test]
    fn start_draws_three_distinct_codes() {
        let room = playing_room(4, 11);
        let (codes, answer) = codes_and_answer(&room);
        assert_eq!(codes.len(), 3);
        assert!(codes.contains(&answer));
        let mut unique = codes.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert_eq!(room.players.iter().filter(|p| p.is_spy).count(), 1);
    }

    #[test]
    fn guesses_rejected_during_signaling() {
        let mut room = playing_room(3, 11);
        let (codes, _) = codes_and_answer(&room);
        let agent = room.players.iter().find(|p| !p.is_spy).unwrap().id;
        assert!(SpySim.handle_guess(&mut room, agent, &codes[0], 5_000).is_empty());
    }

    #[test]
    fn one_guess_per_agent_and_none_for_the_spy() {
        let mut room = playing_room(3, 11);
        to_guessing(&mut room);
        let (codes, _) = codes_and_answer(&room);
        let spy = spy_id(&room);
        let agent = room.players.iter().find(|p| !p.is_spy).unwrap().id;

        assert!(SpySim.handle_guess(&mut room, spy, &codes[0], 31_000).is_empty());
        assert_eq!(
            SpySim.handle_guess(&mut room, agent, &codes[0], 31_000).len(),
            1
        );
        assert!(SpySim.handle_guess(&mut room, agent, &codes[1], 32_000).is_empty());
    }

    #[test]
    fn agents_win_when_most_guess_right() {
        let mut room = playing_room(3, 11);
        to_guessing(&mut room);
        let (_, answer) = codes_and_answer(&room);
        let spy = spy_id(&room);
        for id in room.players.iter().map(|p| p.id).collect::<Vec<_>>() {
            if id != spy {
                SpySim.handle_guess(&mut room, id, &answer, 31_000);
            }
        }
        crate::tick(&mut room, 45_000);
        assert_eq!(room.game_state.status, GameStatus::Finished);
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "The Agents"
        ));
    }

    #[test]
    fn reveal_survives_a_correct_guesser_leaving() {
        let mut room = playing_room(3, 11);
        to_guessing(&mut room);
        let (_, answer) = codes_and_answer(&room);
        let spy = spy_id(&room);
        let agents: Vec<PlayerId> = room
            .players
            .iter()
            .map(|p| p.id)
            .filter(|&id| id != spy)
            .collect();
        for &id in &agents {
            SpySim.handle_guess(&mut room, id, &answer, 31_000);
        }
        // One correct guesser walks out before the reveal; their stale
        // guess must not skew the tally.
        room.players.retain(|p| p.id != agents[0]);
        crate::tick(&mut room, 45_000);
        assert_eq!(room.game_state.status, GameStatus::Finished);
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "The Agents"
        ));
    }

    #[test]
    fn agents_win_by_default_when_the_spy_leaves() {
        let mut room = playing_room(3, 11);
        let spy = spy_id(&room);
        room.players.retain(|p| p.id != spy);
        let events = crate::handle_leave(&mut room, spy, 5_000);
        assert!(events.iter().any(|e| e.name() == "game-over"));
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "The Agents"
        ));
    }

    #[test]
    fn silent_agents_count_against_themselves() {
        let mut room = playing_room(3, 11);
        to_guessing(&mut room);
        // Nobody guesses: two wrong, zero right.
        crate::tick(&mut room, 45_000);
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "The Spy"
        ));
    }
}
