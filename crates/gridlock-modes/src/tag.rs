//! Tag: one player is "it" and chases the rest. Survivors earn a point per
//! second; walking into (or being walked into by) the it player passes the
//! role. Highest score when the round timer runs out wins.

use gridlock_core::events::GameEvent;
use gridlock_core::grid::GridPos;
use gridlock_core::player::PlayerId;
use gridlock_core::room::Room;

use crate::ModeSim;
use crate::common;

const ROUND_SECS: u32 = 60;

pub struct TagSim;

impl ModeSim for TagSim {
    fn start(&self, room: &mut Room, now: u64) {
        common::random_spawns(room);
        let it = common::random_role_index(room);
        room.players[it].is_it = true;
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
        let mover_is_it = room.player(player_id).is_some_and(|p| p.is_it);
        let occupants = room.players_at(pos, player_id);

        if mover_is_it {
            // Chasing: tag the first player sharing the cell.
            if let Some(&victim) = occupants.first() {
                pass_role(room, player_id, victim);
                events.push(GameEvent::PlayerTagged {
                    tagger: player_id,
                    tagged: victim,
                });
            }
        } else if let Some(&it) = occupants
            .iter()
            .find(|&&id| room.player(id).is_some_and(|p| p.is_it))
        {
            // Walking onto the it player counts as being caught.
            pass_role(room, it, player_id);
            events.push(GameEvent::PlayerTagged {
                tagger: it,
                tagged: player_id,
            });
        }
        events
    }

    fn handle_leave(&self, room: &mut Room, player_id: PlayerId, _now: u64) -> Vec<GameEvent> {
        // The tagger walking out must not leave the room with nobody it.
        if room.players.is_empty() || room.players.iter().any(|p| p.is_it) {
            return Vec::new();
        }
        let next = common::random_role_index(room);
        room.players[next].is_it = true;
        let tagged = room.players[next].id;
        tracing::debug!(room = %room.id, tagged, "It role reassigned after leave");
        vec![GameEvent::PlayerTagged {
            tagger: player_id,
            tagged,
        }]
    }

    fn tick(&self, room: &mut Room, now: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let step = common::advance_timer(room, now);
        events.extend(step.event);

        if step.seconds_elapsed > 0 {
            for p in &mut room.players {
                if !p.is_it {
                    p.score += step.seconds_elapsed as i32;
                }
            }
            events.push(GameEvent::ScoresUpdate {
                scores: common::scores(room),
            });
        }
        if step.expired {
            let winner = common::highest_scorer(room);
            events.extend(common::end_game(room, winner));
        }
        events
    }
}

fn pass_role(room: &mut Room, from: PlayerId, to: PlayerId) {
    if let Some(p) = room.player_mut(from) {
        p.is_it = false;
    }
    if let Some(p) = room.player_mut(to) {
        p.is_it = true;
    }
    tracing::debug!(room = %room.id, from, to, "It role passed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlock_core::room::GameMode;
    use gridlock_core::state::{GameStatus, Winner};
    use gridlock_core::test_helpers::make_room;

    fn playing_room(n: usize, seed: u64) -> Room {
        let mut room = make_room(GameMode::Tag, n, seed);
        crate::start_game(&mut room, 0);
        room
    }

    fn it_id(room: &Room) -> PlayerId {
        room.players.iter().find(|p| p.is_it).unwrap().id
    }

    #[test]
    fn exactly_one_player_is_it_at_start() {
        let room = playing_room(4, 3);
        assert_eq!(room.players.iter().filter(|p| p.is_it).count(), 1);
        assert_eq!(room.game_state.timer, ROUND_SECS);
    }

    #[test]
    fn it_player_tags_on_contact() {
        let mut room = playing_room(2, 1);
        let it = it_id(&room);
        let other = room.players.iter().find(|p| !p.is_it).unwrap().id;
        let target = room.player(other).unwrap().pos();

        // Park the it player adjacent, then step onto the victim.
        room.player_mut(it).unwrap().set_pos(GridPos::new(
            (target.x + 1).min(gridlock_core::grid::GRID_SIZE - 1),
            target.y,
        ));
        let events = TagSim.handle_move(&mut room, it, target, 1_000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PlayerTagged { tagger, tagged } if *tagger == it && *tagged == other
        )));
        assert!(room.player(other).unwrap().is_it);
        assert!(!room.player(it).unwrap().is_it);
    }

    #[test]
    fn walking_onto_it_player_gets_you_tagged() {
        let mut room = playing_room(2, 1);
        let it = it_id(&room);
        let other = room.players.iter().find(|p| !p.is_it).unwrap().id;
        let it_pos = room.player(it).unwrap().pos();

        let events = TagSim.handle_move(&mut room, other, it_pos, 1_000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PlayerTagged { tagger, tagged } if *tagger == it && *tagged == other
        )));
        assert!(room.player(other).unwrap().is_it);
    }

    #[test]
    fn survivors_score_each_second() {
        let mut room = playing_room(3, 2);
        let it = it_id(&room);

        let events = crate::tick(&mut room, 1_000);
        assert!(events.iter().any(|e| e.name() == "scores-update"));
        for p in &room.players {
            assert_eq!(p.score, if p.id == it { 0 } else { 1 });
        }
    }

    #[test]
    fn round_ends_with_highest_scorer() {
        let mut room = playing_room(3, 2);
        crate::tick(&mut room, 60_000);
        assert_eq!(room.game_state.status, GameStatus::Finished);
        assert!(matches!(room.game_state.winner, Winner::Player(_)));
    }
}
