//! Infection Arena: one carrier spreads on contact. Survivors win by staying
//! clean until the clock runs out; the virus wins by converting everyone.
//! Each side has one timed ability on a shared cooldown: infected sprint
//! (halved move cooldown), survivors shield (immune to contact).

use gridlock_core::events::{Ability, GameEvent};
use gridlock_core::grid::GridPos;
use gridlock_core::player::PlayerId;
use gridlock_core::room::Room;
use gridlock_core::state::Winner;

use crate::ModeSim;
use crate::common;

const ROUND_SECS: u32 = 60;
const SPRINT_MS: u64 = 3_000;
const SHIELD_MS: u64 = 3_000;
const ABILITY_COOLDOWN_MS: u64 = 10_000;

pub struct InfectionSim;

impl ModeSim for InfectionSim {
    fn start(&self, room: &mut Room, now: u64) {
        common::random_spawns(room);
        let carrier = common::random_role_index(room);
        room.players[carrier].is_infected = true;
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
        let mover_infected = room.player(player_id).is_some_and(|p| p.is_infected);
        let occupants = room.players_at(pos, player_id);

        if mover_infected {
            for id in occupants {
                events.extend(infect(room, id, now));
            }
        } else if occupants
            .iter()
            .any(|&id| room.player(id).is_some_and(|p| p.is_infected))
        {
            events.extend(infect(room, player_id, now));
        }

        if room.players.iter().all(|p| p.is_infected) {
            events.extend(common::end_game(room, Winner::team("The Virus")));
        }
        events
    }

    fn handle_ability(&self, room: &mut Room, player_id: PlayerId, now: u64) -> Vec<GameEvent> {
        let Some(p) = room.player_mut(player_id) else {
            return Vec::new();
        };
        if p.ability_ready_at > now {
            return Vec::new();
        }
        p.ability_ready_at = now + ABILITY_COOLDOWN_MS;
        let (ability, expires) = if p.is_infected {
            p.sprint_until = now + SPRINT_MS;
            (Ability::Sprint, p.sprint_until)
        } else {
            p.shield_until = now + SHIELD_MS;
            (Ability::Shield, p.shield_until)
        };
        vec![GameEvent::AbilityActivated {
            player_id,
            ability,
            expires,
        }]
    }

    fn handle_leave(&self, room: &mut Room, _player_id: PlayerId, _now: u64) -> Vec<GameEvent> {
        if room.players.is_empty() {
            return Vec::new();
        }
        if room.players.iter().all(|p| p.is_infected) {
            return common::end_game(room, Winner::team("The Virus"));
        }
        if room.players.iter().any(|p| p.is_infected) {
            return Vec::new();
        }
        // The only carrier left: seed a new one so the round stays live.
        let next = common::random_role_index(room);
        room.players[next].is_infected = true;
        let player_id = room.players[next].id;
        tracing::debug!(room = %room.id, player_id, "Carrier reassigned after leave");
        vec![GameEvent::PlayerInfected { player_id }]
    }

    fn tick(&self, room: &mut Room, now: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let step = common::advance_timer(room, now);
        events.extend(step.event);
        if step.expired {
            let winner = if room.players.iter().any(|p| !p.is_infected) {
                Winner::team("Survivors")
            } else {
                Winner::team("The Virus")
            };
            events.extend(common::end_game(room, winner));
        }
        events
    }
}

/// Convert a survivor, unless shielded or already infected.
fn infect(room: &mut Room, player_id: PlayerId, now: u64) -> Vec<GameEvent> {
    let Some(p) = room.player_mut(player_id) else {
        return Vec::new();
    };
    if p.is_infected || p.is_shielded(now) {
        return Vec::new();
    }
    p.is_infected = true;
    tracing::debug!(room = %room.id, player_id, "Player infected");
    vec![GameEvent::PlayerInfected { player_id }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlock_core::room::GameMode;
    use gridlock_core::state::GameStatus;
    use gridlock_core::test_helpers::make_room;

    fn playing_room(n: usize, seed: u64) -> Room {
        let mut room = make_room(GameMode::Infection, n, seed);
        crate::start_game(&mut room, 0);
        room
    }

    fn carrier(room: &Room) -> PlayerId {
        room.players.iter().find(|p| p.is_infected).unwrap().id
    }

    fn survivor(room: &Room) -> PlayerId {
        room.players.iter().find(|p| !p.is_infected).unwrap().id
    }

    #[test]
    fn contact_spreads_infection() {
        let mut room = playing_room(3, 5);
        let it = carrier(&room);
        let target = survivor(&room);
        let target_pos = room.player(target).unwrap().pos();

        let events = InfectionSim.handle_move(&mut room, it, target_pos, 1_000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PlayerInfected { player_id } if *player_id == target
        )));
        assert!(room.player(target).unwrap().is_infected);
    }

    #[test]
    fn shield_blocks_infection() {
        let mut room = playing_room(3, 5);
        let it = carrier(&room);
        let target = survivor(&room);
        let target_pos = room.player(target).unwrap().pos();

        let events = InfectionSim.handle_ability(&mut room, target, 1_000);
        assert!(matches!(
            events.as_slice(),
            [GameEvent::AbilityActivated {
                ability: Ability::Shield,
                ..
            }]
        ));
        let events = InfectionSim.handle_move(&mut room, it, target_pos, 2_000);
        assert!(!events.iter().any(|e| e.name() == "player-infected"));
        assert!(!room.player(target).unwrap().is_infected);

        // Shield down at exactly now + 3s
        let events = InfectionSim.handle_move(&mut room, it, target_pos, 4_000);
        assert!(events.iter().any(|e| e.name() == "player-infected"));
    }

    #[test]
    fn ability_cooldown_is_shared() {
        let mut room = playing_room(2, 5);
        let it = carrier(&room);
        assert!(!InfectionSim.handle_ability(&mut room, it, 0).is_empty());
        assert!(InfectionSim.handle_ability(&mut room, it, 9_999).is_empty());
        assert!(!InfectionSim.handle_ability(&mut room, it, 10_000).is_empty());
    }

    #[test]
    fn full_conversion_ends_the_round_early() {
        let mut room = playing_room(2, 5);
        let it = carrier(&room);
        let target = survivor(&room);
        let target_pos = room.player(target).unwrap().pos();

        let events = InfectionSim.handle_move(&mut room, it, target_pos, 1_000);
        assert!(events.iter().any(|e| e.name() == "game-over"));
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "The Virus"
        ));
    }

    #[test]
    fn a_new_carrier_is_seeded_when_the_only_one_leaves() {
        let mut room = playing_room(3, 5);
        let it = carrier(&room);
        room.players.retain(|p| p.id != it);

        let events = crate::handle_leave(&mut room, it, 5_000);
        assert!(events.iter().any(|e| e.name() == "player-infected"));
        assert_eq!(room.game_state.status, GameStatus::Playing);
        assert_eq!(room.players.iter().filter(|p| p.is_infected).count(), 1);
    }

    #[test]
    fn virus_wins_when_the_last_survivor_leaves() {
        let mut room = playing_room(3, 5);
        let quitter = survivor(&room);
        for p in &mut room.players {
            if p.id != quitter {
                p.is_infected = true;
            }
        }
        room.players.retain(|p| p.id != quitter);

        let events = crate::handle_leave(&mut room, quitter, 5_000);
        assert!(events.iter().any(|e| e.name() == "game-over"));
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "The Virus"
        ));
    }

    #[test]
    fn survivors_win_on_expiry() {
        let mut room = playing_room(3, 5);
        crate::tick(&mut room, 60_000);
        assert_eq!(room.game_state.status, GameStatus::Finished);
        assert!(matches!(
            &room.game_state.winner,
            Winner::Team { name } if name == "Survivors"
        ));
    }
}
