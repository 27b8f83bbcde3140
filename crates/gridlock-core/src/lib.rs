pub mod constants;
pub mod events;
pub mod grid;
pub mod maze;
pub mod player;
pub mod room;
pub mod state;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::player::{Player, PlayerColor, PlayerId};
    use crate::room::{GameMode, Room};

    /// Create `n` test players with sequential ids starting at 1, colored by
    /// join order.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| {
                Player::new(
                    i as PlayerId + 1,
                    format!("Player{}", i + 1),
                    PlayerColor::PALETTE[i % PlayerColor::PALETTE.len()],
                )
            })
            .collect()
    }

    /// A waiting room with `n` players and a deterministic RNG. Player 1 is
    /// the host.
    pub fn make_room(mode: GameMode, n: usize, seed: u64) -> Room {
        let mut players = make_players(n);
        let host = players.remove(0);
        let mut room = Room::new("TEST01".into(), host, mode, StdRng::seed_from_u64(seed));
        room.players.extend(players);
        room
    }
}
