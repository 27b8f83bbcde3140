//! Maze Race: first player to reach the exit cell wins. Untimed; the maze
//! walls and the per-move cooldown are the only pacing.

use rand::seq::SliceRandom;

use gridlock_core::events::GameEvent;
use gridlock_core::grid::GridPos;
use gridlock_core::maze;
use gridlock_core::player::PlayerId;
use gridlock_core::room::Room;
use gridlock_core::state::{ModeState, Winner};

use crate::ModeSim;
use crate::common;

pub struct MazeRaceSim;

impl ModeSim for MazeRaceSim {
    fn start(&self, room: &mut Room, _now: u64) {
        let maze = maze::generate(room.maze_difficulty, &mut room.rng);

        // Fairness: spawn everyone among the cells farthest from the exit,
        // shuffled so roster order grants no edge.
        let mut spawns = maze::farthest_cells(&maze.grid, maze.end, room.players.len());
        spawns.shuffle(&mut room.rng);
        for (p, pos) in room.players.iter_mut().zip(spawns) {
            p.set_pos(pos);
        }
        room.game_state.mode_state = ModeState::MazeRace { maze: Some(maze) };
    }

    fn handle_move(
        &self,
        room: &mut Room,
        player_id: PlayerId,
        pos: GridPos,
        _now: u64,
    ) -> Vec<GameEvent> {
        let mut events = common::apply_move(room, player_id, pos);
        let at_exit = room.game_state.maze().is_some_and(|m| m.end == pos);
        if at_exit && let Some(winner) = room.player(player_id).cloned() {
            events.extend(common::end_game(room, Winner::Player(winner)));
        }
        events
    }

    fn tick(&self, _room: &mut Room, _now: u64) -> Vec<GameEvent> {
        Vec::new()
    }
}
