use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::grid::{GRID_SIZE, GridPos};

/// How aggressively dead ends are opened into loops, set per room before a
/// maze mode starts. Fewer loops means fewer alternate routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MazeDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl MazeDifficulty {
    /// Fraction of dead-end cells that get one wall knocked down.
    pub fn braid_fraction(self) -> f64 {
        match self {
            MazeDifficulty::Easy => 0.50,
            MazeDifficulty::Normal => 0.35,
            MazeDifficulty::Hard => 0.15,
        }
    }
}

/// A carved maze over the play grid. `grid[y][x]` is 1 for wall, 0 for path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maze {
    pub grid: Vec<Vec<u8>>,
    pub start: GridPos,
    pub end: GridPos,
}

impl Maze {
    pub fn is_wall(&self, pos: GridPos) -> bool {
        if !pos.in_bounds() {
            return true;
        }
        self.grid[pos.y as usize][pos.x as usize] == 1
    }
}

const CARVE_START: GridPos = GridPos::new(1, 1);

/// Carve a maze with iterative randomized DFS, then open a fraction of dead
/// ends into loops. Corridors land on odd coordinates; row and column 0 stay
/// walls, so every carved cell is reachable from (1,1) by construction.
pub fn generate(difficulty: MazeDifficulty, rng: &mut StdRng) -> Maze {
    let size = GRID_SIZE as usize;
    let mut grid = vec![vec![1u8; size]; size];

    // DFS carve: move in 2-cell steps so a wall cell remains between
    // corridors, knocking through the wall in between.
    let mut stack = vec![CARVE_START];
    grid[CARVE_START.y as usize][CARVE_START.x as usize] = 0;
    while let Some(&cell) = stack.last() {
        let mut dirs = [(0i32, -2i32), (0, 2), (-2, 0), (2, 0)];
        dirs.shuffle(rng);
        let next = dirs.iter().find_map(|&(dx, dy)| {
            let n = GridPos::new(cell.x + dx, cell.y + dy);
            let interior =
                n.x >= 1 && n.y >= 1 && n.x < GRID_SIZE - 1 && n.y < GRID_SIZE - 1;
            (interior && grid[n.y as usize][n.x as usize] == 1).then_some(n)
        });
        match next {
            Some(n) => {
                let wall = GridPos::new((cell.x + n.x) / 2, (cell.y + n.y) / 2);
                grid[wall.y as usize][wall.x as usize] = 0;
                grid[n.y as usize][n.x as usize] = 0;
                stack.push(n);
            },
            None => {
                stack.pop();
            },
        }
    }

    braid_dead_ends(&mut grid, difficulty.braid_fraction(), rng);

    // Goal: the path cell graph-farthest from the carve origin.
    let end = farthest_cells(&grid, CARVE_START, 1)
        .into_iter()
        .next()
        .unwrap_or(CARVE_START);

    Maze {
        grid,
        start: CARVE_START,
        end,
    }
}

/// Knock one random interior wall off a fraction of dead-end cells so the
/// maze is not a single corridor tree.
fn braid_dead_ends(grid: &mut [Vec<u8>], fraction: f64, rng: &mut StdRng) {
    let size = grid.len() as i32;
    let mut dead_ends = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let cell = GridPos::new(x, y);
            if grid[y as usize][x as usize] != 0 {
                continue;
            }
            let walls = neighbor_walls(grid, cell);
            if walls.len() >= 3 {
                dead_ends.push(cell);
            }
        }
    }

    for cell in dead_ends {
        if !rng.random_bool(fraction) {
            continue;
        }
        // Re-check: an earlier removal may already have opened this cell.
        let walls = neighbor_walls(grid, cell);
        if walls.len() < 3 {
            continue;
        }
        let mut interior = walls;
        interior.retain(|w| w.x > 0 && w.x < size - 1 && w.y > 0 && w.y < size - 1);
        if let Some(&w) = interior[..].choose(rng) {
            grid[w.y as usize][w.x as usize] = 0;
        }
    }
}

fn neighbor_walls(grid: &[Vec<u8>], cell: GridPos) -> Vec<GridPos> {
    let size = grid.len() as i32;
    [(0i32, -1i32), (0, 1), (-1, 0), (1, 0)]
        .iter()
        .filter_map(|&(dx, dy)| {
            let n = GridPos::new(cell.x + dx, cell.y + dy);
            (n.x >= 0 && n.x < size && n.y >= 0 && n.y < size
                && grid[n.y as usize][n.x as usize] == 1)
                .then_some(n)
        })
        .collect()
}

/// BFS hop counts from `origin` across path cells. Walls and unreachable
/// cells are -1.
pub fn distance_field(grid: &[Vec<u8>], origin: GridPos) -> Vec<Vec<i32>> {
    let size = grid.len() as i32;
    let mut dist = vec![vec![-1i32; size as usize]; size as usize];
    if origin.x < 0
        || origin.y < 0
        || origin.x >= size
        || origin.y >= size
        || grid[origin.y as usize][origin.x as usize] == 1
    {
        return dist;
    }
    dist[origin.y as usize][origin.x as usize] = 0;
    let mut queue = VecDeque::from([origin]);
    while let Some(cell) = queue.pop_front() {
        let d = dist[cell.y as usize][cell.x as usize];
        for (dx, dy) in [(0i32, -1i32), (0, 1), (-1, 0), (1, 0)] {
            let n = GridPos::new(cell.x + dx, cell.y + dy);
            if n.x < 0 || n.x >= size || n.y < 0 || n.y >= size {
                continue;
            }
            if grid[n.y as usize][n.x as usize] == 1 || dist[n.y as usize][n.x as usize] != -1 {
                continue;
            }
            dist[n.y as usize][n.x as usize] = d + 1;
            queue.push_back(n);
        }
    }
    dist
}

/// The `count` reachable path cells farthest from `origin`, farthest first.
/// Used for fairness placement: race spawns and hider spreading.
pub fn farthest_cells(grid: &[Vec<u8>], origin: GridPos, count: usize) -> Vec<GridPos> {
    let dist = distance_field(grid, origin);
    let size = grid.len() as i32;
    let mut cells: Vec<(i32, GridPos)> = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let d = dist[y as usize][x as usize];
            if d > 0 {
                cells.push((d, GridPos::new(x, y)));
            }
        }
    }
    cells.sort_by(|a, b| b.0.cmp(&a.0));
    cells.into_iter().take(count).map(|(_, c)| c).collect()
}

/// A uniformly random path cell, for modes that spawn on open maze ground.
pub fn random_path_cell(grid: &[Vec<u8>], rng: &mut StdRng) -> GridPos {
    let size = grid.len() as i32;
    let mut cells = Vec::new();
    for y in 0..size {
        for x in 0..size {
            if grid[y as usize][x as usize] == 0 {
                cells.push(GridPos::new(x, y));
            }
        }
    }
    cells[rng.random_range(0..cells.len())]
}
