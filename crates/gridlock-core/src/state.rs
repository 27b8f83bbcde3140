use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::grid::{GRID_SIZE, GridPos};
use crate::maze::Maze;
use crate::player::{Player, PlayerId};
use crate::room::GameMode;

/// Room lifecycle. Strictly forward-moving; only a fresh start resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

/// Game outcome: nobody yet, a single player, or a named side like
/// "Survivors". Serializes to null, a player object, or `{"name": ...}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum Winner {
    #[default]
    None,
    Player(Player),
    Team {
        name: String,
    },
}

impl Winner {
    pub fn team(name: &str) -> Self {
        Winner::Team {
            name: name.to_string(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Winner::None)
    }
}

/// A hidden floor trap. `revealed` flips one way, false to true.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trap {
    #[serde(rename = "type")]
    pub kind: TrapKind,
    pub revealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrapKind {
    Slow,
    Teleport,
    Freeze,
}

/// One vault code pad on the heist floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodePad {
    pub id: u32,
    pub x: i32,
    pub y: i32,
}

/// Spy & Decode round phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpyPhase {
    Signaling,
    Guessing,
    Reveal,
}

/// A timestamped trace left by a moving hider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footprint {
    pub player_id: PlayerId,
    pub x: i32,
    pub y: i32,
    pub ts: u64,
}

/// Mode-specific sub-state carried inside `GameState`. Exactly the data the
/// active mode needs; switching modes re-derives the scaffolding.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ModeState {
    Tag,
    Territory {
        /// `tiles[y][x]` holds the claiming player, if any.
        tiles: Vec<Vec<Option<PlayerId>>>,
    },
    MazeRace {
        maze: Option<Maze>,
    },
    Infection,
    TrapRush {
        /// `traps[y][x]`; rows 0-1 and the finish row stay clear.
        traps: Vec<Vec<Option<Trap>>>,
    },
    SpyDecode {
        codes: Vec<String>,
        correct: usize,
        guesses: HashMap<PlayerId, String>,
        phase: SpyPhase,
        phase_ends_at: u64,
    },
    Heist {
        pads: Vec<CodePad>,
        correct_pad: u32,
    },
    HideSeek {
        maze: Option<Maze>,
        footprints: Vec<Footprint>,
        seeker_freeze_until: u64,
        hiders_revealed: bool,
    },
}

/// Shared per-room game state plus the active mode's sub-state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub status: GameStatus,
    /// Whole seconds remaining, 0 for untimed modes.
    pub timer: u32,
    pub winner: Winner,
    pub mode_state: ModeState,
    /// Epoch ms when the round timer runs out; None for untimed modes.
    #[serde(skip)]
    pub ends_at: Option<u64>,
}

impl GameState {
    /// Fresh waiting-state scaffolding for a mode. Content that depends on
    /// randomness (mazes, traps, pads, codes) is filled in at start.
    pub fn scaffold(mode: GameMode) -> Self {
        let size = GRID_SIZE as usize;
        let mode_state = match mode {
            GameMode::Tag => ModeState::Tag,
            GameMode::Territory => ModeState::Territory {
                tiles: vec![vec![None; size]; size],
            },
            GameMode::MazeRace => ModeState::MazeRace { maze: None },
            GameMode::Infection => ModeState::Infection,
            GameMode::TrapRush => ModeState::TrapRush {
                traps: vec![vec![None; size]; size],
            },
            GameMode::SpyDecode => ModeState::SpyDecode {
                codes: Vec::new(),
                correct: 0,
                guesses: HashMap::new(),
                phase: SpyPhase::Signaling,
                phase_ends_at: 0,
            },
            GameMode::Heist => ModeState::Heist {
                pads: Vec::new(),
                correct_pad: 0,
            },
            GameMode::HideSeek => ModeState::HideSeek {
                maze: None,
                footprints: Vec::new(),
                seeker_freeze_until: 0,
                hiders_revealed: false,
            },
        };
        Self {
            status: GameStatus::Waiting,
            timer: 0,
            winner: Winner::None,
            mode_state,
            ends_at: None,
        }
    }

    /// The maze the active mode navigates, if it has one. The move validator
    /// uses this for wall rejection.
    pub fn maze(&self) -> Option<&Maze> {
        match &self.mode_state {
            ModeState::MazeRace { maze } | ModeState::HideSeek { maze, .. } => maze.as_ref(),
            _ => None,
        }
    }

    /// Arm the round countdown for `secs` seconds from `now`.
    pub fn arm_timer(&mut self, secs: u32, now: u64) {
        self.timer = secs;
        self.ends_at = Some(now + u64::from(secs) * 1000);
    }

    /// Trap lookup for Trap Rush, None elsewhere or off-grid.
    pub fn trap_at(&self, pos: GridPos) -> Option<Trap> {
        match &self.mode_state {
            ModeState::TrapRush { traps } if pos.in_bounds() => {
                traps[pos.y as usize][pos.x as usize]
            },
            _ => None,
        }
    }
}
