use serde::Serialize;

use crate::maze::MazeDifficulty;
use crate::player::{EffectKind, Player, PlayerId};
use crate::room::{GameMode, Room, RoomSummary};
use crate::state::{Footprint, SpyPhase, TrapKind, Winner};

/// An immutable, serializable fact about a state change. Events are the only
/// way information crosses into the transport layer; the wire form is
/// `{"name": ..., "data": {...}}` with kebab-case names.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "name", content = "data", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
pub enum GameEvent {
    GameStarted {
        room: Room,
    },
    PlayerMoved {
        player_id: PlayerId,
        x: i32,
        y: i32,
    },
    PlayerTagged {
        tagger: PlayerId,
        tagged: PlayerId,
    },
    TileClaimed {
        player_id: PlayerId,
        x: i32,
        y: i32,
    },
    ScoresUpdate {
        scores: Vec<ScoreEntry>,
    },
    PlayerInfected {
        player_id: PlayerId,
    },
    TrapTriggered {
        player_id: PlayerId,
        x: i32,
        y: i32,
        trap: TrapKind,
    },
    PlayerEffect {
        player_id: PlayerId,
        #[serde(rename = "type")]
        effect: EffectKind,
        expires: u64,
    },
    PadGuessed {
        player_id: PlayerId,
        pad_id: u32,
        correct: bool,
    },
    PhaseChanged {
        phase: SpyPhase,
    },
    PlayerGuessed {
        player_id: PlayerId,
    },
    TimerUpdate {
        timer: u32,
    },
    GameOver {
        winner: Winner,
        scores: Vec<ScoreEntry>,
    },
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    HostChanged {
        host_id: PlayerId,
    },
    GameModeChanged {
        game_mode: GameMode,
    },
    AbilityActivated {
        player_id: PlayerId,
        ability: Ability,
        expires: u64,
    },
    MazeDifficultyChanged {
        difficulty: MazeDifficulty,
    },
    PlayerCaught {
        player_id: PlayerId,
        by: PlayerId,
    },
    PlayerConverted {
        player_id: PlayerId,
    },
    FootprintsUpdate {
        footprints: Vec<Footprint>,
    },
    HidersRevealed {
        hiders: Vec<HiderPos>,
    },
    AvailableRoomsUpdate {
        rooms: Vec<RoomSummary>,
    },
}

impl GameEvent {
    /// Wire name of the event, for logging and test assertions.
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "game-started",
            GameEvent::PlayerMoved { .. } => "player-moved",
            GameEvent::PlayerTagged { .. } => "player-tagged",
            GameEvent::TileClaimed { .. } => "tile-claimed",
            GameEvent::ScoresUpdate { .. } => "scores-update",
            GameEvent::PlayerInfected { .. } => "player-infected",
            GameEvent::TrapTriggered { .. } => "trap-triggered",
            GameEvent::PlayerEffect { .. } => "player-effect",
            GameEvent::PadGuessed { .. } => "pad-guessed",
            GameEvent::PhaseChanged { .. } => "phase-changed",
            GameEvent::PlayerGuessed { .. } => "player-guessed",
            GameEvent::TimerUpdate { .. } => "timer-update",
            GameEvent::GameOver { .. } => "game-over",
            GameEvent::PlayerJoined { .. } => "player-joined",
            GameEvent::PlayerLeft { .. } => "player-left",
            GameEvent::HostChanged { .. } => "host-changed",
            GameEvent::GameModeChanged { .. } => "game-mode-changed",
            GameEvent::AbilityActivated { .. } => "ability-activated",
            GameEvent::MazeDifficultyChanged { .. } => "maze-difficulty-changed",
            GameEvent::PlayerCaught { .. } => "player-caught",
            GameEvent::PlayerConverted { .. } => "player-converted",
            GameEvent::FootprintsUpdate { .. } => "footprints-update",
            GameEvent::HidersRevealed { .. } => "hiders-revealed",
            GameEvent::AvailableRoomsUpdate { .. } => "available-rooms-update",
        }
    }
}

/// One row of a scores broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub score: i32,
}

/// Infection Arena ability kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ability {
    Sprint,
    Shield,
}

/// Revealed hider position for the late-round broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiderPos {
    pub player_id: PlayerId,
    pub x: i32,
    pub y: i32,
}
