use serde::{Deserialize, Serialize};

use crate::grid::GridPos;

/// Unique identifier for a player, allocated by the room registry.
pub type PlayerId = u64;

/// A timed status effect attached to a player. `expires` is epoch ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    pub expires: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    Frozen,
    Slow,
}

/// A player inside a room. Mode-specific role flags are sparse: each mode
/// resets the ones it owns on start and ignores the rest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub color: PlayerColor,
    pub score: i32,
    pub is_it: bool,
    pub is_infected: bool,
    pub is_spy: bool,
    pub is_seeker: bool,
    pub is_caught: bool,
    pub effects: Vec<Effect>,
    pub sprint_until: u64,
    pub shield_until: u64,
    #[serde(skip)]
    pub ability_ready_at: u64,
    #[serde(skip)]
    pub convert_at: Option<u64>,
    #[serde(skip)]
    pub last_move_ms: u64,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: PlayerColor) -> Self {
        Self {
            id,
            name: name.into(),
            x: 0,
            y: 0,
            color,
            score: 0,
            is_it: false,
            is_infected: false,
            is_spy: false,
            is_seeker: false,
            is_caught: false,
            effects: Vec::new(),
            sprint_until: 0,
            shield_until: 0,
            ability_ready_at: 0,
            convert_at: None,
            last_move_ms: 0,
        }
    }

    pub fn pos(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }

    pub fn set_pos(&mut self, pos: GridPos) {
        self.x = pos.x;
        self.y = pos.y;
    }

    /// Clear score, roles, effects, and timers ahead of a fresh game start.
    /// Position is left alone; the mode's `start` assigns spawns.
    pub fn reset_for_start(&mut self) {
        self.score = 0;
        self.is_it = false;
        self.is_infected = false;
        self.is_spy = false;
        self.is_seeker = false;
        self.is_caught = false;
        self.effects.clear();
        self.sprint_until = 0;
        self.shield_until = 0;
        self.ability_ready_at = 0;
        self.convert_at = None;
        self.last_move_ms = 0;
    }

    /// Attach a timed effect, extending the expiry if the kind is already
    /// active.
    pub fn add_effect(&mut self, kind: EffectKind, expires: u64) {
        if let Some(e) = self.effects.iter_mut().find(|e| e.kind == kind) {
            e.expires = e.expires.max(expires);
        } else {
            self.effects.push(Effect { kind, expires });
        }
    }

    pub fn has_effect(&self, kind: EffectKind, now: u64) -> bool {
        self.effects
            .iter()
            .any(|e| e.kind == kind && e.expires > now)
    }

    pub fn is_frozen(&self, now: u64) -> bool {
        self.has_effect(EffectKind::Frozen, now)
    }

    pub fn is_slowed(&self, now: u64) -> bool {
        self.has_effect(EffectKind::Slow, now)
    }

    pub fn is_sprinting(&self, now: u64) -> bool {
        self.sprint_until > now
    }

    pub fn is_shielded(&self, now: u64) -> bool {
        self.shield_until > now
    }

    /// Drop effects whose expiry has passed.
    pub fn prune_effects(&mut self, now: u64) {
        self.effects.retain(|e| e.expires > now);
    }
}

/// Avatar color, assigned from the fixed palette by join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// Fixed palette. Its length is also the hard cap on room occupancy.
    pub const PALETTE: &[PlayerColor] = &[
        PlayerColor {
            r: 255,
            g: 87,
            b: 87,
        }, // Red
        PlayerColor {
            r: 78,
            g: 205,
            b: 196,
        }, // Teal
        PlayerColor {
            r: 255,
            g: 195,
            b: 18,
        }, // Yellow
        PlayerColor {
            r: 130,
            g: 88,
            b: 255,
        }, // Purple
        PlayerColor {
            r: 46,
            g: 213,
            b: 115,
        }, // Green
        PlayerColor {
            r: 255,
            g: 148,
            b: 77,
        }, // Orange
        PlayerColor {
            r: 83,
            g: 152,
            b: 255,
        }, // Blue
        PlayerColor {
            r: 255,
            g: 107,
            b: 175,
        }, // Pink
    ];
}
