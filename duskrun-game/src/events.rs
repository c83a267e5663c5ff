//! Per-tick game events drained by the presentation layer.
//!
//! The core never calls into UI code directly; everything observable
//! (state flips, timer updates, battle messages, popup/effect spawn
//! requests) is queued here and drained once per tick by the host.
use crate::flow::GameState;
use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Which combatant an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// Events emitted during a single tick, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A committed flow transition. Never emitted for same-state requests.
    StateChanged {
        previous: GameState,
        next: GameState,
    },
    TimeUpdated {
        time_left: f32,
    },
    /// One-shot countdown expiry.
    TimeExpired,
    /// A battle session began (encounter banner).
    EncounterStarted,
    /// Battle-log line: `name` took `amount` damage.
    BattleMessage {
        side: Side,
        name: String,
        amount: i32,
    },
    /// Floating damage number at a world position.
    DamagePopup {
        side: Side,
        position: Vec3,
        amount: i32,
    },
    /// Cosmetic impact effect spawn request.
    ImpactSpawned {
        position: Vec3,
    },
    /// Battle cleanup ran. `winner` is `None` on a forced exit.
    BattleEnded {
        winner: Option<Side>,
    },
    LeveledUp {
        level: u32,
    },
    PlayerDied,
    EnemyDied,
}

/// Event buffer sized for a typical tick without heap allocation.
pub type EventQueue = SmallVec<[GameEvent; 8]>;
