//! Centralized balance and tuning constants for Duskrun game logic.
//!
//! Keeping these together ensures gameplay can only be adjusted via code
//! changes reviewed in version control rather than scattered literals.

// Flow tuning --------------------------------------------------------------
/// Fraction of the cosmetic fade after which the deferred state flip fires
/// (fade runs 40% in, 20% hold, then out; the flip lands at full black).
pub(crate) const FADE_COMMIT_RATIO: f32 = 0.6;

// Encounter tuning ---------------------------------------------------------
pub(crate) const ENCOUNTER_MIN_CHECK_INTERVAL: f32 = 0.01;

// Battle tuning ------------------------------------------------------------
/// Knockback grows by this factor per point of attack differential.
pub(crate) const KNOCKBACK_ATTACK_DIFF_SCALE: f32 = 0.1;
/// Vertical offset above a combatant where damage popups appear.
pub(crate) const DAMAGE_POPUP_HEIGHT: f32 = 1.2;

// Stat tuning --------------------------------------------------------------
pub(crate) const LEVEL_UP_MAX_HP_GAIN: f32 = 10.0;
pub(crate) const LEVEL_UP_ATTACK_GAIN: f32 = 2.0;
/// Dash may never drain the player below this HP floor.
pub(crate) const DASH_HP_FLOOR: f32 = 1.0;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f32 = 1e-5;
