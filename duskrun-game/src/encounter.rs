//! Random field encounters while the player is running in the overworld.
use crate::constants::ENCOUNTER_MIN_CHECK_INTERVAL;
use crate::events::EventQueue;
use crate::flow::{GameFlow, GameState};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Encounter sampling tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncounterConfig {
    /// How often (seconds) an encounter roll fires while running.
    #[serde(default = "EncounterConfig::default_check_interval")]
    pub check_interval: f32,
    /// Minimum forward speed required to consider an encounter.
    #[serde(default = "EncounterConfig::default_min_speed")]
    pub min_speed: f32,
    /// Probability in [0, 1] that a roll triggers a battle.
    #[serde(default = "EncounterConfig::default_chance")]
    pub chance: f32,
    /// Grace period after a battle starts before another may trigger.
    #[serde(default = "EncounterConfig::default_battle_cooldown")]
    pub battle_cooldown: f32,
}

impl EncounterConfig {
    const fn default_check_interval() -> f32 {
        1.5
    }

    const fn default_min_speed() -> f32 {
        1.0
    }

    const fn default_chance() -> f32 {
        0.25
    }

    const fn default_battle_cooldown() -> f32 {
        3.0
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            check_interval: Self::default_check_interval(),
            min_speed: Self::default_min_speed(),
            chance: Self::default_chance(),
            battle_cooldown: Self::default_battle_cooldown(),
        }
    }
}

/// Probabilistic encounter trigger gated on flow state, player speed and
/// grounding, with a post-battle cooldown.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEncounter {
    cfg: EncounterConfig,
    check_timer: f32,
    cooldown_timer: f32,
}

impl FieldEncounter {
    #[must_use]
    pub const fn new(cfg: EncounterConfig) -> Self {
        Self {
            cfg,
            check_timer: 0.0,
            cooldown_timer: 0.0,
        }
    }

    #[must_use]
    pub const fn cooldown_active(&self) -> bool {
        self.cooldown_timer > 0.0
    }

    /// Accumulate check time and roll for an encounter. Returns true when
    /// a battle was requested this tick.
    pub fn tick<R: Rng>(
        &mut self,
        dt: f32,
        flow: &mut GameFlow,
        current_speed: f32,
        grounded: bool,
        rng: &mut R,
        events: &mut EventQueue,
    ) -> bool {
        if !self.can_check(flow, current_speed, grounded) {
            self.check_timer = 0.0;
            return false;
        }

        if self.cooldown_timer > 0.0 {
            self.cooldown_timer -= dt;
            return false;
        }

        self.check_timer += dt;
        if self.check_timer < self.cfg.check_interval.max(ENCOUNTER_MIN_CHECK_INTERVAL) {
            return false;
        }

        self.check_timer = 0.0;
        if rng.gen_range(0.0..1.0_f32) <= self.cfg.chance {
            self.cooldown_timer = self.cfg.battle_cooldown;
            flow.enter_battle(events);
            return true;
        }
        false
    }

    /// Observe a committed flow transition. Entering battle arms the
    /// cooldown (covers manually triggered battles); returning to the
    /// field clears it.
    pub fn notice_state(&mut self, next: GameState) {
        match next {
            GameState::Running => self.cooldown_timer = 0.0,
            GameState::Battle => self.cooldown_timer = self.cfg.battle_cooldown,
            _ => {}
        }
    }

    fn can_check(&self, flow: &GameFlow, current_speed: f32, grounded: bool) -> bool {
        flow.current_state() == GameState::Running
            && current_speed >= self.cfg.min_speed
            && grounded
    }
}
