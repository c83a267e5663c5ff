//! Explicitly constructed game context: one flow controller, one
//! encounter trigger, one battle orchestrator, one player, all wired
//! together by ownership instead of global singletons.
use crate::battle::{BattleConfig, BattleManager};
use crate::encounter::{EncounterConfig, FieldEncounter};
use crate::events::{EventQueue, GameEvent};
use crate::flow::{FlowConfig, GameFlow, GameState};
use crate::runner::{PlayerController, RunnerConfig};
use crate::stats::{EnemyConfig, PlayerStats, PlayerStatsConfig};
use crate::{CameraRig, GroundProbe};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Aggregate tuning for a whole session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub encounter: EncounterConfig,
    #[serde(default)]
    pub battle: BattleConfig,
    #[serde(default)]
    pub player: PlayerStatsConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub enemy: EnemyConfig,
}

impl SessionConfig {
    /// Validate configuration invariants before a session is built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::positive("flow.start_time_limit", self.flow.start_time_limit)?;
        Self::at_least("flow.transition_fade", self.flow.transition_fade, 0.0)?;
        Self::positive("battle.move_speed", self.battle.move_speed)?;
        Self::positive("battle.contact_threshold", self.battle.contact_threshold)?;
        Self::positive("battle.knockback_distance", self.battle.knockback_distance)?;
        Self::at_least(
            "battle.min_impact_interval",
            self.battle.min_impact_interval,
            0.0,
        )?;
        Self::positive("player.max_hp", self.player.max_hp)?;
        Self::positive("player.attack_power", self.player.attack_power)?;
        Self::at_least("player.exp_growth_factor", self.player.exp_growth_factor, 1.0)?;
        Self::positive("enemy.max_hp", self.enemy.max_hp)?;
        Self::positive("enemy.attack_power", self.enemy.attack_power)?;
        Self::positive("runner.forward_speed", self.runner.forward_speed)?;
        if !(0.0..=1.0).contains(&self.encounter.chance) {
            return Err(ConfigError::RangeViolation {
                field: "encounter.chance",
                min: 0.0,
                max: 1.0,
                value: self.encounter.chance,
            });
        }
        Ok(())
    }

    fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value <= 0.0 {
            return Err(ConfigError::MinViolation {
                field,
                min: f32::EPSILON,
                value,
            });
        }
        Ok(())
    }

    fn at_least(field: &'static str, value: f32, min: f32) -> Result<(), ConfigError> {
        if value < min {
            return Err(ConfigError::MinViolation { field, min, value });
        }
        Ok(())
    }
}

/// Errors raised when session configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f32,
        value: f32,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
}

/// One run of the game, ticked by the host loop at a variable time-step.
///
/// Everything is single-threaded and cooperative: each `tick` advances
/// the flow (fade + countdown), delivers committed transitions to the
/// observers, then steps locomotion, encounter sampling, and the battle
/// loop. Events raised along the way are returned for the presentation
/// layer to drain.
#[derive(Debug)]
pub struct GameSession<C: CameraRig, G: GroundProbe> {
    flow: GameFlow,
    encounter: FieldEncounter,
    battle: BattleManager,
    player: PlayerController,
    stats: PlayerStats,
    camera: C,
    probe: G,
    rng: SmallRng,
    events: EventQueue,
    delivered: usize,
}

impl<C: CameraRig, G: GroundProbe> GameSession<C, G> {
    /// Build a session from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates its bounds.
    pub fn new(cfg: SessionConfig, camera: C, probe: G, seed: u64) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            flow: GameFlow::new(cfg.flow),
            encounter: FieldEncounter::new(cfg.encounter),
            battle: BattleManager::new(cfg.battle, Some(cfg.enemy)),
            player: PlayerController::new(cfg.runner),
            stats: PlayerStats::new(cfg.player),
            camera,
            probe,
            rng: SmallRng::seed_from_u64(seed),
            events: EventQueue::new(),
            delivered: 0,
        })
    }

    /// Begin the run: `Intro -> Running`, countdown armed.
    pub fn start(&mut self) {
        self.with_queue(|session, events| session.flow.start_game(events));
    }

    /// Manually request a battle (encounters call this internally).
    pub fn enter_battle(&mut self) {
        self.with_queue(|session, events| session.flow.enter_battle(events));
    }

    pub fn enter_boss_cutscene(&mut self) {
        self.with_queue(|session, events| session.flow.enter_boss_cutscene(events));
    }

    pub fn end_game_clear(&mut self) {
        self.with_queue(|session, events| session.flow.end_game_clear(events));
    }

    pub fn trigger_game_over(&mut self) {
        self.with_queue(|session, events| session.flow.trigger_game_over(events));
    }

    pub fn reset_timer(&mut self) {
        self.with_queue(|session, events| session.flow.reset_timer(events));
    }

    pub fn jump(&mut self) {
        self.player.jump();
    }

    pub fn try_start_dash(&mut self) -> bool {
        self.player.try_start_dash(&self.stats)
    }

    pub fn stop_dash(&mut self) {
        self.player.stop_dash();
    }

    /// Advance the whole simulation by `dt` seconds, returning every
    /// event raised during the tick in emission order.
    pub fn tick(&mut self, dt: f32) -> EventQueue {
        let mut events = std::mem::take(&mut self.events);
        let mut cursor = self.delivered;

        self.flow.tick(dt, &mut events);
        cursor = self.deliver(&mut events, cursor);

        self.player.tick(dt, &self.probe, &mut self.stats);
        self.encounter.tick(
            dt,
            &mut self.flow,
            self.player.current_speed(),
            self.player.is_grounded(),
            &mut self.rng,
            &mut events,
        );
        cursor = self.deliver(&mut events, cursor);

        self.battle.tick(
            dt,
            &mut self.player,
            &mut self.stats,
            &mut self.flow,
            &mut self.camera,
            &mut events,
        );
        self.deliver(&mut events, cursor);

        self.delivered = 0;
        events
    }

    /// Deliver committed transitions appended since `cursor` to the
    /// observers; cascaded transitions are picked up in the same sweep.
    fn deliver(&mut self, events: &mut EventQueue, mut cursor: usize) -> usize {
        while cursor < events.len() {
            let next = match &events[cursor] {
                GameEvent::StateChanged { next, .. } => Some(*next),
                _ => None,
            };
            if let Some(next) = next {
                self.encounter.notice_state(next);
                self.battle
                    .notice_state(next, &mut self.player, &mut self.camera, events);
            }
            cursor += 1;
        }
        cursor
    }

    fn with_queue(&mut self, f: impl FnOnce(&mut Self, &mut EventQueue)) {
        let mut events = std::mem::take(&mut self.events);
        let cursor = self.delivered.min(events.len());
        f(self, &mut events);
        self.delivered = self.deliver(&mut events, cursor);
        self.events = events;
    }

    #[must_use]
    pub const fn current_state(&self) -> GameState {
        self.flow.current_state()
    }

    #[must_use]
    pub const fn time_left(&self) -> f32 {
        self.flow.time_left()
    }

    #[must_use]
    pub const fn flow(&self) -> &GameFlow {
        &self.flow
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerController {
        &self.player
    }

    #[must_use]
    pub const fn player_stats(&self) -> &PlayerStats {
        &self.stats
    }

    #[must_use]
    pub const fn battle(&self) -> &BattleManager {
        &self.battle
    }

    #[must_use]
    pub const fn encounter(&self) -> &FieldEncounter {
        &self.encounter
    }

    #[must_use]
    pub const fn camera(&self) -> &C {
        &self.camera
    }
}
