//! Kinematic player locomotion for the overworld runner phase.
//!
//! No physics engine: position, vertical velocity and a grounded flag
//! are integrated here, with grounding resolved against an injected
//! downward-cast query. Dash is paid for in HP (there is no separate
//! stamina pool) and health trickles back after a damage-free delay.
use crate::GroundProbe;
use crate::constants::DASH_HP_FLOOR;
use crate::math::Vec3;
use crate::stats::PlayerStats;
use serde::{Deserialize, Serialize};

/// Locomotion tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "RunnerConfig::default_forward_speed")]
    pub forward_speed: f32,
    #[serde(default = "RunnerConfig::default_dash_speed_multiplier")]
    pub dash_speed_multiplier: f32,
    /// HP drained per second while dashing.
    #[serde(default = "RunnerConfig::default_dash_drain_per_second")]
    pub dash_drain_per_second: f32,
    #[serde(default = "RunnerConfig::default_jump_velocity")]
    pub jump_velocity: f32,
    #[serde(default = "RunnerConfig::default_gravity")]
    pub gravity: f32,
    /// Grounded when a walkable surface lies within this distance below.
    #[serde(default = "RunnerConfig::default_ground_check_distance")]
    pub ground_check_distance: f32,
    #[serde(default = "RunnerConfig::default_hp_regen_per_second")]
    pub hp_regen_per_second: f32,
    /// Seconds after taking damage before regen resumes.
    #[serde(default = "RunnerConfig::default_hp_regen_delay")]
    pub hp_regen_delay: f32,
}

impl RunnerConfig {
    const fn default_forward_speed() -> f32 {
        10.0
    }

    const fn default_dash_speed_multiplier() -> f32 {
        1.5
    }

    const fn default_dash_drain_per_second() -> f32 {
        30.0
    }

    const fn default_jump_velocity() -> f32 {
        5.0
    }

    const fn default_gravity() -> f32 {
        9.81
    }

    const fn default_ground_check_distance() -> f32 {
        0.1
    }

    const fn default_hp_regen_per_second() -> f32 {
        1.0
    }

    const fn default_hp_regen_delay() -> f32 {
        2.0
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            forward_speed: Self::default_forward_speed(),
            dash_speed_multiplier: Self::default_dash_speed_multiplier(),
            dash_drain_per_second: Self::default_dash_drain_per_second(),
            jump_velocity: Self::default_jump_velocity(),
            gravity: Self::default_gravity(),
            ground_check_distance: Self::default_ground_check_distance(),
            hp_regen_per_second: Self::default_hp_regen_per_second(),
            hp_regen_delay: Self::default_hp_regen_delay(),
        }
    }
}

/// Player movement state. Suspended entirely while `enabled` is false
/// (the battle orchestrator owns the transform for that span).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerController {
    cfg: RunnerConfig,
    position: Vec3,
    yaw: f32,
    vertical_velocity: f32,
    grounded: bool,
    dashing: bool,
    enabled: bool,
    drain_accumulator: f32,
    regen_accumulator: f32,
    time_since_damage: f32,
}

impl PlayerController {
    #[must_use]
    pub const fn new(cfg: RunnerConfig) -> Self {
        Self {
            cfg,
            position: Vec3::ZERO,
            yaw: 0.0,
            vertical_velocity: 0.0,
            grounded: false,
            dashing: false,
            enabled: true,
            drain_accumulator: 0.0,
            regen_accumulator: 0.0,
            time_since_damage: f32::INFINITY,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    pub const fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    pub const fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    #[must_use]
    pub const fn is_dashing(&self) -> bool {
        self.dashing
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Forward speed this tick, dash multiplier included.
    #[must_use]
    pub fn current_speed(&self) -> f32 {
        if self.dashing {
            self.cfg.forward_speed * self.cfg.dash_speed_multiplier
        } else {
            self.cfg.forward_speed
        }
    }

    /// Grounded, non-dashing jump.
    pub fn jump(&mut self) {
        if !self.enabled || !self.grounded || self.dashing {
            return;
        }
        self.vertical_velocity = self.cfg.jump_velocity;
        self.grounded = false;
    }

    /// Begin dashing if grounded and the HP floor allows it.
    pub fn try_start_dash(&mut self, stats: &PlayerStats) -> bool {
        if !self.enabled || self.dashing || !self.grounded {
            return false;
        }
        if !self.can_afford_drain(stats, self.cfg.dash_drain_per_second) {
            return false;
        }
        self.dashing = true;
        true
    }

    pub const fn stop_dash(&mut self) {
        self.dashing = false;
        self.drain_accumulator = 0.0;
    }

    /// Called when battle damage lands so regen backs off.
    pub const fn note_damage_taken(&mut self) {
        self.time_since_damage = 0.0;
        self.regen_accumulator = 0.0;
    }

    /// Advance locomotion by `dt` seconds. No-op while disabled.
    pub fn tick<G: GroundProbe>(&mut self, dt: f32, probe: &G, stats: &mut PlayerStats) {
        if !self.enabled || dt <= 0.0 {
            return;
        }
        self.time_since_damage += dt;

        self.integrate_vertical(dt, probe);
        self.drain_dash(dt, stats);
        self.position.z += self.current_speed() * dt;
        self.regen(dt, stats);
    }

    fn integrate_vertical<G: GroundProbe>(&mut self, dt: f32, probe: &G) {
        self.vertical_velocity -= self.cfg.gravity * dt;
        self.position.y += self.vertical_velocity * dt;

        if self.vertical_velocity <= 0.0 {
            if let Some(gap) = probe.cast_down(self.position, self.cfg.ground_check_distance) {
                self.position.y -= gap;
                self.vertical_velocity = 0.0;
                self.grounded = true;
                return;
            }
        }
        self.grounded = false;
    }

    fn drain_dash(&mut self, dt: f32, stats: &mut PlayerStats) {
        if !self.dashing {
            return;
        }
        self.drain_accumulator += self.cfg.dash_drain_per_second * dt;
        let whole = self.drain_accumulator.floor();
        if whole < 1.0 {
            return;
        }
        if !self.can_afford_drain(stats, whole) {
            self.stop_dash();
            return;
        }
        self.drain_accumulator -= whole;
        stats.apply_damage(whole);
        self.note_damage_taken();
    }

    fn regen(&mut self, dt: f32, stats: &mut PlayerStats) {
        if !stats.is_alive()
            || stats.current_hp() >= stats.max_hp()
            || self.time_since_damage < self.cfg.hp_regen_delay
        {
            return;
        }
        self.regen_accumulator += self.cfg.hp_regen_per_second * dt;
        let whole = self.regen_accumulator.floor();
        if whole >= 1.0 {
            stats.heal(whole);
            self.regen_accumulator -= whole;
        }
    }

    fn can_afford_drain(&self, stats: &PlayerStats, amount: f32) -> bool {
        stats.current_hp() - amount >= DASH_HP_FLOOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlatGround;
    use crate::constants::FLOAT_EPSILON;
    use crate::stats::PlayerStatsConfig;

    fn setup() -> (PlayerController, FlatGround, PlayerStats) {
        let mut controller = PlayerController::new(RunnerConfig::default());
        let ground = FlatGround { height: 0.0 };
        let stats = PlayerStats::new(PlayerStatsConfig::default());
        // Settle onto the ground before each scenario.
        controller.set_position(Vec3::new(0.0, 0.05, 0.0));
        let mut warm_stats = stats.clone();
        controller.tick(0.01, &ground, &mut warm_stats);
        assert!(controller.is_grounded());
        (controller, ground, stats)
    }

    #[test]
    fn runs_forward_at_configured_speed() {
        let (mut controller, ground, mut stats) = setup();
        let start_z = controller.position().z;
        controller.tick(1.0, &ground, &mut stats);
        assert!((controller.position().z - start_z - 10.0).abs() < 1e-3);
    }

    #[test]
    fn jump_leaves_the_ground_and_lands_again() {
        let (mut controller, ground, mut stats) = setup();
        controller.jump();
        controller.tick(0.1, &ground, &mut stats);
        assert!(!controller.is_grounded());
        assert!(controller.position().y > 0.0);

        for _ in 0..30 {
            controller.tick(0.1, &ground, &mut stats);
        }
        assert!(controller.is_grounded());
        assert!(controller.position().y.abs() < FLOAT_EPSILON);
    }

    #[test]
    fn dash_multiplies_speed_and_drains_whole_hp_points() {
        let (mut controller, ground, mut stats) = setup();
        assert!(controller.try_start_dash(&stats));
        assert!((controller.current_speed() - 15.0).abs() < FLOAT_EPSILON);

        let hp_before = stats.current_hp();
        controller.tick(0.1, &ground, &mut stats);
        // 30 hp/s over 0.1s drains exactly 3 whole points.
        assert!((hp_before - stats.current_hp() - 3.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn dash_refused_and_cancelled_at_the_hp_floor() {
        let (mut controller, ground, mut stats) = setup();
        stats.apply_damage(stats.current_hp() - 20.0);
        // 20 HP left: starting a 30/s dash would breach the floor.
        assert!(!controller.try_start_dash(&stats));

        stats.heal(stats.max_hp());
        stats.apply_damage(stats.current_hp() - 33.0);
        assert!(controller.try_start_dash(&stats));
        for _ in 0..20 {
            controller.tick(0.1, &ground, &mut stats);
        }
        assert!(!controller.is_dashing());
        assert!(stats.current_hp() >= DASH_HP_FLOOR);
    }

    #[test]
    fn regen_waits_for_the_damage_delay() {
        let (mut controller, ground, mut stats) = setup();
        stats.apply_damage(50.0);
        controller.note_damage_taken();

        controller.tick(1.0, &ground, &mut stats);
        assert!((stats.current_hp() - 50.0).abs() < FLOAT_EPSILON);

        // Past the 2s delay, one whole point per second comes back.
        controller.tick(1.5, &ground, &mut stats);
        controller.tick(1.0, &ground, &mut stats);
        assert!(stats.current_hp() > 50.0);
    }

    #[test]
    fn disabled_controller_is_inert() {
        let (mut controller, ground, mut stats) = setup();
        controller.set_enabled(false);
        let before = controller.position();
        controller.jump();
        controller.tick(1.0, &ground, &mut stats);
        assert_eq!(controller.position(), before);
    }
}
