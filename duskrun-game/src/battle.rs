//! Real-time collision battle: player and enemy charge each other,
//! trade simultaneous damage on contact, and get knocked back.
//!
//! The orchestrator is entirely reactive: it enters its active phase
//! only when the flow commits a transition into [`GameState::Battle`]
//! and tears down when the flow leaves it (or a combatant dies). While
//! active it exclusively owns the enemy instance and the player's
//! transform; normal locomotion is disabled for the whole session.
use crate::CameraRig;
use crate::constants::{DAMAGE_POPUP_HEIGHT, KNOCKBACK_ATTACK_DIFF_SCALE};
use crate::events::{EventQueue, GameEvent, Side};
use crate::flow::{GameFlow, GameState};
use crate::math::{Vec3, smooth_step, yaw_towards};
use crate::runner::PlayerController;
use crate::stats::{DamageResult, EnemyConfig, EnemyStats, PlayerStats};
use serde::{Deserialize, Serialize};

/// Battle stage and combat tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Shared closing speed of both combatants.
    #[serde(default = "BattleConfig::default_move_speed")]
    pub move_speed: f32,
    /// Horizontal distance at which contact resolves.
    #[serde(default = "BattleConfig::default_contact_threshold")]
    pub contact_threshold: f32,
    #[serde(default = "BattleConfig::default_knockback_distance")]
    pub knockback_distance: f32,
    /// The dead side is shoved this many times the base distance.
    #[serde(default = "BattleConfig::default_death_knockback_multiplier")]
    pub death_knockback_multiplier: f32,
    /// Minimum seconds between two resolved impacts.
    #[serde(default = "BattleConfig::default_min_impact_interval")]
    pub min_impact_interval: f32,
    /// Seconds the knockback interpolation runs.
    #[serde(default = "BattleConfig::default_knockback_duration")]
    pub knockback_duration: f32,
    /// Hold after the knockback lands before contact may re-arm.
    #[serde(default = "BattleConfig::default_contact_grace")]
    pub contact_grace: f32,
    #[serde(default = "BattleConfig::default_player_spawn")]
    pub player_spawn: Vec3,
    #[serde(default = "BattleConfig::default_enemy_spawn")]
    pub enemy_spawn: Vec3,
    /// Fixed battle camera placement.
    #[serde(default = "BattleConfig::default_camera_offset")]
    pub camera_offset: Vec3,
    /// Fixed battle camera orientation, euler degrees.
    #[serde(default = "BattleConfig::default_camera_euler")]
    pub camera_euler: Vec3,
    #[serde(default = "BattleConfig::default_shake_intensity")]
    pub shake_intensity: f32,
    #[serde(default = "BattleConfig::default_shake_duration")]
    pub shake_duration: f32,
    #[serde(default = "BattleConfig::default_player_name")]
    pub player_name: String,
}

impl BattleConfig {
    const fn default_move_speed() -> f32 {
        6.0
    }

    const fn default_contact_threshold() -> f32 {
        1.0
    }

    const fn default_knockback_distance() -> f32 {
        1.5
    }

    const fn default_death_knockback_multiplier() -> f32 {
        3.0
    }

    const fn default_min_impact_interval() -> f32 {
        0.18
    }

    const fn default_knockback_duration() -> f32 {
        0.18
    }

    const fn default_contact_grace() -> f32 {
        0.08
    }

    const fn default_player_spawn() -> Vec3 {
        Vec3::new(-2.0, 0.0, 0.0)
    }

    const fn default_enemy_spawn() -> Vec3 {
        Vec3::new(2.0, 0.0, 0.0)
    }

    const fn default_camera_offset() -> Vec3 {
        Vec3::new(0.0, 5.5, -6.0)
    }

    const fn default_camera_euler() -> Vec3 {
        Vec3::new(45.0, 180.0, 0.0)
    }

    const fn default_shake_intensity() -> f32 {
        0.25
    }

    const fn default_shake_duration() -> f32 {
        0.15
    }

    fn default_player_name() -> String {
        String::from("Hero")
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            move_speed: Self::default_move_speed(),
            contact_threshold: Self::default_contact_threshold(),
            knockback_distance: Self::default_knockback_distance(),
            death_knockback_multiplier: Self::default_death_knockback_multiplier(),
            min_impact_interval: Self::default_min_impact_interval(),
            knockback_duration: Self::default_knockback_duration(),
            contact_grace: Self::default_contact_grace(),
            player_spawn: Self::default_player_spawn(),
            enemy_spawn: Self::default_enemy_spawn(),
            camera_offset: Self::default_camera_offset(),
            camera_euler: Self::default_camera_euler(),
            shake_intensity: Self::default_shake_intensity(),
            shake_duration: Self::default_shake_duration(),
            player_name: Self::default_player_name(),
        }
    }
}

/// The transient battle opponent, owned by the orchestrator for exactly
/// one session.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyUnit {
    pub stats: EnemyStats,
    pub position: Vec3,
    pub yaw: f32,
    pub name: String,
    pub exp_reward: f32,
}

impl EnemyUnit {
    fn spawn(template: &EnemyConfig, position: Vec3) -> Self {
        Self {
            stats: EnemyStats::new(template),
            position,
            yaw: 0.0,
            name: template.name.clone(),
            exp_reward: template.exp_reward,
        }
    }
}

/// Resumable knockback interpolation advanced once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
struct KnockbackAnim {
    player_start: Vec3,
    player_target: Vec3,
    enemy_start: Vec3,
    enemy_target: Vec3,
    elapsed: f32,
    duration: f32,
    grace: f32,
}

/// Battle orchestrator over `{Inactive, Active}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleManager {
    cfg: BattleConfig,
    enemy_template: Option<EnemyConfig>,
    active: bool,
    impact_blocked: bool,
    clock: f32,
    last_impact_at: Option<f32>,
    saved_player_position: Vec3,
    saved_player_yaw: f32,
    controller_was_enabled: bool,
    enemy: Option<EnemyUnit>,
    knockback: Option<KnockbackAnim>,
}

impl BattleManager {
    #[must_use]
    pub const fn new(cfg: BattleConfig, enemy_template: Option<EnemyConfig>) -> Self {
        Self {
            cfg,
            enemy_template,
            active: false,
            impact_blocked: false,
            clock: 0.0,
            last_impact_at: None,
            saved_player_position: Vec3::ZERO,
            saved_player_yaw: 0.0,
            controller_was_enabled: true,
            enemy: None,
            knockback: None,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Contact-block flag: set from the moment an impact resolves until
    /// the combatants have separated beyond the contact threshold.
    #[must_use]
    pub const fn impact_blocked(&self) -> bool {
        self.impact_blocked
    }

    #[must_use]
    pub const fn enemy(&self) -> Option<&EnemyUnit> {
        self.enemy.as_ref()
    }

    /// Observe a committed flow transition.
    pub fn notice_state<C: CameraRig>(
        &mut self,
        next: GameState,
        player: &mut PlayerController,
        camera: &mut C,
        events: &mut EventQueue,
    ) {
        if next == GameState::Battle {
            self.start_battle(player, camera, events);
        } else if self.active {
            // The flow already moved on (timer expiry, game over from
            // outside); clean up without requesting another transition.
            self.finish_battle(player, camera, events, None);
        }
    }

    /// Advance the battle loop by `dt` seconds.
    pub fn tick<C: CameraRig>(
        &mut self,
        dt: f32,
        player: &mut PlayerController,
        player_stats: &mut PlayerStats,
        flow: &mut GameFlow,
        camera: &mut C,
        events: &mut EventQueue,
    ) {
        self.clock += dt;

        if !self.active {
            // Reference resolution is retried while the flow sits in
            // Battle without an active session (e.g. the enemy template
            // arrived late). A deferred resume still reports Battle
            // until its flip commits; that window is not a retry.
            if flow.current_state() == GameState::Battle && !flow.transition_pending() {
                self.start_battle(player, camera, events);
            }
            return;
        }

        let enemy_alive = self.enemy.as_ref().is_some_and(|enemy| enemy.stats.is_alive());
        if !player_stats.is_alive() || !enemy_alive {
            self.end_with_casualty(player, player_stats, flow, camera, events);
            return;
        }

        if self.advance_knockback(dt, player) {
            return;
        }

        self.approach(dt, player);
        self.detect_contact(player, player_stats, flow, camera, events);
    }

    fn start_battle<C: CameraRig>(
        &mut self,
        player: &mut PlayerController,
        camera: &mut C,
        events: &mut EventQueue,
    ) {
        if self.active {
            return;
        }
        let Some(template) = self.enemy_template.clone() else {
            log::warn!("battle: enemy template unresolved, battle not started");
            return;
        };

        self.saved_player_position = player.position();
        self.saved_player_yaw = player.yaw();

        let mut enemy = EnemyUnit::spawn(&template, self.cfg.enemy_spawn);
        player.set_position(self.cfg.player_spawn);
        if let Some(yaw) = yaw_towards(player.position(), enemy.position) {
            player.set_yaw(yaw);
        }
        if let Some(yaw) = yaw_towards(enemy.position, player.position()) {
            enemy.yaw = yaw;
        }

        self.controller_was_enabled = player.is_enabled();
        player.set_enabled(false);

        camera.set_manual_view(self.cfg.camera_offset, self.cfg.camera_euler);

        self.enemy = Some(enemy);
        self.active = true;
        self.impact_blocked = false;
        self.knockback = None;
        self.last_impact_at = None;
        events.push(GameEvent::EncounterStarted);
        log::debug!("battle: started");
    }

    /// Tear down the session and restore everything captured at start.
    /// Safe to run immediately after a forced global transition.
    fn finish_battle<C: CameraRig>(
        &mut self,
        player: &mut PlayerController,
        camera: &mut C,
        events: &mut EventQueue,
        winner: Option<Side>,
    ) {
        if !self.active {
            return;
        }
        self.active = false;
        self.impact_blocked = false;
        self.knockback = None;
        self.last_impact_at = None;

        player.set_position(self.saved_player_position);
        player.set_yaw(self.saved_player_yaw);
        player.set_enabled(self.controller_was_enabled);
        camera.clear_manual_view();
        self.enemy = None;

        events.push(GameEvent::BattleEnded { winner });
        log::debug!("battle: ended");
    }

    /// Advance an in-flight knockback. Returns true while one is
    /// running; approach and contact stay suspended for that span.
    fn advance_knockback(&mut self, dt: f32, player: &mut PlayerController) -> bool {
        let Some(anim) = self.knockback.as_mut() else {
            return false;
        };
        anim.elapsed += dt;

        if anim.elapsed < anim.duration {
            let f = smooth_step(anim.elapsed / anim.duration);
            player.set_position(anim.player_start.lerp(anim.player_target, f));
            if let Some(enemy) = self.enemy.as_mut() {
                enemy.position = anim.enemy_start.lerp(anim.enemy_target, f);
            }
            return true;
        }

        player.set_position(anim.player_target);
        if let Some(enemy) = self.enemy.as_mut() {
            enemy.position = anim.enemy_target;
        }
        if anim.elapsed >= anim.duration + anim.grace {
            // Block clears later, once separation is confirmed.
            self.knockback = None;
        }
        true
    }

    /// Converge both combatants on the horizontal plane, clamped so
    /// neither overshoots. Vertical coordinates are left untouched.
    fn approach(&mut self, dt: f32, player: &mut PlayerController) {
        if self.impact_blocked {
            return;
        }
        let Some(enemy) = self.enemy.as_mut() else {
            return;
        };
        let step = self.cfg.move_speed * dt;
        let player_pos = player.position();
        let enemy_pos = enemy.position;

        let player_target = Vec3::new(enemy_pos.x, player_pos.y, enemy_pos.z);
        let enemy_target = Vec3::new(player_pos.x, enemy_pos.y, player_pos.z);

        player.set_position(player_pos.move_towards(player_target, step));
        enemy.position = enemy_pos.move_towards(enemy_target, step);
    }

    fn detect_contact<C: CameraRig>(
        &mut self,
        player: &mut PlayerController,
        player_stats: &mut PlayerStats,
        flow: &mut GameFlow,
        camera: &mut C,
        events: &mut EventQueue,
    ) {
        let Some(enemy) = self.enemy.as_ref() else {
            return;
        };
        let distance = player.position().horizontal_distance(enemy.position);

        if self.impact_blocked {
            if distance > self.cfg.contact_threshold {
                self.impact_blocked = false;
            }
            return;
        }

        if distance > self.cfg.contact_threshold {
            return;
        }
        let ready = self
            .last_impact_at
            .is_none_or(|at| self.clock - at >= self.cfg.min_impact_interval);
        if !ready {
            return;
        }

        self.impact_blocked = true;
        self.last_impact_at = Some(self.clock);
        self.resolve_impact(player, player_stats, flow, camera, events);
    }

    /// Simultaneous symmetric damage exchange plus knockback. Runs at
    /// most once per contact; the contact-block flag set by the caller
    /// holds until the combatants separate again.
    fn resolve_impact<C: CameraRig>(
        &mut self,
        player: &mut PlayerController,
        player_stats: &mut PlayerStats,
        flow: &mut GameFlow,
        camera: &mut C,
        events: &mut EventQueue,
    ) {
        let Some(enemy) = self.enemy.as_mut() else {
            return;
        };

        let mut normal = (player.position() - enemy.position)
            .horizontal()
            .normalized_or_zero();
        if normal == Vec3::ZERO {
            normal = Vec3::FORWARD;
        }

        let player_attack = player_stats.attack_power();
        let enemy_attack = enemy.stats.attack_power();
        let damage_to_player = enemy_attack.ceil() as i32;
        let damage_to_enemy = player_attack.ceil() as i32;

        events.push(GameEvent::BattleMessage {
            side: Side::Player,
            name: self.cfg.player_name.clone(),
            amount: damage_to_player,
        });
        events.push(GameEvent::BattleMessage {
            side: Side::Enemy,
            name: enemy.name.clone(),
            amount: damage_to_enemy,
        });
        events.push(GameEvent::DamagePopup {
            side: Side::Player,
            position: player.position() + Vec3::UP * DAMAGE_POPUP_HEIGHT,
            amount: damage_to_player,
        });
        events.push(GameEvent::DamagePopup {
            side: Side::Enemy,
            position: enemy.position + Vec3::UP * DAMAGE_POPUP_HEIGHT,
            amount: damage_to_enemy,
        });
        events.push(GameEvent::ImpactSpawned {
            position: player.position().midpoint(enemy.position),
        });
        if self.cfg.shake_intensity > 0.0 && self.cfg.shake_duration > 0.0 {
            camera.shake(self.cfg.shake_intensity, self.cfg.shake_duration);
        }

        let player_result = player_stats.apply_damage(damage_to_player as f32);
        player.note_damage_taken();
        let enemy_result = enemy.stats.apply_damage(damage_to_enemy as f32);

        // The side that hit harder is pushed back less: the differential
        // of the attacks scales the shove, not who "won" the exchange.
        let diff = (enemy_attack - player_attack).abs() * KNOCKBACK_ATTACK_DIFF_SCALE;
        let player_push = self.cfg.knockback_distance + diff;
        let enemy_push = self.cfg.knockback_distance + diff;
        self.knockback = Some(KnockbackAnim {
            player_start: player.position(),
            player_target: player.position() + normal * player_push,
            enemy_start: enemy.position,
            enemy_target: enemy.position + (-normal) * enemy_push,
            elapsed: 0.0,
            duration: self.cfg.knockback_duration.max(f32::EPSILON),
            grace: self.cfg.contact_grace,
        });

        let death_push = self.cfg.knockback_distance * self.cfg.death_knockback_multiplier;
        if player_result == DamageResult::Died {
            events.push(GameEvent::PlayerDied);
            player.set_position(player.position() + normal * death_push);
            self.finish_battle(player, camera, events, Some(Side::Enemy));
            flow.trigger_game_over(events);
            return;
        }
        if enemy_result == DamageResult::Died {
            events.push(GameEvent::EnemyDied);
            if let Some(enemy) = self.enemy.as_mut() {
                enemy.position += -normal * death_push;
            }
            let before = player_stats.level();
            let gained = player_stats.gain_exp(self.enemy.as_ref().map_or(0.0, |e| e.exp_reward));
            for step in 1..=gained {
                events.push(GameEvent::LeveledUp {
                    level: before + step,
                });
            }
            self.finish_battle(player, camera, events, Some(Side::Player));
            if flow.current_state() == GameState::Battle {
                flow.resume_running(events);
            }
        }
    }

    /// Exit path for a combatant found dead at tick start (killed from
    /// outside the impact loop).
    fn end_with_casualty<C: CameraRig>(
        &mut self,
        player: &mut PlayerController,
        player_stats: &mut PlayerStats,
        flow: &mut GameFlow,
        camera: &mut C,
        events: &mut EventQueue,
    ) {
        let player_dead = !player_stats.is_alive();
        let winner = if player_dead {
            Some(Side::Enemy)
        } else {
            Some(Side::Player)
        };
        self.finish_battle(player, camera, events, winner);
        if player_dead {
            flow.trigger_game_over(events);
        } else if flow.current_state() == GameState::Battle {
            flow.resume_running(events);
        }
    }
}
