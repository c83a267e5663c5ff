//! Combatant stat models: HP, attack power, and player progression.
use crate::constants::{LEVEL_UP_ATTACK_GAIN, LEVEL_UP_MAX_HP_GAIN};
use serde::{Deserialize, Serialize};

/// Result of one damage application.
///
/// `Died` is produced exactly once per life: on the tick HP first
/// reaches zero. Later hits against a dead combatant report `Ignored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageResult {
    /// Amount was non-positive or the combatant was already dead.
    Ignored,
    Survived,
    Died,
}

impl DamageResult {
    /// Whether the combatant is still alive after this application.
    #[must_use]
    pub const fn still_alive(self) -> bool {
        matches!(self, Self::Survived)
    }
}

/// Player stat tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatsConfig {
    #[serde(default = "PlayerStatsConfig::default_max_hp")]
    pub max_hp: f32,
    #[serde(default = "PlayerStatsConfig::default_attack_power")]
    pub attack_power: f32,
    #[serde(default = "PlayerStatsConfig::default_exp_to_next_level")]
    pub exp_to_next_level: f32,
    #[serde(default = "PlayerStatsConfig::default_exp_growth_factor")]
    pub exp_growth_factor: f32,
    #[serde(default = "PlayerStatsConfig::default_recommended_boss_level")]
    pub recommended_boss_level: u32,
}

impl PlayerStatsConfig {
    const fn default_max_hp() -> f32 {
        100.0
    }

    const fn default_attack_power() -> f32 {
        10.0
    }

    const fn default_exp_to_next_level() -> f32 {
        100.0
    }

    const fn default_exp_growth_factor() -> f32 {
        1.2
    }

    const fn default_recommended_boss_level() -> u32 {
        8
    }
}

impl Default for PlayerStatsConfig {
    fn default() -> Self {
        Self {
            max_hp: Self::default_max_hp(),
            attack_power: Self::default_attack_power(),
            exp_to_next_level: Self::default_exp_to_next_level(),
            exp_growth_factor: Self::default_exp_growth_factor(),
            recommended_boss_level: Self::default_recommended_boss_level(),
        }
    }
}

/// Enemy template: base stats plus the reward granted on its death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    #[serde(default = "EnemyConfig::default_max_hp")]
    pub max_hp: f32,
    #[serde(default = "EnemyConfig::default_attack_power")]
    pub attack_power: f32,
    #[serde(default = "EnemyConfig::default_exp_reward")]
    pub exp_reward: f32,
    #[serde(default = "EnemyConfig::default_name")]
    pub name: String,
}

impl EnemyConfig {
    const fn default_max_hp() -> f32 {
        60.0
    }

    const fn default_attack_power() -> f32 {
        12.0
    }

    const fn default_exp_reward() -> f32 {
        40.0
    }

    fn default_name() -> String {
        String::from("Orc")
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_hp: Self::default_max_hp(),
            attack_power: Self::default_attack_power(),
            exp_reward: Self::default_exp_reward(),
            name: Self::default_name(),
        }
    }
}

/// Player HP, EXP, level and attack power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    cfg: PlayerStatsConfig,
    max_hp: f32,
    current_hp: f32,
    attack_power: f32,
    current_exp: f32,
    exp_to_next_level: f32,
    level: u32,
}

impl PlayerStats {
    #[must_use]
    pub fn new(cfg: PlayerStatsConfig) -> Self {
        let mut stats = Self {
            max_hp: cfg.max_hp,
            current_hp: cfg.max_hp,
            attack_power: cfg.attack_power,
            current_exp: 0.0,
            exp_to_next_level: cfg.exp_to_next_level,
            level: 1,
            cfg,
        };
        stats.reset_stats();
        stats
    }

    /// Restore base values: full HP, level 1, zero exp.
    pub fn reset_stats(&mut self) {
        self.max_hp = self.cfg.max_hp;
        self.current_hp = self.max_hp;
        self.attack_power = self.cfg.attack_power.max(1.0);
        self.current_exp = 0.0;
        self.exp_to_next_level = self.cfg.exp_to_next_level.max(1.0);
        self.level = 1;
    }

    pub fn apply_damage(&mut self, amount: f32) -> DamageResult {
        apply_damage(&mut self.current_hp, amount)
    }

    /// Clamped heal. No-op when dead or for non-positive amounts.
    pub fn heal(&mut self, amount: f32) {
        if amount <= 0.0 || self.current_hp <= 0.0 {
            return;
        }
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
    }

    /// Accumulate experience, levelling up as many times as the reward
    /// covers. Returns the number of levels gained.
    pub fn gain_exp(&mut self, amount: f32) -> u32 {
        if amount <= 0.0 {
            return 0;
        }
        self.current_exp += amount;
        let mut gained = 0;
        while self.current_exp >= self.exp_to_next_level {
            self.current_exp -= self.exp_to_next_level;
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.max_hp += LEVEL_UP_MAX_HP_GAIN;
        self.attack_power += LEVEL_UP_ATTACK_GAIN;
        self.current_hp = self.max_hp;
        self.exp_to_next_level *= self.cfg.exp_growth_factor;
    }

    #[must_use]
    pub const fn max_hp(&self) -> f32 {
        self.max_hp
    }

    #[must_use]
    pub const fn current_hp(&self) -> f32 {
        self.current_hp
    }

    #[must_use]
    pub const fn attack_power(&self) -> f32 {
        self.attack_power
    }

    #[must_use]
    pub const fn current_exp(&self) -> f32 {
        self.current_exp
    }

    #[must_use]
    pub const fn exp_to_next_level(&self) -> f32 {
        self.exp_to_next_level
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_hp > 0.0
    }

    #[must_use]
    pub const fn is_boss_ready(&self) -> bool {
        self.level >= self.cfg.recommended_boss_level
    }
}

/// Battle opponent stats, reset at the start of every session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    max_hp: f32,
    current_hp: f32,
    attack_power: f32,
}

impl EnemyStats {
    #[must_use]
    pub fn new(cfg: &EnemyConfig) -> Self {
        Self {
            max_hp: cfg.max_hp,
            current_hp: cfg.max_hp,
            attack_power: cfg.attack_power,
        }
    }

    pub fn reset_stats(&mut self) {
        self.current_hp = self.max_hp;
    }

    pub fn apply_damage(&mut self, amount: f32) -> DamageResult {
        apply_damage(&mut self.current_hp, amount)
    }

    #[must_use]
    pub const fn max_hp(&self) -> f32 {
        self.max_hp
    }

    #[must_use]
    pub const fn current_hp(&self) -> f32 {
        self.current_hp
    }

    #[must_use]
    pub const fn attack_power(&self) -> f32 {
        self.attack_power
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_hp > 0.0
    }
}

fn apply_damage(current_hp: &mut f32, amount: f32) -> DamageResult {
    if *current_hp <= 0.0 || amount <= 0.0 {
        return DamageResult::Ignored;
    }
    *current_hp -= amount;
    if *current_hp <= 0.0 {
        *current_hp = 0.0;
        DamageResult::Died
    } else {
        DamageResult::Survived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    #[test]
    fn damage_clamps_at_zero_and_reports_death_once() {
        let mut enemy = EnemyStats::new(&EnemyConfig::default());
        assert_eq!(enemy.apply_damage(59.0), DamageResult::Survived);
        assert_eq!(enemy.apply_damage(5.0), DamageResult::Died);
        assert!((enemy.current_hp()).abs() < FLOAT_EPSILON);
        // Dead combatants ignore further hits; HP never goes negative.
        assert_eq!(enemy.apply_damage(100.0), DamageResult::Ignored);
        assert!(enemy.current_hp() >= 0.0);
        assert!(!enemy.is_alive());
    }

    #[test]
    fn non_positive_damage_is_a_no_op() {
        let mut player = PlayerStats::new(PlayerStatsConfig::default());
        assert_eq!(player.apply_damage(0.0), DamageResult::Ignored);
        assert_eq!(player.apply_damage(-3.0), DamageResult::Ignored);
        assert!((player.current_hp() - player.max_hp()).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn heal_clamps_at_max_and_ignores_the_dead() {
        let mut player = PlayerStats::new(PlayerStatsConfig::default());
        player.apply_damage(30.0);
        player.heal(500.0);
        assert!((player.current_hp() - player.max_hp()).abs() < FLOAT_EPSILON);

        player.apply_damage(player.max_hp());
        assert!(!player.is_alive());
        player.heal(10.0);
        assert!(!player.is_alive());
    }

    #[test]
    fn exp_ladder_levels_up_with_full_heal() {
        let mut player = PlayerStats::new(PlayerStatsConfig::default());
        player.apply_damage(40.0);
        assert_eq!(player.gain_exp(100.0), 1);
        assert_eq!(player.level(), 2);
        assert!((player.max_hp() - 110.0).abs() < FLOAT_EPSILON);
        assert!((player.attack_power() - 12.0).abs() < FLOAT_EPSILON);
        assert!((player.current_hp() - player.max_hp()).abs() < FLOAT_EPSILON);
        assert!((player.exp_to_next_level() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn large_reward_grants_multiple_levels() {
        let mut player = PlayerStats::new(PlayerStatsConfig::default());
        // 100 + 120 = 220 covers two thresholds with 30 spare.
        assert_eq!(player.gain_exp(250.0), 2);
        assert_eq!(player.level(), 3);
        assert!((player.current_exp() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn reset_restores_base_progression() {
        let mut player = PlayerStats::new(PlayerStatsConfig::default());
        player.gain_exp(400.0);
        player.apply_damage(15.0);
        player.reset_stats();
        assert_eq!(player.level(), 1);
        assert!((player.current_exp()).abs() < FLOAT_EPSILON);
        assert!((player.max_hp() - 100.0).abs() < FLOAT_EPSILON);
        assert!(player.is_alive());
        assert!(!player.is_boss_ready());
    }

    #[test]
    fn boss_readiness_tracks_recommended_level() {
        let cfg = PlayerStatsConfig {
            recommended_boss_level: 3,
            ..PlayerStatsConfig::default()
        };
        let mut player = PlayerStats::new(cfg);
        assert!(!player.is_boss_ready());
        player.gain_exp(100.0 + 120.0);
        assert_eq!(player.level(), 3);
        assert!(player.is_boss_ready());
    }
}
