//! Duskrun Game Engine
//!
//! Platform-agnostic core game logic for the Duskrun action-runner game.
//! This crate provides all game mechanics without UI or platform-specific dependencies.

pub mod battle;
pub mod constants;
pub mod encounter;
pub mod events;
pub mod flow;
pub mod math;
pub mod runner;
pub mod session;
pub mod stats;

// Re-export commonly used types
pub use battle::{BattleConfig, BattleManager, EnemyUnit};
pub use encounter::{EncounterConfig, FieldEncounter};
pub use events::{EventQueue, GameEvent, Side};
pub use flow::{FlowConfig, GameFlow, GameState};
pub use math::Vec3;
pub use runner::{PlayerController, RunnerConfig};
pub use session::{ConfigError, GameSession, SessionConfig};
pub use stats::{DamageResult, EnemyConfig, EnemyStats, PlayerStats, PlayerStatsConfig};

/// Trait for abstracting the presentation camera.
/// Platform-specific implementations should provide this.
///
/// The battle orchestrator drives the camera through these calls; all
/// methods default to no-ops so a headless host can ignore them.
pub trait CameraRig {
    /// Take over the camera at a fixed pose. `euler_degrees` is the
    /// (pitch, yaw, roll) orientation in degrees.
    fn set_manual_view(&mut self, position: Vec3, euler_degrees: Vec3) {
        let _ = (position, euler_degrees);
    }

    /// Return the camera to whatever it was doing before manual control.
    fn clear_manual_view(&mut self) {}

    /// Shake the view for `duration` seconds at `magnitude` world units.
    fn shake(&mut self, magnitude: f32, duration: f32) {
        let _ = (magnitude, duration);
    }
}

/// Camera rig that ignores every command. Stands in for a missing or
/// headless camera so battle code never branches on presence.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCamera;

impl CameraRig for NullCamera {}

/// Trait for abstracting ground queries.
/// Platform-specific implementations should provide this.
pub trait GroundProbe {
    /// Cast straight down from `position` and return the signed vertical
    /// gap to the nearest walkable surface, if one lies within
    /// `max_distance`. A negative gap means the position is below the
    /// surface and should be pushed back up.
    fn cast_down(&self, position: Vec3, max_distance: f32) -> Option<f32>;
}

/// Infinite horizontal plane at a fixed height.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround {
    pub height: f32,
}

impl GroundProbe for FlatGround {
    fn cast_down(&self, position: Vec3, max_distance: f32) -> Option<f32> {
        let gap = position.y - self.height;
        (gap <= max_distance).then_some(gap)
    }
}

/// Trait for abstracting configuration loading.
/// Platform-specific implementations should provide this.
pub trait ConfigSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the session configuration from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_session_config(&self) -> Result<SessionConfig, Self::Error>;
}

/// Config source backed by an in-memory JSON document.
#[derive(Debug, Clone, Copy)]
pub struct JsonConfigSource<'a>(pub &'a str);

impl ConfigSource for JsonConfigSource<'_> {
    type Error = serde_json::Error;

    fn load_session_config(&self) -> Result<SessionConfig, Self::Error> {
        serde_json::from_str(self.0)
    }
}

/// Load, validate and wire up a full game session.
///
/// # Errors
///
/// Returns an error when the configuration cannot be loaded or fails
/// validation.
pub fn build_session<S, C, G>(
    source: &S,
    camera: C,
    probe: G,
    seed: u64,
) -> anyhow::Result<GameSession<C, G>>
where
    S: ConfigSource,
    C: CameraRig,
    G: GroundProbe,
{
    let cfg = source
        .load_session_config()
        .map_err(anyhow::Error::new)?;
    let session = GameSession::new(cfg, camera, probe, seed)?;
    Ok(session)
}
