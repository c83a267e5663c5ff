//! Central game flow controller: the global state machine plus the
//! world countdown that forces the boss cutscene on expiry.
use crate::constants::FADE_COMMIT_RATIO;
use crate::events::{EventQueue, GameEvent};
use serde::{Deserialize, Serialize};

/// Global phase of a run. Exactly one value is current at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Intro,
    Running,
    Battle,
    BossCutscene,
    GameOver,
    Clear,
}

impl GameState {
    /// The countdown only runs while the player is in the field or in battle.
    #[must_use]
    pub const fn timer_runs(self) -> bool {
        matches!(self, Self::Running | Self::Battle)
    }
}

/// Flow tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Countdown length in seconds.
    #[serde(default = "FlowConfig::default_start_time_limit")]
    pub start_time_limit: f32,
    /// Total duration of the cosmetic battle fade. Zero flips states
    /// immediately.
    #[serde(default = "FlowConfig::default_transition_fade")]
    pub transition_fade: f32,
}

impl FlowConfig {
    const fn default_start_time_limit() -> f32 {
        30.0
    }

    const fn default_transition_fade() -> f32 {
        0.22
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            start_time_limit: Self::default_start_time_limit(),
            transition_fade: Self::default_transition_fade(),
        }
    }
}

/// A state flip deferred behind the fade; commits at the fade midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingFlip {
    target: GameState,
    elapsed: f32,
    commit_at: f32,
}

/// Finite state machine over [`GameState`] plus the countdown timer.
///
/// Identical-state requests are silent no-ops. While a deferred flip is
/// pending, no other transition request is honored until it commits; the
/// countdown expiry is the one interrupt that overrides a pending flip.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFlow {
    cfg: FlowConfig,
    current_state: GameState,
    time_left: f32,
    timer_active: bool,
    pending: Option<PendingFlip>,
}

impl GameFlow {
    #[must_use]
    pub fn new(cfg: FlowConfig) -> Self {
        Self {
            current_state: GameState::Intro,
            time_left: cfg.start_time_limit,
            timer_active: false,
            pending: None,
            cfg,
        }
    }

    #[must_use]
    pub const fn current_state(&self) -> GameState {
        self.current_state
    }

    #[must_use]
    pub const fn time_left(&self) -> f32 {
        self.time_left
    }

    #[must_use]
    pub const fn timer_active(&self) -> bool {
        self.timer_active
    }

    /// Whether a deferred flip is waiting on the fade.
    #[must_use]
    pub const fn transition_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Reset the countdown and begin the run.
    pub fn start_game(&mut self, events: &mut EventQueue) {
        self.time_left = self.cfg.start_time_limit;
        self.request(GameState::Running, events);
    }

    /// Transition into battle, behind the fade when one is configured.
    pub fn enter_battle(&mut self, events: &mut EventQueue) {
        self.request_faded(GameState::Battle, events);
    }

    /// Transition back to the field, behind the fade when one is configured.
    pub fn resume_running(&mut self, events: &mut EventQueue) {
        self.request_faded(GameState::Running, events);
    }

    pub fn enter_boss_cutscene(&mut self, events: &mut EventQueue) {
        self.request(GameState::BossCutscene, events);
    }

    pub fn end_game_clear(&mut self, events: &mut EventQueue) {
        self.request(GameState::Clear, events);
    }

    pub fn trigger_game_over(&mut self, events: &mut EventQueue) {
        self.request(GameState::GameOver, events);
    }

    /// Reset the countdown without changing state; re-arms ticking
    /// according to the current state.
    pub fn reset_timer(&mut self, events: &mut EventQueue) {
        self.time_left = self.cfg.start_time_limit;
        events.push(GameEvent::TimeUpdated {
            time_left: self.time_left,
        });
        self.timer_active = self.current_state.timer_runs();
    }

    /// Advance the fade and the countdown by `dt` seconds.
    pub fn tick(&mut self, dt: f32, events: &mut EventQueue) {
        if let Some(flip) = self.pending.as_mut() {
            flip.elapsed += dt;
            if flip.elapsed >= flip.commit_at {
                let target = flip.target;
                self.pending = None;
                self.commit(target, events);
            }
        }

        if !self.timer_active || self.time_left <= 0.0 {
            return;
        }

        self.time_left -= dt;
        if self.time_left < 0.0 {
            self.time_left = 0.0;
        }
        events.push(GameEvent::TimeUpdated {
            time_left: self.time_left,
        });

        if self.time_left <= 0.0 {
            self.timer_active = false;
            events.push(GameEvent::TimeExpired);
            // Expiry overrides any fade still in flight.
            self.pending = None;
            self.commit(GameState::BossCutscene, events);
        }
    }

    fn request(&mut self, target: GameState, events: &mut EventQueue) {
        if self.current_state == target {
            return;
        }
        if self.pending.is_some() {
            log::debug!("flow: transition to {target:?} ignored, flip pending");
            return;
        }
        self.commit(target, events);
    }

    fn request_faded(&mut self, target: GameState, events: &mut EventQueue) {
        if self.current_state == target {
            return;
        }
        if self.pending.is_some() {
            log::debug!("flow: transition to {target:?} ignored, flip pending");
            return;
        }
        if self.cfg.transition_fade <= 0.0 {
            self.commit(target, events);
            return;
        }
        self.pending = Some(PendingFlip {
            target,
            elapsed: 0.0,
            commit_at: self.cfg.transition_fade * FADE_COMMIT_RATIO,
        });
    }

    fn commit(&mut self, next: GameState, events: &mut EventQueue) {
        if self.current_state == next {
            return;
        }
        let previous = self.current_state;
        self.current_state = next;

        self.timer_active = next.timer_runs();
        if !self.timer_active {
            events.push(GameEvent::TimeUpdated {
                time_left: self.time_left,
            });
        }

        events.push(GameEvent::StateChanged { previous, next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    fn instant_flow() -> GameFlow {
        GameFlow::new(FlowConfig {
            transition_fade: 0.0,
            ..FlowConfig::default()
        })
    }

    fn state_changes(events: &EventQueue) -> Vec<(GameState, GameState)> {
        events
            .iter()
            .filter_map(|event| match event {
                GameEvent::StateChanged { previous, next } => Some((*previous, *next)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_game_arms_timer_and_announces_transition() {
        let mut flow = instant_flow();
        let mut events = EventQueue::new();
        flow.start_game(&mut events);
        assert_eq!(flow.current_state(), GameState::Running);
        assert!(flow.timer_active());
        assert_eq!(
            state_changes(&events),
            vec![(GameState::Intro, GameState::Running)]
        );
    }

    #[test]
    fn same_state_request_is_a_silent_no_op() {
        let mut flow = instant_flow();
        let mut events = EventQueue::new();
        flow.start_game(&mut events);
        events.clear();

        flow.resume_running(&mut events);
        assert!(events.is_empty());
        assert!(flow.timer_active());
    }

    #[test]
    fn zero_fade_flips_synchronously() {
        let mut flow = instant_flow();
        let mut events = EventQueue::new();
        flow.start_game(&mut events);
        events.clear();

        flow.enter_battle(&mut events);
        assert_eq!(flow.current_state(), GameState::Battle);
        assert_eq!(
            state_changes(&events),
            vec![(GameState::Running, GameState::Battle)]
        );
    }

    #[test]
    fn faded_flip_commits_on_a_later_tick_and_blocks_other_requests() {
        let mut flow = GameFlow::new(FlowConfig::default());
        let mut events = EventQueue::new();
        flow.start_game(&mut events);
        events.clear();

        flow.enter_battle(&mut events);
        assert_eq!(flow.current_state(), GameState::Running);
        assert!(flow.transition_pending());
        assert!(events.is_empty());

        // Requests while the flip is in flight are not honored.
        flow.trigger_game_over(&mut events);
        assert_eq!(flow.current_state(), GameState::Running);
        assert!(events.is_empty());

        flow.tick(0.05, &mut events);
        assert_eq!(flow.current_state(), GameState::Running);
        flow.tick(0.10, &mut events);
        assert_eq!(flow.current_state(), GameState::Battle);
        assert!(!flow.transition_pending());
        assert_eq!(
            state_changes(&events),
            vec![(GameState::Running, GameState::Battle)]
        );
    }

    #[test]
    fn countdown_clamps_at_zero_with_one_expiry() {
        let mut flow = GameFlow::new(FlowConfig {
            start_time_limit: 1.0,
            transition_fade: 0.0,
        });
        let mut events = EventQueue::new();
        flow.start_game(&mut events);
        events.clear();

        for _ in 0..9 {
            flow.tick(0.1, &mut events);
        }
        assert!(flow.time_left() > 0.0);
        flow.tick(0.5, &mut events);
        assert!(flow.time_left().abs() < FLOAT_EPSILON);
        assert_eq!(flow.current_state(), GameState::BossCutscene);

        let expiries = events
            .iter()
            .filter(|event| matches!(event, GameEvent::TimeExpired))
            .count();
        assert_eq!(expiries, 1);

        // Further ticks keep the timer frozen at zero.
        events.clear();
        flow.tick(1.0, &mut events);
        assert!(events.is_empty());
        assert!(flow.time_left() >= 0.0);
    }

    #[test]
    fn expiry_overrides_a_pending_flip() {
        let mut flow = GameFlow::new(FlowConfig {
            start_time_limit: 0.05,
            transition_fade: 10.0,
        });
        let mut events = EventQueue::new();
        flow.start_game(&mut events);
        events.clear();

        flow.enter_battle(&mut events);
        assert!(flow.transition_pending());
        flow.tick(0.1, &mut events);
        assert_eq!(flow.current_state(), GameState::BossCutscene);
        assert!(!flow.transition_pending());
    }

    #[test]
    fn timer_only_ticks_in_running_or_battle() {
        let mut flow = instant_flow();
        let mut events = EventQueue::new();
        flow.start_game(&mut events);
        flow.enter_boss_cutscene(&mut events);
        events.clear();

        let before = flow.time_left();
        flow.tick(5.0, &mut events);
        assert!((flow.time_left() - before).abs() < FLOAT_EPSILON);
        assert!(events.is_empty());
    }

    #[test]
    fn reset_timer_keeps_state_and_rearms_per_state() {
        let mut flow = instant_flow();
        let mut events = EventQueue::new();
        flow.start_game(&mut events);
        flow.tick(4.0, &mut events);
        events.clear();

        flow.reset_timer(&mut events);
        assert!((flow.time_left() - 30.0).abs() < FLOAT_EPSILON);
        assert_eq!(flow.current_state(), GameState::Running);
        assert!(flow.timer_active());
        assert_eq!(state_changes(&events), vec![]);

        flow.trigger_game_over(&mut events);
        flow.reset_timer(&mut events);
        assert!(!flow.timer_active());
    }
}
