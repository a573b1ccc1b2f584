/// Fade-out effect
///
/// Linear ramps to silence, advanced by the controller's tick. A ramp is
/// keyed by handle, so scheduling a second ramp for the same handle
/// replaces the first.
use std::collections::BTreeMap;
use std::time::Duration;

use crate::audio_system::handle::HandleId;

/// One linear ramp from `start` to zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeEffect {
    duration: Duration,
    elapsed: Duration,
    start: f32,
}

impl FadeEffect {
    /// Create a ramp that starts at `start` (a volume fraction, 0.0-1.0)
    pub fn new(duration: Duration, start: f32) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            start: start.clamp(0.0, 1.0),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Fraction of the ramp already covered (0.0-1.0)
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Current level of the ramp
    pub fn level(&self) -> f32 {
        self.start * (1.0 - self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Move the ramp forward and return the new level
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.level()
    }
}

/// Result of advancing every scheduled fade by one tick
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FadeStep {
    /// Handles still ramping, with their new level
    pub updated: Vec<(HandleId, f32)>,

    /// Handles whose ramp reached zero during this tick
    pub finished: Vec<HandleId>,
}

/// Pending fades keyed by handle
#[derive(Debug, Default)]
pub struct FadeScheduler {
    fades: BTreeMap<HandleId, FadeEffect>,
}

impl FadeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fade for `id`, cancelling any fade already running for it.
    /// Returns true if a previous fade was replaced.
    pub fn schedule(&mut self, id: HandleId, duration: Duration, start: f32) -> bool {
        self.fades.insert(id, FadeEffect::new(duration, start)).is_some()
    }

    /// Drop the fade for `id`; returns true if one was running
    pub fn cancel(&mut self, id: HandleId) -> bool {
        self.fades.remove(&id).is_some()
    }

    pub fn get(&self, id: HandleId) -> Option<&FadeEffect> {
        self.fades.get(&id)
    }

    pub fn is_fading(&self, id: HandleId) -> bool {
        self.fades.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.fades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fades.is_empty()
    }

    /// Advance every fade by `dt`. Finished fades are removed.
    pub fn advance(&mut self, dt: Duration) -> FadeStep {
        let mut step = FadeStep::default();

        for (id, fade) in self.fades.iter_mut() {
            let level = fade.advance(dt);
            if fade.is_finished() {
                step.finished.push(*id);
            } else {
                step.updated.push((*id, level));
            }
        }

        for id in &step.finished {
            self.fades.remove(id);
        }

        step
    }
}
