//! Cleanup and expiry plumbing for `Effect`-tagged components.

use std::time::{Duration, Instant};

use crate::component::Component;

/// Elapsed-time check for effects that expire on their own.
#[derive(Clone, Copy, Debug)]
pub struct EffectTimer {
    started: Instant,
    duration: Duration,
}

impl EffectTimer {
    #[inline]
    pub fn new(duration: Duration) -> Self {
        Self {
            started: Instant::now(),
            duration,
        }
    }

    #[inline]
    pub fn has_elapsed(&self) -> bool {
        self.started.elapsed() >= self.duration
    }
}

/// State embedded by every effect component: a cleanup flag raised by
/// collaborators and an optional expiry timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectState {
    pub cleanup: bool,
    pub timer: Option<EffectTimer>,
}

impl EffectState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// An effect that expires once `duration` has passed.
    #[inline]
    pub fn expiring(duration: Duration) -> Self {
        Self {
            cleanup: false,
            timer: Some(EffectTimer::new(duration)),
        }
    }
}

/// Implemented by `Effect`-tagged components, usually via `#[derive(Effect)]`
/// on a struct with an `effect: EffectState` field.
pub trait Effect: Component {
    fn state(&self) -> &EffectState;
    fn state_mut(&mut self) -> &mut EffectState;
}

pub fn mark_for_cleanup<E: Effect>(effect: &mut E) {
    effect.state_mut().cleanup = true;
}

pub fn is_effect_expired<E: Effect>(effect: &E) -> bool {
    let state = effect.state();
    if state.cleanup {
        return true;
    }
    state.timer.map_or(false, |timer| timer.has_elapsed())
}
