/// Generation pacing across ticks.
///
/// When a tick hits the per-tick build cap the remaining work is deferred:
/// the schedule waits `cooldown_ticks` ticks before the next batch. After
/// `max_pending_batches` consecutive deferred batches the cooldown is skipped
/// so a long burst always finishes in bounded time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSchedule {
    cooldown_remaining: u32,
    pending_batches: u32,
    cancelled: bool,
}

impl GenerationSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per tick; true when generation may run this tick
    pub fn ready(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
            return false;
        }
        true
    }

    /// The tick stopped at the build cap with work left over
    pub fn defer(&mut self, cooldown_ticks: u32, max_pending_batches: u32) {
        self.pending_batches += 1;
        if self.pending_batches >= max_pending_batches {
            log::warn!(
                "[GenerationSchedule] {} deferred batches, skipping cooldown",
                self.pending_batches
            );
            self.cooldown_remaining = 0;
        } else {
            self.cooldown_remaining = cooldown_ticks;
        }
    }

    /// Generation caught up with the window
    pub fn complete(&mut self) {
        self.pending_batches = 0;
        self.cooldown_remaining = 0;
    }

    /// Stop all future generation
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.pending_batches = 0;
        self.cooldown_remaining = 0;
    }

    pub fn is_pending(&self) -> bool {
        self.pending_batches > 0
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn pending_batches(&self) -> u32 {
        self.pending_batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_skips_ticks() {
        let mut schedule = GenerationSchedule::new();
        assert!(schedule.ready());
        schedule.defer(2, 64);
        assert!(schedule.is_pending());
        assert!(!schedule.ready());
        assert!(!schedule.ready());
        assert!(schedule.ready());
        schedule.complete();
        assert!(!schedule.is_pending());
    }

    #[test]
    fn test_pending_batches_are_bounded() {
        let mut schedule = GenerationSchedule::new();
        schedule.defer(5, 2);
        assert!(!schedule.ready());
        schedule.complete();
        schedule.defer(5, 2);
        schedule.defer(5, 2);
        assert!(schedule.ready());
    }

    #[test]
    fn test_cancel_is_permanent() {
        let mut schedule = GenerationSchedule::new();
        schedule.defer(3, 64);
        schedule.cancel();
        assert!(!schedule.ready());
        assert!(!schedule.is_pending());
        schedule.complete();
        assert!(!schedule.ready());
    }
}
