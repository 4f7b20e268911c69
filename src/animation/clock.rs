use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Shareable animation clock.
///
/// Cloning gives another handle to the same clock. Time is sampled lazily and cached until
/// the next [`Clock::clear()`], so everything computed during one frame sees the same time.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    inner: Rc<RefCell<AdjustableClock>>,
}

#[derive(Debug)]
struct AdjustableClock {
    start: Instant,
    /// Time fixed by the caller instead of sampled from the monotonic clock.
    manual: Option<Duration>,
    cached: Option<Duration>,
    complete_instantly: bool,
}

impl Default for AdjustableClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            manual: None,
            cached: None,
            complete_instantly: false,
        }
    }
}

impl Clock {
    /// Creates a clock that only moves when [`Clock::set_unadjusted()`] is called.
    pub fn with_time(time: Duration) -> Self {
        let clock = Self::default();
        clock.set_unadjusted(time);
        clock
    }

    /// Returns the current time.
    pub fn now(&self) -> Duration {
        let mut inner = self.inner.borrow_mut();
        if let Some(time) = inner.manual {
            return time;
        }
        let start = inner.start;
        *inner.cached.get_or_insert_with(|| start.elapsed())
    }

    /// Sets the time, switching the clock to manual mode.
    pub fn set_unadjusted(&self, time: Duration) {
        self.inner.borrow_mut().manual = Some(time);
    }

    /// Moves a manual clock forward.
    pub fn advance(&self, delta: Duration) {
        let now = self.now();
        self.set_unadjusted(now + delta);
    }

    /// Forgets the cached time so that the next [`Clock::now()`] samples it again.
    pub fn clear(&self) {
        self.inner.borrow_mut().cached = None;
    }

    pub fn should_complete_instantly(&self) -> bool {
        self.inner.borrow().complete_instantly
    }

    pub fn set_complete_instantly(&self, value: bool) {
        self.inner.borrow_mut().complete_instantly = value;
    }
}
