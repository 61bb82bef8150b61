//! Frame sources for the pacing queue.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Source of render ticks. The pacing queue emits one character per tick.
#[async_trait]
pub trait FrameScheduler: Send + Sync {
    /// Resolve at the next frame.
    async fn next_frame(&self);
}

/// Fixed-rate ticks approximating a display's repaint callback.
///
/// Late ticks are not bunched up: if the consumer falls behind, the next tick is a full
/// period after the late one.
pub struct IntervalFrames {
    period: Duration,
    interval: Mutex<Option<Interval>>,
}

impl IntervalFrames {
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(16);

    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for IntervalFrames {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

#[async_trait]
impl FrameScheduler for IntervalFrames {
    async fn next_frame(&self) {
        let mut slot = self.interval.lock().await;
        // Created lazily so the scheduler can be built outside a runtime.
        let interval = slot.get_or_insert_with(|| {
            let mut i = interval_at(Instant::now() + self.period, self.period);
            i.set_missed_tick_behavior(MissedTickBehavior::Delay);
            i
        });
        interval.tick().await;
    }
}

/// Ticks as fast as the runtime allows. For consumers with no display, such as pipes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateFrames;

#[async_trait]
impl FrameScheduler for ImmediateFrames {
    async fn next_frame(&self) {
        tokio::task::yield_now().await;
    }
}
