use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of frame durations for instrumentation.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: VecDeque<Duration>,
    capacity: usize,
    total: Duration,
}

impl FrameTimer {
    /// Keep the last `capacity` frames. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            total: Duration::ZERO,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.window.len() == self.capacity {
            if let Some(old) = self.window.pop_front() {
                self.total -= old;
            }
        }
        self.window.push_back(dt);
        self.total += dt;
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn average(&self) -> Duration {
        match self.window.len() {
            0 => Duration::ZERO,
            n => self.total / n as u32,
        }
    }

    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.window.iter().copied().min().unwrap_or(Duration::ZERO)
    }

    /// Frames per second over the window; zero before any frame is recorded.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}
