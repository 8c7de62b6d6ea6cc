// --- File: clock.rs ---
use crate::constants::{MONTH_TIME_MS, START_MONTH};

/// Per-subsystem sampler that turns the world clock into simulation time.
///
/// Every stateful subsystem owns one. Sampling always moves `last_sample`
/// forward, so a paused stretch never shows up as a jump after resuming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    last_sample: f64,
}

impl Ticker {
    pub fn new(now: f64) -> Self {
        Self { last_sample: now }
    }

    /// Raw elapsed milliseconds since the previous sample, ignoring pause and speed.
    pub fn elapsed(&mut self, now: f64) -> f32 {
        let raw = (now - self.last_sample).max(0.0);
        self.last_sample = now;
        raw as f32
    }

    /// Simulation milliseconds since the previous sample: zero while paused,
    /// otherwise the raw delta scaled by `speed`.
    pub fn sample(&mut self, now: f64, speed: f32, paused: bool) -> f32 {
        let raw = self.elapsed(now);
        if paused { 0.0 } else { raw * speed }
    }

    pub fn last_sample(&self) -> f64 {
        self.last_sample
    }
}

/// Calendar shown to the player plus the active speed multiplier.
#[derive(Debug, Clone)]
pub struct Clock {
    pub years: u32,
    pub months: u32,
    month_time: f32,
    elapsed: f32,
    speed: u32,
    speeds: Vec<u32>,
    ticker: Ticker,
}

impl Clock {
    pub fn new(now: f64, speeds: Vec<u32>) -> Self {
        let speed = speeds.first().copied().unwrap_or(1);
        Self {
            years: 0,
            months: START_MONTH,
            month_time: MONTH_TIME_MS,
            elapsed: 0.0,
            speed,
            speeds,
            ticker: Ticker::new(now),
        }
    }

    pub fn update(&mut self, now: f64, paused: bool) {
        let delta = self.ticker.sample(now, self.speed as f32, paused);
        if paused {
            return;
        }
        self.elapsed += delta;
        if self.elapsed >= self.month_time {
            self.elapsed = 0.0;
            self.months += 1;
            if self.months > 12 {
                self.months = 1;
                self.years += 1;
            }
        }
    }

    /// Step to the next multiplier in the configured list, wrapping around.
    pub fn change_speed(&mut self) -> u32 {
        if self.speeds.is_empty() {
            return self.speed;
        }
        let idx = self
            .speeds
            .iter()
            .position(|&s| s == self.speed)
            .map_or(0, |i| (i + 1) % self.speeds.len());
        self.speed = self.speeds[idx];
        self.speed
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed as f32
    }

    pub fn label(&self) -> String {
        format!("{}y {}m", self.years, self.months)
    }
}

// --- End of File: clock.rs ---
