// --- File: season.rs ---
use crate::clock::Ticker;
use crate::config::{MapConfig, SeasonConfig};
use crate::constants::*;
use crate::utils::{SimRng, lerp_color};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const CYCLE: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn from_index(index: usize) -> Season {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }

    pub fn next(self) -> Season {
        Self::from_index(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }

    pub fn color(self) -> [f32; 3] {
        SEASON_COLORS[self.index()].map(f32::from)
    }
}

/// Truncated exponential over `[min, max]` ms, sampled by inverse CDF and
/// rounded to whole seconds. Short showers dominate; long ones stay possible.
#[derive(Debug, Clone, Copy)]
pub struct RainDistribution {
    min: f32,
    lambda: f64,
    cdf_min: f64,
    cdf_max: f64,
}

impl RainDistribution {
    pub fn new(min: f32, max: f32) -> Self {
        let desired_mean = f64::from(max - min) / 4.0;
        let lambda = 1.0 / desired_mean;
        let cdf = |x: f64| 1.0 - (-lambda * (x - f64::from(min))).exp();
        Self {
            min,
            lambda,
            cdf_min: cdf(f64::from(min)),
            cdf_max: cdf(f64::from(max)),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let u: f64 = rng.gen_range(0.0..1.0);
        let u_scaled = u * (self.cdf_max - self.cdf_min) + self.cdf_min;
        let duration = f64::from(self.min) - (1.0 - u_scaled).ln() / self.lambda;
        ((duration / 1000.0).round() * 1000.0) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raindrop {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

/// Season cycle plus the independent dry/raining weather machine.
#[derive(Debug, Clone)]
pub struct SeasonController {
    current: Season,
    color: [f32; 3],
    target_color: [f32; 3],
    active_time: f32,
    ticker: Ticker,

    rain: RainDistribution,
    is_raining: bool,
    rain_check_timer: f32,
    rain_check_interval: f32,
    rain_duration_timer: f32,
    rain_duration: f32,
    raindrops: Vec<Raindrop>,
}

impl SeasonController {
    pub fn new(now: f64, rng: &mut SimRng) -> Self {
        let rain = RainDistribution::new(RAIN_MIN_DURATION_MS, RAIN_MAX_DURATION_MS);
        let current = Season::Spring;
        Self {
            current,
            color: current.color(),
            target_color: current.color(),
            active_time: 0.0,
            ticker: Ticker::new(now),
            rain,
            is_raining: false,
            rain_check_timer: 0.0,
            rain_check_interval: RAIN_CHECK_INTERVAL_MS,
            rain_duration_timer: 0.0,
            rain_duration: rain.sample(rng),
            raindrops: Vec::new(),
        }
    }

    pub fn update(
        &mut self,
        now: f64,
        speed: f32,
        paused: bool,
        config: &SeasonConfig,
        map: &MapConfig,
        rng: &mut SimRng,
    ) {
        let raw = self.ticker.elapsed(now);

        // Visuals keep moving while paused.
        self.color = lerp_color(self.color, self.target_color, COLOR_BLEND_RATE);
        if self.is_raining {
            self.update_raindrops(map, rng);
        }

        if paused {
            return;
        }
        let delta = raw * speed;
        self.active_time += delta;

        if self.active_time >= config.switch_interval {
            self.active_time = 0.0;
            self.current = self.current.next();
            self.target_color = self.current.color();
            log::info!("Season changed to {}", self.current.name());
        }

        if !self.is_raining {
            self.rain_check_timer += delta;
            if self.rain_check_timer > self.rain_check_interval {
                self.rain_check_timer = 0.0;
                if rng.gen_bool(config.rain_probability.clamp(0.0, 1.0)) {
                    self.start_rain(map, rng);
                }
            }
        } else {
            self.rain_duration_timer += delta;
            if self.rain_duration_timer > self.rain_duration {
                self.stop_rain();
            }
        }
    }

    pub fn start_rain(&mut self, map: &MapConfig, rng: &mut SimRng) {
        self.is_raining = true;
        self.rain_duration_timer = 0.0;
        self.rain_duration = self.rain.sample(rng);
        self.raindrops = (0..RAINDROP_COUNT)
            .map(|_| Raindrop {
                x: rng.gen_range(0.0..=map.width),
                y: rng.gen_range(-200.0..=0.0),
                speed: rng.gen_range(5..=12) as f32,
            })
            .collect();
        log::info!("Rain started for {:.0}s", self.rain_duration / 1000.0);
    }

    pub fn stop_rain(&mut self) {
        self.is_raining = false;
        self.raindrops.clear();
        log::info!("Rain stopped");
    }

    fn update_raindrops(&mut self, map: &MapConfig, rng: &mut SimRng) {
        let floor = map.height - RAINDROP_FLOOR_MARGIN;
        for drop in &mut self.raindrops {
            drop.y += drop.speed;
            if drop.y > floor {
                drop.y = rng.gen_range(-100.0..=0.0);
                drop.x = rng.gen_range(0.0..=map.width);
            }
        }
    }

    /// Jump straight to `season`, restarting its timer.
    pub fn change_to(&mut self, season: Season) {
        self.current = season;
        self.target_color = season.color();
        self.active_time = 0.0;
    }

    /// Push the next season switch back by `ms` of simulation time.
    pub fn extend_current(&mut self, ms: f32) {
        self.active_time -= ms;
    }

    pub fn current(&self) -> Season {
        self.current
    }

    pub fn index(&self) -> usize {
        self.current.index()
    }

    pub fn speed_multiplier(&self, config: &SeasonConfig) -> f32 {
        config.speed_multipliers.get(self.current)
    }

    pub fn growth_multiplier(&self, config: &SeasonConfig) -> f32 {
        config.interval_multipliers.get(self.current)
    }

    pub fn is_raining(&self) -> bool {
        self.is_raining
    }

    pub fn rain_duration(&self) -> f32 {
        self.rain_duration
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn raindrops(&self) -> &[Raindrop] {
        &self.raindrops
    }
}

// --- End of File: season.rs ---
