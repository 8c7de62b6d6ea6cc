// --- File: disaster.rs ---
use crate::animal::AnimalPopulation;
use crate::clock::Ticker;
use crate::config::PlantConfig;
use crate::constants::*;
use crate::season::{Season, SeasonController};
use crate::utils::SimRng;
use rand::Rng;
use rand::seq::SliceRandom;
use std::f32::consts::PI;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DisasterKind {
    /// Infects one or two uninfected herbivores.
    Plague,
    /// Waits for winter, then lengthens it and makes plants fragile.
    HarshWinter,
}

impl DisasterKind {
    pub const ALL: [DisasterKind; 2] = [DisasterKind::Plague, DisasterKind::HarshWinter];

    pub fn message(self) -> &'static str {
        match self {
            DisasterKind::Plague => "Plague spreads among the rabbits!",
            DisasterKind::HarshWinter => "A harsh winter arrives!",
        }
    }

    /// Whether the effect may fire in the current season.
    pub fn is_ready(self, season: Season) -> bool {
        match self {
            DisasterKind::Plague => true,
            DisasterKind::HarshWinter => season == Season::Winter,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisasterState {
    /// Accumulating time toward the next disaster.
    Idle,
    /// Chosen, waiting for its readiness predicate.
    Pending(DisasterKind),
}

/// On-screen announcement of the last disaster. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisasterNotice {
    pub kind: DisasterKind,
    elapsed: f32,
}

impl DisasterNotice {
    pub const TOTAL_MS: f32 = NOTICE_FLICKER_MS + NOTICE_HOLD_MS + NOTICE_FADE_MS;
    const MAX_BOX_ALPHA: u8 = 180;

    fn new(kind: DisasterKind) -> Self {
        Self { kind, elapsed: 0.0 }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed > Self::TOTAL_MS
    }

    /// Text opacity: flicker, ramp up to opaque, hold, then fade out.
    pub fn alpha(&self) -> u8 {
        let t = self.elapsed;
        let flicker = |t: f32| (t / NOTICE_FLICKER_MS * NOTICE_FLICKER_CYCLES * PI).sin().powi(2) * 255.0;
        let alpha = if t <= NOTICE_FLICKER_MS - 1000.0 {
            flicker(t)
        } else if t <= NOTICE_FLICKER_MS {
            let ramp_start = NOTICE_FLICKER_MS - 500.0;
            let base = flicker(ramp_start);
            let progress = ((t - ramp_start) / 500.0).clamp(0.0, 1.0);
            base + (255.0 - base) * progress
        } else if t <= NOTICE_FLICKER_MS + NOTICE_HOLD_MS {
            255.0
        } else {
            let fade = t - (NOTICE_FLICKER_MS + NOTICE_HOLD_MS);
            255.0 * (1.0 - fade / NOTICE_FADE_MS).max(0.0)
        };
        alpha.clamp(0.0, 255.0) as u8
    }

    /// Opacity of the backing box, capped below fully opaque.
    pub fn box_alpha(&self) -> u8 {
        self.alpha().min(Self::MAX_BOX_ALPHA)
    }
}

/// Everything a disaster effect may touch.
pub struct DisasterTargets<'a> {
    pub season: &'a mut SeasonController,
    pub plant_config: &'a mut PlantConfig,
    pub herbivores: &'a mut AnimalPopulation,
}

#[derive(Debug, Clone)]
pub struct DisasterController {
    state: DisasterState,
    active_time: f32,
    interval: f32,
    ticker: Ticker,
    notice_ticker: Ticker,
    notice: Option<DisasterNotice>,
    fired: u32,
}

impl DisasterController {
    pub fn new(now: f64) -> Self {
        Self {
            state: DisasterState::Idle,
            active_time: 0.0,
            interval: FIRST_DISASTER_INTERVAL_MS,
            ticker: Ticker::new(now),
            notice_ticker: Ticker::new(now),
            notice: None,
            fired: 0,
        }
    }

    /// Advance the controller. Returns the disaster that fired this step, if any.
    pub fn update(
        &mut self,
        now: f64,
        speed: f32,
        paused: bool,
        targets: DisasterTargets<'_>,
        rng: &mut SimRng,
    ) -> Option<DisasterKind> {
        let delta = self.ticker.sample(now, speed, paused);
        self.update_notice(now, speed, paused);
        if paused {
            return None;
        }

        if self.state == DisasterState::Idle {
            self.active_time += delta;
            if self.active_time > self.interval {
                if let Some(&kind) = DisasterKind::ALL.choose(rng) {
                    log::debug!("Disaster chosen: {:?}", kind);
                    self.state = DisasterState::Pending(kind);
                }
            }
        }

        let DisasterState::Pending(kind) = self.state else {
            return None;
        };
        if !kind.is_ready(targets.season.current()) {
            return None;
        }
        self.fire(kind, targets, rng);
        Some(kind)
    }

    fn fire(&mut self, kind: DisasterKind, targets: DisasterTargets<'_>, rng: &mut SimRng) {
        match kind {
            DisasterKind::Plague => {
                let infected = Self::plague(targets.herbivores, rng);
                log::info!("Disaster: plague infected {} rabbits", infected);
            }
            DisasterKind::HarshWinter => {
                targets.season.extend_current(HARSH_WINTER_EXTENSION_MS);
                targets.plant_config.is_fragile = true;
                log::info!("Disaster: harsh winter, plants are fragile");
            }
        }
        self.notice = Some(DisasterNotice::new(kind));
        self.fired += 1;
        self.state = DisasterState::Idle;
        self.active_time = 0.0;
        self.interval = rng.gen_range(MIN_DISASTER_SECS..=MAX_DISASTER_SECS) as f32 * 1000.0;
    }

    /// Infect one or two randomly chosen uninfected herbivores. Returns how many took.
    fn plague(herbivores: &mut AnimalPopulation, rng: &mut SimRng) -> usize {
        let candidates: Vec<usize> = herbivores
            .iter()
            .enumerate()
            .filter(|(_, a)| a.herbivore().is_some_and(|s| !s.is_infected()))
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return 0;
        }
        let amount = rng.gen_range(1..=2).min(candidates.len());
        candidates
            .choose_multiple(rng, amount)
            .filter(|&&i| {
                herbivores
                    .get_mut(i)
                    .and_then(|a| a.herbivore_mut())
                    .is_some_and(|s| s.infect())
            })
            .count()
    }

    fn update_notice(&mut self, now: f64, speed: f32, paused: bool) {
        let delta = self.notice_ticker.sample(now, speed, paused);
        if let Some(notice) = &mut self.notice {
            notice.elapsed += delta;
            if notice.is_expired() {
                self.notice = None;
            }
        }
    }

    pub fn state(&self) -> DisasterState {
        self.state
    }

    pub fn notice(&self) -> Option<&DisasterNotice> {
        self.notice.as_ref()
    }

    /// Milliseconds of unpaused time until the next disaster is chosen.
    pub fn time_until_next(&self) -> f32 {
        (self.interval - self.active_time).max(0.0)
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn fired(&self) -> u32 {
        self.fired
    }
}

// --- End of File: disaster.rs ---
