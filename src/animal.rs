// --- File: animal.rs ---
use crate::clock::Ticker;
use crate::config::{CrocodileConfig, MapConfig, RabbitConfig};
use crate::constants::MINUTE_MS;
use crate::plant::BoostWindow;
use crate::resources::{Resource, ResourceLedger};
use crate::season::Season;
use crate::utils::{SimRng, heading_vector, inner_bounds, place_with_retry};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::{PI, TAU};

fn uniform(rng: &mut SimRng, lo: f32, hi: f32) -> f32 {
    if lo < hi { rng.gen_range(lo..=hi) } else { lo }
}

/// Parameters every animal species shares, read through one interface so the
/// movement and life-cycle code is written once.
pub trait SpeciesConfig {
    fn initial_num(&self) -> usize;
    fn half_size(&self) -> Vec2;
    fn min_distance(&self) -> f32;
    fn ave_speed(&self) -> f32;
    fn range_speed(&self) -> f32;
    fn speed_change_rate(&self) -> f32;
    fn angle_change_rate(&self) -> f32;
    fn boost_rate(&self) -> f32;
    fn reproduction_threshold(&self, season: Season) -> u32;
    fn reproduction_resource(&self) -> u64;
    fn clears_energy_on_reproduction(&self) -> bool {
        false
    }
    /// Build a fresh individual of this species at `position`.
    fn spawn(&self, position: Vec2, now: f64, rng: &mut SimRng) -> Animal;
}

impl SpeciesConfig for RabbitConfig {
    fn initial_num(&self) -> usize {
        self.initial_num
    }
    fn half_size(&self) -> Vec2 {
        Vec2::from(self.half_size)
    }
    fn min_distance(&self) -> f32 {
        self.min_distance
    }
    fn ave_speed(&self) -> f32 {
        self.ave_speed
    }
    fn range_speed(&self) -> f32 {
        self.range_speed
    }
    fn speed_change_rate(&self) -> f32 {
        self.speed_change_rate
    }
    fn angle_change_rate(&self) -> f32 {
        self.angle_change_rate
    }
    fn boost_rate(&self) -> f32 {
        self.boost_rate
    }
    fn reproduction_threshold(&self, season: Season) -> u32 {
        self.reproduction_threshold.get(season)
    }
    fn reproduction_resource(&self) -> u64 {
        self.reproduction_resource
    }
    fn clears_energy_on_reproduction(&self) -> bool {
        self.clear_energy_on_reproduction
    }
    fn spawn(&self, position: Vec2, now: f64, rng: &mut SimRng) -> Animal {
        let kind = AnimalKind::Herbivore(HerbivoreState::default());
        Animal::new(position, self, self.ave_age, self.range_age, kind, now, rng)
    }
}

impl SpeciesConfig for CrocodileConfig {
    fn initial_num(&self) -> usize {
        self.initial_num
    }
    fn half_size(&self) -> Vec2 {
        Vec2::from(self.half_size)
    }
    fn min_distance(&self) -> f32 {
        self.min_distance
    }
    fn ave_speed(&self) -> f32 {
        self.ave_speed
    }
    fn range_speed(&self) -> f32 {
        self.range_speed
    }
    fn speed_change_rate(&self) -> f32 {
        self.speed_change_rate
    }
    fn angle_change_rate(&self) -> f32 {
        self.angle_change_rate
    }
    fn boost_rate(&self) -> f32 {
        self.boost_rate
    }
    fn reproduction_threshold(&self, season: Season) -> u32 {
        self.reproduction_threshold.get(season)
    }
    fn reproduction_resource(&self) -> u64 {
        self.reproduction_resource
    }
    fn spawn(&self, position: Vec2, now: f64, rng: &mut SimRng) -> Animal {
        let [lo, hi] = self.edge_margin_range;
        let edge_margin = if lo < hi { rng.gen_range(lo..hi) } else { lo };
        let kind = AnimalKind::Predator(PredatorState::new(edge_margin));
        Animal::new(position, self, self.ave_age, self.range_age, kind, now, rng)
    }
}

// --- Core Data Structures ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HerbivoreState {
    pub energy: u32,
    infected: bool,
    immune: bool,
}

impl HerbivoreState {
    /// Infect unless already immune. Infection grants permanent immunity.
    pub fn infect(&mut self) -> bool {
        if self.immune {
            return false;
        }
        self.infected = true;
        self.immune = true;
        true
    }

    /// Clears the infection; immunity stays.
    pub fn cure(&mut self) {
        self.infected = false;
    }

    pub fn is_infected(&self) -> bool {
        self.infected
    }

    pub fn is_immune(&self) -> bool {
        self.immune
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HuntMode {
    Hunting,
    Resting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredatorState {
    pub mode: HuntMode,
    /// Prey eaten since the last rest.
    pub kills: u32,
    pub total_kills: u32,
    pub rest_time: f32,
    pub edge_margin: f32,
}

impl PredatorState {
    pub fn new(edge_margin: f32) -> Self {
        Self {
            mode: HuntMode::Hunting,
            kills: 0,
            total_kills: 0,
            rest_time: 0.0,
            edge_margin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimalKind {
    Herbivore(HerbivoreState),
    Predator(PredatorState),
}

#[derive(Debug, Clone)]
pub struct Animal {
    pub position: Vec2,
    pub half_size: Vec2,
    pub heading: f32,
    /// Clamped speed before time, season and boost multipliers.
    pub speed: f32,
    /// Distance covered this step once all multipliers are applied.
    pub effective_speed: f32,
    pub age: f32,
    pub death_age: f32,
    pub eaten: u32,
    pub boost: BoostWindow,
    pub kind: AnimalKind,
    // Cached from the species config at construction; resynced when it changes.
    ave_speed: f32,
    range_speed: f32,
    ticker: Ticker,
}

/// Per-step inputs shared by every animal.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub now: f64,
    pub time_multiplier: f32,
    pub paused: bool,
    pub season_multiplier: f32,
    pub map: &'a MapConfig,
}

impl Animal {
    pub fn new(
        position: Vec2,
        species: &impl SpeciesConfig,
        ave_age: f32,
        range_age: f32,
        kind: AnimalKind,
        now: f64,
        rng: &mut SimRng,
    ) -> Self {
        let ave_speed = species.ave_speed();
        let range_speed = species.range_speed();
        let speed = uniform(rng, ave_speed - range_speed, ave_speed + range_speed);
        let death_age = MINUTE_MS * uniform(rng, ave_age - range_age, ave_age + range_age);
        Self {
            position,
            half_size: species.half_size(),
            heading: rng.gen_range(0.0..TAU),
            speed,
            effective_speed: 0.0,
            age: 0.0,
            death_age,
            eaten: 0,
            boost: BoostWindow::default(),
            kind,
            ave_speed,
            range_speed,
            ticker: Ticker::new(now),
        }
    }

    pub fn min_speed(&self) -> f32 {
        self.ave_speed - self.range_speed
    }

    pub fn max_speed(&self) -> f32 {
        self.ave_speed + self.range_speed
    }

    pub fn is_herbivore(&self) -> bool {
        matches!(self.kind, AnimalKind::Herbivore(_))
    }

    pub fn herbivore(&self) -> Option<&HerbivoreState> {
        match &self.kind {
            AnimalKind::Herbivore(state) => Some(state),
            AnimalKind::Predator(_) => None,
        }
    }

    pub fn herbivore_mut(&mut self) -> Option<&mut HerbivoreState> {
        match &mut self.kind {
            AnimalKind::Herbivore(state) => Some(state),
            AnimalKind::Predator(_) => None,
        }
    }

    pub fn predator(&self) -> Option<&PredatorState> {
        match &self.kind {
            AnimalKind::Predator(state) => Some(state),
            AnimalKind::Herbivore(_) => None,
        }
    }

    pub fn is_infected(&self) -> bool {
        self.herbivore().is_some_and(HerbivoreState::is_infected)
    }

    pub fn is_too_old(&self) -> bool {
        self.age >= self.death_age
    }

    /// Shared first half of a step: age, jitter, clamp, multipliers and boost.
    ///
    /// `envelope_shift` moves both speed bounds (herbivore energy bonus minus
    /// infection penalty). `species_boosting` is the species-wide boost flag;
    /// whichever individual's countdown lapses first switches it off for all.
    /// Returns the simulation delta, or `None` while paused.
    pub fn begin_step(
        &mut self,
        ctx: &StepContext,
        species: &impl SpeciesConfig,
        envelope_shift: f32,
        species_boosting: &mut bool,
        rng: &mut SimRng,
    ) -> Option<f32> {
        let delta = self.ticker.sample(ctx.now, ctx.time_multiplier, ctx.paused);
        if ctx.paused {
            return None;
        }

        if self.ave_speed != species.ave_speed() || self.range_speed != species.range_speed() {
            self.ave_speed = species.ave_speed();
            self.range_speed = species.range_speed();
            self.speed = uniform(rng, self.min_speed(), self.max_speed());
        }

        self.age += delta;

        let speed_jitter = species.speed_change_rate();
        if speed_jitter > 0.0 {
            self.speed += rng.gen_range(-speed_jitter..=speed_jitter);
        }
        let angle_jitter = species.angle_change_rate();
        if angle_jitter > 0.0 {
            self.heading += rng.gen_range(-angle_jitter..=angle_jitter);
        }
        let low = self.min_speed() + envelope_shift;
        let high = (self.max_speed() + envelope_shift).max(low);
        self.speed = self.speed.clamp(low, high);

        self.effective_speed = self.speed * ctx.time_multiplier * ctx.season_multiplier;
        if self.boost.tick(species_boosting, delta) {
            self.effective_speed *= species.boost_rate();
        }
        Some(delta)
    }

    /// Shared second half of a step: bounce off edges, move, clamp inside the map.
    pub fn finish_step(&mut self, map: &MapConfig) {
        let (min, max) = inner_bounds(map, self.half_size);
        let next = self.position + heading_vector(self.heading) * self.effective_speed;
        if next.x < min.x || next.x > max.x {
            self.heading = PI - self.heading;
        }
        if next.y < min.y || next.y > max.y {
            self.heading = -self.heading;
        }
        self.heading = self.heading.rem_euclid(TAU);
        self.position += heading_vector(self.heading) * self.effective_speed;
        self.position = self.position.clamp(min, max);
    }

    /// Skip a step without moving, keeping the sample clock current.
    pub fn refresh_clock(&mut self, now: f64) {
        self.ticker.elapsed(now);
    }
}

/// One species' pool. Membership means alive; removal is the only death.
#[derive(Debug, Clone, Default)]
pub struct AnimalPopulation {
    animals: Vec<Animal>,
}

impl AnimalPopulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial seeding: spacing is checked against the species' own members only.
    pub fn seed(species: &impl SpeciesConfig, map: &MapConfig, now: f64, rng: &mut SimRng) -> Self {
        let mut population = Self::new();
        for _ in 0..species.initial_num() {
            let spot = place_with_retry(
                rng,
                map,
                species.half_size(),
                species.min_distance(),
                population.positions(),
            );
            if let Some(position) = spot {
                population.animals.push(species.spawn(position, now, rng));
            }
        }
        population
    }

    pub fn push(&mut self, animal: Animal) {
        self.animals.push(animal);
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Animal> {
        self.animals.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Animal> {
        self.animals.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Animal> {
        self.animals.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Animal> {
        self.animals.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Animal] {
        &mut self.animals
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + Clone + '_ {
        self.animals.iter().map(|a| a.position)
    }

    /// Grant every current member a boost countdown and raise the species flag.
    pub fn activate_boost(&mut self, species_boosting: &mut bool, duration: f32) {
        *species_boosting = true;
        for animal in &mut self.animals {
            animal.boost.extend(duration);
        }
    }

    /// Reproduction pass. An animal that has eaten its seasonal threshold pays
    /// the threshold (surplus carries over) and tries to place one offspring at
    /// least `min_distance` from every animal in `occupied` and every newborn.
    /// Returns the number of offspring placed.
    #[allow(clippy::too_many_arguments)]
    pub fn reproduce(
        &mut self,
        species: &impl SpeciesConfig,
        season: Season,
        occupied: &[Vec2],
        map: &MapConfig,
        now: f64,
        ledger: &mut ResourceLedger,
        rng: &mut SimRng,
    ) -> usize {
        let threshold = species.reproduction_threshold(season);
        debug_assert!(threshold > 0, "reproduction threshold must be positive");
        let threshold = threshold.max(1);

        let mut newborns: Vec<Animal> = Vec::new();
        for parent in &mut self.animals {
            if parent.eaten < threshold {
                continue;
            }
            parent.eaten -= threshold;
            if species.clears_energy_on_reproduction() {
                if let Some(state) = parent.herbivore_mut() {
                    state.energy = 0;
                }
            }

            let taken = occupied
                .iter()
                .copied()
                .chain(newborns.iter().map(|a| a.position));
            let spot = place_with_retry(rng, map, species.half_size(), species.min_distance(), taken);
            if let Some(position) = spot {
                newborns.push(species.spawn(position, now, rng));
                ledger.gain(Resource::Animite, species.reproduction_resource());
            }
        }

        let born = newborns.len();
        if born > 0 {
            log::debug!("{} offspring born", born);
        }
        self.animals.extend(newborns);
        born
    }

    /// Remove the animals at `indices` (any order, duplicates allowed).
    pub fn remove_indices(&mut self, indices: &mut Vec<usize>) {
        // Descending order keeps swap_remove from disturbing pending indices.
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        for &index in indices.iter() {
            if index < self.animals.len() {
                self.animals.swap_remove(index);
            } else {
                log::warn!(
                    "Attempted swap_remove with invalid index {} (current len {})",
                    index,
                    self.animals.len()
                );
            }
        }
        indices.clear();
    }

    /// Purge every animal past its death age. Returns how many died.
    pub fn remove_old(&mut self) -> usize {
        let before = self.animals.len();
        self.animals.retain(|a| !a.is_too_old());
        before - self.animals.len()
    }
}

// --- End of File: animal.rs ---
