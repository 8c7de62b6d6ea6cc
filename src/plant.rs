// --- File: plant.rs ---
use crate::animal::Animal;
use crate::clock::Ticker;
use crate::config::{MapConfig, PlantConfig, SeasonConfig};
use crate::constants::{BASE_WITHER_PROBABILITY, PLACEMENT_ATTEMPTS};
use crate::resources::{Resource, ResourceLedger};
use crate::season::{Season, SeasonController};
use crate::utils::{SimRng, place_with_retry};
use glam::Vec2;
use rand::Rng;

/// Countdown half of a time-boxed boost. The on/off flag lives in the species
/// config so collaborators can read it; the remaining time lives here.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoostWindow {
    remaining: f32,
}

impl BoostWindow {
    pub fn extend(&mut self, duration: f32) {
        self.remaining += duration;
    }

    /// Advance by `delta`. Returns whether the boost applies this step; once the
    /// countdown has lapsed the flag is switched off.
    pub fn tick(&mut self, flag: &mut bool, delta: f32) -> bool {
        if *flag && self.remaining > 0.0 {
            self.remaining -= delta;
            true
        } else {
            self.remaining = 0.0;
            *flag = false;
            false
        }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub position: Vec2,
    pub half_size: Vec2,
    /// Cures an infected herbivore that eats it.
    pub medicative: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub eaten: usize,
    pub cured: usize,
    pub withered: usize,
}

/// The plant pool plus the timers the species shares.
#[derive(Debug, Clone)]
pub struct PlantPopulation {
    plants: Vec<Plant>,
    active_time: f32,
    grow_ticker: Ticker,
    remove_ticker: Ticker,
    growth_boost: BoostWindow,
    medicative_window: BoostWindow,
    invincible_window: BoostWindow,
}

impl PlantPopulation {
    pub fn empty(now: f64) -> Self {
        Self {
            plants: Vec::new(),
            active_time: 0.0,
            grow_ticker: Ticker::new(now),
            remove_ticker: Ticker::new(now),
            growth_boost: BoostWindow::default(),
            medicative_window: BoostWindow::default(),
            invincible_window: BoostWindow::default(),
        }
    }

    pub fn seed(config: &PlantConfig, map: &MapConfig, now: f64, rng: &mut SimRng) -> Self {
        let mut population = Self::empty(now);
        for _ in 0..config.initial_num {
            if let Some(plant) = population.place(config, map, rng) {
                population.plants.push(plant);
            }
        }
        population
    }

    fn place(&self, config: &PlantConfig, map: &MapConfig, rng: &mut SimRng) -> Option<Plant> {
        let half_size = Vec2::from(config.half_size);
        let occupied = self.plants.iter().map(|p| p.position);
        place_with_retry(rng, map, half_size, config.min_distance, occupied).map(|position| Plant {
            position,
            half_size,
            medicative: false,
        })
    }

    pub fn push(&mut self, plant: Plant) {
        self.plants.push(plant);
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Plant> {
        self.plants.iter()
    }

    pub fn clear(&mut self) {
        self.plants.clear();
    }

    /// Interval between growth events for the current season and weather.
    pub fn effective_interval(
        config: &PlantConfig,
        season: &SeasonController,
        season_config: &SeasonConfig,
        boosted: bool,
    ) -> f32 {
        let mut interval = config.reproduction_interval * season.growth_multiplier(season_config);
        if season.is_raining() {
            interval *= config.rain_bonus;
        }
        if boosted {
            interval *= config.boost_rate;
        }
        interval
    }

    /// Growth phase. An empty pool never grows again. Returns plants added.
    #[allow(clippy::too_many_arguments)]
    pub fn grow(
        &mut self,
        now: f64,
        speed: f32,
        paused: bool,
        season: &SeasonController,
        season_config: &SeasonConfig,
        config: &mut PlantConfig,
        map: &MapConfig,
        ledger: &mut ResourceLedger,
        rng: &mut SimRng,
    ) -> usize {
        if self.plants.is_empty() {
            return 0;
        }
        let delta = self.grow_ticker.sample(now, speed, paused);
        if paused {
            return 0;
        }
        self.active_time += delta;

        let boosted = self.growth_boost.tick(&mut config.boosting, delta);
        let interval = Self::effective_interval(config, season, season_config, boosted);
        self.medicative_window.tick(&mut config.is_medicative, delta);

        if self.active_time <= interval {
            return 0;
        }
        self.active_time = 0.0;

        let target = if config.double_reproduction && rng.gen_bool(config.double_reproduction_rate) {
            2
        } else {
            1
        };
        let mut grown = 0;
        for _ in 0..target {
            let Some(mut plant) = self.place(config, map, rng) else {
                log::debug!("No room for a new plant after {} attempts", PLACEMENT_ATTEMPTS);
                continue;
            };
            if config.is_medicative && rng.gen_bool(config.medicative_prob) {
                plant.medicative = true;
            }
            self.plants.push(plant);
            ledger.gain(Resource::Leafium, 1);
            grown += 1;
        }
        grown
    }

    /// Predation and winter die-off.
    ///
    /// Herbivores at `excluded` indices were killed earlier this step and no
    /// longer eat.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_near_herbivores(
        &mut self,
        now: f64,
        speed: f32,
        paused: bool,
        season: Season,
        config: &mut PlantConfig,
        herbivores: &mut [Animal],
        excluded: &[usize],
        ledger: &mut ResourceLedger,
        rng: &mut SimRng,
    ) -> RemovalReport {
        let delta = self.remove_ticker.sample(now, speed, paused);
        let mut report = RemovalReport::default();
        if paused {
            return report;
        }
        if season == Season::Spring {
            config.is_fragile = false;
        }
        if self.plants.is_empty() {
            return report;
        }
        if self.invincible_window.tick(&mut config.is_invincible, delta) {
            return report;
        }

        // Scan: pair each plant with the first herbivore close enough to eat it.
        let reach_sq = config.min_animal_distance * config.min_animal_distance;
        let meals: Vec<(usize, usize)> = self
            .plants
            .iter()
            .enumerate()
            .filter_map(|(p, plant)| {
                herbivores
                    .iter()
                    .enumerate()
                    .filter(|(h, animal)| animal.is_herbivore() && !excluded.contains(h))
                    .find(|(_, animal)| animal.position.distance_squared(plant.position) < reach_sq)
                    .map(|(h, _)| (p, h))
            })
            .collect();

        // Apply: credit the eaters, then drop the eaten plants.
        let mut eaten = vec![false; self.plants.len()];
        for &(p, h) in &meals {
            eaten[p] = true;
            let animal = &mut herbivores[h];
            animal.eaten += 1;
            let medicative = self.plants[p].medicative;
            if let Some(state) = animal.herbivore_mut() {
                state.energy += 1;
                if medicative && state.is_infected() {
                    state.cure();
                    ledger.gain(Resource::Ecopoint, 1);
                    report.cured += 1;
                    log::debug!("Herbivore cured by medicative plant");
                }
            }
        }
        let mut index = 0;
        self.plants.retain(|_| {
            let keep = !eaten[index];
            index += 1;
            keep
        });
        report.eaten = meals.len();

        if season == Season::Winter && !config.survive_winter {
            let mut wither = BASE_WITHER_PROBABILITY * f64::from(config.winter_harshness);
            if config.is_fragile {
                wither *= 2.0;
            }
            let wither = wither.clamp(0.0, 1.0);
            let before = self.plants.len();
            self.plants.retain(|_| !rng.gen_bool(wither));
            report.withered = before - self.plants.len();
        }

        if self.plants.is_empty() {
            log::info!("The last plant is gone");
        }
        report
    }

    pub fn activate_growth_boost(&mut self, config: &mut PlantConfig) {
        config.boosting = true;
        self.growth_boost.extend(config.boost_duration);
    }

    pub fn activate_medicative(&mut self, config: &mut PlantConfig) {
        config.is_medicative = true;
        self.medicative_window.extend(config.medicative_duration);
    }

    pub fn activate_invincible(&mut self, config: &mut PlantConfig) {
        config.is_invincible = true;
        self.invincible_window.extend(config.invincible_duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LedgerConfig, RabbitConfig};
    use crate::animal::SpeciesConfig;
    use rand::SeedableRng;

    fn plant_at(x: f32, y: f32, medicative: bool) -> Plant {
        Plant {
            position: Vec2::new(x, y),
            half_size: Vec2::splat(10.0),
            medicative,
        }
    }

    #[test]
    fn test_medicative_plant_cures_and_rewards() {
        let mut config = PlantConfig::default();
        let rabbit = RabbitConfig::default();
        let mut rng = SimRng::seed_from_u64(21);
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        let mut plants = PlantPopulation::empty(0.0);
        plants.push(plant_at(100.0, 100.0, true));
        plants.push(plant_at(600.0, 600.0, false));

        let mut herbivore = rabbit.spawn(Vec2::new(105.0, 100.0), 0.0, &mut rng);
        herbivore.herbivore_mut().unwrap().infect();
        let mut herbivores = vec![herbivore];

        let report = plants.remove_near_herbivores(
            16.0, 1.0, false, Season::Summer, &mut config, &mut herbivores, &[], &mut ledger, &mut rng,
        );
        assert_eq!(report.eaten, 1);
        assert_eq!(report.cured, 1);
        assert_eq!(plants.len(), 1);
        let state = herbivores[0].herbivore().unwrap();
        assert!(!state.is_infected());
        assert!(state.is_immune());
        assert_eq!(state.energy, 1);
        assert_eq!(herbivores[0].eaten, 1);
        assert_eq!(ledger.get(Resource::Ecopoint), 1);
    }

    #[test]
    fn test_invincible_window_blocks_removal() {
        let mut config = PlantConfig::default();
        let rabbit = RabbitConfig::default();
        let mut rng = SimRng::seed_from_u64(22);
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        let mut plants = PlantPopulation::empty(0.0);
        plants.push(plant_at(100.0, 100.0, false));
        plants.activate_invincible(&mut config);
        let mut herbivores = vec![rabbit.spawn(Vec2::new(100.0, 100.0), 0.0, &mut rng)];

        let report = plants.remove_near_herbivores(
            16.0, 1.0, false, Season::Winter, &mut config, &mut herbivores, &[], &mut ledger, &mut rng,
        );
        assert_eq!(report, RemovalReport::default());
        assert_eq!(plants.len(), 1);
    }

    #[test]
    fn test_empty_population_never_grows() {
        let mut config = PlantConfig::default();
        let map = MapConfig::default();
        let season_config = SeasonConfig::default();
        let mut rng = SimRng::seed_from_u64(23);
        let season = SeasonController::new(0.0, &mut rng);
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        let mut plants = PlantPopulation::empty(0.0);
        for step in 1..50 {
            let grown = plants.grow(
                step as f64 * 1000.0, 1.0, false, &season, &season_config, &mut config, &map,
                &mut ledger, &mut rng,
            );
            assert_eq!(grown, 0);
        }
        assert!(plants.is_empty());
        assert_eq!(ledger.get(Resource::Leafium), 0);
    }

    #[test]
    fn test_growth_after_effective_interval() {
        let mut config = PlantConfig::default();
        let map = MapConfig::default();
        let season_config = SeasonConfig::default();
        let mut rng = SimRng::seed_from_u64(24);
        let season = SeasonController::new(0.0, &mut rng);
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        let mut plants = PlantPopulation::empty(0.0);
        plants.push(plant_at(640.0, 400.0, false));

        // Spring: 2000 ms * 0.75.
        let interval = PlantPopulation::effective_interval(&config, &season, &season_config, false);
        assert_eq!(interval, 1500.0);
        let grown = plants.grow(1400.0, 1.0, false, &season, &season_config, &mut config, &map, &mut ledger, &mut rng);
        assert_eq!(grown, 0);
        let grown = plants.grow(1600.0, 1.0, false, &season, &season_config, &mut config, &map, &mut ledger, &mut rng);
        assert_eq!(grown, 1);
        assert_eq!(plants.len(), 2);
        assert_eq!(ledger.get(Resource::Leafium), 1);
    }

    /// 100 plants on a grid, well apart from each other.
    fn plant_grid() -> PlantPopulation {
        let mut plants = PlantPopulation::empty(0.0);
        for i in 0..10 {
            for j in 0..10 {
                plants.push(plant_at(60.0 + 110.0 * i as f32, 60.0 + 70.0 * j as f32, false));
            }
        }
        plants
    }

    fn winter_pass(plants: &mut PlantPopulation, config: &mut PlantConfig, season: Season, seed: u64) -> RemovalReport {
        let mut rng = SimRng::seed_from_u64(seed);
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        let mut herbivores: Vec<Animal> = Vec::new();
        plants.remove_near_herbivores(16.0, 1.0, false, season, config, &mut herbivores, &[], &mut ledger, &mut rng)
    }

    #[test]
    fn test_harsh_fragile_winter_thins_plants() {
        let mut config = PlantConfig { winter_harshness: 200.0, is_fragile: true, ..Default::default() };
        let mut plants = plant_grid();

        // 0.001 * 200 * 2 = 0.4 per plant.
        let report = winter_pass(&mut plants, &mut config, Season::Winter, 31);
        assert!((20..=60).contains(&report.withered), "withered {}", report.withered);
        assert_eq!(plants.len(), 100 - report.withered);
        assert_eq!(report.eaten, 0);
    }

    #[test]
    fn test_fragile_doubles_wither_chance() {
        // 0.5 on its own, 1.0 once fragile.
        let mut config = PlantConfig { winter_harshness: 500.0, ..Default::default() };
        let mut plants = plant_grid();
        let report = winter_pass(&mut plants, &mut config, Season::Winter, 32);
        assert!(report.withered > 0 && report.withered < 100);

        config.is_fragile = true;
        let mut plants = plant_grid();
        let report = winter_pass(&mut plants, &mut config, Season::Winter, 32);
        assert_eq!(report.withered, 100);
        assert!(plants.is_empty());
    }

    #[test]
    fn test_survive_winter_keeps_every_plant() {
        let mut config = PlantConfig {
            winter_harshness: 1000.0,
            is_fragile: true,
            survive_winter: true,
            ..Default::default()
        };
        let mut plants = plant_grid();
        let report = winter_pass(&mut plants, &mut config, Season::Winter, 33);
        assert_eq!(report.withered, 0);
        assert_eq!(plants.len(), 100);
    }

    #[test]
    fn test_no_wither_outside_winter() {
        let mut config = PlantConfig { winter_harshness: 1000.0, ..Default::default() };
        let mut plants = plant_grid();
        let report = winter_pass(&mut plants, &mut config, Season::Autumn, 34);
        assert_eq!(report.withered, 0);
        assert_eq!(plants.len(), 100);
    }

    #[test]
    fn test_spring_pass_clears_fragile() {
        let mut config = PlantConfig { is_fragile: true, ..Default::default() };
        let mut plants = plant_grid();
        winter_pass(&mut plants, &mut config, Season::Summer, 35);
        assert!(config.is_fragile);
        winter_pass(&mut plants, &mut config, Season::Spring, 35);
        assert!(!config.is_fragile);

        // Same on an empty pool.
        config.is_fragile = true;
        let mut empty = PlantPopulation::empty(0.0);
        winter_pass(&mut empty, &mut config, Season::Spring, 36);
        assert!(!config.is_fragile);
    }

    #[test]
    fn test_boost_and_rain_shorten_interval() {
        let config = PlantConfig::default();
        let map = MapConfig::default();
        let season_config = SeasonConfig::default();
        let mut rng = SimRng::seed_from_u64(25);
        let mut season = SeasonController::new(0.0, &mut rng);

        assert_eq!(PlantPopulation::effective_interval(&config, &season, &season_config, true), 750.0);
        season.start_rain(&map, &mut rng);
        assert!(season.is_raining());
        let rainy = PlantPopulation::effective_interval(&config, &season, &season_config, false);
        assert!((rainy - 1200.0).abs() < 1e-3);
        let both = PlantPopulation::effective_interval(&config, &season, &season_config, true);
        assert!((both - 600.0).abs() < 1e-3);
    }

    #[test]
    fn test_growth_boost_grows_sooner() {
        let mut config = PlantConfig::default();
        let map = MapConfig::default();
        let season_config = SeasonConfig::default();
        let mut rng = SimRng::seed_from_u64(26);
        let season = SeasonController::new(0.0, &mut rng);
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        let mut plants = PlantPopulation::empty(0.0);
        plants.push(plant_at(640.0, 400.0, false));

        plants.activate_growth_boost(&mut config);
        assert!(config.boosting);
        let grown = plants.grow(800.0, 1.0, false, &season, &season_config, &mut config, &map, &mut ledger, &mut rng);
        assert_eq!(grown, 1);
    }

    #[test]
    fn test_double_reproduction_spawns_two() {
        let mut config = PlantConfig {
            double_reproduction: true,
            double_reproduction_rate: 1.0,
            ..Default::default()
        };
        let map = MapConfig::default();
        let season_config = SeasonConfig::default();
        let mut rng = SimRng::seed_from_u64(27);
        let season = SeasonController::new(0.0, &mut rng);
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        let mut plants = PlantPopulation::empty(0.0);
        plants.push(plant_at(640.0, 400.0, false));

        let grown = plants.grow(1600.0, 1.0, false, &season, &season_config, &mut config, &map, &mut ledger, &mut rng);
        assert_eq!(grown, 2);
        assert_eq!(plants.len(), 3);
        assert_eq!(ledger.get(Resource::Leafium), 2);
    }

    #[test]
    fn test_medicative_window_marks_new_plants() {
        let mut config = PlantConfig { medicative_prob: 1.0, ..Default::default() };
        let map = MapConfig::default();
        let season_config = SeasonConfig::default();
        let mut rng = SimRng::seed_from_u64(28);
        let season = SeasonController::new(0.0, &mut rng);
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        let mut plants = PlantPopulation::empty(0.0);
        plants.push(plant_at(640.0, 400.0, false));

        plants.activate_medicative(&mut config);
        let grown = plants.grow(1600.0, 1.0, false, &season, &season_config, &mut config, &map, &mut ledger, &mut rng);
        assert_eq!(grown, 1);
        assert_eq!(plants.iter().filter(|p| p.medicative).count(), 1);

        // Still open for this step, closed on the next.
        plants.grow(40_000.0, 1.0, false, &season, &season_config, &mut config, &map, &mut ledger, &mut rng);
        assert_eq!(plants.iter().filter(|p| p.medicative).count(), 2);
        let grown = plants.grow(41_600.0, 1.0, false, &season, &season_config, &mut config, &map, &mut ledger, &mut rng);
        assert_eq!(grown, 1);
        assert!(!config.is_medicative);
        assert_eq!(plants.iter().filter(|p| p.medicative).count(), 2);
    }

    #[test]
    fn test_boost_window_expires_and_clears_flag() {
        let mut window = BoostWindow::default();
        let mut flag = true;
        window.extend(50.0);
        assert!(window.tick(&mut flag, 30.0));
        assert!(window.tick(&mut flag, 30.0));
        assert!(!window.tick(&mut flag, 30.0));
        assert!(!flag);
    }
}
// --- End of File: plant.rs ---
