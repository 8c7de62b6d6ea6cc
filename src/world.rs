// --- File: world.rs ---
use crate::animal::{AnimalPopulation, StepContext};
use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::disaster::{DisasterController, DisasterKind, DisasterTargets};
use crate::error::{ConfigError, EcoError};
use crate::plant::PlantPopulation;
use crate::render::{Hud, Scene};
use crate::resources::{Resource, ResourceLedger};
use crate::season::SeasonController;
use crate::steering::{Neighborhood, move_herbivores, move_predators};
use crate::tech::{CraftItem, CraftingSystem, Tech, TechTree};
use crate::utils::SimRng;
use rand::SeedableRng;

/// Which populations have died out. Any flag ends the run.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ExtinctionState {
    pub no_plants: bool,
    pub no_herbivores: bool,
    pub no_predators: bool,
}

impl ExtinctionState {
    pub fn any(&self) -> bool {
        self.no_plants || self.no_herbivores || self.no_predators
    }
}

/// What happened during one call to [`World::advance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub plants_grown: usize,
    pub plants_eaten: usize,
    pub plants_withered: usize,
    pub cured: usize,
    pub infected: usize,
    pub herbivores_killed: usize,
    pub herbivores_born: usize,
    pub predators_born: usize,
    pub died_of_age: usize,
    pub disaster: Option<DisasterKind>,
    pub crafted: Vec<CraftItem>,
}

/// Running totals since the last (re)start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub steps: u64,
    pub plants_grown: u64,
    pub plants_eaten: u64,
    pub herbivores_killed: u64,
    pub births: u64,
    pub deaths_of_age: u64,
    pub cures: u64,
    pub disasters: u64,
}

impl WorldStats {
    fn absorb(&mut self, report: &StepReport) {
        self.steps += 1;
        self.plants_grown += report.plants_grown as u64;
        self.plants_eaten += report.plants_eaten as u64;
        self.herbivores_killed += report.herbivores_killed as u64;
        self.births += (report.herbivores_born + report.predators_born) as u64;
        self.deaths_of_age += report.died_of_age as u64;
        self.cures += report.cured as u64;
        self.disasters += u64::from(report.disaster.is_some());
    }
}

/// Owns every population and subsystem and sequences one simulation step.
pub struct World {
    initial_config: SimulationConfig,
    config: SimulationConfig,
    rng: SimRng,
    now: f64,
    paused: bool,
    extinction: ExtinctionState,

    clock: Clock,
    ledger: ResourceLedger,
    season: SeasonController,
    plants: PlantPopulation,
    herbivores: AnimalPopulation,
    predators: AnimalPopulation,
    disaster: DisasterController,
    tech: TechTree,
    crafting: CraftingSystem,

    // Herbivores caught this step; removed during cleanup.
    killed: Vec<usize>,
    stats: WorldStats,
}

impl World {
    /// Seeded from system entropy.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::build(config, SimRng::from_entropy(), true)
    }

    /// Reproducible world: the same seed and config give the same run.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::build(config, SimRng::seed_from_u64(seed), true)
    }

    /// A world with every subsystem ready but no plants or animals.
    pub fn empty(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::build(config, SimRng::seed_from_u64(seed), false)
    }

    fn build(config: SimulationConfig, mut rng: SimRng, populate: bool) -> Result<Self, ConfigError> {
        config.validate()?;
        let now = 0.0;
        let (plants, herbivores, predators) = if populate {
            (
                PlantPopulation::seed(&config.plant, &config.map, now, &mut rng),
                AnimalPopulation::seed(&config.rabbit, &config.map, now, &mut rng),
                AnimalPopulation::seed(&config.crocodile, &config.map, now, &mut rng),
            )
        } else {
            (PlantPopulation::empty(now), AnimalPopulation::new(), AnimalPopulation::new())
        };
        log::info!(
            "World created: {} plants, {} rabbits, {} crocodiles",
            plants.len(),
            herbivores.len(),
            predators.len()
        );

        Ok(Self {
            clock: Clock::new(now, config.speeds.clone()),
            ledger: ResourceLedger::new(now, &config.ledger),
            season: SeasonController::new(now, &mut rng),
            plants,
            herbivores,
            predators,
            disaster: DisasterController::new(now),
            tech: TechTree::new(),
            crafting: CraftingSystem::new(now),
            initial_config: config.clone(),
            config,
            rng,
            now,
            paused: false,
            extinction: ExtinctionState::default(),
            killed: Vec::new(),
            stats: WorldStats::default(),
        })
    }

    /// Advance the virtual clock by `dt_ms` and run one step.
    ///
    /// Does nothing once any population has died out. While paused the clock
    /// still moves but only visual state (season tint, raindrops) changes.
    pub fn advance(&mut self, dt_ms: f64) -> StepReport {
        let mut report = StepReport::default();
        if self.check_extinction().any() {
            return report;
        }
        self.now += dt_ms.max(0.0);
        let now = self.now;
        let paused = self.paused;
        let speed = self.clock.speed_multiplier();

        // --- Environment ---
        self.ledger.update(now, speed, paused, &self.config.ledger);
        report.plants_grown = self.plants.grow(
            now,
            speed,
            paused,
            &self.season,
            &self.config.season,
            &mut self.config.plant,
            &self.config.map,
            &mut self.ledger,
            &mut self.rng,
        );
        self.season
            .update(now, speed, paused, &self.config.season, &self.config.map, &mut self.rng);
        self.clock.update(now, paused);
        report.disaster = self.disaster.update(
            now,
            speed,
            paused,
            DisasterTargets {
                season: &mut self.season,
                plant_config: &mut self.config.plant,
                herbivores: &mut self.herbivores,
            },
            &mut self.rng,
        );
        report.crafted = self.crafting.update(now, speed, paused);

        // --- Movement ---
        self.move_animals(now, speed, paused, &mut report);

        // --- Feeding ---
        let removal = self.plants.remove_near_herbivores(
            now,
            speed,
            paused,
            self.season.current(),
            &mut self.config.plant,
            self.herbivores.as_mut_slice(),
            &self.killed,
            &mut self.ledger,
            &mut self.rng,
        );
        report.plants_eaten = removal.eaten;
        report.plants_withered = removal.withered;
        report.cured = removal.cured;

        // --- Life cycle ---
        if !paused {
            report.herbivores_killed = self.killed.len();
            self.herbivores.remove_indices(&mut self.killed);
            self.reproduce(&mut report);
            report.died_of_age = self.herbivores.remove_old() + self.predators.remove_old();
        }

        self.stats.absorb(&report);
        report
    }

    fn move_animals(&mut self, now: f64, speed: f32, paused: bool, report: &mut StepReport) {
        let ctx = StepContext {
            now,
            time_multiplier: speed,
            paused,
            season_multiplier: self.season.speed_multiplier(&self.config.season),
            map: &self.config.map,
        };
        let mut hood = Neighborhood::capture(&self.herbivores, &self.predators, &self.plants);

        move_predators(
            &mut self.predators,
            &mut self.config.crocodile,
            &hood,
            &ctx,
            &mut self.killed,
            &mut self.rng,
        );

        // Herbivores react to where the predators are now.
        hood.predators = self.predators.positions().collect();
        report.infected = move_herbivores(
            &mut self.herbivores,
            &mut self.config.rabbit,
            &hood,
            self.config.plant.is_invincible,
            &ctx,
            &self.killed,
            &mut self.rng,
        );
    }

    fn reproduce(&mut self, report: &mut StepReport) {
        let season = self.season.current();

        let occupied: Vec<_> = self.herbivores.positions().chain(self.predators.positions()).collect();
        report.herbivores_born = self.herbivores.reproduce(
            &self.config.rabbit,
            season,
            &occupied,
            &self.config.map,
            self.now,
            &mut self.ledger,
            &mut self.rng,
        );

        let occupied: Vec<_> = self.herbivores.positions().chain(self.predators.positions()).collect();
        report.predators_born = self.predators.reproduce(
            &self.config.crocodile,
            season,
            &occupied,
            &self.config.map,
            self.now,
            &mut self.ledger,
            &mut self.rng,
        );
    }

    /// Evaluate the terminal condition. Once set, the flags stay set until [`World::restart`].
    pub fn check_extinction(&mut self) -> ExtinctionState {
        if !self.extinction.any() {
            let state = ExtinctionState {
                no_plants: self.plants.is_empty(),
                no_herbivores: self.herbivores.is_empty(),
                no_predators: self.predators.is_empty(),
            };
            if state.any() {
                log::info!("Ecosystem collapsed after {} steps: {:?}", self.stats.steps, state);
                self.extinction = state;
            }
        }
        self.extinction
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }

    /// Cycle to the next configured speed multiplier.
    pub fn change_speed(&mut self) -> u32 {
        let speed = self.clock.change_speed();
        log::info!("Speed multiplier: {}x", speed);
        speed
    }

    /// Throw the current run away and re-seed everything from the starting config.
    pub fn restart(&mut self) {
        log::info!("Restarting simulation");
        let config = self.initial_config.clone();
        let now = self.now;
        let rng = &mut self.rng;
        self.plants = PlantPopulation::seed(&config.plant, &config.map, now, rng);
        self.herbivores = AnimalPopulation::seed(&config.rabbit, &config.map, now, rng);
        self.predators = AnimalPopulation::seed(&config.crocodile, &config.map, now, rng);
        self.season = SeasonController::new(now, rng);
        self.clock = Clock::new(now, config.speeds.clone());
        self.ledger = ResourceLedger::new(now, &config.ledger);
        self.disaster = DisasterController::new(now);
        self.tech = TechTree::new();
        self.crafting = CraftingSystem::new(now);
        self.config = config;
        self.paused = false;
        self.extinction = ExtinctionState::default();
        self.killed.clear();
        self.stats = WorldStats::default();
    }

    // --- Collaborator entry points ---

    pub fn unlock_tech(&mut self, tech: Tech) -> Result<(), EcoError> {
        self.tech.unlock(tech, &mut self.ledger, &mut self.config)
    }

    pub fn craft(&mut self, item: CraftItem) -> Result<(), EcoError> {
        self.crafting.try_craft(item, &mut self.ledger)
    }

    /// Spend one crafted `item` and apply its effect.
    pub fn use_item(&mut self, item: CraftItem) -> Result<(), EcoError> {
        self.crafting.try_use(item)?;
        match item {
            CraftItem::HealingHerb => self.plants.activate_medicative(&mut self.config.plant),
            CraftItem::CrocodileSpeed => {
                let duration = self.config.crocodile.boost_duration;
                self.predators.activate_boost(&mut self.config.crocodile.boosting, duration);
            }
            CraftItem::ArtificialRain => self.season.start_rain(&self.config.map, &mut self.rng),
            CraftItem::PlantShield => self.plants.activate_invincible(&mut self.config.plant),
        }
        log::info!("Used item: {}", item.name());
        Ok(())
    }

    pub fn boost_plant_growth(&mut self) {
        self.plants.activate_growth_boost(&mut self.config.plant);
    }

    pub fn boost_herbivores(&mut self) {
        let duration = self.config.rabbit.boost_duration;
        self.herbivores.activate_boost(&mut self.config.rabbit.boosting, duration);
    }

    /// Live configuration. Changes are seen by every individual on its next update.
    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    // --- Queries ---

    pub fn scene(&self) -> Scene {
        Scene {
            background: self.season.color(),
            instances: Scene::collect_instances(
                &self.plants,
                &self.herbivores,
                &self.predators,
                self.season.raindrops(),
            ),
            hud: Hud {
                calendar: self.clock.label(),
                season: self.season.current().name(),
                speed: self.clock.speed(),
                paused: self.paused,
                leafium: self.ledger.get(Resource::Leafium),
                animite: self.ledger.get(Resource::Animite),
                ecopoint: self.ledger.get(Resource::Ecopoint),
                notice: Scene::notice_overlay(self.disaster.notice()),
            },
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_ended(&self) -> bool {
        self.extinction.any()
    }

    pub fn extinction(&self) -> ExtinctionState {
        self.extinction
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ResourceLedger {
        &mut self.ledger
    }

    pub fn season(&self) -> &SeasonController {
        &self.season
    }

    pub fn season_mut(&mut self) -> &mut SeasonController {
        &mut self.season
    }

    pub fn disaster(&self) -> &DisasterController {
        &self.disaster
    }

    pub fn tech(&self) -> &TechTree {
        &self.tech
    }

    pub fn crafting(&self) -> &CraftingSystem {
        &self.crafting
    }

    pub fn plants(&self) -> &PlantPopulation {
        &self.plants
    }

    pub fn plants_mut(&mut self) -> &mut PlantPopulation {
        &mut self.plants
    }

    pub fn herbivores(&self) -> &AnimalPopulation {
        &self.herbivores
    }

    pub fn herbivores_mut(&mut self) -> &mut AnimalPopulation {
        &mut self.herbivores
    }

    pub fn predators(&self) -> &AnimalPopulation {
        &self.predators
    }

    pub fn predators_mut(&mut self) -> &mut AnimalPopulation {
        &mut self.predators
    }

    /// Spawn-ready rng for callers that build entities by hand.
    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }
}

// --- End of File: world.rs ---
