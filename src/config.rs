// --- File: config.rs ---
use crate::constants::{MAP_HEIGHT, MAP_WIDTH};
use crate::error::ConfigError;
use crate::season::Season;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// One value per season, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonTable<T> {
    pub spring: T,
    pub summer: T,
    pub autumn: T,
    pub winter: T,
}

impl<T: Copy> SeasonTable<T> {
    pub const fn new(spring: T, summer: T, autumn: T, winter: T) -> Self {
        Self {
            spring,
            summer,
            autumn,
            winter,
        }
    }

    pub const fn uniform(value: T) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn get(&self, season: Season) -> T {
        match season {
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Autumn => self.autumn,
            Season::Winter => self.winter,
        }
    }

    pub fn get_mut(&mut self, season: Season) -> &mut T {
        match season {
            Season::Spring => &mut self.spring,
            Season::Summer => &mut self.summer,
            Season::Autumn => &mut self.autumn,
            Season::Winter => &mut self.winter,
        }
    }

    pub fn values(&self) -> [T; 4] {
        [self.spring, self.summer, self.autumn, self.winter]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
        }
    }
}

/// Herbivore ("rabbit") parameters. Distances in pixels, times in ms, ages in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RabbitConfig {
    pub initial_num: usize,
    pub half_size: [f32; 2],

    pub min_distance: f32,
    pub min_plant_distance: f32,
    pub min_plant_distance_infected: f32,
    pub min_croc_distance: f32,

    pub ave_speed: f32,
    pub range_speed: f32,
    pub speed_change_rate: f32,
    pub angle_change_rate: f32,
    pub plant_eat_boost: f32,
    pub max_eat_boost: u32,

    pub reproduction_threshold: SeasonTable<u32>,
    pub reproduction_resource: u64,
    pub clear_energy_on_reproduction: bool,

    pub ave_age: f32,
    pub range_age: f32,

    pub boosting: bool,
    pub boost_rate: f32,
    pub boost_duration: f32,

    pub infection_range: f32,
    pub infected_multiplier: f32,
    pub infection_speed_down: f32,
}

impl Default for RabbitConfig {
    fn default() -> Self {
        Self {
            initial_num: 8,
            half_size: [15.0, 20.0],
            min_distance: 50.0,
            min_plant_distance: 60.0,
            min_plant_distance_infected: 150.0,
            min_croc_distance: 200.0,
            ave_speed: 0.9,
            range_speed: 0.2,
            speed_change_rate: 0.05,
            angle_change_rate: PI / 12.0,
            plant_eat_boost: 0.15,
            max_eat_boost: 2,
            reproduction_threshold: SeasonTable::new(3, 3, 3, 4),
            reproduction_resource: 3,
            clear_energy_on_reproduction: true,
            ave_age: 3.0,
            range_age: 0.5,
            boosting: false,
            boost_rate: 1.5,
            boost_duration: 10_000.0,
            infection_range: 80.0,
            infected_multiplier: 2.0,
            infection_speed_down: 0.3,
        }
    }
}

/// Predator ("crocodile") parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrocodileConfig {
    pub initial_num: usize,
    pub half_size: [f32; 2],

    pub min_distance: f32,
    pub min_hunt_distance: f32,
    pub min_eat_distance: f32,

    pub ave_speed: f32,
    pub range_speed: f32,
    pub speed_change_rate: f32,
    pub angle_change_rate: f32,

    pub reproduction_threshold: SeasonTable<u32>,
    pub reproduction_resource: u64,

    pub ave_age: f32,
    pub range_age: f32,

    pub boosting: bool,
    pub boost_rate: f32,
    pub boost_duration: f32,

    pub rest_num: u32,
    pub rest_duration: f32,
    pub full_speed_rate: f32,
    pub rest_speed_rate: f32,
    pub edge_margin_range: [f32; 2],
}

impl Default for CrocodileConfig {
    fn default() -> Self {
        Self {
            initial_num: 2,
            half_size: [20.0, 20.0],
            min_distance: 100.0,
            min_hunt_distance: 500.0,
            min_eat_distance: 40.0,
            ave_speed: 1.2,
            range_speed: 0.2,
            speed_change_rate: 0.05,
            angle_change_rate: PI / 12.0,
            reproduction_threshold: SeasonTable::uniform(6),
            reproduction_resource: 5,
            ave_age: 4.0,
            range_age: 0.5,
            boosting: false,
            boost_rate: 2.0,
            boost_duration: 10_000.0,
            rest_num: 1,
            rest_duration: 15_000.0,
            full_speed_rate: 0.8,
            rest_speed_rate: 0.6,
            edge_margin_range: [80.0, 120.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    pub initial_num: usize,
    pub half_size: [f32; 2],

    pub min_distance: f32,
    pub min_animal_distance: f32,

    pub reproduction_interval: f32,

    pub boosting: bool,
    pub boost_rate: f32,
    pub boost_duration: f32,

    pub rain_bonus: f32,
    pub winter_harshness: f32,
    pub is_fragile: bool,
    pub survive_winter: bool,

    pub double_reproduction: bool,
    pub double_reproduction_rate: f64,

    pub is_medicative: bool,
    pub medicative_prob: f64,
    pub medicative_duration: f32,

    pub is_invincible: bool,
    pub invincible_duration: f32,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            initial_num: 20,
            half_size: [10.0, 10.0],
            min_distance: 50.0,
            min_animal_distance: 20.0,
            reproduction_interval: 2000.0,
            boosting: false,
            boost_rate: 0.5,
            boost_duration: 10_000.0,
            rain_bonus: 0.8,
            winter_harshness: 1.0,
            is_fragile: false,
            survive_winter: false,
            double_reproduction: false,
            double_reproduction_rate: 0.2,
            is_medicative: false,
            medicative_prob: 0.5,
            medicative_duration: 30_000.0,
            is_invincible: false,
            invincible_duration: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    pub switch_interval: f32,
    pub speed_multipliers: SeasonTable<f32>,
    pub interval_multipliers: SeasonTable<f32>,
    pub rain_probability: f64,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            switch_interval: 15_000.0,
            speed_multipliers: SeasonTable::new(1.0, 1.1, 1.0, 0.6),
            interval_multipliers: SeasonTable::new(0.75, 1.0, 1.25, 2.0),
            rain_probability: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub eco_interval: f32,
    // Starting balance for every counter; handy for sandbox runs.
    pub starting_balance: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            eco_interval: 8000.0,
            starting_balance: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub map: MapConfig,
    pub rabbit: RabbitConfig,
    pub crocodile: CrocodileConfig,
    pub plant: PlantConfig,
    pub season: SeasonConfig,
    pub ledger: LedgerConfig,
    pub speeds: Vec<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            rabbit: RabbitConfig::default(),
            crocodile: CrocodileConfig::default(),
            plant: PlantConfig::default(),
            season: SeasonConfig::default(),
            ledger: LedgerConfig::default(),
            speeds: crate::constants::DEFAULT_SPEEDS.to_vec(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |what: &'static str| Err(ConfigError::Invalid(what));

        if self.map.width <= 0.0 || self.map.height <= 0.0 {
            return invalid("map dimensions must be positive");
        }
        if self.speeds.is_empty() || self.speeds.contains(&0) {
            return invalid("speeds must be a non-empty list of positive multipliers");
        }
        if self.season.switch_interval <= 0.0 {
            return invalid("season switch_interval must be positive");
        }
        if !(0.0..=1.0).contains(&self.season.rain_probability) {
            return invalid("rain_probability must be within [0, 1]");
        }
        if self.plant.reproduction_interval <= 0.0 {
            return invalid("plant reproduction_interval must be positive");
        }
        if !(0.0..=1.0).contains(&self.plant.double_reproduction_rate)
            || !(0.0..=1.0).contains(&self.plant.medicative_prob)
        {
            return invalid("plant probabilities must be within [0, 1]");
        }
        if self.ledger.eco_interval <= 0.0 {
            return invalid("eco_interval must be positive");
        }
        if self.rabbit.reproduction_threshold.values().contains(&0)
            || self.crocodile.reproduction_threshold.values().contains(&0)
        {
            return invalid("reproduction thresholds must be at least 1");
        }
        if self.rabbit.range_age > self.rabbit.ave_age
            || self.crocodile.range_age > self.crocodile.ave_age
        {
            return invalid("range_age cannot exceed ave_age");
        }
        if self.crocodile.edge_margin_range[0] >= self.crocodile.edge_margin_range[1] {
            return invalid("edge_margin_range must be an increasing pair");
        }
        if self.crocodile.rest_num == 0 {
            return invalid("rest_num must be at least 1");
        }
        let fits = |half: [f32; 2]| half[0] * 2.0 < self.map.width && half[1] * 2.0 < self.map.height;
        if !fits(self.rabbit.half_size) || !fits(self.crocodile.half_size) || !fits(self.plant.half_size)
        {
            return invalid("entity sizes must fit inside the map");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = SimulationConfig::default();
        *config.rabbit.reproduction_threshold.get_mut(Season::Winter) = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "plant": { "initial_num": 5 }, "speeds": [1, 3] }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.plant.initial_num, 5);
        assert_eq!(config.plant.min_distance, 50.0);
        assert_eq!(config.speeds, vec![1, 3]);
        assert_eq!(config.rabbit, RabbitConfig::default());
    }

    #[test]
    fn test_season_table_lookup() {
        let mut table = SeasonTable::new(1, 2, 3, 4);
        assert_eq!(table.get(Season::Autumn), 3);
        *table.get_mut(Season::Spring) -= 1;
        assert_eq!(table.values(), [0, 2, 3, 4]);
    }
}
// --- End of File: config.rs ---
