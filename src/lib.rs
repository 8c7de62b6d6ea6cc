//! Ecobox: a closed plant / rabbit / crocodile ecosystem driven by seasons,
//! weather and the occasional disaster.

pub mod animal;
pub mod clock;
pub mod config;
pub mod constants;
pub mod disaster;
pub mod error;
pub mod plant;
pub mod render;
pub mod resources;
pub mod season;
pub mod steering;
pub mod tech;
pub mod utils;
pub mod world;

pub use config::SimulationConfig;
pub use error::{ConfigError, EcoError};
pub use world::{ExtinctionState, StepReport, World, WorldStats};
