use thiserror::Error;

/// Errors raised while loading or validating a [`crate::config::SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// A tech or crafting request the world refused. Refusals leave all state untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EcoError {
    #[error("not enough {resource}: need {needed}, have {available}")]
    InsufficientResources {
        resource: &'static str,
        needed: u64,
        available: u64,
    },
    #[error("tech already unlocked")]
    AlreadyUnlocked,
    #[error("item is already being crafted")]
    AlreadyCrafting,
    #[error("no crafted item left to use")]
    NothingToUse,
}
