// --- File: resources.rs ---
use crate::clock::Ticker;
use crate::config::LedgerConfig;
use crate::error::EcoError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Earned when plants grow.
    Leafium,
    /// Earned when animals reproduce.
    Animite,
    /// Earned over time and by curing infected herbivores.
    Ecopoint,
}

impl Resource {
    pub fn name(self) -> &'static str {
        match self {
            Resource::Leafium => "leafium",
            Resource::Animite => "animite",
            Resource::Ecopoint => "ecopoint",
        }
    }
}

/// Cost of a tech or crafted item, as `(resource, amount)` pairs.
pub type Cost = &'static [(Resource, u64)];

/// Three independent counters fed by population events.
///
/// The simulation only ever adds; spending happens through [`ResourceLedger::spend`],
/// which tech and crafting call after checking [`ResourceLedger::can_afford`].
#[derive(Debug, Clone)]
pub struct ResourceLedger {
    leafium: u64,
    animite: u64,
    ecopoint: u64,
    active_time: f32,
    ticker: Ticker,
}

impl ResourceLedger {
    pub fn new(now: f64, config: &LedgerConfig) -> Self {
        let start = config.starting_balance;
        Self {
            leafium: start,
            animite: start,
            ecopoint: start,
            active_time: 0.0,
            ticker: Ticker::new(now),
        }
    }

    pub fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Leafium => self.leafium,
            Resource::Animite => self.animite,
            Resource::Ecopoint => self.ecopoint,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u64 {
        match resource {
            Resource::Leafium => &mut self.leafium,
            Resource::Animite => &mut self.animite,
            Resource::Ecopoint => &mut self.ecopoint,
        }
    }

    pub fn gain(&mut self, resource: Resource, amount: u64) {
        let slot = self.slot(resource);
        *slot = slot.saturating_add(amount);
    }

    /// Time-driven eco-point accrual: one point per `eco_interval` of unpaused time.
    pub fn update(&mut self, now: f64, speed: f32, paused: bool, config: &LedgerConfig) {
        let delta = self.ticker.sample(now, speed, paused);
        if paused {
            return;
        }
        self.active_time += delta;
        if self.active_time > config.eco_interval {
            self.active_time = 0.0;
            self.gain(Resource::Ecopoint, 1);
        }
    }

    pub fn can_afford(&self, cost: Cost) -> Result<(), EcoError> {
        for &(resource, needed) in cost {
            let available = self.get(resource);
            if available < needed {
                return Err(EcoError::InsufficientResources {
                    resource: resource.name(),
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Deduct `cost` if every counter covers it; otherwise leave the ledger untouched.
    pub fn spend(&mut self, cost: Cost) -> Result<(), EcoError> {
        self.can_afford(cost)?;
        for &(resource, amount) in cost {
            let slot = self.slot(resource);
            debug_assert!(*slot >= amount, "ledger counter would go negative");
            *slot = slot.saturating_sub(amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_spend_is_noop() {
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        ledger.gain(Resource::Leafium, 15);
        ledger.gain(Resource::Ecopoint, 5);
        let cost: Cost = &[(Resource::Leafium, 15), (Resource::Ecopoint, 10)];
        assert_eq!(
            ledger.spend(cost),
            Err(EcoError::InsufficientResources {
                resource: "ecopoint",
                needed: 10,
                available: 5
            })
        );
        assert_eq!(ledger.get(Resource::Leafium), 15);
        assert_eq!(ledger.get(Resource::Ecopoint), 5);
    }

    #[test]
    fn test_ecopoints_accrue_only_when_running() {
        let config = LedgerConfig::default();
        let mut ledger = ResourceLedger::new(0.0, &config);
        ledger.update(9000.0, 1.0, true, &config);
        assert_eq!(ledger.get(Resource::Ecopoint), 0);
        ledger.update(18_000.0, 1.0, false, &config);
        assert_eq!(ledger.get(Resource::Ecopoint), 1);
    }
}
// --- End of File: resources.rs ---
