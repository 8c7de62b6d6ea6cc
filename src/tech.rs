// --- File: tech.rs ---
use crate::clock::Ticker;
use crate::config::SimulationConfig;
use crate::constants::CRAFT_TIME_MS;
use crate::error::EcoError;
use crate::resources::{Cost, Resource, ResourceLedger};
use crate::season::Season;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TechArea {
    Plants,
    Animals,
    Weather,
    Buildings,
}

/// Permanent upgrades bought with ledger currencies. Each rewrites config fields once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Tech {
    GrowthAlpha,
    GrowthBeta,
    HydrophilicGenes,
    ColdResistance,
    RabbitSpeed,
    RabbitBreedingSeason,
    CrocodileBirthControl,
    CrocodileBite,
    EcoRegulation,
    SeasonStabilizer,
    RainIntervention,
    PlantShelter,
    AnimalBufferZone,
    RabbitOutpost,
}

impl Tech {
    pub const ALL: [Tech; 14] = [
        Tech::GrowthAlpha,
        Tech::GrowthBeta,
        Tech::HydrophilicGenes,
        Tech::ColdResistance,
        Tech::RabbitSpeed,
        Tech::RabbitBreedingSeason,
        Tech::CrocodileBirthControl,
        Tech::CrocodileBite,
        Tech::EcoRegulation,
        Tech::SeasonStabilizer,
        Tech::RainIntervention,
        Tech::PlantShelter,
        Tech::AnimalBufferZone,
        Tech::RabbitOutpost,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Tech::GrowthAlpha => "Growth Boost Alpha",
            Tech::GrowthBeta => "Growth Boost Beta",
            Tech::HydrophilicGenes => "Hydrophilic Genes",
            Tech::ColdResistance => "Cold Resistance",
            Tech::RabbitSpeed => "Rabbit: Speed",
            Tech::RabbitBreedingSeason => "Rabbit: Breeding Season",
            Tech::CrocodileBirthControl => "Crocodile: Birth Control",
            Tech::CrocodileBite => "Crocodile: Bite Evolution",
            Tech::EcoRegulation => "Eco Regulation",
            Tech::SeasonStabilizer => "Season Stabilizer",
            Tech::RainIntervention => "Rain Intervention",
            Tech::PlantShelter => "Plant Shelter",
            Tech::AnimalBufferZone => "Animal Buffer Zone",
            Tech::RabbitOutpost => "Rabbit Outpost",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tech::GrowthAlpha => "Plants reproduce slightly faster",
            Tech::GrowthBeta => "Plants may reproduce twice at once",
            Tech::HydrophilicGenes => "Plants grow faster in rain but die more in winter",
            Tech::ColdResistance => "Plants no longer die from the cold",
            Tech::RabbitSpeed => "Rabbits move faster but forage in a smaller radius",
            Tech::RabbitBreedingSeason => "Rabbits breed faster in spring",
            Tech::CrocodileBirthControl => "Crocodiles need one more meal to breed",
            Tech::CrocodileBite => "Crocodiles catch prey from further away",
            Tech::EcoRegulation => "Eco points accrue faster",
            Tech::SeasonStabilizer => "Every season lasts longer",
            Tech::RainIntervention => "It rains more often all year",
            Tech::PlantShelter => "Plants grow a little faster in winter",
            Tech::AnimalBufferZone => "Animals move a little faster in winter",
            Tech::RabbitOutpost => "Rabbits notice predators from further away",
        }
    }

    pub fn area(self) -> TechArea {
        match self {
            Tech::GrowthAlpha | Tech::GrowthBeta | Tech::HydrophilicGenes | Tech::ColdResistance => {
                TechArea::Plants
            }
            Tech::RabbitSpeed
            | Tech::RabbitBreedingSeason
            | Tech::CrocodileBirthControl
            | Tech::CrocodileBite => TechArea::Animals,
            Tech::EcoRegulation | Tech::SeasonStabilizer | Tech::RainIntervention => TechArea::Weather,
            Tech::PlantShelter | Tech::AnimalBufferZone | Tech::RabbitOutpost => TechArea::Buildings,
        }
    }

    pub fn cost(self) -> Cost {
        use Resource::*;
        match self {
            Tech::GrowthAlpha | Tech::GrowthBeta => &[(Leafium, 20)],
            Tech::HydrophilicGenes => &[(Leafium, 30)],
            Tech::ColdResistance => &[(Leafium, 60)],
            Tech::RabbitSpeed
            | Tech::RabbitBreedingSeason
            | Tech::CrocodileBirthControl
            | Tech::CrocodileBite => &[(Animite, 20)],
            Tech::EcoRegulation => &[(Ecopoint, 10)],
            Tech::SeasonStabilizer | Tech::RainIntervention => &[(Ecopoint, 20)],
            Tech::PlantShelter => &[(Leafium, 15), (Ecopoint, 10)],
            Tech::AnimalBufferZone | Tech::RabbitOutpost => &[(Animite, 15), (Ecopoint, 10)],
        }
    }

    fn apply(self, config: &mut SimulationConfig) {
        match self {
            Tech::GrowthAlpha => {
                config.plant.reproduction_interval = (config.plant.reproduction_interval - 500.0).max(1.0)
            }
            Tech::GrowthBeta => config.plant.double_reproduction = true,
            Tech::HydrophilicGenes => {
                config.plant.rain_bonus = 0.5;
                config.plant.winter_harshness = 1.5;
            }
            Tech::ColdResistance => config.plant.survive_winter = true,
            Tech::RabbitSpeed => {
                config.rabbit.ave_speed += 0.2;
                config.rabbit.min_plant_distance = (config.rabbit.min_plant_distance - 10.0).max(0.0);
            }
            Tech::RabbitBreedingSeason => {
                let spring = config.rabbit.reproduction_threshold.get_mut(Season::Spring);
                *spring = spring.saturating_sub(1).max(1);
            }
            Tech::CrocodileBirthControl => {
                for season in Season::CYCLE {
                    *config.crocodile.reproduction_threshold.get_mut(season) += 1;
                }
            }
            Tech::CrocodileBite => config.crocodile.min_eat_distance += 10.0,
            Tech::EcoRegulation => {
                config.ledger.eco_interval = (config.ledger.eco_interval - 3000.0).max(1.0)
            }
            Tech::SeasonStabilizer => config.season.switch_interval += 5000.0,
            Tech::RainIntervention => config.season.rain_probability = 0.4,
            Tech::PlantShelter => *config.season.interval_multipliers.get_mut(Season::Winter) = 1.5,
            Tech::AnimalBufferZone => *config.season.speed_multipliers.get_mut(Season::Winter) = 0.8,
            Tech::RabbitOutpost => config.rabbit.min_croc_distance += 50.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TechTree {
    unlocked: [bool; Tech::ALL.len()],
}

impl TechTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, tech: Tech) -> bool {
        self.unlocked[tech.index()]
    }

    /// Buy `tech`: refused without side effects if already owned or unaffordable.
    pub fn unlock(
        &mut self,
        tech: Tech,
        ledger: &mut ResourceLedger,
        config: &mut SimulationConfig,
    ) -> Result<(), EcoError> {
        if self.is_unlocked(tech) {
            return Err(EcoError::AlreadyUnlocked);
        }
        ledger.spend(tech.cost())?;
        self.unlocked[tech.index()] = true;
        tech.apply(config);
        log::info!("Tech unlocked: {}", tech.name());
        Ok(())
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Tech> + '_ {
        Tech::ALL.into_iter().filter(|&t| self.is_unlocked(t))
    }
}

// --- Crafting ---

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CraftItem {
    /// Opens the medicative window for new plants.
    HealingHerb,
    /// Speed boost for every predator.
    CrocodileSpeed,
    /// Starts rain immediately.
    ArtificialRain,
    /// Opens the plant invincibility window.
    PlantShield,
}

impl CraftItem {
    pub const ALL: [CraftItem; 4] = [
        CraftItem::HealingHerb,
        CraftItem::CrocodileSpeed,
        CraftItem::ArtificialRain,
        CraftItem::PlantShield,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            CraftItem::HealingHerb => "Healing Herb",
            CraftItem::CrocodileSpeed => "Crocodile Speed",
            CraftItem::ArtificialRain => "Artificial Rain",
            CraftItem::PlantShield => "Plant Shield",
        }
    }

    pub fn cost(self) -> Cost {
        match self {
            CraftItem::HealingHerb | CraftItem::PlantShield => &[(Resource::Leafium, 10)],
            CraftItem::CrocodileSpeed => &[(Resource::Animite, 10)],
            CraftItem::ArtificialRain => &[(Resource::Ecopoint, 10)],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemSlot {
    pub quantity: u32,
    crafting: bool,
    progress: f32,
}

impl ItemSlot {
    pub fn is_crafting(&self) -> bool {
        self.crafting
    }

    /// Milliseconds left on the current craft, or zero when idle.
    pub fn remaining(&self, craft_time: f32) -> f32 {
        if self.crafting { (craft_time - self.progress).max(0.0) } else { 0.0 }
    }
}

/// Item inventory. Crafting pays up front and finishes after `craft_time` of
/// unpaused simulation time; one craft per item kind at a time.
#[derive(Debug, Clone)]
pub struct CraftingSystem {
    slots: [ItemSlot; CraftItem::ALL.len()],
    craft_time: f32,
    ticker: Ticker,
}

impl CraftingSystem {
    pub fn new(now: f64) -> Self {
        Self {
            slots: [ItemSlot::default(); CraftItem::ALL.len()],
            craft_time: CRAFT_TIME_MS,
            ticker: Ticker::new(now),
        }
    }

    pub fn slot(&self, item: CraftItem) -> &ItemSlot {
        &self.slots[item.index()]
    }

    pub fn craft_time(&self) -> f32 {
        self.craft_time
    }

    pub fn try_craft(&mut self, item: CraftItem, ledger: &mut ResourceLedger) -> Result<(), EcoError> {
        let slot = &mut self.slots[item.index()];
        if slot.crafting {
            return Err(EcoError::AlreadyCrafting);
        }
        ledger.spend(item.cost())?;
        slot.crafting = true;
        slot.progress = 0.0;
        Ok(())
    }

    /// Take one crafted `item` out of the inventory. The caller applies its effect.
    pub fn try_use(&mut self, item: CraftItem) -> Result<(), EcoError> {
        let slot = &mut self.slots[item.index()];
        if slot.quantity == 0 {
            return Err(EcoError::NothingToUse);
        }
        slot.quantity -= 1;
        Ok(())
    }

    /// Advance every running craft. Returns the items finished this step.
    pub fn update(&mut self, now: f64, speed: f32, paused: bool) -> Vec<CraftItem> {
        let delta = self.ticker.sample(now, speed, paused);
        if paused {
            return Vec::new();
        }
        let mut finished = Vec::new();
        for item in CraftItem::ALL {
            let slot = &mut self.slots[item.index()];
            if !slot.crafting {
                continue;
            }
            slot.progress += delta;
            if slot.progress > self.craft_time {
                slot.progress = 0.0;
                slot.crafting = false;
                slot.quantity += 1;
                finished.push(item);
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;

    fn rich_ledger() -> ResourceLedger {
        ResourceLedger::new(0.0, &LedgerConfig { starting_balance: 100, ..Default::default() })
    }

    #[test]
    fn test_unlock_applies_once() {
        let mut tree = TechTree::new();
        let mut ledger = rich_ledger();
        let mut config = SimulationConfig::default();
        let base = config.crocodile.reproduction_threshold;

        tree.unlock(Tech::CrocodileBirthControl, &mut ledger, &mut config).unwrap();
        assert_eq!(ledger.get(Resource::Animite), 80);
        for season in Season::CYCLE {
            assert_eq!(config.crocodile.reproduction_threshold.get(season), base.get(season) + 1);
        }

        let again = tree.unlock(Tech::CrocodileBirthControl, &mut ledger, &mut config);
        assert_eq!(again, Err(EcoError::AlreadyUnlocked));
        assert_eq!(ledger.get(Resource::Animite), 80);
        assert_eq!(config.crocodile.reproduction_threshold.get(Season::Spring), base.spring + 1);
    }

    #[test]
    fn test_unaffordable_unlock_is_noop() {
        let mut tree = TechTree::new();
        let mut ledger = ResourceLedger::new(0.0, &LedgerConfig::default());
        ledger.gain(Resource::Leafium, 15);
        let mut config = SimulationConfig::default();

        let result = tree.unlock(Tech::PlantShelter, &mut ledger, &mut config);
        assert!(matches!(result, Err(EcoError::InsufficientResources { resource: "ecopoint", .. })));
        assert_eq!(ledger.get(Resource::Leafium), 15);
        assert!(!tree.is_unlocked(Tech::PlantShelter));
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_tech_effects() {
        let mut tree = TechTree::new();
        let mut ledger = rich_ledger();
        let mut config = SimulationConfig::default();
        for tech in [Tech::GrowthAlpha, Tech::RabbitSpeed, Tech::EcoRegulation, Tech::AnimalBufferZone] {
            tree.unlock(tech, &mut ledger, &mut config).unwrap();
        }
        assert_eq!(config.plant.reproduction_interval, 1500.0);
        assert!((config.rabbit.ave_speed - 1.1).abs() < 1e-6);
        assert_eq!(config.rabbit.min_plant_distance, 50.0);
        assert_eq!(config.ledger.eco_interval, 5000.0);
        assert_eq!(config.season.speed_multipliers.winter, 0.8);
        assert_eq!(tree.unlocked().count(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_crafting_cycle() {
        let mut crafting = CraftingSystem::new(0.0);
        let mut ledger = rich_ledger();

        assert_eq!(crafting.try_use(CraftItem::ArtificialRain), Err(EcoError::NothingToUse));
        crafting.try_craft(CraftItem::ArtificialRain, &mut ledger).unwrap();
        assert_eq!(ledger.get(Resource::Ecopoint), 90);
        assert_eq!(
            crafting.try_craft(CraftItem::ArtificialRain, &mut ledger),
            Err(EcoError::AlreadyCrafting)
        );
        assert_eq!(ledger.get(Resource::Ecopoint), 90);

        // Paused time does not count toward the craft.
        let slot = *crafting.slot(CraftItem::ArtificialRain);
        assert_eq!(slot.remaining(crafting.craft_time()), CRAFT_TIME_MS);
        assert!(crafting.update(20_000.0, 1.0, true).is_empty());
        assert_eq!(crafting.slot(CraftItem::ArtificialRain).remaining(crafting.craft_time()), CRAFT_TIME_MS);
        assert!(crafting.update(25_000.0, 1.0, false).is_empty());
        assert_eq!(crafting.slot(CraftItem::ArtificialRain).remaining(crafting.craft_time()), 5_000.0);
        assert_eq!(crafting.update(30_001.0, 1.0, false), vec![CraftItem::ArtificialRain]);
        assert_eq!(crafting.slot(CraftItem::ArtificialRain).quantity, 1);

        assert_eq!(crafting.slot(CraftItem::ArtificialRain).remaining(crafting.craft_time()), 0.0);

        crafting.try_use(CraftItem::ArtificialRain).unwrap();
        assert_eq!(crafting.slot(CraftItem::ArtificialRain).quantity, 0);
    }

    #[test]
    fn test_tech_catalogue_by_area() {
        let count = |area| Tech::ALL.iter().filter(|t| t.area() == area).count();
        assert_eq!(count(TechArea::Plants), 4);
        assert_eq!(count(TechArea::Animals), 4);
        assert_eq!(count(TechArea::Weather), 3);
        assert_eq!(count(TechArea::Buildings), 3);
        for tech in Tech::ALL {
            assert!(!tech.description().is_empty(), "{} has no description", tech.name());
            assert!(!tech.cost().is_empty());
        }
        assert_eq!(Tech::ColdResistance.description(), "Plants no longer die from the cold");
    }
}
// --- End of File: tech.rs ---
