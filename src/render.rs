// --- File: render.rs ---
// Read-only frame description handed to whatever draws the world.
use crate::animal::{Animal, AnimalKind, AnimalPopulation, HuntMode};
use crate::disaster::DisasterNotice;
use crate::plant::PlantPopulation;
use crate::season::Raindrop;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SpriteKey {
    Plant = 0,
    MedicativePlant = 1,
    Rabbit = 2,
    InfectedRabbit = 3,
    Crocodile = 4,
    RestingCrocodile = 5,
    Raindrop = 6,
}

// `repr(C)` keeps the layout stable for upload as a GPU instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EntityInstance {
    pub world_position: [f32; 2],
    pub half_size: [f32; 2],
    pub heading: f32,
    pub sprite: u32,
    pub _padding: [f32; 2],
}

impl EntityInstance {
    fn new(position: [f32; 2], half_size: [f32; 2], heading: f32, sprite: SpriteKey) -> Self {
        Self {
            world_position: position,
            half_size,
            heading,
            sprite: sprite as u32,
            _padding: [0.0; 2],
        }
    }

    fn from_animal(animal: &Animal) -> Self {
        let sprite = match &animal.kind {
            AnimalKind::Herbivore(state) if state.is_infected() => SpriteKey::InfectedRabbit,
            AnimalKind::Herbivore(_) => SpriteKey::Rabbit,
            AnimalKind::Predator(state) if state.mode == HuntMode::Resting => SpriteKey::RestingCrocodile,
            AnimalKind::Predator(_) => SpriteKey::Crocodile,
        };
        Self::new(animal.position.into(), animal.half_size.into(), animal.heading, sprite)
    }
}

/// Heads-up display values.
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub calendar: String,
    pub season: &'static str,
    pub speed: u32,
    pub paused: bool,
    pub leafium: u64,
    pub animite: u64,
    pub ecopoint: u64,
    pub notice: Option<(&'static str, u8, u8)>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub background: [f32; 3],
    pub instances: Vec<EntityInstance>,
    pub hud: Hud,
}

impl Scene {
    /// Instances in draw order: plants, rabbits, crocodiles, then rain on top.
    pub fn collect_instances(
        plants: &PlantPopulation,
        herbivores: &AnimalPopulation,
        predators: &AnimalPopulation,
        raindrops: &[Raindrop],
    ) -> Vec<EntityInstance> {
        let mut instances = Vec::with_capacity(plants.len() + herbivores.len() + predators.len() + raindrops.len());
        instances.extend(plants.iter().map(|p| {
            let sprite = if p.medicative { SpriteKey::MedicativePlant } else { SpriteKey::Plant };
            EntityInstance::new(p.position.into(), p.half_size.into(), 0.0, sprite)
        }));
        instances.extend(herbivores.iter().map(EntityInstance::from_animal));
        instances.extend(predators.iter().map(EntityInstance::from_animal));
        instances.extend(
            raindrops
                .iter()
                .map(|d| EntityInstance::new([d.x, d.y], [1.0, 5.0], 0.0, SpriteKey::Raindrop)),
        );
        instances
    }

    pub fn notice_overlay(notice: Option<&DisasterNotice>) -> Option<(&'static str, u8, u8)> {
        notice.map(|n| (n.kind.message(), n.alpha(), n.box_alpha()))
    }

    /// Raw bytes of the instance buffer, ready for upload.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn count(&self, sprite: SpriteKey) -> usize {
        self.instances.iter().filter(|i| i.sprite == sprite as u32).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::SpeciesConfig;
    use crate::config::{CrocodileConfig, RabbitConfig};
    use crate::plant::Plant;
    use crate::utils::SimRng;
    use glam::Vec2;
    use rand::SeedableRng;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<EntityInstance>(), 32);
    }

    #[test]
    fn test_collect_instances_marks_states() {
        let mut rng = SimRng::seed_from_u64(9);
        let mut plants = PlantPopulation::empty(0.0);
        plants.push(Plant {
            position: Vec2::new(50.0, 50.0),
            half_size: Vec2::splat(10.0),
            medicative: true,
        });
        let mut herbivores = AnimalPopulation::new();
        let mut sick = RabbitConfig::default().spawn(Vec2::new(200.0, 200.0), 0.0, &mut rng);
        sick.herbivore_mut().unwrap().infect();
        herbivores.push(sick);
        let mut predators = AnimalPopulation::new();
        predators.push(CrocodileConfig::default().spawn(Vec2::new(600.0, 400.0), 0.0, &mut rng));

        let scene = Scene {
            background: [0.0; 3],
            instances: Scene::collect_instances(&plants, &herbivores, &predators, &[]),
            hud: Hud {
                calendar: String::new(),
                season: "Spring",
                speed: 1,
                paused: false,
                leafium: 0,
                animite: 0,
                ecopoint: 0,
                notice: None,
            },
        };
        assert_eq!(scene.count(SpriteKey::MedicativePlant), 1);
        assert_eq!(scene.count(SpriteKey::InfectedRabbit), 1);
        assert_eq!(scene.count(SpriteKey::Crocodile), 1);
        assert_eq!(scene.instance_bytes().len(), 3 * 32);
    }
}
// --- End of File: render.rs ---
