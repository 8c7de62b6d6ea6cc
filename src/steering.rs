// --- File: steering.rs ---
use crate::animal::{Animal, AnimalKind, AnimalPopulation, HuntMode, StepContext};
use crate::config::{CrocodileConfig, MapConfig, RabbitConfig};
use crate::constants::*;
use crate::plant::PlantPopulation;
use crate::utils::{SimRng, heading_to, heading_vector, inner_bounds};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, PI};

/// Herbivore as seen by others at the start of the movement phase.
#[derive(Debug, Clone, Copy)]
pub struct HerbivoreView {
    pub position: Vec2,
    pub infected: bool,
    pub immune: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PlantView {
    pub position: Vec2,
    pub medicative: bool,
}

/// Read-only snapshot every steering decision is made against.
#[derive(Debug, Clone, Default)]
pub struct Neighborhood {
    pub herbivores: Vec<HerbivoreView>,
    pub predators: Vec<Vec2>,
    pub plants: Vec<PlantView>,
}

impl Neighborhood {
    pub fn capture(herbivores: &AnimalPopulation, predators: &AnimalPopulation, plants: &PlantPopulation) -> Self {
        Self {
            herbivores: herbivores
                .iter()
                .map(|a| {
                    let state = a.herbivore();
                    HerbivoreView {
                        position: a.position,
                        infected: state.is_some_and(|s| s.is_infected()),
                        immune: state.is_some_and(|s| s.is_immune()),
                    }
                })
                .collect(),
            predators: predators.positions().collect(),
            plants: plants
                .iter()
                .map(|p| PlantView {
                    position: p.position,
                    medicative: p.medicative,
                })
                .collect(),
        }
    }
}

// --- Predator ---

/// Move every predator. Prey caught this step is appended to `killed`
/// (indices into the herbivore pool); nothing is removed here.
pub fn move_predators(
    predators: &mut AnimalPopulation,
    config: &mut CrocodileConfig,
    hood: &Neighborhood,
    ctx: &StepContext,
    killed: &mut Vec<usize>,
    rng: &mut SimRng,
) {
    let mut boosting = config.boosting;
    for predator in predators.iter_mut() {
        let Some(delta) = predator.begin_step(ctx, &*config, 0.0, &mut boosting, rng) else {
            continue;
        };
        steer_predator(predator, delta, hood, killed, config, ctx.map, rng);
        predator.finish_step(ctx.map);
    }
    config.boosting = boosting;
}

fn steer_predator(
    predator: &mut Animal,
    delta: f32,
    hood: &Neighborhood,
    killed: &mut Vec<usize>,
    config: &CrocodileConfig,
    map: &MapConfig,
    rng: &mut SimRng,
) {
    let Animal {
        position,
        heading,
        effective_speed,
        eaten,
        kind,
        ..
    } = predator;
    let AnimalKind::Predator(state) = kind else {
        return;
    };
    let position = *position;

    match state.mode {
        HuntMode::Hunting => {
            let prey = hood
                .herbivores
                .iter()
                .enumerate()
                .filter(|(i, _)| !killed.contains(i))
                .map(|(i, view)| (i, view.position, position.distance(view.position)))
                .filter(|&(_, _, dist)| dist < config.min_hunt_distance)
                .min_by(|a, b| a.2.total_cmp(&b.2));

            if let Some((index, target, dist)) = prey {
                *heading = heading_to(position, target) + rng.gen_range(-PI / 8.0..=PI / 8.0);
                if dist < config.min_eat_distance {
                    killed.push(index);
                    *eaten += 1;
                    state.kills += 1;
                    state.total_kills += 1;
                    log::debug!("Predator caught prey at ({:.0}, {:.0})", target.x, target.y);
                    if state.kills >= config.rest_num {
                        state.kills = 0;
                        state.mode = HuntMode::Resting;
                    }
                }
            }
        }
        HuntMode::Resting => {
            state.rest_time += delta;
            let margin = state.edge_margin;
            let near_edge = position.x < margin
                || position.x > map.width - margin
                || position.y < margin
                || position.y > map.height - margin;

            if near_edge {
                *effective_speed *= config.rest_speed_rate;
            } else {
                let target = Vec2::new(
                    if position.x < map.width / 2.0 { 0.0 } else { map.width },
                    if position.y < map.height / 2.0 { 0.0 } else { map.height },
                );
                *heading = heading_to(position, target) + rng.gen_range(-PI / 6.0..=PI / 6.0);
                *effective_speed *= config.full_speed_rate;
            }

            if state.rest_time > config.rest_duration {
                state.rest_time = 0.0;
                state.mode = HuntMode::Hunting;
            }
        }
    }
}

// --- Herbivore ---

/// Move every herbivore not in `killed`. Infections spread by proximity are
/// collected during the pass and applied once it completes.
pub fn move_herbivores(
    herbivores: &mut AnimalPopulation,
    config: &mut RabbitConfig,
    hood: &Neighborhood,
    plants_invincible: bool,
    ctx: &StepContext,
    killed: &[usize],
    rng: &mut SimRng,
) -> usize {
    let mut boosting = config.boosting;
    let mut exposed: Vec<usize> = Vec::new();

    for (index, herbivore) in herbivores.iter_mut().enumerate() {
        if killed.contains(&index) {
            herbivore.refresh_clock(ctx.now);
            continue;
        }
        let (energy, infected) = herbivore
            .herbivore()
            .map_or((0, false), |s| (s.energy, s.is_infected()));
        let eat_boost = energy.min(config.max_eat_boost) as f32 * config.plant_eat_boost;
        let infection_down = if infected { config.infection_speed_down } else { 0.0 };

        let Some(delta) = herbivore.begin_step(ctx, &*config, eat_boost - infection_down, &mut boosting, rng)
        else {
            continue;
        };

        if infected {
            herbivore.age += delta * config.infected_multiplier;
            let range_sq = config.infection_range * config.infection_range;
            exposed.extend(hood.herbivores.iter().enumerate().filter_map(|(other, view)| {
                let close = view.position.distance_squared(herbivore.position) < range_sq;
                (other != index && !view.infected && !view.immune && close && !killed.contains(&other))
                    .then_some(other)
            }));
        }

        steer_herbivore(herbivore, index, hood, plants_invincible, killed, config, ctx.map, rng);
        herbivore.finish_step(ctx.map);
    }
    config.boosting = boosting;

    exposed.sort_unstable();
    exposed.dedup();
    let mut newly_infected = 0;
    for index in exposed {
        if let Some(state) = herbivores.get_mut(index).and_then(Animal::herbivore_mut) {
            if state.infect() {
                newly_infected += 1;
            }
        }
    }
    if newly_infected > 0 {
        log::debug!("{} herbivores caught the infection", newly_infected);
    }
    newly_infected
}

/// Inverse-square weighted centre of the predators within `radius`.
fn predator_center(position: Vec2, predators: &[Vec2], radius: f32) -> Option<Vec2> {
    let mut weighted = Vec2::ZERO;
    let mut total = 0.0;
    for &predator in predators {
        let dist = position.distance(predator);
        if dist < radius {
            let weight = 1.0 / (dist * dist + PREDATOR_WEIGHT_EPSILON);
            weighted += predator * weight;
            total += weight;
        }
    }
    (total > 0.0).then(|| weighted / total)
}

/// Quadratic push back toward the interior once `pos` passes `min` or `max`.
fn boundary_force(pos: f32, min: f32, max: f32) -> f32 {
    if pos < min {
        (min - pos).powi(2) / EDGE_MARGIN.powi(2)
    } else if pos > max {
        -(pos - max).powi(2) / EDGE_MARGIN.powi(2)
    } else {
        0.0
    }
}

fn nearest_plant(position: Vec2, plants: &[PlantView], radius: f32, medicative_only: bool) -> Option<Vec2> {
    plants
        .iter()
        .filter(|p| !medicative_only || p.medicative)
        .map(|p| (p.position, position.distance(p.position)))
        .filter(|&(_, dist)| dist < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

#[allow(clippy::too_many_arguments)]
fn steer_herbivore(
    herbivore: &mut Animal,
    index: usize,
    hood: &Neighborhood,
    plants_invincible: bool,
    killed: &[usize],
    config: &RabbitConfig,
    map: &MapConfig,
    rng: &mut SimRng,
) {
    let position = herbivore.position;

    // 1. Flee predators.
    if let Some(center) = predator_center(position, &hood.predators, config.min_croc_distance) {
        let escape = position - center;
        let boundary = Vec2::new(
            boundary_force(position.x, EDGE_MARGIN, map.width - EDGE_MARGIN),
            boundary_force(position.y, EDGE_MARGIN, map.height - EDGE_MARGIN),
        );
        let combined = escape * ESCAPE_WEIGHT + boundary * BOUNDARY_WEIGHT;
        let mut angle = combined.y.atan2(combined.x);

        // Slide along a wall instead of running into it.
        let (min, max) = inner_bounds(map, herbivore.half_size);
        let test = heading_vector(angle) * herbivore.effective_speed;
        let next = position + test;
        if next.x < min.x || next.x > max.x {
            angle = FRAC_PI_2.copysign(test.y);
        }
        if next.y < min.y || next.y > max.y {
            angle = if test.x > 0.0 { 0.0 } else { PI };
        }

        // Less noise near the edges keeps escapes from oscillating there.
        let proximity_x = (position.x - EDGE_MARGIN)
            .abs()
            .min((position.x - (map.width - EDGE_MARGIN)).abs())
            / EDGE_MARGIN;
        let proximity_y = (position.y - EDGE_MARGIN)
            .abs()
            .min((position.y - (map.height - EDGE_MARGIN)).abs())
            / EDGE_MARGIN;
        let proximity = proximity_x.min(proximity_y).min(1.0);
        let noise = MIN_ESCAPE_NOISE.max(MAX_ESCAPE_NOISE * proximity);
        herbivore.heading = angle + rng.gen_range(-noise..=noise);
        return;
    }

    // 2. Keep apart from other herbivores.
    let crowding = hood.herbivores.iter().enumerate().find(|(other, view)| {
        *other != index && !killed.contains(other) && position.distance(view.position) < config.min_distance
    });
    if let Some((_, other)) = crowding {
        herbivore.heading = heading_to(other.position, position) + rng.gen_range(0.0..=FRAC_PI_2);
        return;
    }

    // 3. Forage; an infected herbivore heads for a cure first.
    if plants_invincible {
        return;
    }
    let cure = herbivore
        .is_infected()
        .then(|| nearest_plant(position, &hood.plants, config.min_plant_distance_infected, true))
        .flatten();
    let target = cure.or_else(|| nearest_plant(position, &hood.plants, config.min_plant_distance, false));
    if let Some(target) = target {
        herbivore.heading = heading_to(position, target) + rng.gen_range(-PI / 10.0..=PI / 10.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::SpeciesConfig;
    use rand::SeedableRng;

    fn ctx(map: &MapConfig, now: f64) -> StepContext<'_> {
        StepContext {
            now,
            time_multiplier: 1.0,
            paused: false,
            season_multiplier: 1.0,
            map,
        }
    }

    fn view(x: f32, y: f32) -> HerbivoreView {
        HerbivoreView {
            position: Vec2::new(x, y),
            infected: false,
            immune: false,
        }
    }

    #[test]
    fn test_predator_catches_and_rests() {
        let mut config = CrocodileConfig::default();
        let map = MapConfig::default();
        let mut rng = SimRng::seed_from_u64(31);
        let mut predators = AnimalPopulation::new();
        predators.push(config.spawn(Vec2::new(400.0, 400.0), 0.0, &mut rng));
        let hood = Neighborhood {
            herbivores: vec![view(900.0, 400.0), view(400.0 + config.min_eat_distance - 1.0, 400.0)],
            ..Default::default()
        };
        let mut killed = Vec::new();
        move_predators(&mut predators, &mut config, &hood, &ctx(&map, 16.0), &mut killed, &mut rng);

        assert_eq!(killed, vec![1]);
        let predator = predators.get(0).unwrap();
        assert_eq!(predator.eaten, 1);
        assert_eq!(predator.predator().unwrap().mode, HuntMode::Resting);
    }

    #[test]
    fn test_resting_predator_returns_to_hunting() {
        let mut config = CrocodileConfig::default();
        let map = MapConfig::default();
        let mut rng = SimRng::seed_from_u64(32);
        let mut predators = AnimalPopulation::new();
        let mut predator = config.spawn(Vec2::new(640.0, 400.0), 0.0, &mut rng);
        if let AnimalKind::Predator(state) = &mut predator.kind {
            state.mode = HuntMode::Resting;
        }
        predators.push(predator);
        let hood = Neighborhood::default();
        let mut killed = Vec::new();
        let mut now = 0.0;
        while now < f64::from(config.rest_duration) + 1000.0 {
            now += 500.0;
            move_predators(&mut predators, &mut config, &hood, &ctx(&map, now), &mut killed, &mut rng);
        }
        assert_eq!(predators.get(0).unwrap().predator().unwrap().mode, HuntMode::Hunting);
    }

    #[test]
    fn test_herbivore_flees_nearby_predator() {
        let mut config = RabbitConfig::default();
        let map = MapConfig::default();
        let mut rng = SimRng::seed_from_u64(33);
        let mut herbivores = AnimalPopulation::new();
        herbivores.push(config.spawn(Vec2::new(640.0, 400.0), 0.0, &mut rng));
        let hood = Neighborhood {
            herbivores: vec![view(640.0, 400.0)],
            predators: vec![Vec2::new(540.0, 400.0)],
            plants: Vec::new(),
        };
        move_herbivores(&mut herbivores, &mut config, &hood, false, &ctx(&map, 16.0), &[], &mut rng);
        let herbivore = herbivores.get(0).unwrap();
        assert!(herbivore.position.x > 640.0, "moved away from the predator");
    }

    #[test]
    fn test_infected_herbivore_exposes_neighbours() {
        let mut config = RabbitConfig::default();
        let map = MapConfig::default();
        let mut rng = SimRng::seed_from_u64(34);
        let mut herbivores = AnimalPopulation::new();
        let mut carrier = config.spawn(Vec2::new(300.0, 300.0), 0.0, &mut rng);
        carrier.herbivore_mut().unwrap().infect();
        herbivores.push(carrier);
        herbivores.push(config.spawn(Vec2::new(340.0, 300.0), 0.0, &mut rng));
        herbivores.push(config.spawn(Vec2::new(900.0, 600.0), 0.0, &mut rng));
        let hood = Neighborhood::capture(&herbivores, &AnimalPopulation::new(), &PlantPopulation::empty(0.0));

        let infected = move_herbivores(&mut herbivores, &mut config, &hood, false, &ctx(&map, 16.0), &[], &mut rng);
        assert_eq!(infected, 1);
        assert!(herbivores.get(1).unwrap().is_infected());
        assert!(!herbivores.get(2).unwrap().is_infected());
        // Infected herbivores age faster.
        assert!(herbivores.get(0).unwrap().age > herbivores.get(2).unwrap().age);
    }

    #[test]
    fn test_infected_herbivore_prefers_medicative_plant() {
        let config = RabbitConfig::default();
        let map = MapConfig::default();
        let mut rng = SimRng::seed_from_u64(35);
        let mut herbivore = config.spawn(Vec2::new(400.0, 400.0), 0.0, &mut rng);
        herbivore.herbivore_mut().unwrap().infect();
        let hood = Neighborhood {
            herbivores: vec![view(400.0, 400.0)],
            predators: Vec::new(),
            plants: vec![
                PlantView { position: Vec2::new(440.0, 400.0), medicative: false },
                PlantView { position: Vec2::new(400.0, 520.0), medicative: true },
            ],
        };
        steer_herbivore(&mut herbivore, 0, &hood, false, &[], &config, &map, &mut rng);
        // Heading points down toward the medicative plant (pi/2 +- pi/10).
        assert!((herbivore.heading - FRAC_PI_2).abs() <= PI / 10.0 + 1e-4);
    }

    #[test]
    fn test_boundary_force_is_quadratic() {
        assert_eq!(boundary_force(100.0, 60.0, 1220.0), 0.0);
        let shallow = boundary_force(50.0, 60.0, 1220.0);
        let deep = boundary_force(40.0, 60.0, 1220.0);
        assert!((deep / shallow - 4.0).abs() < 1e-4);
        assert!(boundary_force(1240.0, 60.0, 1220.0) < 0.0);
    }
}
// --- End of File: steering.rs ---
