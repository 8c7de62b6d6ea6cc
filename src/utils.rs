use crate::config::MapConfig;
use crate::constants::PLACEMENT_ATTEMPTS;
use glam::Vec2;
use rand::Rng;
use rand::rngs::StdRng;

pub type SimRng = StdRng;

// --- Helper Functions ---

pub fn lerp_color(from: [f32; 3], to: [f32; 3], t: f32) -> [f32; 3] {
    [
        from[0] + (to[0] - from[0]) * t,
        from[1] + (to[1] - from[1]) * t,
        from[2] + (to[2] - from[2]) * t,
    ]
}

pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

pub fn heading_to(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Lowest and highest legal centre position for an entity of `half_size`.
pub fn inner_bounds(map: &MapConfig, half_size: Vec2) -> (Vec2, Vec2) {
    (half_size, Vec2::new(map.width, map.height) - half_size)
}

pub fn random_position(rng: &mut impl Rng, map: &MapConfig, half_size: Vec2) -> Vec2 {
    let (min, max) = inner_bounds(map, half_size);
    Vec2::new(rng.gen_range(min.x..=max.x), rng.gen_range(min.y..=max.y))
}

/// Reject-and-retry placement: draw up to [`PLACEMENT_ATTEMPTS`] positions and
/// return the first one at least `min_distance` from every point in `occupied`.
/// `None` means the budget ran out and the spawn is skipped.
pub fn place_with_retry<I>(
    rng: &mut impl Rng,
    map: &MapConfig,
    half_size: Vec2,
    min_distance: f32,
    occupied: I,
) -> Option<Vec2>
where
    I: IntoIterator<Item = Vec2> + Clone,
{
    let min_distance_sq = min_distance * min_distance;
    (0..PLACEMENT_ATTEMPTS)
        .map(|_| random_position(&mut *rng, map, half_size))
        .find(|candidate| {
            occupied
                .clone()
                .into_iter()
                .all(|p| p.distance_squared(*candidate) >= min_distance_sq)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_placement_respects_min_distance() {
        let map = MapConfig::default();
        let mut rng = SimRng::seed_from_u64(11);
        let mut placed: Vec<Vec2> = Vec::new();
        for _ in 0..30 {
            if let Some(p) = place_with_retry(&mut rng, &map, Vec2::splat(10.0), 50.0, placed.iter().copied()) {
                placed.push(p);
            }
        }
        assert!(placed.len() > 20);
        for (i, a) in placed.iter().enumerate() {
            assert!(a.x >= 10.0 && a.x <= map.width - 10.0);
            for b in &placed[i + 1..] {
                assert!(a.distance(*b) >= 50.0);
            }
        }
    }

    #[test]
    fn test_placement_gives_up_on_full_map() {
        let map = MapConfig { width: 40.0, height: 40.0 };
        let mut rng = SimRng::seed_from_u64(5);
        let occupied = [Vec2::new(20.0, 20.0)];
        let spot = place_with_retry(&mut rng, &map, Vec2::splat(10.0), 100.0, occupied.iter().copied());
        assert!(spot.is_none());
    }
}
