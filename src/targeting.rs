use bevy::math::Vec2;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::config::SimConfig;
use crate::environment::{Environment, ZCutoff};

/// Reachable ledges, split by whether they are above the character.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledges {
    pub above: Vec<Vec2>,
    pub below: Vec<Vec2>,
}

impl Ledges {
    pub fn is_empty(&self) -> bool {
        self.above.is_empty() && self.below.is_empty()
    }
}

pub fn search_radius(env: &Environment, config: &SimConfig) -> f32 {
    let min_dim = env
        .smallest_monitor_dimension()
        .unwrap_or(config.fallback_min_dimension);
    min_dim * config.jump_range_fraction
}

/// Top-center points of every window that is close, a real height change
/// away, visible, and not hugging a monitor's top edge.
pub fn find_ledges(from: Vec2, env: &Environment, config: &SimConfig) -> Ledges {
    let radius = search_radius(env, config);
    let mut ledges = Ledges::default();

    for (rank, r) in env.platforms().ranked() {
        let point = r.top_center();
        if point.distance(from) > radius {
            continue;
        }
        if (point.y - from.y).abs() < config.min_jump_height {
            continue;
        }
        if env.is_obscured(point, ZCutoff::Above(rank)) {
            continue;
        }
        let near_ceiling = env
            .monitors()
            .iter()
            .any(|m| m.spans_x(point.x) && point.y < m.top + config.ceiling_margin);
        if near_ceiling {
            continue;
        }

        if point.y < from.y {
            ledges.above.push(point);
        } else {
            ledges.below.push(point);
        }
    }
    ledges
}

/// Pick one ledge: above is preferred `jump_up_bias` percent of the time,
/// otherwise below, falling back to whichever side has anything.
pub fn choose<R: Rng + ?Sized>(ledges: &Ledges, config: &SimConfig, rng: &mut R) -> Option<Vec2> {
    let prefer_up = rng.random_range(0..100) < config.jump_up_bias;
    let side = if prefer_up && !ledges.above.is_empty() {
        &ledges.above
    } else if !ledges.below.is_empty() {
        &ledges.below
    } else {
        &ledges.above
    };
    side.choose(rng).copied()
}

pub fn find_target<R: Rng + ?Sized>(
    from: Vec2,
    env: &Environment,
    config: &SimConfig,
    rng: &mut R,
) -> Option<Vec2> {
    let ledges = find_ledges(from, env, config);
    if ledges.is_empty() {
        return None;
    }
    choose(&ledges, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Platforms;
    use crate::geometry::ScreenRect;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MONITOR: ScreenRect = ScreenRect::new(0.0, 0.0, 1920.0, 1040.0);

    fn env_with(platforms: Vec<ScreenRect>) -> Environment {
        let mut env = Environment::new(vec![MONITOR]);
        env.replace_platforms(Platforms::new(platforms));
        env
    }

    #[test]
    fn radius_uses_smallest_dimension() {
        let config = SimConfig::default();
        assert!((search_radius(&env_with(vec![]), &config) - 208.0).abs() < 1e-3);
        assert!((search_radius(&Environment::default(), &config) - 2000.0).abs() < 1e-2);
    }

    #[test]
    fn ledges_are_filtered_and_partitioned() {
        let from = Vec2::new(500.0, 700.0);
        let env = env_with(vec![
            // above, in range
            ScreenRect::new(400.0, 600.0, 700.0, 650.0),
            // below, in range
            ScreenRect::new(350.0, 800.0, 750.0, 1000.0),
            // same level
            ScreenRect::new(400.0, 690.0, 700.0, 1000.0),
            // out of range
            ScreenRect::new(1400.0, 600.0, 1800.0, 900.0),
        ]);
        let ledges = find_ledges(from, &env, &SimConfig::default());
        assert_eq!(ledges.above, vec![Vec2::new(550.0, 600.0)]);
        assert_eq!(ledges.below, vec![Vec2::new(550.0, 800.0)]);
    }

    #[test]
    fn covered_ledge_is_skipped() {
        let from = Vec2::new(550.0, 700.0);
        let env = env_with(vec![
            ScreenRect::new(500.0, 500.0, 650.0, 640.0),
            ScreenRect::new(400.0, 600.0, 700.0, 900.0),
        ]);
        let ledges = find_ledges(from, &env, &SimConfig::default());
        // the covering window itself is a ledge, the covered one is not
        assert_eq!(ledges.above, vec![Vec2::new(575.0, 500.0)]);
        assert!(ledges.below.is_empty());
    }

    #[test]
    fn ceiling_ledge_is_skipped() {
        let from = Vec2::new(500.0, 150.0);
        let env = env_with(vec![ScreenRect::new(400.0, 20.0, 700.0, 300.0)]);
        assert!(find_ledges(from, &env, &SimConfig::default()).is_empty());
    }

    #[test]
    fn falls_back_to_the_non_empty_side() {
        let config = SimConfig {
            jump_up_bias: 100,
            ..SimConfig::default()
        };
        let ledges = Ledges {
            above: vec![],
            below: vec![Vec2::new(1.0, 2.0)],
        };
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(choose(&ledges, &config, &mut rng), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn zero_bias_always_goes_down_when_possible() {
        let config = SimConfig {
            jump_up_bias: 0,
            ..SimConfig::default()
        };
        let ledges = Ledges {
            above: vec![Vec2::new(0.0, 0.0)],
            below: vec![Vec2::new(9.0, 9.0)],
        };
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            assert_eq!(choose(&ledges, &config, &mut rng), Some(Vec2::new(9.0, 9.0)));
        }
    }

    #[test]
    fn nothing_to_choose_from() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            find_target(Vec2::ZERO, &Environment::default(), &SimConfig::default(), &mut rng),
            None
        );
    }
}
