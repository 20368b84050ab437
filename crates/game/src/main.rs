use engine::{
    palette_color, run_app, AttachError, Circle, ConfigError, DanceToggle, FractalTree, LoopConfig,
    PathFollowingBehavior, Pivot, Point, Precision, Rgb, RimStyle, RotateBehavior, ScaleBehavior,
    Scene, SceneRegistry, Shape, SineWave, SineWaveBehavior, TreeDanceBehavior, Triangle,
};
use glam::Vec2;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const SEED_ENV_VAR: &str = "GROVE_SEED";
const MARKER_COLOR: Rgb = Rgb::new(0.95, 0.45, 0.35);
const RIBBON_COLOR: Rgb = Rgb::new(0.42, 0.68, 0.86);
const GEAR_COLOR: Rgb = Rgb::new(0.82, 0.67, 0.28);
const MARKER_DWELL_SECONDS: f32 = 0.8;

#[derive(Debug, Error)]
enum ShowcaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Attach(#[from] AttachError),
}

/// Demo population: one dancing tree, one pulsing gear circle, one
/// traveling ribbon, one marker patrolling a square. Clicks grow more
/// shapes at the pointer; digit keys 1-4 flip the dance channels.
struct ShowcaseScene;

impl ShowcaseScene {
    fn populate(&mut self, registry: &mut SceneRegistry) -> Result<(), ShowcaseError> {
        let tree_seed = registry.rng.next_int() as u64;
        let tree = FractalTree::new(
            Vec2::new(-240.0, -280.0),
            8,
            90.0,
            26.0,
            0.72,
            6.0,
            0.35,
            tree_seed,
        )?;
        let tree_id = registry.spawn(Shape::FractalTree(tree.clone()));
        registry.attach(Box::new(TreeDanceBehavior::new(tree_id, &tree)))?;

        let mut gear = Circle::new(Vec2::new(230.0, 140.0), 60.0, GEAR_COLOR);
        gear.rim = RimStyle::QuantizedSine {
            amplitude: 0.12,
            lobes: 9,
            steps: 2,
        };
        gear.precision = Precision::Fixed(72);
        let gear_id = registry.spawn(Shape::Circle(gear));
        registry.attach(Box::new(RotateBehavior::new(gear_id, 45.0)))?;
        registry.attach(Box::new(ScaleBehavior::new(gear_id, 1.0, 0.2, 2.0)))?;

        let ribbon = SineWave {
            anchor: Vec2::new(-340.0, 210.0),
            length: 260.0,
            amplitude: 26.0,
            frequency: 0.06,
            phase: 0.0,
            color: RIBBON_COLOR,
        };
        let ribbon_id = registry.spawn(Shape::SineWave(ribbon));
        registry.attach(Box::new(SineWaveBehavior::new(ribbon_id, 3.0)))?;

        let marker = Point {
            position: Vec2::new(120.0, -160.0),
            size: 6.0,
            color: MARKER_COLOR,
        };
        let marker_id = registry.spawn(Shape::Point(marker));
        let patrol = vec![
            Vec2::new(120.0, -160.0),
            Vec2::new(280.0, -160.0),
            Vec2::new(280.0, -40.0),
            Vec2::new(120.0, -40.0),
        ];
        registry.attach(Box::new(PathFollowingBehavior::new(
            marker_id,
            patrol,
            MARKER_DWELL_SECONDS,
        )?))?;

        Ok(())
    }

    fn spawn_at_pointer(
        &mut self,
        world: Vec2,
        registry: &mut SceneRegistry,
    ) -> Result<(), ShowcaseError> {
        match registry.rng.next_int() % 3 {
            0 => {
                let seed = registry.rng.next_int() as u64;
                let depth = 4 + registry.rng.next_int() % 4;
                let length = registry.rng.next_in_range(40.0, 80.0);
                let tree =
                    FractalTree::new(world, depth, length, 24.0, 0.7, 4.0, 0.3, seed)?;
                let id = registry.spawn(Shape::FractalTree(tree.clone()));
                registry.attach(Box::new(TreeDanceBehavior::new(id, &tree)))?;
            }
            1 => {
                let radius = registry.rng.next_in_range(20.0, 55.0);
                let color = palette_color(registry.rng.next_int() as u64);
                let mut circle = Circle::new(world, radius, color);
                circle.rim = RimStyle::Sine {
                    amplitude: 0.1,
                    lobes: 6,
                };
                let id = registry.spawn(Shape::Circle(circle));
                let spin = registry.rng.next_in_range(-90.0, 90.0);
                registry.attach(Box::new(RotateBehavior::new(id, spin)))?;
            }
            _ => {
                let size = registry.rng.next_in_range(18.0, 40.0);
                let triangle = Triangle::new(
                    world,
                    [
                        (Vec2::new(0.0, size), palette_color(0)),
                        (Vec2::new(-size, -size), palette_color(2)),
                        (Vec2::new(size, -size), palette_color(4)),
                    ],
                    Pivot::Centroid,
                );
                let id = registry.spawn(Shape::Triangle(triangle));
                let spin = registry.rng.next_in_range(30.0, 120.0);
                registry.attach(Box::new(RotateBehavior::new(id, spin)))?;
            }
        }
        Ok(())
    }
}

impl Scene for ShowcaseScene {
    fn load(&mut self, registry: &mut SceneRegistry) {
        if let Err(err) = self.populate(registry) {
            error!(error = %err, "scene_population_failed");
        }
    }

    fn on_click(&mut self, world: Vec2, registry: &mut SceneRegistry) {
        match self.spawn_at_pointer(world, registry) {
            Ok(()) => info!(x = world.x, y = world.y, "shape_spawned"),
            Err(err) => warn!(error = %err, "click_spawn_failed"),
        }
    }

    fn on_toggle(&mut self, slot: usize, registry: &mut SceneRegistry) {
        let Some(toggle) = dance_toggle_for_slot(slot) else {
            return;
        };
        registry.toggle(toggle);
        info!(slot, ?toggle, "dance_toggled");
    }
}

fn dance_toggle_for_slot(slot: usize) -> Option<DanceToggle> {
    match slot {
        0 => Some(DanceToggle::SplitAngle),
        1 => Some(DanceToggle::Depth),
        2 => Some(DanceToggle::Length),
        3 => Some(DanceToggle::Randomness),
        _ => None,
    }
}

fn parse_seed(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!(value = trimmed, "invalid seed value; using OS entropy");
            None
        }
    }
}

fn seed_from_env() -> Option<u64> {
    std::env::var(SEED_ENV_VAR).ok().and_then(|raw| parse_seed(&raw))
}

fn main() {
    init_tracing();
    info!("=== Fractal Grove Startup ===");

    let config = LoopConfig {
        rng_seed: seed_from_env(),
        ..LoopConfig::default()
    };

    if let Err(err) = run_app(config, Box::new(ShowcaseScene)) {
        error!(error = %err, "startup_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{FrameTime, Player, SceneRng};

    fn seeded_registry() -> SceneRegistry {
        SceneRegistry::new(Player::new(180.0), SceneRng::seeded(42))
    }

    #[test]
    fn showcase_load_spawns_all_fixtures() {
        let mut registry = seeded_registry();
        ShowcaseScene.load(&mut registry);

        assert_eq!(registry.entity_count(), 4);
        // Dance, rotate, scale, ribbon phase, patrol.
        assert_eq!(registry.behavior_count(), 5);
    }

    #[test]
    fn showcase_population_is_reproducible_per_seed() {
        let mut first = seeded_registry();
        let mut second = seeded_registry();
        ShowcaseScene.load(&mut first);
        ShowcaseScene.load(&mut second);
        first.step(FrameTime::default());
        second.step(FrameTime::default());

        let seeds = |registry: &SceneRegistry| -> Vec<u64> {
            registry
                .entities()
                .iter()
                .filter_map(|entity| match &entity.shape {
                    Shape::FractalTree(tree) => Some(tree.seed),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(seeds(&first), seeds(&second));
    }

    #[test]
    fn click_spawn_adds_one_entity_with_behavior() {
        let mut registry = seeded_registry();
        let mut scene = ShowcaseScene;
        scene.load(&mut registry);
        registry.step(FrameTime::default());

        let before = registry.entity_count();
        scene.on_click(Vec2::new(50.0, 20.0), &mut registry);
        assert_eq!(registry.entity_count(), before + 1);
    }

    #[test]
    fn digit_slots_map_to_dance_toggles() {
        assert_eq!(dance_toggle_for_slot(0), Some(DanceToggle::SplitAngle));
        assert_eq!(dance_toggle_for_slot(1), Some(DanceToggle::Depth));
        assert_eq!(dance_toggle_for_slot(2), Some(DanceToggle::Length));
        assert_eq!(dance_toggle_for_slot(3), Some(DanceToggle::Randomness));
        assert_eq!(dance_toggle_for_slot(4), None);
    }

    #[test]
    fn seed_parsing_accepts_integers_only() {
        assert_eq!(parse_seed("1234"), Some(1234));
        assert_eq!(parse_seed("  77 "), Some(77));
        assert_eq!(parse_seed(""), None);
        assert_eq!(parse_seed("not-a-seed"), None);
    }
}
