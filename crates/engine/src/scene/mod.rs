pub mod behavior;
pub mod clock;
pub mod entity;
pub mod registry;
pub mod rng;
pub mod tree;

use thiserror::Error;

pub use behavior::{
    Behavior, DanceChannel, DanceToggle, PathFollowingBehavior, RotateBehavior, ScaleBehavior,
    SineWaveBehavior, TreeDanceBehavior,
};
pub use clock::{FrameClock, FrameTime};
pub use entity::{
    palette_color, Capability, Circle, EntityId, FractalTree, Pivot, Point, Precision, Primitive,
    Rgb, RimStyle, Shape, SineWave, Triangle, PALETTE,
};
pub use registry::{AttachError, Player, SceneEntity, SceneRegistry};
pub use rng::{with_seed, SceneRng};
pub use tree::{generate as generate_tree, randomness_factor, Branch};

/// Rejected shape or behavior configuration. Everything here fails at
/// construction time, never mid-frame.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("a fractal tree with non-zero length needs depth of at least 1")]
    DegenerateTreeDepth,
    #[error("tree random range must lie in [0, 1], got {value}")]
    RandomRangeOutOfBounds { value: f32 },
    #[error("a waypoint path needs at least one waypoint")]
    EmptyWaypointPath,
}
