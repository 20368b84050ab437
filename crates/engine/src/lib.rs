pub mod app;
pub mod scene;

pub use app::{
    run_app, screen_to_world_px, world_to_screen, world_to_screen_px, AppError, InputAction,
    InputSnapshot, LoopConfig, LoopMetricsSnapshot, Renderer, Scene, Viewport, DANCE_SLOT_COUNT,
};
pub use scene::{
    palette_color, with_seed, AttachError, Behavior, Capability, Circle, ConfigError, DanceChannel,
    DanceToggle, EntityId, FractalTree, FrameClock, FrameTime, PathFollowingBehavior, Pivot,
    Player, Point, Precision, Primitive, Rgb, RimStyle, RotateBehavior, ScaleBehavior,
    SceneEntity, SceneRegistry, SceneRng, Shape, SineWave, SineWaveBehavior, TreeDanceBehavior,
    Triangle, PALETTE,
};
