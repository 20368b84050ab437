mod input;
mod loop_runner;
mod metrics;
mod rendering;

pub use input::{InputAction, InputSnapshot, DANCE_SLOT_COUNT};
pub use loop_runner::{run_app, AppError, LoopConfig, Scene};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{screen_to_world_px, world_to_screen, world_to_screen_px, Renderer, Viewport};
