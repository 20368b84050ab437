use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::scene::{FrameTime, FrameClock, Player, SceneRegistry, SceneRng};

use super::input::{ActionStates, DANCE_SLOT_COUNT};
use super::metrics::MetricsAccumulator;
use super::rendering::{screen_to_world_px, Renderer, Viewport};
use super::{InputAction, InputSnapshot};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub player_speed: f32,
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
    /// `None` seeds the scene stream from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Fractal Grove".to_string(),
            window_width: 1024,
            window_height: 768,
            player_speed: 180.0,
            max_frame_delta: Duration::from_millis(250),
            metrics_log_interval: Duration::from_secs(1),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// A loaded scene: populates the registry once, then reacts to clicks
/// and dance-toggle keys. Per-frame motion belongs to behaviors, not
/// to the scene.
pub trait Scene {
    fn load(&mut self, registry: &mut SceneRegistry);

    fn on_click(&mut self, _world: Vec2, _registry: &mut SceneRegistry) {}

    fn on_toggle(&mut self, _slot: usize, _registry: &mut SceneRegistry) {}
}

pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    let rng = match config.rng_seed {
        Some(seed) => {
            info!(seed, "rng_seeded");
            SceneRng::seeded(seed)
        }
        None => SceneRng::from_os_entropy(),
    };
    let mut registry = SceneRegistry::new(Player::new(config.player_speed), rng);
    scene.load(&mut registry);
    info!(
        entity_count = registry.entity_count(),
        behavior_count = registry.behavior_count(),
        "scene_loaded"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let max_frame_delta = normalize_non_zero_duration(
        config.max_frame_delta,
        Duration::from_millis(250),
    )
    .as_secs_f32();
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let mut input_collector = InputCollector::new(config.window_width, config.window_height);
    let mut clock = FrameClock::new();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);

    info!(
        max_frame_delta_ms = (max_frame_delta * 1000.0) as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_window_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        input_collector.set_window_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input_collector
                            .set_cursor_position_px(position.x as f32, position.y as f32);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.clear_cursor_position();
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let raw = clock.tick();
                        let time = FrameTime {
                            elapsed: raw.elapsed,
                            delta: raw.delta.min(max_frame_delta),
                        };
                        let snapshot = input_collector.snapshot_for_tick();
                        let (width, height) = snapshot.window_size();
                        let viewport = Viewport { width, height };

                        if snapshot.left_click_pressed() {
                            if let Some(cursor) = snapshot.cursor_position_px() {
                                let world = screen_to_world_px(cursor, viewport);
                                scene.on_click(world, &mut registry);
                            }
                        }
                        for slot in 0..DANCE_SLOT_COUNT {
                            if snapshot.dance_toggle_pressed(slot) {
                                scene.on_toggle(slot, &mut registry);
                            }
                        }

                        registry.player.velocity = snapshot.movement_vector();
                        if let Some(cursor) = snapshot.cursor_position_px() {
                            registry
                                .player
                                .set_aim_from_pointer(screen_to_world_px(cursor, viewport));
                        }

                        registry.step(time);

                        if let Err(error) = renderer.render_scene(&registry) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }

                        metrics_accumulator.record_frame(Duration::from_secs_f32(raw.delta));
                        if let Some(metrics) = metrics_accumulator.maybe_snapshot(Instant::now())
                        {
                            info!(
                                fps = metrics.fps,
                                frame_time_ms = metrics.frame_time_ms,
                                entity_count = registry.entity_count(),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    left_click_pressed_edge: bool,
    dance_key_is_down: [bool; DANCE_SLOT_COUNT],
    dance_toggle_edges: [bool; DANCE_SLOT_COUNT],
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
        if let Some(slot) = dance_slot_for_key(key_event.physical_key) {
            self.handle_dance_key_state(slot, key_event.state);
        }
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn handle_dance_key_state(&mut self, slot: usize, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.dance_key_is_down[slot] {
                    self.dance_toggle_edges[slot] = true;
                }
                self.dance_key_is_down[slot] = true;
            }
            ElementState::Released => self.dance_key_is_down[slot] = false,
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    self.left_click_pressed_edge = true;
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2::new(x, y));
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.cursor_position_px,
            self.left_click_pressed_edge,
            self.dance_toggle_edges,
            self.window_width,
            self.window_height,
        );
        self.left_click_pressed_edge = false;
        self.dance_toggle_edges = [false; DANCE_SLOT_COUNT];
        snapshot
    }
}

fn dance_slot_for_key(key: PhysicalKey) -> Option<usize> {
    match key {
        PhysicalKey::Code(KeyCode::Digit1) => Some(0),
        PhysicalKey::Code(KeyCode::Digit2) => Some(1),
        PhysicalKey::Code(KeyCode::Digit3) => Some(2),
        PhysicalKey::Code(KeyCode::Digit4) => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_click_is_edge_triggered_for_single_frame() {
        let mut input = InputCollector::new(1024, 768);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.left_click_pressed());
        assert!(!second.left_click_pressed());
    }

    #[test]
    fn held_left_click_does_not_repeat_pressed_edge() {
        let mut input = InputCollector::new(1024, 768);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let second = input.snapshot_for_tick();

        assert!(first.left_click_pressed());
        assert!(!second.left_click_pressed());
    }

    #[test]
    fn dance_keys_are_edge_triggered_per_slot() {
        let mut input = InputCollector::new(1024, 768);

        input.handle_dance_key_state(2, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_dance_key_state(2, ElementState::Pressed);
        let second = input.snapshot_for_tick();
        input.handle_dance_key_state(2, ElementState::Released);
        input.handle_dance_key_state(2, ElementState::Pressed);
        let third = input.snapshot_for_tick();

        assert!(first.dance_toggle_pressed(2));
        assert!(!first.dance_toggle_pressed(0));
        assert!(!second.dance_toggle_pressed(2));
        assert!(third.dance_toggle_pressed(2));
    }

    #[test]
    fn digit_keys_map_to_consecutive_slots() {
        assert_eq!(dance_slot_for_key(PhysicalKey::Code(KeyCode::Digit1)), Some(0));
        assert_eq!(dance_slot_for_key(PhysicalKey::Code(KeyCode::Digit4)), Some(3));
        assert_eq!(dance_slot_for_key(PhysicalKey::Code(KeyCode::Digit5)), None);
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::new(1024, 768);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::new(1024, 768);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);

        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveRight));
    }

    #[test]
    fn escape_marks_quit_requested() {
        let mut input = InputCollector::new(1024, 768);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn snapshot_carries_cursor_and_window_size() {
        let mut input = InputCollector::new(1024, 768);
        input.set_cursor_position_px(100.0, 200.0);
        let snapshot = input.snapshot_for_tick();

        assert_eq!(snapshot.window_size(), (1024, 768));
        let cursor = snapshot.cursor_position_px().expect("cursor");
        assert!((cursor.x - 100.0).abs() < 0.0001);
        assert!((cursor.y - 200.0).abs() < 0.0001);
    }

    #[test]
    fn cursor_leave_clears_position() {
        let mut input = InputCollector::new(1024, 768);
        input.set_cursor_position_px(10.0, 10.0);
        input.clear_cursor_position();
        assert!(input.snapshot_for_tick().cursor_position_px().is_none());
    }

    #[test]
    fn zero_durations_fall_back_to_defaults() {
        let fallback = Duration::from_millis(250);
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, fallback),
            fallback
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(100), fallback),
            Duration::from_millis(100)
        );
    }
}
