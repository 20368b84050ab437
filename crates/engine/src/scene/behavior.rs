use glam::Vec2;

use super::clock::FrameTime;
use super::entity::{Capability, EntityId, FractalTree, Shape};
use super::ConfigError;

/// Animation channels a scene can flip at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanceToggle {
    SplitAngle,
    Depth,
    Length,
    Randomness,
}

/// Per-frame mutation attached to exactly one entity. A behavior names
/// the single capability it needs up front; the registry refuses the
/// attachment if the target shape lacks it, so `update` can assume the
/// matching accessor succeeds.
pub trait Behavior {
    fn target(&self) -> EntityId;
    fn required_capability(&self) -> Capability;
    fn update(&mut self, time: FrameTime, shape: &mut Shape);
    fn toggle(&mut self, _toggle: DanceToggle) {}
}

/// Constant-rate spin, in degrees per second.
#[derive(Debug, Clone)]
pub struct RotateBehavior {
    target: EntityId,
    degrees_per_second: f32,
}

impl RotateBehavior {
    pub fn new(target: EntityId, degrees_per_second: f32) -> Self {
        Self {
            target,
            degrees_per_second,
        }
    }
}

impl Behavior for RotateBehavior {
    fn target(&self) -> EntityId {
        self.target
    }

    fn required_capability(&self) -> Capability {
        Capability::Rotatable
    }

    fn update(&mut self, time: FrameTime, shape: &mut Shape) {
        if let Some(angle) = shape.angle_mut() {
            *angle += self.degrees_per_second * time.delta;
        }
    }
}

/// Sinusoidal pulse around a base scale, driven by elapsed time so the
/// motion stays phase-stable across uneven frame deltas.
#[derive(Debug, Clone)]
pub struct ScaleBehavior {
    target: EntityId,
    base: f32,
    amplitude: f32,
    frequency: f32,
}

impl ScaleBehavior {
    pub fn new(target: EntityId, base: f32, amplitude: f32, frequency: f32) -> Self {
        Self {
            target,
            base,
            amplitude,
            frequency,
        }
    }
}

impl Behavior for ScaleBehavior {
    fn target(&self) -> EntityId {
        self.target
    }

    fn required_capability(&self) -> Capability {
        Capability::Scalable
    }

    fn update(&mut self, time: FrameTime, shape: &mut Shape) {
        if let Some(scale) = shape.scale_mut() {
            *scale = self.base + self.amplitude * (self.frequency * time.elapsed).sin();
        }
    }
}

/// Advances a ribbon's phase so the wave appears to travel.
#[derive(Debug, Clone)]
pub struct SineWaveBehavior {
    target: EntityId,
    phase_rate: f32,
}

impl SineWaveBehavior {
    pub fn new(target: EntityId, phase_rate: f32) -> Self {
        Self { target, phase_rate }
    }
}

impl Behavior for SineWaveBehavior {
    fn target(&self) -> EntityId {
        self.target
    }

    fn required_capability(&self) -> Capability {
        Capability::WavePhase
    }

    fn update(&mut self, time: FrameTime, shape: &mut Shape) {
        if let Some(phase) = shape.phase_mut() {
            *phase += self.phase_rate * time.delta;
        }
    }
}

/// One oscillating tree parameter. Disabled channels hold the base
/// value instead of freezing mid-swing.
#[derive(Debug, Clone, Copy)]
pub struct DanceChannel {
    pub amplitude: f32,
    pub frequency: f32,
    pub enabled: bool,
}

impl DanceChannel {
    pub fn new(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            enabled: true,
        }
    }

    fn offset(&self, elapsed: f32) -> f32 {
        if self.enabled {
            self.amplitude * (self.frequency * elapsed).sin()
        } else {
            0.0
        }
    }
}

/// Makes a fractal tree sway by oscillating its parameters around the
/// values it was configured with. The base values are captured once at
/// construction, so toggling a channel off always restores the
/// original look exactly.
#[derive(Debug, Clone)]
pub struct TreeDanceBehavior {
    target: EntityId,
    base_split_angle: f32,
    base_depth: u32,
    base_length: f32,
    base_random_range: f32,
    pub split_angle: DanceChannel,
    pub depth: DanceChannel,
    pub length: DanceChannel,
    randomness_enabled: bool,
}

impl TreeDanceBehavior {
    pub fn new(target: EntityId, tree: &FractalTree) -> Self {
        Self {
            target,
            base_split_angle: tree.split_angle,
            base_depth: tree.depth,
            base_length: tree.length,
            base_random_range: tree.random_range,
            split_angle: DanceChannel::new(10.0, 0.9),
            depth: DanceChannel::new(1.6, 0.35),
            length: DanceChannel::new(12.0, 0.6),
            randomness_enabled: true,
        }
    }
}

impl Behavior for TreeDanceBehavior {
    fn target(&self) -> EntityId {
        self.target
    }

    fn required_capability(&self) -> Capability {
        Capability::TreeParams
    }

    fn update(&mut self, time: FrameTime, shape: &mut Shape) {
        let Some(tree) = shape.tree_mut() else {
            return;
        };
        tree.split_angle = self.base_split_angle + self.split_angle.offset(time.elapsed);
        tree.length = self.base_length + self.length.offset(time.elapsed);
        let depth = self.base_depth as f32 + self.depth.offset(time.elapsed);
        tree.depth = depth.round().max(0.0) as u32;
        tree.random_range = if self.randomness_enabled {
            self.base_random_range
        } else {
            0.0
        };
    }

    fn toggle(&mut self, toggle: DanceToggle) {
        match toggle {
            DanceToggle::SplitAngle => self.split_angle.enabled = !self.split_angle.enabled,
            DanceToggle::Depth => self.depth.enabled = !self.depth.enabled,
            DanceToggle::Length => self.length.enabled = !self.length.enabled,
            DanceToggle::Randomness => self.randomness_enabled = !self.randomness_enabled,
        }
    }
}

/// Steps an entity along a cyclic waypoint list. A positive delay is a
/// dwell time per waypoint; the accumulator keeps fractional overshoot
/// so long frames are paid back instead of dropped. A zero delay steps
/// once per update.
#[derive(Debug, Clone)]
pub struct PathFollowingBehavior {
    target: EntityId,
    waypoints: Vec<Vec2>,
    move_delay: f32,
    cursor: usize,
    since_last_step: f32,
    running: bool,
}

impl PathFollowingBehavior {
    pub fn new(
        target: EntityId,
        waypoints: Vec<Vec2>,
        move_delay: f32,
    ) -> Result<Self, ConfigError> {
        if waypoints.is_empty() {
            return Err(ConfigError::EmptyWaypointPath);
        }
        Ok(Self {
            target,
            waypoints,
            move_delay,
            cursor: 0,
            since_last_step: 0.0,
            running: true,
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    fn step(&mut self, shape: &mut Shape) {
        self.cursor = (self.cursor + 1) % self.waypoints.len();
        *shape.position_mut() = self.waypoints[self.cursor];
    }
}

impl Behavior for PathFollowingBehavior {
    fn target(&self) -> EntityId {
        self.target
    }

    fn required_capability(&self) -> Capability {
        Capability::Movable
    }

    fn update(&mut self, time: FrameTime, shape: &mut Shape) {
        if !self.running {
            return;
        }
        if self.move_delay <= 0.0 {
            self.step(shape);
            return;
        }
        self.since_last_step += time.delta;
        while self.since_last_step > self.move_delay {
            self.since_last_step -= self.move_delay;
            self.step(shape);
        }
    }
}
