use glam::Vec2;
use thiserror::Error;
use tracing::debug;

use super::behavior::{Behavior, DanceToggle};
use super::clock::FrameTime;
use super::entity::{Capability, EntityId, EntityIdAllocator, Shape};
use super::rng::SceneRng;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    #[error("behavior targets unknown entity {0:?}")]
    UnknownTarget(EntityId),
    #[error("entity {target:?} does not support {required:?}")]
    MissingCapability {
        target: EntityId,
        required: Capability,
    },
}

#[derive(Debug)]
pub struct SceneEntity {
    pub id: EntityId,
    pub shape: Shape,
}

/// The controllable avatar. It is not a registry entity: it is stepped
/// after all behaviors and drawn last, on top of everything.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub speed: f32,
    pub aim_degrees: f32,
}

impl Player {
    pub fn new(speed: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            speed,
            aim_degrees: 0.0,
        }
    }

    /// Points the avatar at a world-space position. A pointer sitting
    /// exactly on the avatar keeps the previous aim.
    pub fn set_aim_from_pointer(&mut self, world: Vec2) {
        let to_pointer = world - self.position;
        if to_pointer.length_squared() > f32::EPSILON {
            self.aim_degrees = to_pointer.y.atan2(to_pointer.x).to_degrees();
        }
    }

    fn integrate(&mut self, delta: f32) {
        self.position += self.velocity * self.speed * delta;
    }
}

/// Owns every entity and behavior in insertion order. Spawns and
/// attachments requested mid-frame land in pending queues and become
/// visible only after the current frame's updates finish, so behavior
/// iteration never observes a half-built frame.
pub struct SceneRegistry {
    allocator: EntityIdAllocator,
    entities: Vec<SceneEntity>,
    behaviors: Vec<Box<dyn Behavior>>,
    pending_entities: Vec<SceneEntity>,
    pending_behaviors: Vec<Box<dyn Behavior>>,
    pub player: Player,
    pub rng: SceneRng,
}

impl SceneRegistry {
    pub fn new(player: Player, rng: SceneRng) -> Self {
        Self {
            allocator: EntityIdAllocator::default(),
            entities: Vec::new(),
            behaviors: Vec::new(),
            pending_entities: Vec::new(),
            pending_behaviors: Vec::new(),
            player,
            rng,
        }
    }

    pub fn spawn(&mut self, shape: Shape) -> EntityId {
        let id = self.allocator.allocate();
        debug!(entity_id = id.0, "entity_spawned");
        self.pending_entities.push(SceneEntity { id, shape });
        id
    }

    /// Validates the behavior's capability against its target before
    /// queueing it. Pending entities count as valid targets.
    pub fn attach(&mut self, behavior: Box<dyn Behavior>) -> Result<(), AttachError> {
        let target = behavior.target();
        let required = behavior.required_capability();
        let shape = self
            .find_shape(target)
            .ok_or(AttachError::UnknownTarget(target))?;
        if !shape.supports(required) {
            return Err(AttachError::MissingCapability { target, required });
        }
        self.pending_behaviors.push(behavior);
        Ok(())
    }

    fn find_shape(&self, id: EntityId) -> Option<&Shape> {
        self.entities
            .iter()
            .chain(self.pending_entities.iter())
            .find(|entity| entity.id == id)
            .map(|entity| &entity.shape)
    }

    /// One frame: behaviors in attachment order, then the player, then
    /// pending spawns and attachments become live.
    pub fn step(&mut self, time: FrameTime) {
        let entities = &mut self.entities;
        for behavior in &mut self.behaviors {
            let target = behavior.target();
            if let Some(entity) = entities.iter_mut().find(|entity| entity.id == target) {
                behavior.update(time, &mut entity.shape);
            }
        }
        self.player.integrate(time.delta);
        self.apply_pending();
    }

    fn apply_pending(&mut self) {
        self.entities.append(&mut self.pending_entities);
        self.behaviors.append(&mut self.pending_behaviors);
    }

    /// Forwarded to every behavior, live and pending. Non-dancing
    /// behaviors ignore it.
    pub fn toggle(&mut self, toggle: DanceToggle) {
        for behavior in self
            .behaviors
            .iter_mut()
            .chain(self.pending_behaviors.iter_mut())
        {
            behavior.toggle(toggle);
        }
    }

    /// Live entities in insertion order; this is also draw order.
    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len() + self.pending_entities.len()
    }

    pub fn behavior_count(&self) -> usize {
        self.behaviors.len() + self.pending_behaviors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::behavior::RotateBehavior;
    use crate::scene::entity::{Circle, Point, Rgb};

    const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    fn registry() -> SceneRegistry {
        SceneRegistry::new(Player::new(100.0), SceneRng::seeded(1))
    }

    fn circle_at(x: f32) -> Shape {
        Shape::Circle(Circle::new(Vec2::new(x, 0.0), 10.0, WHITE))
    }

    fn point_marker() -> Shape {
        Shape::Point(Point {
            position: Vec2::ZERO,
            size: 2.0,
            color: WHITE,
        })
    }

    fn frame(delta: f32) -> FrameTime {
        FrameTime {
            elapsed: 0.0,
            delta,
        }
    }

    #[test]
    fn spawns_become_visible_only_after_step() {
        let mut registry = registry();
        registry.spawn(circle_at(0.0));
        assert!(registry.entities().is_empty());
        assert_eq!(registry.entity_count(), 1);

        registry.step(frame(0.016));
        assert_eq!(registry.entities().len(), 1);
    }

    #[test]
    fn entities_keep_spawn_order() {
        let mut registry = registry();
        let first = registry.spawn(circle_at(0.0));
        registry.step(frame(0.016));
        let second = registry.spawn(circle_at(10.0));
        let third = registry.spawn(circle_at(20.0));
        registry.step(frame(0.016));

        let ids: Vec<EntityId> = registry.entities().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[test]
    fn attach_rejects_unknown_target() {
        let mut registry = registry();
        let err = registry
            .attach(Box::new(RotateBehavior::new(EntityId(7), 90.0)))
            .expect_err("no such entity");
        assert_eq!(err, AttachError::UnknownTarget(EntityId(7)));
    }

    #[test]
    fn attach_rejects_missing_capability() {
        let mut registry = registry();
        let marker = registry.spawn(point_marker());
        let err = registry
            .attach(Box::new(RotateBehavior::new(marker, 90.0)))
            .expect_err("points cannot rotate");
        assert_eq!(
            err,
            AttachError::MissingCapability {
                target: marker,
                required: Capability::Rotatable,
            }
        );
    }

    #[test]
    fn attach_accepts_pending_targets() {
        let mut registry = registry();
        let circle = registry.spawn(circle_at(0.0));
        registry
            .attach(Box::new(RotateBehavior::new(circle, 90.0)))
            .expect("pending circle is a valid target");
        assert_eq!(registry.behavior_count(), 1);
    }

    #[test]
    fn behaviors_drive_their_target_each_step() {
        let mut registry = registry();
        let circle = registry.spawn(circle_at(0.0));
        registry
            .attach(Box::new(RotateBehavior::new(circle, 90.0)))
            .expect("valid attachment");

        // First step only promotes the pending queues.
        registry.step(frame(0.016));
        for _ in 0..10 {
            registry.step(frame(0.1));
        }

        let Shape::Circle(drawn) = &registry.entities()[0].shape else {
            panic!("expected a circle");
        };
        assert!((drawn.angle_degrees - 90.0).abs() < 0.001);
    }

    #[test]
    fn player_moves_by_velocity_speed_delta() {
        let mut registry = registry();
        registry.player.velocity = Vec2::new(1.0, 0.0);
        registry.step(frame(0.5));
        assert!((registry.player.position.x - 50.0).abs() < 0.001);
        assert_eq!(registry.player.position.y, 0.0);
    }

    #[test]
    fn aim_tracks_pointer_and_holds_on_overlap() {
        let mut player = Player::new(100.0);
        player.set_aim_from_pointer(Vec2::new(0.0, 50.0));
        assert!((player.aim_degrees - 90.0).abs() < 0.001);
        player.set_aim_from_pointer(player.position);
        assert!((player.aim_degrees - 90.0).abs() < 0.001);
    }
}
