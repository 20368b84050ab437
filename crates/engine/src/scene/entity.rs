use std::cell::OnceCell;
use std::f32::consts::TAU;

use glam::Vec2;

use super::tree;
use super::ConfigError;

/// Linear-space RGB color, converted to framebuffer bytes at draw time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ]
    }
}

/// Shared shape palette; trees index into it by seed.
pub const PALETTE: [Rgb; 6] = [
    Rgb::new(0.36, 0.72, 0.33),
    Rgb::new(0.24, 0.55, 0.29),
    Rgb::new(0.78, 0.62, 0.25),
    Rgb::new(0.68, 0.33, 0.24),
    Rgb::new(0.33, 0.56, 0.76),
    Rgb::new(0.76, 0.76, 0.80),
];

pub fn palette_color(index: u64) -> Rgb {
    PALETTE[(index % PALETTE.len() as u64) as usize]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Named contracts a shape may or may not satisfy. Behaviors state the
/// one capability they need; attachment is rejected when the target
/// shape lacks it, so a mismatch can never surface mid-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Movable,
    Rotatable,
    Scalable,
    WavePhase,
    TreeParams,
}

/// Backend-neutral draw command. Shapes emit these; the renderer walks
/// them with explicit color/width per command, so no global graphics
/// state leaks between entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Points {
        points: Vec<Vec2>,
        size: f32,
        color: Rgb,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgb,
    },
    LineStrip {
        points: Vec<Vec2>,
        width: f32,
        color: Rgb,
    },
    LineLoop {
        points: Vec<Vec2>,
        width: f32,
        color: Rgb,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Rgb,
    },
}

fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub position: Vec2,
    pub size: f32,
    pub color: Rgb,
}

/// Radial rim perturbation applied while sampling a circle outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RimStyle {
    Smooth,
    Sine {
        amplitude: f32,
        lobes: u32,
    },
    /// Sine quantized to a fixed number of levels; reads as gear teeth.
    QuantizedSine {
        amplitude: f32,
        lobes: u32,
        steps: u32,
    },
}

impl RimStyle {
    fn offset(self, local_angle: f32) -> f32 {
        match self {
            RimStyle::Smooth => 0.0,
            RimStyle::Sine { amplitude, lobes } => amplitude * (lobes as f32 * local_angle).sin(),
            RimStyle::QuantizedSine {
                amplitude,
                lobes,
                steps,
            } => {
                let levels = steps.max(1) as f32;
                let s = (lobes as f32 * local_angle).sin();
                amplitude * (s * levels).round() / levels
            }
        }
    }
}

/// Outline vertex count: fixed, or derived from the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precision {
    FromRadius,
    Fixed(u32),
}

pub const MIN_OUTLINE_VERTICES: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
    pub angle_degrees: f32,
    pub scale: f32,
    pub color: Rgb,
    pub rim: RimStyle,
    pub precision: Precision,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32, color: Rgb) -> Self {
        Self {
            center,
            radius,
            angle_degrees: 0.0,
            scale: 1.0,
            color,
            rim: RimStyle::Smooth,
            precision: Precision::FromRadius,
        }
    }

    /// Never below [`MIN_OUTLINE_VERTICES`], whichever way it is derived.
    pub fn vertex_count(&self) -> u32 {
        match self.precision {
            Precision::Fixed(n) => n.max(MIN_OUTLINE_VERTICES),
            Precision::FromRadius => (self.radius.abs().round() as u32).max(MIN_OUTLINE_VERTICES),
        }
    }

    fn outline(&self) -> Vec<Vec2> {
        let n = self.vertex_count();
        (0..n)
            .map(|i| {
                let local = i as f32 / n as f32 * TAU;
                let r = self.radius * self.scale * (1.0 + self.rim.offset(local));
                let world = local + self.angle_degrees.to_radians();
                self.center + Vec2::new(world.cos(), world.sin()) * r
            })
            .collect()
    }
}

/// Pivot used for a triangle's rotation and scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pivot {
    Origin,
    Centroid,
}

#[derive(Debug, Clone)]
pub struct Triangle {
    pub position: Vec2,
    pub vertices: [(Vec2, Rgb); 3],
    pub angle_degrees: f32,
    pub scale: f32,
    pub pivot: Pivot,
    // Cached on first use and deliberately never invalidated: the pivot
    // must stay fixed even if vertices are edited afterwards.
    centroid: OnceCell<Vec2>,
}

impl Triangle {
    pub fn new(position: Vec2, vertices: [(Vec2, Rgb); 3], pivot: Pivot) -> Self {
        Self {
            position,
            vertices,
            angle_degrees: 0.0,
            scale: 1.0,
            pivot,
            centroid: OnceCell::new(),
        }
    }

    pub fn centroid(&self) -> Vec2 {
        *self.centroid.get_or_init(|| {
            (self.vertices[0].0 + self.vertices[1].0 + self.vertices[2].0) / 3.0
        })
    }

    fn pivot_point(&self) -> Vec2 {
        match self.pivot {
            Pivot::Origin => Vec2::ZERO,
            Pivot::Centroid => self.centroid(),
        }
    }

    fn corners(&self) -> Vec<Vec2> {
        let pivot = self.pivot_point();
        self.vertices
            .iter()
            .map(|(offset, _)| {
                self.position + pivot + rotate_degrees((*offset - pivot) * self.scale, self.angle_degrees)
            })
            .collect()
    }

    // The CPU rasterizer fills with one flat color, so the three vertex
    // colors are blended up front.
    fn fill_color(&self) -> Rgb {
        let [(_, a), (_, b), (_, c)] = self.vertices;
        Rgb::new(
            (a.r + b.r + c.r) / 3.0,
            (a.g + b.g + c.g) / 3.0,
            (a.b + b.b + c.b) / 3.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SineWave {
    pub anchor: Vec2,
    pub length: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
    pub color: Rgb,
}

impl SineWave {
    pub fn sample_count(&self) -> u32 {
        ((self.length.abs() / 4.0).round() as u32).max(MIN_OUTLINE_VERTICES)
    }

    fn polyline(&self) -> Vec<Vec2> {
        let n = self.sample_count();
        (0..=n)
            .map(|i| {
                let x = i as f32 / n as f32 * self.length;
                let y = self.amplitude * (self.frequency * x + self.phase).sin();
                self.anchor + Vec2::new(x, y)
            })
            .collect()
    }
}

/// Seeded recursive tree. All fields are the *current* animated values;
/// a dance behavior keeps the configured base values and rewrites these
/// every frame, so the shape itself never loses its original setup.
#[derive(Debug, Clone, PartialEq)]
pub struct FractalTree {
    pub anchor: Vec2,
    pub orientation_degrees: f32,
    pub depth: u32,
    pub length: f32,
    pub split_angle: f32,
    pub split_decay: f32,
    pub width: f32,
    pub random_range: f32,
    pub seed: u64,
}

impl FractalTree {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        anchor: Vec2,
        depth: u32,
        length: f32,
        split_angle: f32,
        split_decay: f32,
        width: f32,
        random_range: f32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if depth == 0 && length != 0.0 {
            return Err(ConfigError::DegenerateTreeDepth);
        }
        if !(0.0..=1.0).contains(&random_range) {
            return Err(ConfigError::RandomRangeOutOfBounds {
                value: random_range,
            });
        }
        Ok(Self {
            anchor,
            orientation_degrees: 0.0,
            depth,
            length,
            split_angle,
            split_decay,
            width,
            random_range,
            seed,
        })
    }
}

/// A scene entity: one shape variant plus the capability set implied by
/// it. Geometric parameters are read fresh on every draw.
#[derive(Debug, Clone)]
pub enum Shape {
    Point(Point),
    Circle(Circle),
    Triangle(Triangle),
    SineWave(SineWave),
    FractalTree(FractalTree),
}

impl Shape {
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Movable => true,
            Capability::Rotatable | Capability::Scalable => {
                matches!(self, Shape::Circle(_) | Shape::Triangle(_))
            }
            Capability::WavePhase => matches!(self, Shape::SineWave(_)),
            Capability::TreeParams => matches!(self, Shape::FractalTree(_)),
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Shape::Point(p) => p.position,
            Shape::Circle(c) => c.center,
            Shape::Triangle(t) => t.position,
            Shape::SineWave(w) => w.anchor,
            Shape::FractalTree(t) => t.anchor,
        }
    }

    pub fn position_mut(&mut self) -> &mut Vec2 {
        match self {
            Shape::Point(p) => &mut p.position,
            Shape::Circle(c) => &mut c.center,
            Shape::Triangle(t) => &mut t.position,
            Shape::SineWave(w) => &mut w.anchor,
            Shape::FractalTree(t) => &mut t.anchor,
        }
    }

    pub fn angle_mut(&mut self) -> Option<&mut f32> {
        match self {
            Shape::Circle(c) => Some(&mut c.angle_degrees),
            Shape::Triangle(t) => Some(&mut t.angle_degrees),
            _ => None,
        }
    }

    pub fn scale_mut(&mut self) -> Option<&mut f32> {
        match self {
            Shape::Circle(c) => Some(&mut c.scale),
            Shape::Triangle(t) => Some(&mut t.scale),
            _ => None,
        }
    }

    pub fn phase_mut(&mut self) -> Option<&mut f32> {
        match self {
            Shape::SineWave(w) => Some(&mut w.phase),
            _ => None,
        }
    }

    pub fn tree_mut(&mut self) -> Option<&mut FractalTree> {
        match self {
            Shape::FractalTree(t) => Some(t),
            _ => None,
        }
    }

    /// Pure draw: emits primitives in paint order, no backend calls.
    pub fn primitives(&self) -> Vec<Primitive> {
        match self {
            Shape::Point(p) => vec![Primitive::Points {
                points: vec![p.position],
                size: p.size,
                color: p.color,
            }],
            Shape::Circle(c) => vec![Primitive::LineLoop {
                points: c.outline(),
                width: 1.0,
                color: c.color,
            }],
            Shape::Triangle(t) => vec![Primitive::Polygon {
                points: t.corners(),
                color: t.fill_color(),
            }],
            Shape::SineWave(w) => vec![Primitive::LineStrip {
                points: w.polyline(),
                width: 1.0,
                color: w.color,
            }],
            Shape::FractalTree(t) => tree::generate(t)
                .into_iter()
                .map(|branch| Primitive::Line {
                    from: branch.start,
                    to: branch.end,
                    width: branch.width,
                    color: branch.color,
                })
                .collect(),
        }
    }
}
