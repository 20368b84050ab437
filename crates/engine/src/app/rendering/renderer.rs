use std::cmp::Ordering;
use std::sync::Arc;

use glam::Vec2;
use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::scene::{Player, Primitive, Rgb, SceneRegistry};

use super::transform::{world_to_screen, world_to_screen_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const PLAYER_COLOR: Rgb = Rgb::new(0.94, 0.93, 0.82);
const PLAYER_NOSE_LENGTH: f32 = 16.0;
const PLAYER_BACK_RADIUS: f32 = 9.0;
const PLAYER_BACK_SPREAD_DEGREES: f32 = 140.0;

/// CPU framebuffer renderer. Walks the registry's entities in
/// insertion order, rasterizes each shape's primitive list, then draws
/// the player wedge on top of everything.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    pub fn render_scene(&mut self, registry: &SceneRegistry) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        for entity in registry.entities() {
            for primitive in entity.shape.primitives() {
                draw_primitive(frame, viewport, &primitive);
            }
        }
        draw_player(frame, viewport, &registry.player);

        self.pixels.render()
    }
}

fn draw_primitive(frame: &mut [u8], viewport: Viewport, primitive: &Primitive) {
    match primitive {
        Primitive::Points {
            points,
            size,
            color,
        } => {
            let half = point_half_size(*size);
            let rgba = color.to_rgba8();
            for point in points {
                let (x, y) = world_to_screen_px(*point, viewport);
                draw_brush(frame, viewport, x, y, half, rgba);
            }
        }
        Primitive::Line {
            from,
            to,
            width,
            color,
        } => {
            draw_world_line(frame, viewport, *from, *to, *width, color.to_rgba8());
        }
        Primitive::LineStrip {
            points,
            width,
            color,
        } => {
            let rgba = color.to_rgba8();
            for pair in points.windows(2) {
                draw_world_line(frame, viewport, pair[0], pair[1], *width, rgba);
            }
        }
        Primitive::LineLoop {
            points,
            width,
            color,
        } => {
            let rgba = color.to_rgba8();
            for pair in points.windows(2) {
                draw_world_line(frame, viewport, pair[0], pair[1], *width, rgba);
            }
            if points.len() > 2 {
                if let (Some(last), Some(first)) = (points.last(), points.first()) {
                    draw_world_line(frame, viewport, *last, *first, *width, rgba);
                }
            }
        }
        Primitive::Polygon { points, color } => {
            let screen: Vec<Vec2> = points
                .iter()
                .map(|point| world_to_screen(*point, viewport))
                .collect();
            fill_polygon_px(frame, viewport, &screen, color.to_rgba8());
        }
    }
}

fn draw_player(frame: &mut [u8], viewport: Viewport, player: &Player) {
    let aim = player.aim_degrees.to_radians();
    let nose = player.position + Vec2::new(aim.cos(), aim.sin()) * PLAYER_NOSE_LENGTH;
    let spread = PLAYER_BACK_SPREAD_DEGREES.to_radians();
    let left = player.position + Vec2::new((aim + spread).cos(), (aim + spread).sin()) * PLAYER_BACK_RADIUS;
    let right = player.position + Vec2::new((aim - spread).cos(), (aim - spread).sin()) * PLAYER_BACK_RADIUS;

    let screen: Vec<Vec2> = [nose, left, right]
        .iter()
        .map(|point| world_to_screen(*point, viewport))
        .collect();
    fill_polygon_px(frame, viewport, &screen, PLAYER_COLOR.to_rgba8());
}

fn point_half_size(size: f32) -> i32 {
    ((size * 0.5).round() as i32).max(0)
}

fn line_brush_half(width: f32) -> i32 {
    (((width - 1.0) * 0.5).round() as i32).max(0)
}

fn draw_world_line(
    frame: &mut [u8],
    viewport: Viewport,
    from: Vec2,
    to: Vec2,
    width: f32,
    color: [u8; 4],
) {
    let (x0, y0) = world_to_screen_px(from, viewport);
    let (x1, y1) = world_to_screen_px(to, viewport);
    draw_line_px(frame, viewport, x0, y0, x1, y1, line_brush_half(width), color);
}

#[allow(clippy::too_many_arguments)]
fn draw_line_px(
    frame: &mut [u8],
    viewport: Viewport,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    brush_half: i32,
    color: [u8; 4],
) {
    let mut x = x0;
    let mut y = y0;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        draw_brush(frame, viewport, x, y, brush_half, color);
        if x == x1 && y == y1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_brush(frame: &mut [u8], viewport: Viewport, cx: i32, cy: i32, half: i32, color: [u8; 4]) {
    for y in (cy - half)..=(cy + half) {
        for x in (cx - half)..=(cx + half) {
            if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
                continue;
            }
            write_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
        }
    }
}

/// Even-odd scanline fill against screen-space vertices.
fn fill_polygon_px(frame: &mut [u8], viewport: Viewport, points: &[Vec2], color: [u8; 4]) {
    if points.len() < 3 {
        return;
    }
    let min_y = points
        .iter()
        .map(|p| p.y)
        .fold(f32::INFINITY, f32::min)
        .floor()
        .max(0.0) as i32;
    let max_y = points
        .iter()
        .map(|p| p.y)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil()
        .min(viewport.height as f32 - 1.0) as i32;

    let mut crossings = Vec::new();
    for y in min_y..=max_y {
        let scan = y as f32 + 0.5;
        crossings.clear();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if (a.y <= scan && b.y > scan) || (b.y <= scan && a.y > scan) {
                let t = (scan - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].round().max(0.0) as i32;
            let end = pair[1].round().min(viewport.width as f32 - 1.0) as i32;
            for x in start..=end {
                write_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
            }
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
