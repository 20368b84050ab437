use glam::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Screen pixels (origin top-left, y down) to world units (origin at
/// the viewport center, y up).
pub fn screen_to_world_px(screen: Vec2, viewport: Viewport) -> Vec2 {
    let half_w = viewport.width as f32 * 0.5;
    let half_h = viewport.height as f32 * 0.5;
    Vec2::new(
        screen.x - half_w,
        (viewport.height as f32 - screen.y) - half_h,
    )
}

pub fn world_to_screen(world: Vec2, viewport: Viewport) -> Vec2 {
    let half_w = viewport.width as f32 * 0.5;
    let half_h = viewport.height as f32 * 0.5;
    Vec2::new(world.x + half_w, viewport.height as f32 - (world.y + half_h))
}

pub fn world_to_screen_px(world: Vec2, viewport: Viewport) -> (i32, i32) {
    let screen = world_to_screen(world, viewport);
    (screen.x.round() as i32, screen.y.round() as i32)
}
