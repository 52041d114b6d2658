use bevy::math::{UVec2, Vec2};

pub mod debug_overlay;
pub mod race_runtime;

/// Convert a screen position (origin top-left, y down) into the world space
/// of a fixed `Camera2d` at the origin (y up, screen centre at 0,0).
pub fn screen_to_world(screen: Vec2, screen_size: UVec2) -> Vec2 {
    let half = screen_size.as_vec2() / 2.0;
    Vec2::new(screen.x - half.x, half.y - screen.y)
}
