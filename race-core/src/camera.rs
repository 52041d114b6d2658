use bevy_math::{UVec2, Vec2};

/// Screen-space translation that keeps the followed target centred.
///
/// World positions are never touched; [`Camera::apply`] only produces a
/// transient draw position.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Camera {
    offset: Vec2,
}

impl Camera {
    pub fn update(&mut self, target_center: Vec2, screen_size: UVec2) {
        self.offset = (screen_size / 2).as_vec2() - target_center;
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn apply(&self, world: Vec2) -> Vec2 {
        world + self.offset
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::{UVec2, Vec2};

    use super::Camera;

    #[test]
    fn target_lands_on_screen_centre() {
        let mut camera = Camera::default();
        camera.update(Vec2::new(1600.0, 300.0), UVec2::new(1600, 900));
        assert_eq!(camera.apply(Vec2::new(1600.0, 300.0)), Vec2::new(800.0, 450.0));
        assert_eq!(camera.offset(), Vec2::new(-800.0, 150.0));
    }

    #[test]
    fn repeated_updates_do_not_accumulate() {
        let mut camera = Camera::default();
        let world = Vec2::new(10.0, 20.0);
        for _ in 0..1000 {
            camera.update(Vec2::new(400.0, 400.0), UVec2::new(800, 600));
            assert_eq!(camera.apply(world), Vec2::new(10.0, -80.0));
        }
    }
}
