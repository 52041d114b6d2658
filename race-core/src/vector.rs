use bevy_math::Vec2;

/// Velocity stored as a signed magnitude and a heading in degrees.
///
/// The Cartesian components are derived once in [`PolarVector::new`] and are
/// never written on their own, so they always agree with `length`/`angle`.
/// Screen coordinates are used (`y` grows downward). With angle 0° a negative
/// length moves toward the top of the screen, which is where the nose of the
/// unrotated car sprite points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarVector {
    length: f32,
    angle: f32,
    x: f32,
    y: f32,
}

impl PolarVector {
    pub fn new(length: f32, angle: f32) -> Self {
        let mut angle = angle.rem_euclid(360.0);
        // rem_euclid rounds tiny negative inputs up to exactly 360.0
        if angle >= 360.0 {
            angle = 0.0;
        }
        let (sin, cos) = angle.to_radians().sin_cos();
        Self {
            length,
            angle,
            x: sin * length,
            y: cos * length,
        }
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Heading in degrees, always in `[0, 360)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn rotate(self, delta_angle: f32) -> Self {
        Self::new(self.length, self.angle + delta_angle)
    }

    pub fn add_scalar(self, delta_length: f32) -> Self {
        Self::new(self.length + delta_length, self.angle)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.length * factor, self.angle)
    }

    pub fn with_length(self, length: f32) -> Self {
        Self::new(length, self.angle)
    }
}
