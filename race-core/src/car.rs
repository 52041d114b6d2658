use bevy_math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collision::Collider;
use crate::mask::Mask;
use crate::vector::PolarVector;

/// How speed bleeds off when no key is pushing the car.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Drag {
    /// Fixed drag in units per second.
    Inertia(f32),
    /// Drag derived from the car's weight, `weight / 50` units per second.
    Weight(f32),
}

impl Drag {
    pub fn inertia(&self) -> f32 {
        match *self {
            Drag::Inertia(inertia) => inertia,
            Drag::Weight(weight) => weight / 50.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct CarParams {
    /// Units per second, applied in `1 / tick_rate` steps.
    pub acceleration: f32,
    /// Degrees per tick while a steering key is held.
    pub turnability: f32,
    /// Maximum |length| of the velocity, in units per tick.
    pub max_speed: f32,
    pub drag: Drag,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            acceleration: 60.0,
            turnability: 3.0,
            max_speed: 15.0,
            drag: Drag::Inertia(30.0),
        }
    }
}

/// Held state of the four driving keys for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DriveInput {
    pub const UP: Self = Self {
        up: true,
        down: false,
        left: false,
        right: false,
    };
}

/// The player's car: world-space centre, velocity and the collision mask of
/// its currently rotated sprite.
#[derive(Debug, Clone)]
pub struct Car {
    center: Vec2,
    velocity: PolarVector,
    params: CarParams,
    sprite: Mask,
    mask: Mask,
}

impl Car {
    /// Spawn at rest, centred on `center`, heading `angle` degrees.
    pub fn new(center: Vec2, angle: f32, params: CarParams, sprite: Mask) -> Self {
        let velocity = PolarVector::new(0.0, angle);
        let mask = sprite.rotated(velocity.angle());
        Self {
            center,
            velocity,
            params,
            sprite,
            mask,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn velocity(&self) -> PolarVector {
        self.velocity
    }

    pub fn params(&self) -> &CarParams {
        &self.params
    }

    /// Size of the rotated sprite's bounding box.
    pub fn size(&self) -> Vec2 {
        self.mask.size().as_vec2()
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length().abs()
    }

    /// Advance one tick of the kinematic model.
    pub fn step(&mut self, input: DriveInput, tick_rate: f32) {
        let max_speed = self.params.max_speed;
        let accel_step = self.params.acceleration / tick_rate;

        // "up" drives toward negative length, the direction the sprite's nose faces
        if input.up && self.velocity.length() > -max_speed {
            let length = (self.velocity.length() - accel_step).max(-max_speed);
            self.velocity = self.velocity.with_length(length);
        }
        if input.down && self.velocity.length() < max_speed {
            let length = (self.velocity.length() + accel_step).min(max_speed);
            self.velocity = self.velocity.with_length(length);
        }
        if input.left {
            self.turn(self.params.turnability);
        }
        if input.right {
            self.turn(-self.params.turnability);
        }

        let drag_step = self.params.drag.inertia() / tick_rate;
        let length = self.velocity.length();
        if length < 0.0 {
            self.velocity = self.velocity.add_scalar(drag_step.min(-length));
        } else if length > 0.0 {
            self.velocity = self.velocity.add_scalar(-drag_step.min(length));
        }

        self.center += self.velocity.as_vec2();
    }

    /// Off-track penalty: full speed in the direction opposite to travel.
    pub fn bounce_back(&mut self) {
        let length = self.velocity.length();
        if length == 0.0 {
            return;
        }
        let bounced = -self.params.max_speed * length.signum();
        debug!(from = length, to = bounced, "off track, bouncing back");
        self.velocity = self.velocity.with_length(bounced);
    }

    pub fn damp(&mut self, factor: f32) {
        self.velocity = self.velocity.scale(factor);
    }

    fn turn(&mut self, degrees: f32) {
        self.velocity = self.velocity.rotate(degrees);
        self.mask = self.sprite.rotated(self.velocity.angle());
    }
}

impl Collider for Car {
    fn mask(&self) -> &Mask {
        &self.mask
    }

    fn top_left(&self) -> IVec2 {
        (self.center - self.size() / 2.0).round().as_ivec2()
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec2;

    use super::{Car, CarParams, Drag, DriveInput};
    use crate::mask::Mask;

    fn car(params: CarParams) -> Car {
        Car::new(Vec2::new(100.0, 100.0), 0.0, params, Mask::filled(10, 20))
    }

    fn no_drag() -> CarParams {
        CarParams {
            acceleration: 30.0,
            turnability: 3.0,
            max_speed: 15.0,
            drag: Drag::Inertia(0.0),
        }
    }

    #[test]
    fn drag_never_crosses_zero() {
        let params = CarParams {
            drag: Drag::Inertia(5.0),
            ..no_drag()
        };
        let mut forward = car(params);
        forward.velocity = forward.velocity.with_length(2.0);
        forward.step(DriveInput::default(), 1.0);
        assert_eq!(forward.velocity().length(), 0.0);

        let mut reverse = car(params);
        reverse.velocity = reverse.velocity.with_length(-2.0);
        reverse.step(DriveInput::default(), 1.0);
        assert_eq!(reverse.velocity().length(), 0.0);
    }

    #[test]
    fn drag_shrinks_speed_monotonically() {
        let params = CarParams {
            drag: Drag::Weight(50.0),
            ..no_drag()
        };
        let mut car = car(params);
        car.velocity = car.velocity.with_length(-3.0);
        let mut previous = car.speed();
        for _ in 0..400 {
            car.step(DriveInput::default(), 60.0);
            assert!(car.speed() <= previous);
            assert!(car.velocity().length() <= 0.0);
            previous = car.speed();
        }
        assert_eq!(car.speed(), 0.0);
    }

    #[test]
    fn speed_is_capped_both_ways() {
        let mut car = car(CarParams {
            acceleration: 600.0,
            ..no_drag()
        });
        for _ in 0..100 {
            car.step(DriveInput::UP, 60.0);
            assert!(car.speed() <= 15.0);
        }
        assert_eq!(car.velocity().length(), -15.0);

        let down = DriveInput {
            down: true,
            ..DriveInput::default()
        };
        for _ in 0..100 {
            car.step(down, 60.0);
            assert!(car.speed() <= 15.0);
        }
        assert_eq!(car.velocity().length(), 15.0);
    }

    #[test]
    fn up_moves_toward_the_top_of_the_screen() {
        let mut car = car(no_drag());
        let start = car.center();
        for _ in 0..10 {
            car.step(DriveInput::UP, 60.0);
        }
        assert!(car.center().y < start.y);
        assert!((car.center().x - start.x).abs() < 1e-3);
    }

    #[test]
    fn steering_rotates_heading_and_mask() {
        let mut car = car(no_drag());
        let left = DriveInput {
            left: true,
            ..DriveInput::default()
        };
        for _ in 0..30 {
            car.step(left, 60.0);
        }
        assert!((car.velocity().angle() - 90.0).abs() < 1e-3);
        // a 10x20 sprite turned a quarter is 20x10
        assert_eq!(car.size(), Vec2::new(20.0, 10.0));

        let right = DriveInput {
            right: true,
            ..DriveInput::default()
        };
        for _ in 0..60 {
            car.step(right, 60.0);
        }
        assert!((car.velocity().angle() - 270.0).abs() < 1e-3);
    }

    #[test]
    fn bounce_back_flips_to_full_speed() {
        let mut car = car(no_drag());
        car.velocity = car.velocity.with_length(-4.0);
        car.bounce_back();
        assert_eq!(car.velocity().length(), 15.0);

        car.velocity = car.velocity.with_length(0.5);
        car.bounce_back();
        assert_eq!(car.velocity().length(), -15.0);
    }

    #[test]
    fn bounce_back_at_rest_is_a_no_op() {
        let mut car = car(no_drag());
        car.bounce_back();
        assert_eq!(car.velocity().length(), 0.0);
    }

    #[test]
    fn damping_scales_speed() {
        let mut car = car(no_drag());
        car.velocity = car.velocity.with_length(-10.0);
        car.damp(0.9);
        assert!((car.velocity().length() + 9.0).abs() < 1e-5);
    }
}
