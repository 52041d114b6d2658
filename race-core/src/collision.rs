use bevy_math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::mask::Mask;

/// Anything with a mask placed in world pixels.
pub trait Collider {
    fn mask(&self) -> &Mask;

    fn top_left(&self) -> IVec2;
}

/// Pixel-accurate overlap test between two placed masks.
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: Collider + ?Sized,
    B: Collider + ?Sized,
{
    a.mask().overlaps(b.mask(), b.top_left() - a.top_left())
}

/// What touching a boundary does to the car.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ZoneEffect {
    /// Hard off-track penalty, see [`crate::car::Car::bounce_back`].
    Bounce,
    /// Soft zone: scale the speed by this factor every tick of contact.
    Damp(f32),
}

/// A static track image with its (possibly inverted) mask.
#[derive(Debug, Clone)]
pub struct Boundary {
    name: String,
    top_left: IVec2,
    mask: Mask,
    effect: ZoneEffect,
}

impl Boundary {
    pub fn new(name: impl Into<String>, top_left: IVec2, mask: Mask, effect: ZoneEffect) -> Self {
        Self {
            name: name.into(),
            top_left,
            mask,
            effect,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn effect(&self) -> ZoneEffect {
        self.effect
    }

    pub fn size(&self) -> Vec2 {
        self.mask.size().as_vec2()
    }

    pub fn center(&self) -> Vec2 {
        self.top_left.as_vec2() + self.size() / 2.0
    }
}

impl Collider for Boundary {
    fn mask(&self) -> &Mask {
        &self.mask
    }

    fn top_left(&self) -> IVec2 {
        self.top_left
    }
}
