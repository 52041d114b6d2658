use std::sync::Arc;

use bevy_math::{IVec2, Vec2};

use crate::collision::Collider;
use crate::mask::Mask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckpointId(pub usize);

/// A small static sprite the car collects by touching it.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    id: CheckpointId,
    center: Vec2,
    mask: Arc<Mask>,
}

impl Checkpoint {
    pub fn new(id: CheckpointId, center: Vec2, mask: Arc<Mask>) -> Self {
        Self { id, center, mask }
    }

    /// One checkpoint per position, numbered in list order. All of them share
    /// the same sprite mask.
    pub fn batch(positions: &[Vec2], mask: Arc<Mask>) -> Vec<Self> {
        positions
            .iter()
            .enumerate()
            .map(|(index, &center)| Self::new(CheckpointId(index), center, mask.clone()))
            .collect()
    }

    pub fn id(&self) -> CheckpointId {
        self.id
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn size(&self) -> Vec2 {
        self.mask.size().as_vec2()
    }
}

impl Collider for Checkpoint {
    fn mask(&self) -> &Mask {
        &self.mask
    }

    fn top_left(&self) -> IVec2 {
        (self.center - self.size() / 2.0).round().as_ivec2()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy_math::{IVec2, Vec2};

    use super::{Checkpoint, CheckpointId};
    use crate::collision::Collider;
    use crate::mask::Mask;

    #[test]
    fn batch_numbers_in_list_order_and_shares_the_mask() {
        let mask = Arc::new(Mask::filled(40, 40));
        let positions = [Vec2::new(100.0, 100.0), Vec2::new(-50.0, 300.0), Vec2::ZERO];
        let checkpoints = Checkpoint::batch(&positions, mask.clone());

        assert_eq!(checkpoints.len(), 3);
        for (index, checkpoint) in checkpoints.iter().enumerate() {
            assert_eq!(checkpoint.id(), CheckpointId(index));
            assert_eq!(checkpoint.center(), positions[index]);
            assert_eq!(checkpoint.size(), Vec2::new(40.0, 40.0));
        }
        // three checkpoints plus the local handle
        assert_eq!(Arc::strong_count(&mask), 4);
    }

    #[test]
    fn top_left_rounds_to_whole_pixels() {
        let mask = Arc::new(Mask::filled(5, 4));
        let checkpoint = Checkpoint::new(CheckpointId(0), Vec2::new(10.3, 20.6), mask);
        // (10.3 - 2.5, 20.6 - 2.0) = (7.8, 18.6)
        assert_eq!(checkpoint.top_left(), IVec2::new(8, 19));
        assert_eq!(checkpoint.mask().count(), 20);
    }

    #[test]
    fn empty_batch() {
        assert!(Checkpoint::batch(&[], Arc::new(Mask::filled(1, 1))).is_empty());
    }
}
