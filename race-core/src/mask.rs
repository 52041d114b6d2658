use bevy_math::{IVec2, UVec2};

use crate::error::TrackError;

const WORD_BITS: usize = 64;

/// Alpha values above this count as solid, matching the usual sprite-mask rule.
pub const ALPHA_THRESHOLD: u8 = 127;

/// Bit-packed opacity bitmap used for pixel-accurate collision tests.
///
/// Rows are stored as whole `u64` words; bits past `width` in the last word of
/// a row are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    /// An all-clear mask.
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(WORD_BITS);
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    /// An all-solid mask.
    pub fn filled(width: u32, height: u32) -> Self {
        Self::new(width, height).inverted()
    }

    pub fn from_fn(width: u32, height: u32, mut solid: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if solid(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Build a mask from tightly packed RGBA8 pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, TrackError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TrackError::Invalid(format!(
                "expected {expected} bytes of RGBA for a {width}x{height} image, got {}",
                rgba.len()
            )));
        }
        Ok(Self::from_fn(width, height, |x, y| {
            let idx = (y as usize * width as usize + x as usize) * 4;
            rgba[idx + 3] > ALPHA_THRESHOLD
        }))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (word, bit) = self.locate(x, y);
        self.bits[word] & (1 << bit) != 0
    }

    pub fn set(&mut self, x: u32, y: u32, solid: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (word, bit) = self.locate(x, y);
        if solid {
            self.bits[word] |= 1 << bit;
        } else {
            self.bits[word] &= !(1 << bit);
        }
    }

    /// Number of solid pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    pub fn invert(&mut self) {
        let tail = self.width as usize % WORD_BITS;
        let tail_mask = if tail == 0 { u64::MAX } else { (1u64 << tail) - 1 };
        for row in self.bits.chunks_mut(self.words_per_row.max(1)) {
            for word in row.iter_mut() {
                *word = !*word;
            }
            if let Some(last) = row.last_mut() {
                *last &= tail_mask;
            }
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert();
        self
    }

    /// Nearest-neighbour resize.
    pub fn scaled(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let (src_w, src_h) = (self.width as u64, self.height as u64);
        let mut out = Self::new(width, height);
        if src_w == 0 || src_h == 0 {
            return out;
        }
        for y in 0..height {
            let sy = (y as u64 * src_h / height as u64) as u32;
            for x in 0..width {
                let sx = (x as u64 * src_w / width as u64) as u32;
                if self.get(sx, sy) {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    /// Rotate counter-clockwise (as seen on screen) by `degrees`.
    ///
    /// The result grows to the bounding box of the rotated rectangle, the way
    /// a rotated sprite does, and is sampled with nearest neighbour.
    pub fn rotated(&self, degrees: f32) -> Self {
        let degrees = degrees.rem_euclid(360.0);
        if degrees == 0.0 || degrees == 360.0 {
            return self.clone();
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width as f32, self.height as f32);
        // Trim float noise so right angles swap the dimensions exactly.
        let out_w = (w * cos.abs() + h * sin.abs() - 1e-3).ceil().max(0.0) as u32;
        let out_h = (w * sin.abs() + h * cos.abs() - 1e-3).ceil().max(0.0) as u32;

        let mut out = Self::new(out_w, out_h);
        let (half_out_w, half_out_h) = (out_w as f32 / 2.0, out_h as f32 / 2.0);
        for oy in 0..out_h {
            let dy = oy as f32 + 0.5 - half_out_h;
            for ox in 0..out_w {
                let dx = ox as f32 + 0.5 - half_out_w;
                let sx = (dx * cos - dy * sin + w / 2.0).floor();
                let sy = (dx * sin + dy * cos + h / 2.0).floor();
                if sx < 0.0 || sy < 0.0 {
                    continue;
                }
                if self.get(sx as u32, sy as u32) {
                    out.set(ox, oy, true);
                }
            }
        }
        out
    }

    /// First pixel (in `self` coordinates) where both masks are solid, with
    /// `other`'s top-left placed at `offset` relative to `self`'s.
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> Option<IVec2> {
        let x0 = offset.x.max(0);
        let y0 = offset.y.max(0);
        let x1 = (self.width as i32).min(offset.x + other.width as i32);
        let y1 = (self.height as i32).min(offset.y + other.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        for y in y0..y1 {
            let row = y as usize * self.words_per_row;
            for x in x0..x1 {
                let word = self.bits[row + x as usize / WORD_BITS];
                if word == 0 {
                    continue;
                }
                if word & (1 << (x as usize % WORD_BITS)) != 0
                    && other.get((x - offset.x) as u32, (y - offset.y) as u32)
                {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }

    pub fn overlaps(&self, other: &Mask, offset: IVec2) -> bool {
        self.overlap(other, offset).is_some()
    }

    fn locate(&self, x: u32, y: u32) -> (usize, usize) {
        let x = x as usize;
        (
            y as usize * self.words_per_row + x / WORD_BITS,
            x % WORD_BITS,
        )
    }
}
