use std::sync::Arc;

use bevy_math::{UVec2, Vec2};
use tracing::{debug, info};

use crate::camera::Camera;
use crate::car::{Car, DriveInput};
use crate::checkpoint::{Checkpoint, CheckpointId};
use crate::collision::{Boundary, Collider, ZoneEffect, overlaps};
use crate::error::TrackError;
use crate::mask::Mask;
use crate::track_format::TrackFile;

/// Identifies one renderable in a session's draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    /// Index into [`Session::boundaries`].
    Boundary(usize),
    Checkpoint(CheckpointId),
    Car,
}

/// Masks of the decoded source images, before any scaling or inversion.
pub struct SpriteMasks {
    pub car: Mask,
    /// Required when the track lists checkpoints.
    pub checkpoint: Option<Mask>,
    /// One per [`TrackFile::boundaries`] entry, same order.
    pub boundaries: Vec<Mask>,
}

/// What happened during one [`Session::tick`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub bounced: bool,
    pub damped: bool,
    pub collected: Vec<CheckpointId>,
}

/// Where to draw one sprite this frame, in screen pixels (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub sprite: SpriteId,
    pub top_left: Vec2,
    pub size: Vec2,
    /// Counter-clockwise rotation in degrees; only the car turns.
    pub angle: f32,
}

impl DrawItem {
    pub fn center(&self) -> Vec2 {
        self.top_left + self.size / 2.0
    }
}

/// One game session: the car, the static track, the remaining checkpoints
/// and the camera that follows the car.
pub struct Session {
    car: Car,
    boundaries: Vec<Boundary>,
    checkpoints: Vec<Checkpoint>,
    draw_order: Vec<SpriteId>,
    camera: Camera,
    screen_size: UVec2,
    tick_rate: f32,
    frame: u64,
}

impl Session {
    pub fn new(track: &TrackFile, masks: SpriteMasks) -> Result<Self, TrackError> {
        track.validate()?;
        if masks.boundaries.len() != track.boundaries.len() {
            return Err(TrackError::Invalid(format!(
                "{} boundary images for {} boundaries",
                masks.boundaries.len(),
                track.boundaries.len()
            )));
        }

        let boundaries: Vec<Boundary> = track
            .boundaries
            .iter()
            .zip(masks.boundaries)
            .map(|(entry, image)| {
                let size = entry.size();
                let mut mask = image.scaled(size.x, size.y);
                if entry.invert {
                    mask.invert();
                }
                Boundary::new(entry.name.clone(), entry.position(), mask, entry.effect)
            })
            .collect();

        let checkpoints = if track.checkpoints.is_empty() {
            Vec::new()
        } else {
            let Some(mask) = masks.checkpoint else {
                return Err(TrackError::Invalid(
                    "checkpoints listed but no checkpoint image given".to_string(),
                ));
            };
            Checkpoint::batch(&track.checkpoint_positions(), Arc::new(mask))
        };

        let car = Car::new(
            track.start_position(),
            track.start.angle,
            track.car,
            masks.car,
        );

        let mut draw_order: Vec<SpriteId> = (0..boundaries.len()).map(SpriteId::Boundary).collect();
        draw_order.extend(checkpoints.iter().map(|c| SpriteId::Checkpoint(c.id())));
        draw_order.push(SpriteId::Car);

        let screen_size = track.window.size();
        let mut camera = Camera::default();
        camera.update(car.center(), screen_size);

        info!(
            track = %track.metadata.name,
            boundaries = boundaries.len(),
            checkpoints = checkpoints.len(),
            "session ready"
        );

        Ok(Self {
            car,
            boundaries,
            checkpoints,
            draw_order,
            camera,
            screen_size,
            tick_rate: track.tick_rate,
            frame: 0,
        })
    }

    /// Run one frame of simulation: drive, collide, then re-centre the camera.
    pub fn tick(&mut self, input: DriveInput) -> TickReport {
        let mut report = TickReport::default();

        self.car.step(input, self.tick_rate);

        // The hard zone wins: a bounce leaves the car at full reverse speed,
        // so soft zones touched in the same tick are skipped.
        let touched: Vec<ZoneEffect> = self
            .boundaries
            .iter()
            .filter(|boundary| overlaps(&self.car, *boundary))
            .map(Boundary::effect)
            .collect();
        if touched.contains(&ZoneEffect::Bounce) {
            self.car.bounce_back();
            report.bounced = true;
        } else {
            for effect in touched {
                if let ZoneEffect::Damp(factor) = effect {
                    self.car.damp(factor);
                    report.damped = true;
                }
            }
        }

        let car = &self.car;
        let mut collected = Vec::new();
        self.checkpoints.retain(|checkpoint| {
            let hit = overlaps(car, checkpoint);
            if hit {
                collected.push(checkpoint.id());
            }
            !hit
        });
        for id in &collected {
            self.draw_order.retain(|sprite| *sprite != SpriteId::Checkpoint(*id));
            info!(
                checkpoint = id.0,
                remaining = self.checkpoints.len(),
                frame = self.frame,
                "checkpoint collected"
            );
        }
        report.collected = collected;

        self.camera.update(self.car.center(), self.screen_size);
        self.frame += 1;

        if report.bounced || report.damped {
            debug!(
                frame = self.frame,
                speed = self.car.speed(),
                bounced = report.bounced,
                damped = report.damped,
                "boundary contact"
            );
        }
        report
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn draw_order(&self) -> &[SpriteId] {
        &self.draw_order
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn screen_size(&self) -> UVec2 {
        self.screen_size
    }

    pub fn tick_rate(&self) -> f32 {
        self.tick_rate
    }

    /// Ticks simulated so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Screen placement of a sprite, or `None` once it left the draw order.
    pub fn draw_item(&self, sprite: SpriteId) -> Option<DrawItem> {
        let (top_left, size, angle) = match sprite {
            SpriteId::Car => (
                self.car.top_left().as_vec2(),
                self.car.size(),
                self.car.velocity().angle(),
            ),
            SpriteId::Boundary(index) => {
                let boundary = self.boundaries.get(index)?;
                (boundary.top_left().as_vec2(), boundary.size(), 0.0)
            }
            SpriteId::Checkpoint(id) => {
                let checkpoint = self.checkpoints.iter().find(|c| c.id() == id)?;
                (checkpoint.top_left().as_vec2(), checkpoint.size(), 0.0)
            }
        };
        Some(DrawItem {
            sprite,
            top_left: self.camera.apply(top_left),
            size,
            angle,
        })
    }

    /// Everything to draw this frame, back to front.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        self.draw_order
            .iter()
            .filter_map(|&sprite| self.draw_item(sprite))
            .collect()
    }
}
