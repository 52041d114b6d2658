use bevy::{asset::LoadState, prelude::*};

use race_core::Session;
use race_core::car::DriveInput;
use race_core::mask::Mask;
use race_core::session::{SpriteId, SpriteMasks};
use race_core::track_format::TrackFile;

use crate::screen_to_world;

/// Loads the track images, builds the session once they are decoded and
/// then runs it on the fixed schedule.
pub struct RaceRuntimePlugin {
    pub track: TrackFile,
}

impl Plugin for RaceRuntimePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<RaceState>()
            .insert_resource(TrackConfig(self.track.clone()))
            .insert_resource(Time::<Fixed>::from_duration(
                std::time::Duration::from_secs_f32(1.0 / self.track.tick_rate),
            ))
            .add_systems(Startup, (setup, load_track_images))
            .add_systems(
                Update,
                finish_loading.run_if(in_state(RaceState::Loading)),
            )
            .add_systems(OnEnter(RaceState::Racing), spawn_sprites)
            .add_systems(FixedUpdate, drive.run_if(in_state(RaceState::Racing)))
            .add_systems(Update, sync_sprites.run_if(in_state(RaceState::Racing)));
    }
}

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RaceState {
    #[default]
    Loading,
    Racing,
}

#[derive(Resource)]
pub struct TrackConfig(pub TrackFile);

#[derive(Resource)]
pub struct RaceSession(pub Session);

#[derive(Resource)]
pub struct TrackImages {
    pub car: Handle<Image>,
    pub checkpoint: Option<Handle<Image>>,
    pub boundaries: Vec<Handle<Image>>,
}

impl TrackImages {
    fn all(&self) -> impl Iterator<Item = &Handle<Image>> {
        self.boundaries
            .iter()
            .chain(self.checkpoint.iter())
            .chain(std::iter::once(&self.car))
    }

    fn handle(&self, sprite: SpriteId) -> Option<&Handle<Image>> {
        match sprite {
            SpriteId::Car => Some(&self.car),
            SpriteId::Boundary(index) => self.boundaries.get(index),
            SpriteId::Checkpoint(_) => self.checkpoint.as_ref(),
        }
    }
}

/// Ties a sprite entity to its entry in the session's draw order.
#[derive(Component)]
pub struct Renderable(pub SpriteId);

fn setup(mut commands: Commands, config: Res<TrackConfig>) {
    info!(
        "Loading track '{}' ({} boundaries, {} checkpoints)",
        config.0.metadata.name,
        config.0.boundaries.len(),
        config.0.checkpoints.len()
    );
    // The camera never moves; the session's camera offset is applied to the
    // sprites instead.
    commands.spawn(Camera2d);
}

fn load_track_images(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<TrackConfig>,
) {
    let track = &config.0;
    let checkpoint = (!track.checkpoints.is_empty())
        .then(|| asset_server.load(track.assets.checkpoint.clone()));
    commands.insert_resource(TrackImages {
        car: asset_server.load(track.assets.car.clone()),
        checkpoint,
        boundaries: track
            .boundaries
            .iter()
            .map(|b| asset_server.load(b.image.clone()))
            .collect(),
    });
}

fn finish_loading(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
    handles: Option<Res<TrackImages>>,
    config: Res<TrackConfig>,
    mut next_state: ResMut<NextState<RaceState>>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(handles) = handles else {
        return;
    };

    for handle in handles.all() {
        if let LoadState::Failed(err) = asset_server.load_state(handle.id()) {
            error!("Failed to load {:?}: {err}", handle.path());
            exit.write(AppExit::error());
            return;
        }
    }
    if handles.all().any(|handle| images.get(handle).is_none()) {
        return;
    }

    let masks = match collect_masks(&handles, &images) {
        Ok(masks) => masks,
        Err(err) => {
            error!("Failed to build collision masks: {err}");
            exit.write(AppExit::error());
            return;
        }
    };

    match Session::new(&config.0, masks) {
        Ok(session) => {
            commands.insert_resource(RaceSession(session));
            next_state.set(RaceState::Racing);
        }
        Err(err) => {
            error!("{err}");
            exit.write(AppExit::error());
        }
    }
}

fn collect_masks(handles: &TrackImages, images: &Assets<Image>) -> Result<SpriteMasks, String> {
    let mask_of = |handle: &Handle<Image>| {
        images
            .get(handle)
            .ok_or_else(|| format!("image {:?} is not loaded", handle.path()))
            .and_then(mask_from_image)
    };

    Ok(SpriteMasks {
        car: mask_of(&handles.car)?,
        checkpoint: handles.checkpoint.as_ref().map(mask_of).transpose()?,
        boundaries: handles
            .boundaries
            .iter()
            .map(mask_of)
            .collect::<Result<_, _>>()?,
    })
}

/// Opaque pixels of a decoded image, whatever its texture format.
pub fn mask_from_image(image: &Image) -> Result<Mask, String> {
    let size = image.size();
    let rgba = image
        .clone()
        .try_into_dynamic()
        .map_err(|err| format!("unsupported image format: {err}"))?
        .to_rgba8();
    Mask::from_rgba(size.x, size.y, rgba.as_raw()).map_err(|err| err.to_string())
}

fn spawn_sprites(mut commands: Commands, session: Res<RaceSession>, handles: Res<TrackImages>) {
    let screen = session.0.screen_size();
    for (z, item) in session.0.draw_list().into_iter().enumerate() {
        let Some(image) = handles.handle(item.sprite) else {
            continue;
        };
        let mut sprite = Sprite::from_image(image.clone());
        if let SpriteId::Boundary(_) = item.sprite {
            // track images are stretched to the boundary size
            sprite.custom_size = Some(item.size);
        }
        let position = screen_to_world(item.center(), screen);
        commands.spawn((
            sprite,
            Transform::from_xyz(position.x, position.y, z as f32)
                .with_rotation(Quat::from_rotation_z(item.angle.to_radians())),
            Renderable(item.sprite),
        ));
    }
}

fn drive(keyboard: Res<ButtonInput<KeyCode>>, mut session: ResMut<RaceSession>) {
    let input = DriveInput {
        up: keyboard.pressed(KeyCode::ArrowUp),
        down: keyboard.pressed(KeyCode::ArrowDown),
        left: keyboard.pressed(KeyCode::ArrowLeft),
        right: keyboard.pressed(KeyCode::ArrowRight),
    };
    session.0.tick(input);
}

fn sync_sprites(
    mut commands: Commands,
    session: Res<RaceSession>,
    mut query: Query<(Entity, &Renderable, &mut Transform)>,
) {
    let screen = session.0.screen_size();
    for (entity, renderable, mut transform) in &mut query {
        let Some(item) = session.0.draw_item(renderable.0) else {
            // collected checkpoints leave the draw order for good
            commands.entity(entity).despawn();
            continue;
        };
        let position = screen_to_world(item.center(), screen);
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        transform.rotation = Quat::from_rotation_z(item.angle.to_radians());
    }
}
