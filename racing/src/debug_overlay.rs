use bevy::{
    color::palettes::css::{RED, WHITE, YELLOW},
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use race_core::collision::ZoneEffect;
use race_core::session::SpriteId;

use crate::race_runtime::{RaceSession, RaceState};
use crate::screen_to_world;

/// Car bounding box, velocity arrow, ribbon position readout and FPS.
pub struct DebugOverlayPlugin;

impl Plugin for DebugOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_overlay)
            .add_systems(
                Update,
                (draw_car_gizmos, update_track_readout).run_if(in_state(RaceState::Racing)),
            )
            .add_systems(Update, update_fps_counter);
    }
}

/// Screen position of the velocity arrow's tail.
const VELOCITY_ORIGIN: Vec2 = Vec2::new(50.0, 50.0);
const VELOCITY_SCALE: f32 = 1.5;
/// Screen position the soft-zone readout is centred on.
const READOUT_CENTER: Vec2 = Vec2::new(50.0, 500.0);

#[derive(Component)]
struct TrackReadout;

#[derive(Component)]
struct FpsCounterText;

fn setup_overlay(mut commands: Commands) {
    // Zero-sized anchor so the readout is centred on READOUT_CENTER.
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(READOUT_CENTER.x),
            top: Val::Px(READOUT_CENTER.y),
            width: Val::Px(0.0),
            height: Val::Px(0.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        children![(
            Text::new(""),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(RED.into()),
            TextLayout::new_with_no_wrap(),
            Node {
                flex_shrink: 0.0,
                ..default()
            },
            TrackReadout,
        )],
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            right: Val::Px(8.0),
            padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.55)),
        Text::new("FPS: --"),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(WHITE.into()),
        FpsCounterText,
    ));
}

fn draw_car_gizmos(session: Res<RaceSession>, mut gizmos: Gizmos) {
    let session = &session.0;
    let screen = session.screen_size();
    let Some(car) = session.draw_item(SpriteId::Car) else {
        return;
    };

    let center = screen_to_world(car.center(), screen);
    gizmos.rect_2d(Isometry2d::from_translation(center), car.size, RED);
    gizmos.rect_2d(Isometry2d::from_translation(center), Vec2::splat(4.0), YELLOW);

    let velocity = session.car().velocity().as_vec2();
    gizmos.line_2d(
        screen_to_world(VELOCITY_ORIGIN, screen),
        screen_to_world(VELOCITY_ORIGIN + velocity * VELOCITY_SCALE, screen),
        RED,
    );
}

/// Shows where the centre of the soft-zone image currently sits on screen.
fn update_track_readout(
    session: Res<RaceSession>,
    mut query: Query<&mut Text, With<TrackReadout>>,
) {
    let Ok(mut text) = query.single_mut() else {
        return;
    };
    let session = &session.0;
    let ribbon = session
        .boundaries()
        .iter()
        .position(|b| matches!(b.effect(), ZoneEffect::Damp(_)))
        .or_else(|| (!session.boundaries().is_empty()).then_some(0));
    let Some(item) = ribbon.and_then(|index| session.draw_item(SpriteId::Boundary(index))) else {
        return;
    };
    let center = item.center();
    text.0 = format!("({:.0}, {:.0})", center.x, center.y);
}

fn update_fps_counter(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsCounterText>>,
) {
    let Ok(mut text) = query.single_mut() else {
        return;
    };

    if let Some(fps) = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|value| value.smoothed())
    {
        text.0 = format!("FPS: {fps:>3.0}");
    }
}
