use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use df_entity_spawn::{
    default_background_config, default_item_config, ChunkStreamingSet, ContentStream,
    ContentStreamPlugin, Decorations, Items, StreamedContent, StreamingGizmos,
    StreamingGizmosPlugin, StreamingObserver,
};
use df_persistence::{load_streaming_config, streaming_config_path, ConfigIoError};
use df_stream::{PropertyRanges, StreamingConfig};
use serde::de::DeserializeOwned;

/// Observer speed in world units per second.
const OBSERVER_SPEED: f32 = 12.0;

/// World units per screen pixel.
const CAMERA_SCALE: f32 = 0.04;

fn main() {
    let background = load_or_default("background", default_background_config);
    let items = load_or_default("items", default_item_config);

    let (background, items) = match (background, items) {
        (Ok(background), Ok(items)) => (background, items),
        (Err(err), _) | (_, Err(err)) => {
            eprintln!("Could not load streaming config: {}", err);
            std::process::exit(1);
        }
    };

    let background_plugin = match ContentStreamPlugin::<Decorations>::new(background) {
        Ok(plugin) => plugin,
        Err(err) => {
            eprintln!("Background config rejected: {}", err);
            std::process::exit(1);
        }
    };
    let item_plugin = match ContentStreamPlugin::<Items>::new(items) {
        Ok(plugin) => plugin,
        Err(err) => {
            eprintln!("Item config rejected: {}", err);
            std::process::exit(1);
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Driftfield".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .add_plugins((
            background_plugin,
            item_plugin,
            StreamingGizmosPlugin::<Decorations>::default(),
            StreamingGizmosPlugin::<Items>::default(),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (
            observer_movement.before(ChunkStreamingSet),
            camera_follow.after(observer_movement),
            toggle_gizmos,
            streaming_stats_ui,
        ))
        .run();
}

/// Read `assets/streaming/<name>.ron`, falling back to built-in defaults when
/// the file does not exist. Any other failure is returned.
fn load_or_default<V, R>(
    name: &str,
    fallback: fn() -> StreamingConfig<V, R>,
) -> Result<StreamingConfig<V, R>, ConfigIoError>
where
    V: DeserializeOwned,
    R: DeserializeOwned + PropertyRanges,
{
    let path = streaming_config_path(name);
    match load_streaming_config(&path) {
        Ok(config) => {
            println!("Loaded {} streaming config from {}", name, path.display());
            Ok(config)
        }
        Err(err) if err.is_not_found() => {
            println!("No {} found, using built-in {} settings", path.display(), name);
            Ok(fallback())
        }
        Err(err) => Err(err),
    }
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scale: CAMERA_SCALE,
            ..OrthographicProjection::default_2d()
        },
    ));

    commands.spawn((
        Sprite {
            color: Color::srgb(0.2, 0.6, 1.0),
            custom_size: Some(Vec2::new(0.8, 1.2)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 5.0),
        StreamingObserver,
    ));
}

fn observer_movement(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut query: Query<&mut Transform, With<StreamingObserver>>,
) {
    let mut direction = Vec3::ZERO;

    if keyboard.pressed(KeyCode::KeyW) {
        direction.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        direction.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }

    if direction != Vec3::ZERO {
        direction = direction.normalize();
        for mut transform in &mut query {
            transform.translation += direction * OBSERVER_SPEED * time.delta_secs();
        }
    }
}

fn camera_follow(
    observers: Query<&Transform, (With<StreamingObserver>, Without<Camera2d>)>,
    mut cameras: Query<&mut Transform, With<Camera2d>>,
) {
    let Some(observer) = observers.iter().next() else { return };
    for mut camera in &mut cameras {
        camera.translation.x = observer.translation.x;
        camera.translation.y = observer.translation.y;
    }
}

fn toggle_gizmos(keyboard: Res<ButtonInput<KeyCode>>, mut gizmos: ResMut<StreamingGizmos>) {
    if keyboard.just_pressed(KeyCode::F3) {
        gizmos.enabled = !gizmos.enabled;
    }
}

fn streaming_stats_ui(
    mut contexts: EguiContexts,
    background: Option<Res<ContentStream<Decorations>>>,
    items: Option<Res<ContentStream<Items>>>,
    mut gizmos: ResMut<StreamingGizmos>,
    observers: Query<&Transform, With<StreamingObserver>>,
) {
    egui::Window::new("Streaming")
        .default_width(240.0)
        .show(contexts.ctx_mut(), |ui| {
            match observers.iter().next() {
                Some(t) => ui.label(format!(
                    "Observer at ({:.1}, {:.1})",
                    t.translation.x, t.translation.y
                )),
                None => ui.label("No observer"),
            };
            ui.separator();

            if let Some(stream) = background.as_deref() {
                stream_section(ui, "Background", stream);
            }
            if let Some(stream) = items.as_deref() {
                stream_section(ui, "Items", stream);
            }

            ui.checkbox(&mut gizmos.enabled, "Chunk gizmos (F3)");
            ui.label("WASD - Move");
        });
}

fn stream_section<C: StreamedContent>(ui: &mut egui::Ui, title: &str, stream: &ContentStream<C>) {
    let streamer = &stream.streamer;

    ui.heading(title);
    ui.label(format!("Active chunks: {}", streamer.active_chunk_count()));
    ui.label(format!("Entities: {}", streamer.handle_count()));

    if let Some(report) = &stream.last_report {
        ui.label(format!(
            "Entered {}: +{} / -{} chunks",
            report.observer_chunk,
            report.loaded.len(),
            report.unloaded.len()
        ));
    }
    if stream.failed_total > 0 {
        ui.colored_label(
            egui::Color32::YELLOW,
            format!("Failed spawns: {}", stream.failed_total),
        );
    }
    ui.separator();
}
