use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::app::ScheduleRunnerPlugin;
use bevy::asset::AssetPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowLevel, WindowMode, WindowPosition, WindowResolution};
use bevy::winit::WinitWindows;
use clap::Parser;

use desktop_buddy::environment::EnvironmentProvider;
use desktop_buddy::movie::MovieClassifier;
use desktop_buddy::playground::{Layout, Playground};
use desktop_buddy::presentation::{
    breathing_offset, clip_for, draw_origin, row_col_to_index, sprite_size, SHEET_COLS,
    SHEET_ROWS,
};
use desktop_buddy::{Facing, ScreenRect, SimConfig, Simulation, TickInput, TickOutcome};

const MONITOR_POLL_SECS: f32 = 2.0;

/// A small creature that lives on your desktop.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file overriding the default tuning
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the random source (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window against the playground layout
    #[arg(long)]
    headless: bool,

    /// Number of ticks to run in headless mode
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// JSON layout of scripted monitors and windows
    #[arg(long)]
    playground: Option<PathBuf>,

    /// Pretend the foreground window has this title
    #[arg(long)]
    movie_title: Option<String>,

    /// Pixels trimmed off the bottom of each monitor (taskbar, dock)
    #[arg(long, default_value_t = 0.0)]
    floor_inset: f32,
}

#[derive(Resource)]
struct Buddy {
    config: SimConfig,
    seed: Option<u64>,
    // built once the monitor layout is known
    sim: Option<Simulation>,
}

#[derive(Resource)]
struct Stage {
    playground: Playground,
}

#[derive(Resource)]
struct MovieWatch {
    classifier: MovieClassifier,
    title: Option<String>,
}

impl MovieWatch {
    fn is_playing(&self) -> bool {
        self.classifier.is_playing(self.title.as_deref())
    }
}

#[derive(Resource)]
struct MonitorPoll {
    timer: Timer,
    floor_inset: f32,
}

#[derive(Resource)]
struct HeadlessRun {
    remaining: u64,
}

#[derive(Resource, Default)]
struct SheetInfo {
    frame_w: f32,
    frame_h: f32,
    atlas_layout: Handle<TextureAtlasLayout>,
    texture: Handle<Image>,
    ready: bool,
}

#[derive(Component)]
struct BuddySprite;

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let layout = match &args.playground {
        Some(path) => {
            Layout::load(path).with_context(|| format!("loading playground {}", path.display()))?
        }
        None if args.headless => Layout::demo(),
        None => Layout::default(),
    };

    let movie = MovieWatch {
        classifier: MovieClassifier::new(&config.movie_markers),
        title: args.movie_title.clone(),
    };

    if args.headless {
        run_headless(config, layout, movie, &args);
    } else {
        run_desktop(config, layout, movie, &args);
    }
    Ok(())
}

fn run_headless(config: SimConfig, layout: Layout, movie: MovieWatch, args: &Args) {
    let mut playground = Playground::new(layout);
    let sim = Simulation::new(config.clone(), playground.monitors(), args.seed);
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
            LogPlugin::default(),
        ))
        .insert_resource(Buddy {
            config,
            seed: args.seed,
            sim: Some(sim),
        })
        .insert_resource(Stage { playground })
        .insert_resource(movie)
        .insert_resource(HeadlessRun {
            remaining: args.ticks,
        })
        .add_systems(Startup, || info!("Running HEADLESS against the playground layout."))
        .add_systems(Update, headless_tick)
        .run();
}

fn run_desktop(config: SimConfig, layout: Layout, movie: MovieWatch, args: &Args) {
    let tick = Duration::from_millis(config.tick_ms);

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(AssetPlugin {
                    file_path: ".".into(), // buddy.png from the working directory
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Desktop Buddy".into(),
                        name: Some("desktop-buddy".into()),
                        resolution: WindowResolution::new(64., 64.), // resized once frames are known
                        resizable: false,
                        decorations: false,
                        transparent: true,
                        window_level: WindowLevel::AlwaysOnTop,
                        position: WindowPosition::Centered(MonitorSelection::Primary),
                        mode: WindowMode::Windowed,
                        ..default()
                    }),
                    ..default()
                }),
        )
        .insert_resource(ClearColor(Color::srgba(0.0, 0.0, 0.0, 0.0)))
        .insert_resource(Time::<Fixed>::from_duration(tick))
        .insert_resource(SheetInfo::default())
        .insert_resource(Buddy {
            config,
            seed: args.seed,
            sim: None,
        })
        .insert_resource(Stage {
            playground: Playground::new(layout),
        })
        .insert_resource(movie)
        .insert_resource(MonitorPoll {
            timer: Timer::from_seconds(MONITOR_POLL_SECS, TimerMode::Repeating),
            floor_inset: args.floor_inset,
        })
        .add_systems(Startup, (setup_camera, load_assets, spawn_buddy))
        .add_systems(Update, (refresh_monitors, finalize_after_load, present).chain())
        .add_systems(FixedUpdate, tick_simulation)
        .run();
}

// ----------------- SIMULATION DRIVERS -----------------

/// Escape only reaches us while the buddy window has focus, which an
/// always-on-top overlay rarely does. Closing the window also exits.
fn tick_simulation(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut buddy: ResMut<Buddy>,
    mut stage: ResMut<Stage>,
    movie: Res<MovieWatch>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(sim) = buddy.sim.as_mut() else {
        return;
    };
    let now_ms = time.elapsed().as_millis() as u64;
    let input = TickInput {
        now_ms,
        exit_requested: keys.pressed(KeyCode::Escape),
        movie_playing: movie.is_playing(),
        platforms: stage.playground.platforms(now_ms),
    };
    if let TickOutcome::Exit = sim.tick(input) {
        info!("Exit requested, shutting down.");
        exit.send(AppExit::Success);
    }
}

/// Headless runs use simulated time: one tick interval per frame.
fn headless_tick(
    mut run: ResMut<HeadlessRun>,
    mut buddy: ResMut<Buddy>,
    mut stage: ResMut<Stage>,
    movie: Res<MovieWatch>,
    mut exit: EventWriter<AppExit>,
) {
    let tick_ms = buddy.config.tick_ms;
    let Some(sim) = buddy.sim.as_mut() else {
        return;
    };
    let now_ms = sim.ticks() * tick_ms;
    let input = TickInput {
        now_ms,
        exit_requested: run.remaining == 0,
        movie_playing: movie.is_playing(),
        platforms: stage.playground.platforms(now_ms),
    };
    match sim.tick(input) {
        TickOutcome::Exit => {
            let snap = sim.snapshot();
            info!(
                "Finished after {} ticks: {} at {:.0},{:.0}",
                snap.tick, snap.state, snap.foot.x, snap.foot.y
            );
            exit.send(AppExit::Success);
        }
        TickOutcome::Continue(_) => run.remaining -= 1,
    }
}

/// Keep the monitor set current. The whole set is swapped at once, and the
/// simulation itself is created on the first successful read.
fn refresh_monitors(
    time: Res<Time>,
    mut poll: ResMut<MonitorPoll>,
    mut buddy: ResMut<Buddy>,
    window_q: Query<Entity, With<PrimaryWindow>>,
    winit_windows: NonSend<WinitWindows>,
) {
    poll.timer.tick(time.delta());
    if buddy.sim.is_some() && !poll.timer.just_finished() {
        return;
    }
    let Ok(entity) = window_q.get_single() else {
        return;
    };
    let Some(raw) = winit_windows.get_window(entity) else {
        return;
    };
    // winit only reports whole monitors, not work areas, so the taskbar
    // is handled with a fixed inset.
    let monitors: Vec<ScreenRect> = raw
        .available_monitors()
        .map(|mon| {
            let pos = mon.position();
            let size = mon.size();
            ScreenRect::from_origin_size(
                pos.x as f32,
                pos.y as f32,
                size.width as f32,
                (size.height as f32 - poll.floor_inset).max(1.0),
            )
        })
        .collect();
    if monitors.is_empty() {
        return;
    }

    if let Some(sim) = buddy.sim.as_mut() {
        if sim.environment().monitors() != monitors.as_slice() {
            info!("Display layout changed: {} monitor(s)", monitors.len());
            sim.replace_monitors(monitors);
        }
        return;
    }
    info!("Found {} monitor(s), dropping in.", monitors.len());
    let sim = Simulation::new(buddy.config.clone(), monitors, buddy.seed);
    buddy.sim = Some(sim);
}

// ----------------- RENDERING -----------------

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

/// Queue the texture and make an atlas layout (grid).
fn load_assets(
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut sheet: ResMut<SheetInfo>,
) {
    sheet.texture = asset_server.load("buddy.png");
    // placeholder cell size; overwritten after image loads
    let layout = TextureAtlasLayout::from_grid(
        UVec2::new(1, 1),
        SHEET_COLS as u32,
        SHEET_ROWS as u32,
        None,
        None,
    );
    sheet.atlas_layout = layouts.add(layout);
}

fn spawn_buddy(mut commands: Commands, sheet: Res<SheetInfo>) {
    commands.spawn((
        SpriteBundle {
            texture: sheet.texture.clone(),
            ..default()
        },
        TextureAtlas {
            layout: sheet.atlas_layout.clone(),
            index: 0,
        },
        BuddySprite,
    ));
}

/// Once the image is loaded, compute the frame size and rebuild the atlas.
fn finalize_after_load(
    mut sheet: ResMut<SheetInfo>,
    images: Res<Assets<Image>>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
) {
    if sheet.ready {
        return;
    }
    let Some(img) = images.get(&sheet.texture) else {
        return;
    };

    sheet.frame_w = (img.width() as f32) / (SHEET_COLS as f32);
    sheet.frame_h = (img.height() as f32) / (SHEET_ROWS as f32);

    if let Some(layout) = layouts.get_mut(&sheet.atlas_layout) {
        *layout = TextureAtlasLayout::from_grid(
            UVec2::new(sheet.frame_w as u32, sheet.frame_h as u32),
            SHEET_COLS as u32,
            SHEET_ROWS as u32,
            None,
            None,
        );
    }
    sheet.ready = true;
}

/// Hand the latest state to the screen: frame, facing, size and position.
/// The breathing bob only moves the picture, never the simulation.
fn present(
    time: Res<Time>,
    sheet: Res<SheetInfo>,
    mut buddy: ResMut<Buddy>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut q: Query<(&mut TextureAtlas, &mut Sprite), With<BuddySprite>>,
) {
    if !sheet.ready {
        return;
    }
    let Ok(mut win) = windows.get_single_mut() else {
        return;
    };
    let Ok((mut atlas, mut sprite)) = q.get_single_mut() else {
        return;
    };
    let presentation = buddy.config.presentation.clone();
    let Some(sim) = buddy.sim.as_mut() else {
        return;
    };

    let now_ms = time.elapsed().as_millis() as u64;
    let state = sim.character().state();
    let clip = clip_for(state, &presentation);
    sim.advance_animation(now_ms, &clip);
    let snap = sim.snapshot();

    atlas.index = row_col_to_index(clip.row, snap.frame.index);
    sprite.flip_x = snap.facing == Facing::Left;

    let screen_h = sim.environment().monitors().first().map(|m| m.height());
    let size = sprite_size(Vec2::new(sheet.frame_w, sheet.frame_h), screen_h, &presentation);
    sprite.custom_size = Some(size);
    if win.resolution.width() != size.x || win.resolution.height() != size.y {
        win.resolution.set(size.x, size.y);
    }

    let bob = breathing_offset(state, now_ms, &presentation);
    let origin = draw_origin(snap.foot, size, bob);
    win.position = WindowPosition::At(IVec2::new(
        origin.x.round() as i32,
        origin.y.round() as i32,
    ));
}
