#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Carnival of Crows experience.
//!
//! Wires the authoritative session to the macroquad backend: every frame
//! the captured input is translated into commands, the session ticks, the
//! resulting events feed the audio sink and the scene is rebuilt from a
//! fresh snapshot.

mod audio;
mod night_config;
mod scene;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use carnival_core::{Command, Event, GAME_TITLE};
use carnival_presentation::{translate_input, AudioSink, Color, Presentation, RenderingBackend};
use carnival_presentation_macroquad::MacroquadBackend;
use carnival_session::{apply, query, Session};

use crate::audio::LoggingAudioSink;
use crate::scene::build_scene;

/// Carnival of Crows: survive five nights in the office.
#[derive(Debug, Parser)]
#[command(name = "carnival", about = "Carnival of Crows", long_about = None)]
struct Args {
    /// Seed for the run's random streams. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Pre-seeds the continue slot so the menu can resume at this night.
    /// Development shortcut; the difficulty table still applies.
    #[arg(long, default_value_t = 1)]
    night: u8,

    /// Optional TOML file overriding the built-in night difficulty table.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Render as fast as possible instead of synchronising with the
    /// display refresh rate.
    #[arg(long, default_value_t = false)]
    no_vsync: bool,

    /// Print frame timing metrics once per second.
    #[arg(long, default_value_t = false)]
    show_fps: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let night_table = match &args.config {
        Some(path) => night_config::load_night_table(path)
            .with_context(|| format!("failed to load night table from {}", path.display()))?,
        None => carnival_core::NightTable::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "booting session");

    let mut session = Session::new(seed, night_table).with_saved_night(args.night);
    let mut sink = LoggingAudioSink::default();

    let initial_scene = build_scene(&query::snapshot(&session));
    let presentation = Presentation::new(GAME_TITLE, Color::from_rgb_u8(30, 30, 30), initial_scene);

    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    backend.run(presentation, move |dt, input, scene| {
        let mut events = Vec::new();
        for command in translate_input(scene, &input) {
            apply(&mut session, command, &mut events);
        }
        apply(&mut session, Command::Tick { dt }, &mut events);

        for event in &events {
            match event {
                Event::Audio(cue) => sink.handle(*cue),
                Event::TimeAdvanced { .. } => {}
                other => debug!(?other, "event"),
            }
        }

        *scene = build_scene(&query::snapshot(&session));
    })
}
