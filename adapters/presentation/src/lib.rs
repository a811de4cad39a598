#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation and input contracts for Carnival of Crows adapters.
//!
//! The session never draws or polls anything itself. Each frame the binary
//! builds a declarative [`Scene`] from a session snapshot, the backend
//! renders it and reports a [`FrameInput`], and [`translate_input`] turns
//! that input into the command batch for the next `apply` round. Hit
//! testing happens here, against the static [`HitRegion`] table of the
//! scene being shown, so backends stay free of game rules.
//!
//! All layout is expressed on a fixed 600x400 virtual canvas; backends map
//! it to their real window through a [`Viewport`].

use std::time::Duration;

use anyhow::Result as AnyResult;
use carnival_core::{AudioClip, AudioCue, CameraId, Command, JumpscareCause};
use glam::Vec2;
use thiserror::Error;

/// Width of the virtual canvas every layout constant is expressed in.
pub const CANVAS_WIDTH: f32 = 600.0;

/// Height of the virtual canvas every layout constant is expressed in.
pub const CANVAS_HEIGHT: f32 = 400.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Errors that can occur when constructing presentation helpers.
#[derive(Debug, Error, PartialEq)]
pub enum PresentationError {
    /// Window dimensions must both be positive to derive a viewport.
    #[error("viewport needs positive window dimensions (received {width}x{height})")]
    InvalidViewport {
        /// Window width that failed validation.
        width: f32,
        /// Window height that failed validation.
        height: f32,
    },
}

/// Maps the virtual canvas into a concrete window, letterboxed to keep the
/// canvas aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset: Vec2,
}

impl Viewport {
    /// Derives the viewport for a window of the provided size.
    pub fn new(window_width: f32, window_height: f32) -> Result<Self, PresentationError> {
        if !(window_width > 0.0 && window_height > 0.0) {
            return Err(PresentationError::InvalidViewport {
                width: window_width,
                height: window_height,
            });
        }

        let scale = (window_width / CANVAS_WIDTH).min(window_height / CANVAS_HEIGHT);
        let offset = Vec2::new(
            (window_width - CANVAS_WIDTH * scale) / 2.0,
            (window_height - CANVAS_HEIGHT * scale) / 2.0,
        );
        Ok(Self { scale, offset })
    }

    /// Uniform canvas-to-window scale factor.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Converts a canvas-space point into window space.
    #[must_use]
    pub fn to_window(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    /// Converts a window-space point (e.g. the cursor) into canvas space.
    #[must_use]
    pub fn to_canvas(&self, point: Vec2) -> Vec2 {
        (point - self.offset) / self.scale
    }
}

/// Identifier of a clickable rectangle on the current screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionId {
    /// Menu: start a fresh run.
    NewGame,
    /// Menu: resume from the highest night reached.
    ContinueRun,
    /// Camera view: focus a feed.
    CameraButton(CameraId),
    /// Camera view: fire the screech lure at the focused feed.
    Screech,
    /// Office view: deflate Balloona.
    Deflate,
    /// Cut the active phone call short.
    MutePhone,
    /// Game over: retry the lost night.
    PlayAgain,
    /// Game over or end card: back to the menu.
    MainMenu,
    /// Night complete: move on to the next night.
    AdvanceNight,
}

/// Clickable rectangle exposed by the current screen, in canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRegion {
    /// What clicking the rectangle means.
    pub id: RegionId,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl HitRegion {
    /// Creates a new hit region.
    #[must_use]
    pub const fn new(id: RegionId, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { id, x, y, w, h }
    }

    /// Reports whether a canvas-space point falls inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.x && point.x < self.x + self.w && point.y > self.y && point.y < self.y + self.h
    }
}

/// Heads-up display values shown during active gameplay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    /// Minutes remaining on the night timer.
    pub minutes: u64,
    /// Seconds remaining within the current minute.
    pub seconds: u64,
    /// Power percentage, rounded for display by the backend.
    pub power_percent: f32,
    /// Night in progress.
    pub night: u8,
}

/// Office view contents while the cameras are down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfficeView {
    /// Left door shut.
    pub left_door_closed: bool,
    /// Right door shut.
    pub right_door_closed: bool,
    /// Right door permanently broken for the night.
    pub right_door_broken: bool,
    /// Balloona's head size, 0-100, driving the drawn head scale.
    pub balloona_head: u8,
    /// Time elapsed since the night started, for the controls hint.
    pub night_elapsed: Duration,
}

/// Camera-rig contents while the feeds are up.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraView {
    /// Feed currently in focus.
    pub selected: Option<CameraId>,
    /// Feeds Crowman has blacked out.
    pub blocked_cameras: Vec<CameraId>,
    /// Camera Tilly haunts.
    pub tilly_camera: Option<CameraId>,
    /// Camera Dizzy occupies.
    pub dizzy_camera: Option<CameraId>,
    /// Left door shut (cameras 3 and 5 show their door).
    pub left_door_closed: bool,
    /// Right door shut.
    pub right_door_closed: bool,
    /// Whether the screech lure is off cooldown.
    pub screech_ready: bool,
}

/// Declarative description of what one screen shows.
#[derive(Clone, Debug, PartialEq)]
pub enum ScreenView {
    /// Title screen.
    Menu {
        /// Whether the continue option is available.
        continue_available: bool,
    },
    /// The office, doors and Balloona.
    Office(OfficeView),
    /// The camera rig.
    Cameras(CameraView),
    /// Dark office after the power failure.
    PowerOut,
    /// Held scare image.
    Jumpscare {
        /// What got the player.
        cause: JumpscareCause,
    },
    /// Loss screen with restart options.
    GameOver {
        /// In-fiction loss message.
        message: &'static str,
    },
    /// Night survived, waiting for a click.
    WinNight {
        /// Night the click advances to.
        next_night: u8,
    },
    /// All five nights survived.
    WinGame,
    /// The forced post-victory scare.
    FinalJumpscare,
    /// Static closing card.
    End,
}

/// Scene description consumed by rendering backends each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Screen contents.
    pub view: ScreenView,
    /// HUD, present only during active gameplay.
    pub hud: Option<Hud>,
    /// Whether the phone-call banner (and mute button) is up.
    pub phone_call_active: bool,
}

impl Scene {
    /// Scene for the title screen, the state before any night begins.
    #[must_use]
    pub fn menu(continue_available: bool) -> Self {
        Self {
            view: ScreenView::Menu { continue_available },
            hud: None,
            phone_call_active: false,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed first.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Input snapshot gathered by a backend during a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// `C` was pressed: toggle the camera feeds.
    pub toggle_cameras: bool,
    /// `A` was pressed: toggle the left door.
    pub toggle_left_door: bool,
    /// `D` was pressed: toggle the right door.
    pub toggle_right_door: bool,
    /// `M` was pressed: mute the phone call.
    pub mute_phone: bool,
    /// `P` was pressed: the debug skip-night hatch.
    pub skip_night: bool,
    /// A camera hotkey (`1`-`5`) was pressed.
    pub camera_hotkey: Option<CameraId>,
    /// The primary mouse button was pressed at this canvas-space point.
    pub click: Option<Vec2>,
}

/// Enumerates the clickable regions of the scene being shown.
#[must_use]
pub fn hit_regions(scene: &Scene) -> Vec<HitRegion> {
    let mut regions = Vec::new();

    match &scene.view {
        ScreenView::Menu { continue_available } => {
            regions.push(layout::MENU_NEW);
            if *continue_available {
                regions.push(layout::MENU_CONTINUE);
            }
        }
        ScreenView::Office(_) => {
            regions.push(layout::DEFLATE);
        }
        ScreenView::Cameras(_) => {
            regions.extend(layout::camera_buttons());
            regions.push(layout::SCREECH);
        }
        ScreenView::GameOver { .. } => {
            regions.push(layout::PLAY_AGAIN);
            regions.push(layout::MAIN_MENU);
        }
        ScreenView::WinNight { .. } => {
            regions.push(layout::full_canvas(RegionId::AdvanceNight));
        }
        ScreenView::End => {
            regions.push(layout::full_canvas(RegionId::MainMenu));
        }
        ScreenView::PowerOut
        | ScreenView::Jumpscare { .. }
        | ScreenView::WinGame
        | ScreenView::FinalJumpscare => {}
    }

    if scene.phone_call_active {
        regions.push(layout::MUTE);
    }

    regions
}

/// Translates one frame of input into the command batch for the session.
///
/// Keyboard shortcuts are forwarded unconditionally; the session ignores
/// whatever does not apply to its current screen. Clicks are resolved
/// against the scene's hit regions.
#[must_use]
pub fn translate_input(scene: &Scene, input: &FrameInput) -> Vec<Command> {
    let mut commands = Vec::new();

    if let Some(camera) = input.camera_hotkey {
        commands.push(Command::SelectCamera { camera });
    }
    if input.toggle_cameras {
        commands.push(Command::ToggleCameras);
    }
    if input.toggle_left_door {
        commands.push(Command::ToggleLeftDoor);
    }
    if input.toggle_right_door {
        commands.push(Command::ToggleRightDoor);
    }
    if input.mute_phone {
        commands.push(Command::MutePhoneCall);
    }
    if input.skip_night {
        commands.push(Command::SkipNight);
    }

    if let Some(point) = input.click {
        for region in hit_regions(scene) {
            if !region.contains(point) {
                continue;
            }
            if let Some(command) = command_for_region(region.id, scene) {
                commands.push(command);
            }
            break;
        }
    }

    commands
}

fn command_for_region(id: RegionId, scene: &Scene) -> Option<Command> {
    match id {
        RegionId::NewGame => Some(Command::NewGame),
        RegionId::ContinueRun => Some(Command::ContinueGame),
        RegionId::CameraButton(camera) => Some(Command::SelectCamera { camera }),
        RegionId::Screech => match &scene.view {
            // The lure needs a focused feed to aim at.
            ScreenView::Cameras(view) => view
                .selected
                .map(|camera| Command::ScreechLure { camera }),
            _ => None,
        },
        RegionId::Deflate => Some(Command::DeflateBalloona),
        RegionId::MutePhone => Some(Command::MutePhoneCall),
        RegionId::PlayAgain => Some(Command::RestartNight),
        RegionId::MainMenu => Some(Command::ReturnToMenu),
        RegionId::AdvanceNight => Some(Command::AdvanceNight),
    }
}

/// Sink for the session's fire-and-forget audio cues.
///
/// Implementations must tolerate clips they have no asset for by doing
/// nothing; audio is never load-bearing.
pub trait AudioSink {
    /// Acts on one cue.
    fn handle(&mut self, cue: AudioCue);

    /// Reports whether a clip is currently audible. Sinks without that
    /// knowledge may always answer `false`.
    fn is_playing(&self, clip: AudioClip) -> bool {
        let _ = clip;
        false
    }
}

/// Sink that swallows every cue. Useful for tests and headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn handle(&mut self, cue: AudioCue) {
        let _ = cue;
    }
}

/// Rendering backend capable of presenting Carnival of Crows scenes.
pub trait RenderingBackend {
    /// Runs the backend until it is requested to exit.
    ///
    /// The provided `frame` closure receives the frame delta and the input
    /// captured by the adapter, and replaces the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Canvas-space layout of every screen, mirrored by the drawing code.
pub mod layout {
    use super::{HitRegion, RegionId, CANVAS_HEIGHT, CANVAS_WIDTH};
    use carnival_core::CameraId;

    /// Menu: the new-game button.
    pub const MENU_NEW: HitRegion = HitRegion::new(
        RegionId::NewGame,
        CANVAS_WIDTH / 2.0 - 140.0,
        CANVAS_HEIGHT / 2.0 + 20.0,
        120.0,
        50.0,
    );

    /// Menu: the continue button, shown only with progress to resume.
    pub const MENU_CONTINUE: HitRegion = HitRegion::new(
        RegionId::ContinueRun,
        CANVAS_WIDTH / 2.0 + 20.0,
        CANVAS_HEIGHT / 2.0 + 20.0,
        120.0,
        50.0,
    );

    /// Camera view: the screech button in the top-right corner.
    pub const SCREECH: HitRegion =
        HitRegion::new(RegionId::Screech, CANVAS_WIDTH - 60.0, 20.0, 40.0, 40.0);

    /// Office view: the deflate button near Balloona.
    pub const DEFLATE: HitRegion = HitRegion::new(
        RegionId::Deflate,
        CANVAS_WIDTH / 2.0 + 50.0,
        CANVAS_HEIGHT / 2.0 + 30.0,
        80.0,
        30.0,
    );

    /// Mute button shown while the phone-call banner is up.
    pub const MUTE: HitRegion =
        HitRegion::new(RegionId::MutePhone, CANVAS_WIDTH - 40.0, 5.0, 25.0, 25.0);

    /// Game over: retry the lost night.
    pub const PLAY_AGAIN: HitRegion = HitRegion::new(
        RegionId::PlayAgain,
        CANVAS_WIDTH / 2.0 - 190.0,
        CANVAS_HEIGHT * 0.8,
        180.0,
        50.0,
    );

    /// Game over: back to the menu.
    pub const MAIN_MENU: HitRegion = HitRegion::new(
        RegionId::MainMenu,
        CANVAS_WIDTH / 2.0 + 10.0,
        CANVAS_HEIGHT * 0.8,
        180.0,
        50.0,
    );

    const CAM_BUTTON_W: f32 = 60.0;
    const CAM_BUTTON_H: f32 = 30.0;

    /// Camera selector buttons in their diamond arrangement.
    #[must_use]
    pub fn camera_buttons() -> [HitRegion; 5] {
        let offset_x = CANVAS_WIDTH - 225.0;
        let offset_y = CANVAS_HEIGHT - 145.0;
        let horizontal = 65.0;
        let vertical = 42.0;

        let at = |camera: u8, x: f32, y: f32| {
            HitRegion::new(
                RegionId::CameraButton(CameraId::new(camera)),
                x,
                y,
                CAM_BUTTON_W,
                CAM_BUTTON_H,
            )
        };

        [
            at(0, offset_x + horizontal, offset_y),
            at(1, offset_x, offset_y + vertical),
            at(2, offset_x, offset_y + vertical * 2.0),
            at(3, offset_x + horizontal * 2.0, offset_y + vertical),
            at(4, offset_x + horizontal * 2.0, offset_y + vertical * 2.0),
        ]
    }

    /// Whole-canvas region for screens advanced by any click.
    #[must_use]
    pub fn full_canvas(id: RegionId) -> HitRegion {
        HitRegion::new(id, 0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_scene(selected: Option<CameraId>) -> Scene {
        Scene {
            view: ScreenView::Cameras(CameraView {
                selected,
                blocked_cameras: Vec::new(),
                tilly_camera: Some(CameraId::new(0)),
                dizzy_camera: Some(CameraId::new(0)),
                left_door_closed: false,
                right_door_closed: false,
                screech_ready: true,
            }),
            hud: None,
            phone_call_active: false,
        }
    }

    #[test]
    fn viewport_letterboxes_and_round_trips() {
        let viewport = Viewport::new(1_200.0, 900.0).expect("valid window");
        // Width-limited: scale 2, vertical bars of 50 each.
        assert_eq!(viewport.scale(), 2.0);
        assert_eq!(viewport.to_window(Vec2::ZERO), Vec2::new(0.0, 50.0));

        let point = Vec2::new(321.0, 123.0);
        let round_tripped = viewport.to_canvas(viewport.to_window(point));
        assert!((round_tripped - point).length() < 1e-4);
    }

    #[test]
    fn viewport_rejects_degenerate_windows() {
        assert!(Viewport::new(0.0, 400.0).is_err());
        assert!(Viewport::new(640.0, -1.0).is_err());
    }

    #[test]
    fn menu_regions_follow_saved_progress() {
        let fresh = Scene::menu(false);
        let ids: Vec<RegionId> = hit_regions(&fresh).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RegionId::NewGame]);

        let resumable = Scene::menu(true);
        let ids: Vec<RegionId> = hit_regions(&resumable).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RegionId::NewGame, RegionId::ContinueRun]);
    }

    #[test]
    fn camera_click_selects_the_feed_under_the_cursor() {
        let scene = camera_scene(None);
        let buttons = layout::camera_buttons();
        let third = buttons[2];
        let input = FrameInput {
            click: Some(Vec2::new(third.x + 5.0, third.y + 5.0)),
            ..FrameInput::default()
        };

        assert_eq!(
            translate_input(&scene, &input),
            vec![Command::SelectCamera {
                camera: CameraId::new(2),
            }]
        );
    }

    #[test]
    fn screech_click_requires_a_focused_feed() {
        let input = FrameInput {
            click: Some(Vec2::new(layout::SCREECH.x + 1.0, layout::SCREECH.y + 1.0)),
            ..FrameInput::default()
        };

        assert!(translate_input(&camera_scene(None), &input).is_empty());

        let focused = camera_scene(Some(CameraId::new(4)));
        assert_eq!(
            translate_input(&focused, &input),
            vec![Command::ScreechLure {
                camera: CameraId::new(4),
            }]
        );
    }

    #[test]
    fn keyboard_shortcuts_forward_without_screen_knowledge() {
        let scene = Scene::menu(false);
        let input = FrameInput {
            toggle_cameras: true,
            toggle_left_door: true,
            skip_night: true,
            camera_hotkey: Some(CameraId::new(1)),
            ..FrameInput::default()
        };

        let commands = translate_input(&scene, &input);
        assert!(commands.contains(&Command::ToggleCameras));
        assert!(commands.contains(&Command::ToggleLeftDoor));
        assert!(commands.contains(&Command::SkipNight));
        assert!(commands.contains(&Command::SelectCamera {
            camera: CameraId::new(1),
        }));
    }

    #[test]
    fn win_night_screen_advances_on_any_click() {
        let scene = Scene {
            view: ScreenView::WinNight { next_night: 3 },
            hud: None,
            phone_call_active: false,
        };
        let input = FrameInput {
            click: Some(Vec2::new(12.0, 345.0)),
            ..FrameInput::default()
        };

        assert_eq!(translate_input(&scene, &input), vec![Command::AdvanceNight]);
    }

    #[test]
    fn mute_button_joins_any_screen_with_an_active_call() {
        let mut scene = camera_scene(None);
        scene.phone_call_active = true;
        let regions = hit_regions(&scene);
        assert!(regions.iter().any(|r| r.id == RegionId::MutePhone));
    }
}
