#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Carnival of Crows.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without
//! its default `audio` feature; audio cues are handled by whatever
//! [`carnival_presentation::AudioSink`] the binary wires in.
//!
//! Every screen is drawn with primitive shapes and text on the 600x400
//! virtual canvas. That doubles as the defined fallback for missing image
//! assets: the adapter never fails a frame because a file is absent.

use std::time::Duration;

use anyhow::Result;
use carnival_core::CameraId;
use carnival_presentation::{
    layout, CameraView, Color, FrameInput, HitRegion, Hud, OfficeView, Presentation,
    RenderingBackend, Scene, ScreenView, Viewport, CANVAS_HEIGHT, CANVAS_WIDTH,
};
use glam::Vec2;
use macroquad::{
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
    shapes::{draw_circle, draw_rectangle, draw_rectangle_lines},
    text::draw_text,
};

/// Snapshot of edge-triggered keyboard shortcuts observed during a frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the frame loop.
    quit_requested: bool,
    toggle_cameras: bool,
    toggle_left_door: bool,
    toggle_right_door: bool,
    mute_phone: bool,
    skip_night: bool,
    camera_hotkey: Option<CameraId>,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let camera_hotkey = [
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
        ]
        .iter()
        .position(|key| is_key_pressed(*key))
        .map(|index| CameraId::new(index as u8));

        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            toggle_cameras: is_key_pressed(KeyCode::C),
            toggle_left_door: is_key_pressed(KeyCode::A),
            toggle_right_door: is_key_pressed(KeyCode::D),
            mute_phone: is_key_pressed(KeyCode::M),
            skip_night: is_key_pressed(KeyCode::P),
            camera_hotkey,
        }
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame, yielding the average once per second.
    fn record_frame(&mut self, dt: Duration) -> Option<f32> {
        self.elapsed += dt;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let average = self.frames as f32 / seconds;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(average)
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the
    /// display refresh rate or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = Some(if enabled { 1 } else { 0 });
        self
    }

    /// Configures whether the backend prints frame timing once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut frame: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1_200,
            window_height: 800,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut fps_counter = FpsCounter::default();
            let background = to_macroquad_color(clear_color);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let window = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let Ok(viewport) = Viewport::new(window.x, window.y) else {
                    macroquad::window::next_frame().await;
                    continue;
                };

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(keyboard, &viewport);

                frame(frame_dt, frame_input, &mut scene);

                let painter = Painter { viewport };
                draw_scene(&scene, &painter);

                if show_fps {
                    if let Some(average) = fps_counter.record_frame(frame_dt) {
                        println!("FPS: {average:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input(keyboard: KeyboardShortcuts, viewport: &Viewport) -> FrameInput {
    let click = if is_mouse_button_pressed(MouseButton::Left) {
        let (x, y) = mouse_position();
        Some(viewport.to_canvas(Vec2::new(x, y)))
    } else {
        None
    };

    FrameInput {
        toggle_cameras: keyboard.toggle_cameras,
        toggle_left_door: keyboard.toggle_left_door,
        toggle_right_door: keyboard.toggle_right_door,
        mute_phone: keyboard.mute_phone,
        skip_night: keyboard.skip_night,
        camera_hotkey: keyboard.camera_hotkey,
        click,
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

/// Canvas-space drawing helper that applies the viewport transform.
struct Painter {
    viewport: Viewport,
}

impl Painter {
    fn rect(&self, x: f32, y: f32, w: f32, h: f32, color: macroquad::color::Color) {
        let origin = self.viewport.to_window(Vec2::new(x, y));
        let scale = self.viewport.scale();
        draw_rectangle(origin.x, origin.y, w * scale, h * scale, color);
    }

    fn rect_outline(&self, x: f32, y: f32, w: f32, h: f32, color: macroquad::color::Color) {
        let origin = self.viewport.to_window(Vec2::new(x, y));
        let scale = self.viewport.scale();
        draw_rectangle_lines(origin.x, origin.y, w * scale, h * scale, 2.0 * scale, color);
    }

    fn circle(&self, x: f32, y: f32, radius: f32, color: macroquad::color::Color) {
        let center = self.viewport.to_window(Vec2::new(x, y));
        draw_circle(center.x, center.y, radius * self.viewport.scale(), color);
    }

    /// Draws text horizontally centred on `x` with its baseline near `y`.
    fn text_centered(&self, text: &str, x: f32, y: f32, size: f32, color: macroquad::color::Color) {
        let scale = self.viewport.scale();
        let font_size = size * scale;
        let measured = macroquad::text::measure_text(text, None, font_size as u16, 1.0);
        let position = self.viewport.to_window(Vec2::new(x, y));
        draw_text(
            text,
            position.x - measured.width / 2.0,
            position.y,
            font_size,
            color,
        );
    }

    fn text_left(&self, text: &str, x: f32, y: f32, size: f32, color: macroquad::color::Color) {
        let position = self.viewport.to_window(Vec2::new(x, y));
        draw_text(text, position.x, position.y, size * self.viewport.scale(), color);
    }

    fn button(&self, region: &HitRegion, label: &str, active: bool) {
        let fill = if active {
            macroquad::color::Color::from_rgba(80, 80, 120, 255)
        } else {
            macroquad::color::Color::from_rgba(50, 50, 50, 255)
        };
        self.rect(region.x, region.y, region.w, region.h, fill);
        self.rect_outline(region.x, region.y, region.w, region.h, macroquad::color::BLACK);
        self.text_centered(
            label,
            region.x + region.w / 2.0,
            region.y + region.h / 2.0 + 5.0,
            14.0,
            macroquad::color::WHITE,
        );
    }
}

const WHITE: macroquad::color::Color = macroquad::color::WHITE;

fn draw_scene(scene: &Scene, painter: &Painter) {
    match &scene.view {
        ScreenView::Menu { continue_available } => draw_menu(painter, *continue_available),
        ScreenView::Office(view) => draw_office(painter, view),
        ScreenView::Cameras(view) => draw_cameras(painter, view),
        ScreenView::PowerOut => draw_powerout(painter),
        ScreenView::Jumpscare { cause } => draw_scare_card(painter, cause.message()),
        ScreenView::GameOver { message } => draw_game_over(painter, message),
        ScreenView::WinNight { next_night } => draw_win_night(painter, *next_night),
        ScreenView::WinGame => draw_win_game(painter),
        ScreenView::FinalJumpscare => draw_scare_card(painter, "GOTCHA!"),
        ScreenView::End => draw_end(painter),
    }

    if let Some(hud) = &scene.hud {
        draw_hud(painter, hud);
    }
    if scene.phone_call_active {
        draw_phone_banner(painter);
    }
}

fn draw_menu(painter: &Painter, continue_available: bool) {
    painter.text_centered(
        carnival_core::GAME_TITLE,
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0 - 20.0,
        48.0,
        WHITE,
    );
    painter.button(&layout::MENU_NEW, "NEW GAME", true);
    painter.button(&layout::MENU_CONTINUE, "CONTINUE", continue_available);
}

fn draw_office(painter: &Painter, view: &OfficeView) {
    painter.rect(
        0.0,
        0.0,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        macroquad::color::Color::from_rgba(45, 40, 38, 255),
    );

    if controls_hint_visible(view.night_elapsed) {
        painter.text_centered(
            "Office - 'C' toggles cams, 'A'/'D' doors",
            CANVAS_WIDTH / 2.0,
            40.0,
            24.0,
            WHITE,
        );
    }

    // Balloona sits mid-office; her head swells with the behavior state.
    let body_center = Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0 + 80.0);
    painter.circle(
        body_center.x,
        body_center.y,
        55.0,
        macroquad::color::Color::from_rgba(170, 60, 140, 255),
    );
    if view.balloona_head > 0 {
        let head_radius = 25.0 + f32::from(view.balloona_head) * 0.5;
        painter.circle(
            body_center.x,
            body_center.y - 55.0 - head_radius * 0.8,
            head_radius,
            macroquad::color::Color::from_rgba(220, 90, 180, 255),
        );
    }
    painter.button(&layout::DEFLATE, "DEFLATE", true);

    draw_doors(painter, view);
}

fn draw_doors(painter: &Painter, view: &OfficeView) {
    let door_color = macroquad::color::Color::from_rgba(90, 90, 100, 255);
    if view.left_door_closed {
        painter.rect(0.0, 0.0, 45.0, CANVAS_HEIGHT, door_color);
    }
    if view.right_door_broken {
        painter.rect(
            CANVAS_WIDTH - 45.0,
            0.0,
            45.0,
            CANVAS_HEIGHT,
            macroquad::color::Color::from_rgba(80, 30, 30, 255),
        );
        painter.text_centered("BROKEN", CANVAS_WIDTH - 22.0, CANVAS_HEIGHT / 2.0, 14.0, WHITE);
    } else if view.right_door_closed {
        painter.rect(CANVAS_WIDTH - 45.0, 0.0, 45.0, CANVAS_HEIGHT, door_color);
    }
}

fn controls_hint_visible(elapsed: Duration) -> bool {
    const SHOW_TIME: Duration = Duration::from_secs(10);
    const BLINK_DURATION: Duration = Duration::from_secs(2);
    const BLINK_INTERVAL_MS: u128 = 250;

    if elapsed < SHOW_TIME {
        return true;
    }
    if elapsed < SHOW_TIME + BLINK_DURATION {
        let into_blink = (elapsed - SHOW_TIME).as_millis();
        return (into_blink / BLINK_INTERVAL_MS) % 2 == 0;
    }
    false
}

fn draw_cameras(painter: &Painter, view: &CameraView) {
    let Some(selected) = view.selected else {
        painter.rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT, macroquad::color::BLACK);
        painter.text_centered("NO FEED", CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0, 32.0, WHITE);
        draw_camera_rig(painter, view);
        return;
    };

    if view.blocked_cameras.contains(&selected) {
        painter.rect(
            0.0,
            0.0,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            macroquad::color::Color::from_rgba(30, 0, 0, 255),
        );
        painter.text_centered(
            "CAMERA BLOCKED",
            CANVAS_WIDTH / 2.0,
            CANVAS_HEIGHT / 2.0,
            32.0,
            macroquad::color::RED,
        );
        draw_camera_rig(painter, view);
        return;
    }

    painter.rect(
        0.0,
        0.0,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        macroquad::color::Color::from_rgba(18, 26, 24, 255),
    );
    painter.text_centered(
        &format!("Viewing {}", selected.label()),
        CANVAS_WIDTH / 2.0,
        40.0,
        32.0,
        WHITE,
    );

    // Door cameras show their door state.
    let door_closed = match selected.door_side() {
        Some(carnival_core::DoorSide::Left) => Some(view.left_door_closed),
        Some(carnival_core::DoorSide::Right) => Some(view.right_door_closed),
        None => None,
    };
    if let Some(closed) = door_closed {
        let label = if closed { "DOOR CLOSED" } else { "DOOR OPEN" };
        painter.text_centered(label, CANVAS_WIDTH / 2.0, CANVAS_HEIGHT - 30.0, 20.0, WHITE);
    }

    if view.tilly_camera == Some(selected) {
        painter.circle(
            CANVAS_WIDTH / 2.0 - 80.0,
            CANVAS_HEIGHT / 2.0,
            40.0,
            macroquad::color::RED,
        );
        painter.text_centered("TILLY", CANVAS_WIDTH / 2.0 - 80.0, CANVAS_HEIGHT / 2.0 + 70.0, 16.0, WHITE);
    }
    if view.dizzy_camera == Some(selected) {
        painter.circle(
            CANVAS_WIDTH / 2.0 + 80.0,
            CANVAS_HEIGHT / 2.0,
            40.0,
            macroquad::color::GREEN,
        );
        painter.text_centered("DIZZY", CANVAS_WIDTH / 2.0 + 80.0, CANVAS_HEIGHT / 2.0 + 70.0, 16.0, WHITE);
    }

    draw_camera_rig(painter, view);
}

fn draw_camera_rig(painter: &Painter, view: &CameraView) {
    for region in layout::camera_buttons() {
        let HitRegion { id, .. } = region;
        let carnival_presentation::RegionId::CameraButton(camera) = id else {
            continue;
        };
        painter.button(&region, camera.label(), view.selected == Some(camera));
    }
    painter.button(&layout::SCREECH, "!", view.screech_ready);

    // The office sits between the two door feeds on the rig map.
    let buttons = layout::camera_buttons();
    let left = buttons[2];
    let right = buttons[4];
    let you = Vec2::new(
        (left.x + right.x) / 2.0 + left.w / 2.0,
        (left.y + right.y) / 2.0 + left.h / 2.0,
    );
    painter.circle(you.x, you.y, 10.0, macroquad::color::Color::from_rgba(0, 150, 255, 180));
    painter.text_centered("YOU", you.x, you.y + 4.0, 10.0, WHITE);
}

fn draw_powerout(painter: &Painter) {
    painter.rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT, macroquad::color::BLACK);
    painter.text_centered(
        "The power is out.",
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0,
        24.0,
        macroquad::color::Color::from_rgba(120, 120, 120, 255),
    );
}

fn draw_scare_card(painter: &Painter, message: &str) {
    painter.rect(
        0.0,
        0.0,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        macroquad::color::Color::from_rgba(150, 10, 10, 255),
    );
    painter.text_centered(message, CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0, 40.0, macroquad::color::BLACK);
}

fn draw_game_over(painter: &Painter, message: &str) {
    painter.rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT, macroquad::color::BLACK);
    painter.text_centered(message, CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0 - 40.0, 28.0, WHITE);

    painter.rect(
        0.0,
        CANVAS_HEIGHT * 0.8 - 10.0,
        CANVAS_WIDTH,
        70.0,
        macroquad::color::Color::from_rgba(0, 0, 0, 150),
    );
    painter.button(&layout::PLAY_AGAIN, "PLAY AGAIN", true);
    painter.button(&layout::MAIN_MENU, "MAIN MENU", true);
}

fn draw_win_night(painter: &Painter, next_night: u8) {
    painter.rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT, macroquad::color::BLACK);
    painter.text_centered(
        "6 AM - You Survived!",
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0 - 50.0,
        40.0,
        WHITE,
    );
    painter.text_centered(
        &format!("Click to continue to Night {next_night}"),
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0 + 50.0,
        24.0,
        WHITE,
    );
}

fn draw_win_game(painter: &Painter) {
    painter.rect(
        0.0,
        0.0,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        macroquad::color::Color::from_rgba(0, 100, 0, 255),
    );
    painter.text_centered(
        "CONGRATULATIONS!",
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0 - 50.0,
        40.0,
        WHITE,
    );
    painter.text_centered(
        "You survived all five nights!",
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0 + 20.0,
        24.0,
        WHITE,
    );
}

fn draw_end(painter: &Painter) {
    painter.rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT, macroquad::color::BLACK);
    painter.text_centered(
        "It fits perfectly, doesn't it",
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0,
        40.0,
        WHITE,
    );
}

fn draw_hud(painter: &Painter, hud: &Hud) {
    painter.text_left(
        &format!("Time: {:02}:{:02}", hud.minutes, hud.seconds),
        10.0,
        20.0,
        16.0,
        WHITE,
    );
    painter.text_left(&format!("Power: {:.1}%", hud.power_percent), 10.0, 40.0, 16.0, WHITE);
    painter.text_left(&format!("Night: {}", hud.night), 10.0, 60.0, 16.0, WHITE);
}

fn draw_phone_banner(painter: &Painter) {
    painter.rect(
        0.0,
        0.0,
        CANVAS_WIDTH,
        40.0,
        macroquad::color::Color::from_rgba(0, 0, 0, 200),
    );
    painter.text_centered(
        "Phone Call... (Press 'M' to mute)",
        CANVAS_WIDTH / 2.0,
        25.0,
        20.0,
        WHITE,
    );
    painter.button(&layout::MUTE, "X", true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_hint_shows_then_blinks_then_disappears() {
        assert!(controls_hint_visible(Duration::from_secs(3)));
        assert!(controls_hint_visible(Duration::from_millis(10_100)));
        assert!(!controls_hint_visible(Duration::from_millis(10_300)));
        assert!(controls_hint_visible(Duration::from_millis(10_600)));
        assert!(!controls_hint_visible(Duration::from_secs(13)));
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..59 {
            assert_eq!(counter.record_frame(Duration::from_millis(16)), None);
        }
        let average = counter
            .record_frame(Duration::from_millis(64))
            .expect("a second elapsed");
        assert!(average > 0.0);
    }
}
