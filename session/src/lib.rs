#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state machine for Carnival of Crows.
//!
//! The session owns everything that exists during a run: the screen state,
//! the night progression, the power reserve, both doors, the camera rig,
//! the four animatronics and the queue of delayed transitions. Adapters
//! submit [`Command`] values through [`apply`]; the session mutates itself
//! deterministically and broadcasts [`Event`] values, including the audio
//! cues the sink should act on. Commands that do not apply to the current
//! screen are silently ignored.
//!
//! Every delayed effect (scare endings, the door-break delay, the power-out
//! scare, phone-call auto-end, the post-victory cascade) lives in a
//! generation-tagged scheduled-transition queue. Starting a night or
//! returning to the menu bumps the generation, so transitions scheduled for
//! a previous night can never leak into a new one.

use std::time::Duration;

use carnival_core::{
    AudioClip, AudioCue, CameraId, Clock, Command, Event, JumpscareCause, NightTable, Power,
    ScreenState, CAMERA_COUNT, GRACE_PERIOD, NIGHT_LENGTH, WIN_GAME_NIGHT,
};
use carnival_system_animatronics::{BehaviorEvent, Cast, CastSeeds, DoorState};
use carnival_system_power::{DrainOutcome, Loads, PowerEconomy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Cooldown between two screech lures.
pub const SCREECH_COOLDOWN: Duration = Duration::from_secs(3);

/// Power consumed by each screech lure.
pub const SCREECH_POWER_COST: f32 = 5.0;

/// Dwell required on the night-complete screen before a click advances.
pub const WIN_NIGHT_DWELL: Duration = Duration::from_millis(500);

const SCREECH_CLIP_LENGTH: Duration = Duration::from_secs(2);
const DOOR_BREAK_DELAY: Duration = Duration::from_millis(800);
const POWEROUT_WAIT_MIN_MS: u64 = 6_000;
const POWEROUT_WAIT_MAX_MS: u64 = 12_000;
const WIN_GAME_HOLD: Duration = Duration::from_secs(10);
const FINAL_JUMPSCARE_HOLD: Duration = Duration::from_secs(2);
const END_SCREEN_HOLD: Duration = Duration::from_secs(3);
const PHONE_CALL_LENGTH: Duration = Duration::from_secs(45);

const RNG_STREAM_TILLY: &str = "tilly";
const RNG_STREAM_BALLOONA: &str = "balloona";
const RNG_STREAM_CROWMAN: &str = "crowman";
const RNG_STREAM_DIZZY: &str = "dizzy";
const RNG_STREAM_SESSION: &str = "session";

/// Delayed effect waiting in the session's schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transition {
    /// The held scare image expires into the game-over screen.
    EndJumpscare(JumpscareCause),
    /// Tilly's delayed scare after smashing the right door.
    DoorBreakScare,
    /// The undefeatable scare that follows a power failure.
    PowerOutScare,
    /// The nightly phone call ran its course.
    PhoneCallOver,
    /// A clip played long enough and should stop.
    StopClip(AudioClip),
    /// The congratulations screen gives way to the forced scare.
    BeginFinalJumpscare,
    /// The forced scare gives way to the end card.
    FinalJumpscareOver,
    /// The end card gives way to the menu.
    EndScreenOver,
}

#[derive(Clone, Copy, Debug)]
struct ScheduledTransition {
    fire_at: Duration,
    generation: u64,
    transition: Transition,
}

/// Complete state for one run of the game, from menu to menu.
#[derive(Debug)]
pub struct Session {
    seed: u64,
    night_table: NightTable,
    screen: ScreenState,
    clock: Clock,
    generation: u64,
    scheduled: Vec<ScheduledTransition>,
    saved_night: u8,
    current_night: u8,
    night_start: Duration,
    power: Power,
    economy: PowerEconomy,
    left_door_closed: bool,
    right_door_closed: bool,
    right_door_broken: bool,
    showing_cameras: bool,
    selected_camera: Option<CameraId>,
    last_screech: Option<Duration>,
    screech_count: u32,
    phone_call_active: bool,
    powerout_started: Option<Duration>,
    win_night_entered: Option<Duration>,
    jumpscare_cause: Option<JumpscareCause>,
    game_over_message: Option<&'static str>,
    cast: Option<Cast>,
    session_rng: ChaCha8Rng,
}

impl Session {
    /// Creates a session sitting on the menu screen.
    #[must_use]
    pub fn new(seed: u64, night_table: NightTable) -> Self {
        Self {
            seed,
            night_table,
            screen: ScreenState::Menu,
            clock: Clock::new(),
            generation: 0,
            scheduled: Vec::new(),
            saved_night: 1,
            current_night: 1,
            night_start: Duration::ZERO,
            power: Power::full(),
            economy: PowerEconomy::new(Duration::ZERO),
            left_door_closed: false,
            right_door_closed: false,
            right_door_broken: false,
            showing_cameras: false,
            selected_camera: None,
            last_screech: None,
            screech_count: 0,
            phone_call_active: false,
            powerout_started: None,
            win_night_entered: None,
            jumpscare_cause: None,
            game_over_message: None,
            cast: None,
            session_rng: ChaCha8Rng::seed_from_u64(derive_stream_seed(seed, RNG_STREAM_SESSION, 0)),
        }
    }

    /// Pre-seeds the continue slot so the menu can resume at `night`.
    ///
    /// Development shortcut for jumping straight at a later night; clamped
    /// to the table's range.
    #[must_use]
    pub fn with_saved_night(mut self, night: u8) -> Self {
        self.saved_night = night.clamp(1, WIN_GAME_NIGHT);
        self
    }

    fn schedule(&mut self, fire_at: Duration, transition: Transition) {
        self.scheduled.push(ScheduledTransition {
            fire_at,
            generation: self.generation,
            transition,
        });
    }

    fn set_screen(&mut self, screen: ScreenState, out_events: &mut Vec<Event>) {
        if self.screen != screen {
            debug!(from = ?self.screen, to = ?screen, "screen change");
            self.screen = screen;
            out_events.push(Event::ScreenChanged { screen });
        }
    }

    fn screech_ready(&self, now: Duration) -> bool {
        self.last_screech
            .map_or(true, |at| now.saturating_sub(at) >= SCREECH_COOLDOWN)
    }

    fn in_grace_period(&self, now: Duration) -> bool {
        self.current_night == 1 && now.saturating_sub(self.night_start) < GRACE_PERIOD
    }

    fn phone_clip(&self) -> AudioClip {
        AudioClip::PhoneCall(self.current_night.min(WIN_GAME_NIGHT))
    }

    fn stop_ambient_sounds(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::Audio(AudioCue::stop(AudioClip::CameraStatic)));
        out_events.push(Event::Audio(AudioCue::stop(AudioClip::Fan)));
    }

    fn stop_all_sounds(&mut self, out_events: &mut Vec<Event>) {
        out_events.push(Event::Audio(AudioCue::stop(AudioClip::PoweroutSong)));
        out_events.push(Event::Audio(AudioCue::stop(AudioClip::Screech)));
        out_events.push(Event::Audio(AudioCue::stop(AudioClip::Jumpscare)));
        self.stop_ambient_sounds(out_events);
        if self.phone_call_active {
            self.phone_call_active = false;
            out_events.push(Event::Audio(AudioCue::stop(self.phone_clip())));
            out_events.push(Event::PhoneCallEnded);
        }
    }

    fn start_night(&mut self, night: u8, now: Duration, out_events: &mut Vec<Event>) {
        info!(night, "starting night");
        self.generation = self.generation.wrapping_add(1);
        self.scheduled.clear();
        self.stop_all_sounds(out_events);

        self.current_night = night;
        self.saved_night = self.saved_night.max(night);
        self.night_start = now;
        self.power = Power::full();
        self.economy = PowerEconomy::new(now);
        self.left_door_closed = false;
        self.right_door_closed = false;
        self.right_door_broken = false;
        self.showing_cameras = false;
        self.selected_camera = None;
        self.last_screech = None;
        self.screech_count = 0;
        self.powerout_started = None;
        self.win_night_entered = None;
        self.jumpscare_cause = None;
        self.game_over_message = None;

        let levels = self.night_table.levels_for(night);
        self.cast = Some(Cast::new(
            levels,
            now,
            CastSeeds {
                tilly: derive_stream_seed(self.seed, RNG_STREAM_TILLY, night),
                balloona: derive_stream_seed(self.seed, RNG_STREAM_BALLOONA, night),
                crowman: derive_stream_seed(self.seed, RNG_STREAM_CROWMAN, night),
                dizzy: derive_stream_seed(self.seed, RNG_STREAM_DIZZY, night),
            },
        ));
        self.session_rng =
            ChaCha8Rng::seed_from_u64(derive_stream_seed(self.seed, RNG_STREAM_SESSION, night));

        out_events.push(Event::NightStarted { night });
        self.set_screen(ScreenState::Playing, out_events);

        // The nightly call opens the shift; the fan loop takes over once it
        // ends or is muted.
        self.phone_call_active = true;
        out_events.push(Event::PhoneCallStarted { night });
        out_events.push(Event::Audio(AudioCue::play(self.phone_clip())));
        self.schedule(now + PHONE_CALL_LENGTH, Transition::PhoneCallOver);
    }

    fn to_menu(&mut self, out_events: &mut Vec<Event>) {
        self.generation = self.generation.wrapping_add(1);
        self.scheduled.clear();
        self.stop_all_sounds(out_events);
        self.cast = None;
        self.set_screen(ScreenState::Menu, out_events);
    }

    fn trigger_jumpscare(
        &mut self,
        cause: JumpscareCause,
        now: Duration,
        out_events: &mut Vec<Event>,
    ) {
        info!(?cause, "jumpscare");
        out_events.push(Event::Audio(AudioCue::stop(AudioClip::PoweroutSong)));
        self.stop_ambient_sounds(out_events);
        out_events.push(Event::Audio(AudioCue::play(AudioClip::Jumpscare)));

        self.jumpscare_cause = Some(cause);
        self.set_screen(ScreenState::Jumpscare, out_events);
        out_events.push(Event::JumpscareTriggered { cause });
        self.schedule(now + cause.duration(), Transition::StopClip(AudioClip::Jumpscare));
        self.schedule(now + cause.duration(), Transition::EndJumpscare(cause));
    }

    fn end_game(&mut self, cause: JumpscareCause, out_events: &mut Vec<Event>) {
        self.stop_all_sounds(out_events);
        self.game_over_message = Some(cause.message());
        self.set_screen(ScreenState::GameOver, out_events);
        out_events.push(Event::GameOver {
            message: cause.message(),
        });
    }

    fn enter_powerout(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        info!("power depleted");
        self.stop_ambient_sounds(out_events);
        out_events.push(Event::Audio(AudioCue::play(AudioClip::PoweroutSong)));

        self.powerout_started = Some(now);
        self.showing_cameras = false;
        self.left_door_closed = false;
        self.right_door_closed = false;
        if let Some(cast) = self.cast.as_mut() {
            cast.balloona_mut().deflate(now);
        }

        out_events.push(Event::PowerDepleted);
        self.set_screen(ScreenState::PowerOut, out_events);

        let wait_ms = self
            .session_rng
            .gen_range(POWEROUT_WAIT_MIN_MS..=POWEROUT_WAIT_MAX_MS);
        self.schedule(now + Duration::from_millis(wait_ms), Transition::PowerOutScare);
    }

    fn complete_night(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        info!(night = self.current_night, "night survived");
        out_events.push(Event::NightSurvived {
            night: self.current_night,
        });
        self.stop_all_sounds(out_events);

        if self.current_night >= WIN_GAME_NIGHT {
            self.set_screen(ScreenState::WinGame, out_events);
            out_events.push(Event::GameWon);
            self.schedule(now + WIN_GAME_HOLD, Transition::BeginFinalJumpscare);
        } else {
            self.win_night_entered = Some(now);
            self.set_screen(ScreenState::WinNight, out_events);
        }
    }

    fn run_scheduled(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        self.scheduled.sort_by_key(|entry| entry.fire_at);
        while let Some(first) = self.scheduled.first() {
            if first.fire_at > now {
                break;
            }
            let entry = self.scheduled.remove(0);
            if entry.generation != self.generation {
                debug!(?entry.transition, "discarding stale transition");
                continue;
            }
            self.dispatch(entry.transition, now, out_events);
        }
    }

    fn dispatch(&mut self, transition: Transition, now: Duration, out_events: &mut Vec<Event>) {
        match transition {
            Transition::EndJumpscare(cause) => {
                if self.screen == ScreenState::Jumpscare {
                    self.end_game(cause, out_events);
                }
            }
            Transition::DoorBreakScare => {
                if self.screen == ScreenState::Playing {
                    self.trigger_jumpscare(JumpscareCause::TillyDoorBreak, now, out_events);
                }
            }
            Transition::PowerOutScare => {
                if self.screen == ScreenState::PowerOut {
                    self.trigger_jumpscare(JumpscareCause::Crowman, now, out_events);
                }
            }
            Transition::PhoneCallOver => {
                if self.phone_call_active {
                    self.phone_call_active = false;
                    out_events.push(Event::Audio(AudioCue::stop(self.phone_clip())));
                    out_events.push(Event::PhoneCallEnded);
                    if self.screen == ScreenState::Playing && !self.showing_cameras {
                        out_events.push(Event::Audio(AudioCue::repeat(AudioClip::Fan)));
                    }
                }
            }
            Transition::StopClip(clip) => {
                out_events.push(Event::Audio(AudioCue::stop(clip)));
            }
            Transition::BeginFinalJumpscare => {
                if self.screen == ScreenState::WinGame {
                    out_events.push(Event::Audio(AudioCue::play(AudioClip::FinalJumpscare)));
                    self.set_screen(ScreenState::FinalJumpscare, out_events);
                    self.schedule(
                        now + FINAL_JUMPSCARE_HOLD,
                        Transition::StopClip(AudioClip::FinalJumpscare),
                    );
                    self.schedule(now + FINAL_JUMPSCARE_HOLD, Transition::FinalJumpscareOver);
                }
            }
            Transition::FinalJumpscareOver => {
                if self.screen == ScreenState::FinalJumpscare {
                    self.set_screen(ScreenState::End, out_events);
                    self.schedule(now + END_SCREEN_HOLD, Transition::EndScreenOver);
                }
            }
            Transition::EndScreenOver => {
                if self.screen == ScreenState::End {
                    self.to_menu(out_events);
                }
            }
        }
    }

    fn tick_playing(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        let loads = Loads::new(
            self.showing_cameras,
            self.left_door_closed,
            self.right_door_closed,
        );
        if let DrainOutcome::Drained { amount } = self.economy.tick(now, loads) {
            self.power = self.power.drained(amount);
            out_events.push(Event::PowerDrained {
                remaining: self.power,
            });
            if self.power.is_depleted() {
                self.enter_powerout(now, out_events);
                return;
            }
        }

        if !self.in_grace_period(now) {
            let doors = DoorState::new(self.left_door_closed, self.right_door_closed);
            let mut behavior_events = Vec::new();
            if let Some(cast) = self.cast.as_mut() {
                cast.update(now, doors, &mut behavior_events);
            }
            for behavior in behavior_events {
                self.resolve_behavior(behavior, now, out_events);
            }
        }

        if self.screen == ScreenState::Playing
            && now.saturating_sub(self.night_start) >= NIGHT_LENGTH
        {
            self.complete_night(now, out_events);
        }
    }

    fn resolve_behavior(
        &mut self,
        behavior: BehaviorEvent,
        now: Duration,
        out_events: &mut Vec<Event>,
    ) {
        match behavior {
            BehaviorEvent::TillyMoved(camera) => {
                out_events.push(Event::TillyMoved { camera });
            }
            BehaviorEvent::DoorSmashed => {
                self.right_door_broken = true;
                self.right_door_closed = false;
                out_events.push(Event::DoorBroken);
                self.schedule(now + DOOR_BREAK_DELAY, Transition::DoorBreakScare);
            }
            BehaviorEvent::HeadInflated { head_size } => {
                out_events.push(Event::BalloonaInflated { head_size });
            }
            BehaviorEvent::HeadPopped => {
                out_events.push(Event::BalloonaPopped);
                out_events.push(Event::Audio(AudioCue::play(AudioClip::Pop)));
            }
            BehaviorEvent::CamerasBlocked(cameras) => {
                out_events.push(Event::CamerasBlocked { cameras });
            }
            BehaviorEvent::CamerasCleared => {
                out_events.push(Event::CamerasUnblocked);
            }
            BehaviorEvent::DizzyMoved(camera) => {
                out_events.push(Event::DizzyMoved { camera });
            }
            BehaviorEvent::DizzyAttackStarted(camera) => {
                out_events.push(Event::DizzyAttackStarted { camera });
            }
            BehaviorEvent::DizzyRetreated => {
                out_events.push(Event::DizzyRetreated);
            }
            BehaviorEvent::Jumpscare(cause) => {
                if self.screen == ScreenState::Playing {
                    self.trigger_jumpscare(cause, now, out_events);
                }
            }
        }
    }
}

/// Applies the provided command to the session, mutating state
/// deterministically and appending broadcast events.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            session.clock.advance(dt);
            let now = session.clock.now();
            out_events.push(Event::TimeAdvanced { dt });
            session.run_scheduled(now, out_events);
            if session.screen == ScreenState::Playing {
                session.tick_playing(now, out_events);
            }
        }
        Command::SelectCamera { camera } => {
            if session.screen != ScreenState::Playing || camera.get() >= CAMERA_COUNT {
                return;
            }
            session.selected_camera = Some(camera);
            if !session.showing_cameras {
                session.showing_cameras = true;
                out_events.push(Event::CamerasToggled { showing: true });
                out_events.push(Event::Audio(AudioCue::repeat(AudioClip::CameraStatic)));
                out_events.push(Event::Audio(AudioCue::stop(AudioClip::Fan)));
            }
            out_events.push(Event::CameraSelected { camera });
        }
        Command::ToggleCameras => {
            if session.screen != ScreenState::Playing {
                return;
            }
            session.showing_cameras = !session.showing_cameras;
            out_events.push(Event::CamerasToggled {
                showing: session.showing_cameras,
            });
            if session.showing_cameras {
                out_events.push(Event::Audio(AudioCue::repeat(AudioClip::CameraStatic)));
                out_events.push(Event::Audio(AudioCue::stop(AudioClip::Fan)));
            } else {
                out_events.push(Event::Audio(AudioCue::stop(AudioClip::CameraStatic)));
                if !session.phone_call_active {
                    out_events.push(Event::Audio(AudioCue::repeat(AudioClip::Fan)));
                }
            }
        }
        Command::ToggleLeftDoor => {
            if session.screen != ScreenState::Playing {
                return;
            }
            session.left_door_closed = !session.left_door_closed;
            out_events.push(Event::DoorToggled {
                side: carnival_core::DoorSide::Left,
                closed: session.left_door_closed,
            });
            out_events.push(Event::Audio(AudioCue::play(AudioClip::DoorClose)));
        }
        Command::ToggleRightDoor => {
            if session.screen != ScreenState::Playing || session.right_door_broken {
                return;
            }
            session.right_door_closed = !session.right_door_closed;
            out_events.push(Event::DoorToggled {
                side: carnival_core::DoorSide::Right,
                closed: session.right_door_closed,
            });
            out_events.push(Event::Audio(AudioCue::play(AudioClip::DoorClose)));
        }
        Command::ScreechLure { camera } => {
            let now = session.clock.now();
            if session.screen != ScreenState::Playing
                || !session.showing_cameras
                || session.selected_camera != Some(camera)
                || !session.screech_ready(now)
            {
                return;
            }
            session.last_screech = Some(now);
            session.screech_count += 1;
            session.power = session.power.drained(SCREECH_POWER_COST);
            out_events.push(Event::ScreechFired { camera });
            out_events.push(Event::PowerDrained {
                remaining: session.power,
            });
            out_events.push(Event::Audio(AudioCue::play(AudioClip::Screech)));
            session.schedule(
                now + SCREECH_CLIP_LENGTH,
                Transition::StopClip(AudioClip::Screech),
            );
            if let Some(cast) = session.cast.as_mut() {
                if cast.tilly_mut().lure_to(camera) {
                    out_events.push(Event::TillyMoved { camera });
                }
                if cast.crowman_mut().unblock(camera) {
                    out_events.push(Event::CamerasUnblocked);
                }
            }
        }
        Command::DeflateBalloona => {
            if session.screen != ScreenState::Playing || session.showing_cameras {
                return;
            }
            let now = session.clock.now();
            if let Some(cast) = session.cast.as_mut() {
                cast.balloona_mut().deflate(now);
                out_events.push(Event::BalloonaDeflated);
            }
        }
        Command::MutePhoneCall => {
            if !session.phone_call_active {
                return;
            }
            session.phone_call_active = false;
            out_events.push(Event::Audio(AudioCue::stop(session.phone_clip())));
            out_events.push(Event::PhoneCallEnded);
            if session.screen == ScreenState::Playing && !session.showing_cameras {
                out_events.push(Event::Audio(AudioCue::repeat(AudioClip::Fan)));
            }
        }
        Command::SkipNight => {
            // Debug escape hatch: finishes the night on the spot.
            if session.screen != ScreenState::Playing {
                return;
            }
            let now = session.clock.now();
            session.complete_night(now, out_events);
        }
        Command::AdvanceNight => {
            if session.screen != ScreenState::WinNight {
                return;
            }
            let now = session.clock.now();
            let dwelled = session
                .win_night_entered
                .map_or(false, |at| now.saturating_sub(at) >= WIN_NIGHT_DWELL);
            if dwelled {
                session.start_night(session.current_night + 1, now, out_events);
            }
        }
        Command::RestartNight => {
            if session.screen != ScreenState::GameOver {
                return;
            }
            let now = session.clock.now();
            session.start_night(session.current_night, now, out_events);
        }
        Command::ReturnToMenu => {
            if session.screen == ScreenState::GameOver || session.screen == ScreenState::End {
                session.to_menu(out_events);
            }
        }
        Command::NewGame => {
            if session.screen != ScreenState::Menu {
                return;
            }
            let now = session.clock.now();
            session.start_night(1, now, out_events);
        }
        Command::ContinueGame => {
            if session.screen != ScreenState::Menu || session.saved_night <= 1 {
                return;
            }
            let now = session.clock.now();
            session.start_night(session.saved_night, now, out_events);
        }
    }
}

fn derive_stream_seed(global_seed: u64, label: &str, night: u8) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update([night]);
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use carnival_core::{CameraId, JumpscareCause, Power, ScreenState, NIGHT_LENGTH};

    use super::Session;

    /// Immutable snapshot of everything adapters present each frame.
    #[derive(Clone, Debug, PartialEq)]
    pub struct SessionSnapshot {
        /// Screen currently active.
        pub screen: ScreenState,
        /// Night in progress (or about to be restarted).
        pub night: u8,
        /// Highest night reached this run; drives the continue option.
        pub saved_night: u8,
        /// Power reserve remaining.
        pub power: Power,
        /// Time left on the night timer.
        pub time_remaining: Duration,
        /// Left door shut.
        pub left_door_closed: bool,
        /// Right door shut.
        pub right_door_closed: bool,
        /// Right door permanently broken for the night.
        pub right_door_broken: bool,
        /// Camera feeds raised.
        pub showing_cameras: bool,
        /// Feed currently in focus.
        pub selected_camera: Option<CameraId>,
        /// Whether the screech lure is off cooldown.
        pub screech_ready: bool,
        /// Screeches fired so far this night.
        pub screeches_fired: u32,
        /// A phone call is playing.
        pub phone_call_active: bool,
        /// When the lights went out, if they have.
        pub powerout_started: Option<Duration>,
        /// Message for the game-over screen, when on it.
        pub game_over_message: Option<&'static str>,
        /// Cause of the scare being shown, when on that screen.
        pub jumpscare_cause: Option<JumpscareCause>,
        /// Camera Tilly haunts, while a night is live.
        pub tilly_camera: Option<CameraId>,
        /// Balloona's head size, 0-100.
        pub balloona_head: u8,
        /// Feeds Crowman has blacked out.
        pub blocked_cameras: Vec<CameraId>,
        /// Camera Dizzy occupies, while a night is live.
        pub dizzy_camera: Option<CameraId>,
        /// Whether Dizzy is mid-attack at a door.
        pub dizzy_attacking: bool,
    }

    /// Captures a read-only snapshot of the session for presentation.
    #[must_use]
    pub fn snapshot(session: &Session) -> SessionSnapshot {
        let now = session.clock.now();
        let elapsed = now.saturating_sub(session.night_start);
        SessionSnapshot {
            screen: session.screen,
            night: session.current_night,
            saved_night: session.saved_night,
            power: session.power,
            time_remaining: NIGHT_LENGTH.saturating_sub(elapsed),
            left_door_closed: session.left_door_closed,
            right_door_closed: session.right_door_closed,
            right_door_broken: session.right_door_broken,
            showing_cameras: session.showing_cameras,
            selected_camera: session.selected_camera,
            screech_ready: session.screech_ready(now),
            screeches_fired: session.screech_count,
            phone_call_active: session.phone_call_active,
            powerout_started: session.powerout_started,
            game_over_message: session.game_over_message,
            jumpscare_cause: session.jumpscare_cause,
            tilly_camera: session.cast.as_ref().map(|cast| cast.tilly().position()),
            balloona_head: session
                .cast
                .as_ref()
                .map_or(0, |cast| cast.balloona().head_size()),
            blocked_cameras: session
                .cast
                .as_ref()
                .map_or_else(Vec::new, |cast| cast.crowman().blocked().to_vec()),
            dizzy_camera: session.cast.as_ref().map(|cast| cast.dizzy().position()),
            dizzy_attacking: session
                .cast
                .as_ref()
                .map_or(false, |cast| cast.dizzy().is_attacking()),
        }
    }

    /// Highest night reached, read at menu entry for the continue option.
    #[must_use]
    pub fn saved_night(session: &Session) -> u8 {
        session.saved_night
    }

    /// Reports whether the screech cooldown currently allows a lure.
    #[must_use]
    pub fn screech_ready(session: &Session) -> bool {
        session.screech_ready(session.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu_session() -> Session {
        Session::new(0xcafe, NightTable::default())
    }

    fn tick(session: &mut Session, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        apply(session, Command::Tick { dt }, &mut events);
        events
    }

    #[test]
    fn stale_generation_transitions_never_fire() {
        let mut session = menu_session();
        let mut events = Vec::new();
        apply(&mut session, Command::NewGame, &mut events);

        // Hand-plant a transition tagged with a dead generation.
        session.scheduled.push(ScheduledTransition {
            fire_at: Duration::ZERO,
            generation: session.generation.wrapping_sub(1),
            transition: Transition::PowerOutScare,
        });

        let events = tick(&mut session, Duration::from_millis(16));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::JumpscareTriggered { .. })));
        assert_eq!(session.screen, ScreenState::Playing);
    }

    #[test]
    fn starting_a_night_cancels_previous_schedules() {
        let mut session = menu_session();
        let mut events = Vec::new();
        apply(&mut session, Command::NewGame, &mut events);
        assert!(!session.scheduled.is_empty(), "phone call should be queued");

        let before = session.generation;
        session.start_night(2, session.clock.now(), &mut events);
        assert!(session.generation > before);
        // Only the fresh night's phone-call entry remains.
        assert!(session
            .scheduled
            .iter()
            .all(|entry| entry.generation == session.generation));
    }

    #[test]
    fn broken_right_door_ignores_further_toggles() {
        let mut session = menu_session();
        let mut events = Vec::new();
        apply(&mut session, Command::NewGame, &mut events);

        session.right_door_broken = true;
        session.right_door_closed = false;

        let mut events = Vec::new();
        apply(&mut session, Command::ToggleRightDoor, &mut events);
        assert!(events.is_empty());
        assert!(!session.right_door_closed);

        // The left door keeps working.
        let mut events = Vec::new();
        apply(&mut session, Command::ToggleLeftDoor, &mut events);
        assert!(session.left_door_closed);
        assert!(!events.is_empty());
    }

    #[test]
    fn door_smash_latches_and_schedules_the_delayed_scare() {
        let mut session = menu_session();
        let mut events = Vec::new();
        apply(&mut session, Command::NewGame, &mut events);
        session.right_door_closed = true;

        let now = session.clock.now();
        let mut events = Vec::new();
        session.resolve_behavior(BehaviorEvent::DoorSmashed, now, &mut events);

        assert!(session.right_door_broken);
        assert!(!session.right_door_closed);
        assert!(events.contains(&Event::DoorBroken));

        // The distinct scare lands after the break delay, not immediately.
        assert_eq!(session.screen, ScreenState::Playing);
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::Tick {
                dt: Duration::from_millis(800),
            },
            &mut events,
        );
        assert!(events.contains(&Event::JumpscareTriggered {
            cause: JumpscareCause::TillyDoorBreak,
        }));
        assert_eq!(session.screen, ScreenState::Jumpscare);
    }

    #[test]
    fn saved_night_tracks_the_highest_night_reached() {
        let mut session = menu_session();
        let mut events = Vec::new();
        session.start_night(4, Duration::ZERO, &mut events);
        assert_eq!(query::saved_night(&session), 4);

        // A fresh run does not erase progress.
        session.to_menu(&mut events);
        apply(&mut session, Command::NewGame, &mut events);
        assert_eq!(query::saved_night(&session), 4);
    }
}
