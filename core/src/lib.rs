#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Carnival of Crows engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and the behavior systems. Adapters submit
//! [`Command`] values describing desired mutations, the session executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values for adapters to react to deterministically. Audio is modelled as
//! fire-and-forget [`AudioCue`] values carried inside the event stream; a
//! sink that is missing a clip simply ignores the cue.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical title shown on the menu screen and the window frame.
pub const GAME_TITLE: &str = "Carnival of Crows";

/// Fixed length of a single night of gameplay.
pub const NIGHT_LENGTH: Duration = Duration::from_secs(6 * 60);

/// Window at the start of night 1 during which the cast stays inert.
pub const GRACE_PERIOD: Duration = Duration::from_secs(90);

/// Surviving this night completes the game instead of advancing it.
pub const WIN_GAME_NIGHT: u8 = 5;

/// Smallest delay any randomized behavior timer is allowed to produce.
///
/// Degenerate level mappings could otherwise yield zero or negative delays
/// and spin an entity through a transition on every tick.
pub const MIN_ACTION_DELAY: Duration = Duration::from_millis(250);

/// Number of surveillance cameras wired into the office.
pub const CAMERA_COUNT: u8 = 5;

/// Clamps a millisecond delay to the minimum positive behavior delay.
///
/// Non-finite inputs map to [`Duration::MAX`], leaving the entity inert for
/// the remainder of the night.
#[must_use]
pub fn clamp_delay(milliseconds: f32) -> Duration {
    if !milliseconds.is_finite() {
        return Duration::MAX;
    }

    let clamped = milliseconds.max(MIN_ACTION_DELAY.as_secs_f32() * 1_000.0);
    Duration::from_secs_f32(clamped / 1_000.0)
}

/// Screens the session can present, from the menu through the end card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenState {
    /// Title screen offering a new game and, when progress exists, continue.
    Menu,
    /// Active night: office, cameras, doors, and the cast all live.
    Playing,
    /// Power has run out; the office is dark and the scare is inbound.
    PowerOut,
    /// A cause-specific scare image is being held on screen.
    Jumpscare,
    /// The night was lost; shows the cause message and restart options.
    GameOver,
    /// The night was survived; waits for the player to advance.
    WinNight,
    /// All five nights survived; congratulations before the twist.
    WinGame,
    /// The forced scare that interrupts the congratulations screen.
    FinalJumpscare,
    /// Static closing card shown before returning to the menu.
    End,
}

/// The two office doors the player can hold shut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorSide {
    /// Door on the left side of the office, watched by camera 3.
    Left,
    /// Door on the right side of the office, watched by camera 5.
    Right,
}

/// Zero-based identifier of a surveillance camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CameraId(u8);

impl CameraId {
    /// Every camera in feed order.
    pub const ALL: [CameraId; CAMERA_COUNT as usize] = [
        CameraId::new(0),
        CameraId::new(1),
        CameraId::new(2),
        CameraId::new(3),
        CameraId::new(4),
    ];

    /// Creates a new camera identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Door visible on this camera's feed, if it faces one.
    #[must_use]
    pub const fn door_side(&self) -> Option<DoorSide> {
        match self.0 {
            2 => Some(DoorSide::Left),
            4 => Some(DoorSide::Right),
            _ => None,
        }
    }

    /// Human-readable feed label, e.g. `"Cam 3"`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self.0 {
            0 => "Cam 1",
            1 => "Cam 2",
            2 => "Cam 3",
            3 => "Cam 4",
            _ => "Cam 5",
        }
    }
}

/// Aggression level assigned to one animatronic for one night.
///
/// Levels scale the randomized behavior timers linearly across a nominal
/// 0-20 range; values above 20 extrapolate along the same line. Level 0
/// takes the entity out of the night entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u8);

impl Level {
    /// Creates a new level wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the underlying level value.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the entity sits out the night.
    #[must_use]
    pub const fn is_inert(&self) -> bool {
        self.0 == 0
    }

    /// Interpolates an interval across the 0-20 scale.
    ///
    /// `slow_ms` is the interval at level 0, `fast_ms` at level 20. Returns
    /// `None` at level 0 so inert entities never schedule a transition; all
    /// other results are clamped by [`clamp_delay`].
    #[must_use]
    pub fn interval_between(&self, slow_ms: f32, fast_ms: f32) -> Option<Duration> {
        if self.is_inert() {
            return None;
        }

        let t = f32::from(self.0) / 20.0;
        Some(clamp_delay(slow_ms + (fast_ms - slow_ms) * t))
    }

    /// Interpolates a multiplier across the 1-20 scale, unclamped.
    ///
    /// Used for pace factors applied on top of an already-randomized base
    /// delay; levels outside the range extrapolate linearly.
    #[must_use]
    pub fn pace_factor(&self, at_one: f32, at_twenty: f32) -> f32 {
        at_one + (at_twenty - at_one) * ((f32::from(self.0) - 1.0) / 19.0)
    }

    /// Probability derived from the level as `(level / 20) * ceiling`.
    #[must_use]
    pub fn chance(&self, ceiling: f32) -> f64 {
        f64::from(f32::from(self.0) / 20.0 * ceiling)
    }
}

/// Shared power reserve, clamped to the 0-100 gauge.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Power(f32);

impl Power {
    /// A freshly charged reserve at 100%.
    #[must_use]
    pub fn full() -> Self {
        Self(100.0)
    }

    /// Creates a reserve clamped into the 0-100 range.
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 100.0))
    }

    /// Current charge in the 0-100 range.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }

    /// Returns the reserve after consuming `amount`, saturating at empty.
    #[must_use]
    pub fn drained(self, amount: f32) -> Self {
        Self::new(self.0 - amount)
    }

    /// Reports whether the reserve has run dry.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.0 <= 0.0
    }
}

/// Monotonic simulation clock advanced once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    elapsed: Duration,
}

impl Clock {
    /// Creates a clock at zero elapsed time.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the clock by the provided frame delta.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Total simulated time since the clock was created.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.elapsed
    }
}

/// Terminal threat that ended (or is ending) the current attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JumpscareCause {
    /// Tilly reached the right door and found it open.
    Tilly,
    /// Tilly smashed through the closed right door first.
    TillyDoorBreak,
    /// Dizzy finished an attack against an open door.
    Dizzy,
    /// The lights went out and Crowman came calling.
    Crowman,
}

impl JumpscareCause {
    /// In-fiction message shown on the game-over screen.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Tilly => "Tilly got you!",
            Self::TillyDoorBreak => "Tilly broke through the door and got you!",
            Self::Dizzy => "Dizzy got you!",
            Self::Crowman => "Crowman got you!",
        }
    }

    /// How long the scare image is held before the game-over screen.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        match self {
            Self::TillyDoorBreak => Duration::from_millis(2_500),
            Self::Tilly | Self::Dizzy | Self::Crowman => Duration::from_millis(2_000),
        }
    }
}

/// Sound clips the session can cue. Sinks without a clip stay silent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioClip {
    /// Office fan loop, the baseline ambience.
    Fan,
    /// Static loop played while the camera feeds are up.
    CameraStatic,
    /// Thunk played whenever a door toggles.
    DoorClose,
    /// The screech lure burst.
    Screech,
    /// Balloona's head reaching capacity.
    Pop,
    /// Song that plays out the power failure.
    PoweroutSong,
    /// Standard scare sting.
    Jumpscare,
    /// The sting reserved for the post-victory scare.
    FinalJumpscare,
    /// Recorded phone call for the given night (clamped to night 5).
    PhoneCall(u8),
}

/// What a sink should do with a clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioAction {
    /// Play the clip once from the start.
    Play,
    /// Play the clip on repeat until stopped.
    Loop,
    /// Stop the clip if it is playing.
    Stop,
}

/// Fire-and-forget audio instruction emitted inside the event stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AudioCue {
    /// Clip the cue refers to.
    pub clip: AudioClip,
    /// Action the sink should take.
    pub action: AudioAction,
}

impl AudioCue {
    /// Cue that plays a clip once.
    #[must_use]
    pub const fn play(clip: AudioClip) -> Self {
        Self {
            clip,
            action: AudioAction::Play,
        }
    }

    /// Cue that loops a clip.
    #[must_use]
    pub const fn repeat(clip: AudioClip) -> Self {
        Self {
            clip,
            action: AudioAction::Loop,
        }
    }

    /// Cue that stops a clip.
    #[must_use]
    pub const fn stop(clip: AudioClip) -> Self {
        Self {
            clip,
            action: AudioAction::Stop,
        }
    }
}

/// Aggression levels for the full cast on one night.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightLevels {
    /// Tilly's level for the night.
    pub tilly: Level,
    /// Balloona's level for the night.
    pub balloona: Level,
    /// Crowman's level for the night.
    pub crowman: Level,
    /// Dizzy's level for the night.
    pub dizzy: Level,
}

impl NightLevels {
    /// Creates a night entry from the four cast levels.
    #[must_use]
    pub const fn new(tilly: u8, balloona: u8, crowman: u8, dizzy: u8) -> Self {
        Self {
            tilly: Level::new(tilly),
            balloona: Level::new(balloona),
            crowman: Level::new(crowman),
            dizzy: Level::new(dizzy),
        }
    }
}

const DEFAULT_NIGHTS: [NightLevels; WIN_GAME_NIGHT as usize] = [
    NightLevels::new(2, 0, 1, 4),
    NightLevels::new(7, 1, 2, 1),
    NightLevels::new(7, 3, 4, 2),
    NightLevels::new(10, 6, 6, 4),
    NightLevels::new(14, 10, 12, 18),
];

/// Static difficulty table mapping night numbers to cast levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightTable {
    nights: [NightLevels; WIN_GAME_NIGHT as usize],
}

impl NightTable {
    /// Builds a table from explicit per-night entries.
    #[must_use]
    pub const fn from_nights(nights: [NightLevels; WIN_GAME_NIGHT as usize]) -> Self {
        Self { nights }
    }

    /// Levels for the given night. Nights past the table reuse the final
    /// entry; night 0 is treated as night 1.
    #[must_use]
    pub fn levels_for(&self, night: u8) -> NightLevels {
        let index = night.clamp(1, WIN_GAME_NIGHT) - 1;
        self.nights[usize::from(index)]
    }
}

impl Default for NightTable {
    fn default() -> Self {
        Self::from_nights(DEFAULT_NIGHTS)
    }
}

/// Commands that express all permissible session mutations.
///
/// Commands issued in a state where they do not apply are silently ignored;
/// the session never errors on input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Brings up the camera feeds focused on the provided camera.
    SelectCamera {
        /// Feed to focus.
        camera: CameraId,
    },
    /// Toggles the camera feeds up or down.
    ToggleCameras,
    /// Toggles the left office door.
    ToggleLeftDoor,
    /// Toggles the right office door. Ignored once the door is broken.
    ToggleRightDoor,
    /// Fires the screech lure at the provided camera.
    ///
    /// Requires the feeds up, that camera selected, and the screech
    /// cooldown elapsed. Costs power, lures Tilly toward the camera, and
    /// clears any Crowman block on it.
    ScreechLure {
        /// Camera the lure targets.
        camera: CameraId,
    },
    /// Lets the air out of Balloona's head. Office view only.
    DeflateBalloona,
    /// Cuts the active phone call short.
    MutePhoneCall,
    /// Debug escape hatch: ends the current night as if survived.
    SkipNight,
    /// Advances from the night-complete screen to the next night.
    AdvanceNight,
    /// Restarts the night that was just lost.
    RestartNight,
    /// Returns to the menu from the game-over or end screens.
    ReturnToMenu,
    /// Starts a fresh run on night 1.
    NewGame,
    /// Resumes the run from the highest night reached.
    ContinueGame,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A night began and the cast was rebuilt.
    NightStarted {
        /// Night number now in progress.
        night: u8,
    },
    /// The presented screen changed.
    ScreenChanged {
        /// Screen that became active.
        screen: ScreenState,
    },
    /// The simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// The power economy consumed charge.
    PowerDrained {
        /// Reserve remaining after the drain.
        remaining: Power,
    },
    /// The reserve ran dry and the power-out sequence began.
    PowerDepleted,
    /// A door toggled.
    DoorToggled {
        /// Which door moved.
        side: DoorSide,
        /// Whether the door is now closed.
        closed: bool,
    },
    /// Tilly smashed the right door; it no longer closes this night.
    DoorBroken,
    /// The camera feeds were raised or lowered.
    CamerasToggled {
        /// Whether the feeds are now showing.
        showing: bool,
    },
    /// A camera feed gained focus.
    CameraSelected {
        /// Feed now in focus.
        camera: CameraId,
    },
    /// The screech lure fired at a camera.
    ScreechFired {
        /// Camera that was targeted.
        camera: CameraId,
    },
    /// Balloona's head grew.
    BalloonaInflated {
        /// Head size after the growth step, 0-100.
        head_size: u8,
    },
    /// Balloona's head hit capacity.
    BalloonaPopped,
    /// The player deflated Balloona.
    BalloonaDeflated,
    /// Crowman blocked one or two camera feeds.
    CamerasBlocked {
        /// Feeds that went dark.
        cameras: Vec<CameraId>,
    },
    /// Crowman's blocks expired or were cleared.
    CamerasUnblocked,
    /// Tilly advanced along her path.
    TillyMoved {
        /// Camera she now haunts.
        camera: CameraId,
    },
    /// Dizzy wandered to another camera.
    DizzyMoved {
        /// Camera he now occupies.
        camera: CameraId,
    },
    /// Dizzy reached a door camera and began winding up.
    DizzyAttackStarted {
        /// Door camera under attack.
        camera: CameraId,
    },
    /// Dizzy gave up on a shut door and wandered home.
    DizzyRetreated,
    /// A terminal scare fired.
    JumpscareTriggered {
        /// What got the player.
        cause: JumpscareCause,
    },
    /// The night timer ran out with the player alive.
    NightSurvived {
        /// Night that was completed.
        night: u8,
    },
    /// The final night was survived; the congratulations screen is up.
    GameWon,
    /// The attempt ended.
    GameOver {
        /// In-fiction message describing the loss.
        message: &'static str,
    },
    /// The nightly phone call started.
    PhoneCallStarted {
        /// Night whose recording is playing.
        night: u8,
    },
    /// The phone call ended or was muted.
    PhoneCallEnded,
    /// Instruction for the audio sink.
    Audio(AudioCue),
}
