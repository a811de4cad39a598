#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Behavior models for the four animatronics that stalk the office.
//!
//! Each model is a small timer-driven state machine. The session calls
//! [`Cast::update`] once per simulation tick with the current clock reading
//! and door state; models respond by pushing [`BehaviorEvent`] values that
//! the session resolves into screen transitions, audio cues and broadcast
//! events. Models never mutate anything outside themselves.
//!
//! All randomness flows through a per-entity ChaCha8 stream seeded by the
//! session, so a night replays identically for the same seed, levels and
//! command sequence.

mod balloona;
mod crowman;
mod dizzy;
mod tilly;

use std::time::Duration;

pub use balloona::Balloona;
pub use crowman::{Crowman, DUAL_BLOCK_COOLDOWN};
pub use dizzy::{Dizzy, ATTACK_DURATION, PREP_TIME};
pub use tilly::{Tilly, TILLY_PATH};

use carnival_core::{CameraId, JumpscareCause, NightLevels};

/// Door positions sampled at the start of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoorState {
    /// Left office door is shut.
    pub left_closed: bool,
    /// Right office door is shut.
    pub right_closed: bool,
}

impl DoorState {
    /// Creates a door-state sample.
    #[must_use]
    pub const fn new(left_closed: bool, right_closed: bool) -> Self {
        Self {
            left_closed,
            right_closed,
        }
    }
}

/// Facts emitted by behavior models for the session to resolve.
#[derive(Clone, Debug, PartialEq)]
pub enum BehaviorEvent {
    /// Tilly advanced one waypoint along her path.
    TillyMoved(CameraId),
    /// Tilly hit the closed right door; the latch breaks for the night and
    /// her scare follows after a short delay.
    DoorSmashed,
    /// Balloona's head grew by one increment.
    HeadInflated {
        /// Head size after the growth step, 0-100.
        head_size: u8,
    },
    /// Balloona's head reached capacity this instant.
    HeadPopped,
    /// Crowman blocked the listed camera feeds.
    CamerasBlocked(Vec<CameraId>),
    /// Crowman's blocks expired.
    CamerasCleared,
    /// Dizzy wandered to another camera.
    DizzyMoved(CameraId),
    /// Dizzy arrived at a door camera and began winding up an attack.
    DizzyAttackStarted(CameraId),
    /// Dizzy found the door shut through his whole attack window and went
    /// home.
    DizzyRetreated,
    /// A model resolved a terminal threat.
    Jumpscare(JumpscareCause),
}

/// Seeds for the per-entity random streams, derived by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastSeeds {
    /// Stream seed for Tilly.
    pub tilly: u64,
    /// Stream seed for Balloona.
    pub balloona: u64,
    /// Stream seed for Crowman.
    pub crowman: u64,
    /// Stream seed for Dizzy.
    pub dizzy: u64,
}

/// The full cast active for one night. Rebuilt at every night start and
/// owned exclusively by the session.
#[derive(Clone, Debug)]
pub struct Cast {
    tilly: Tilly,
    balloona: Balloona,
    crowman: Crowman,
    dizzy: Dizzy,
}

impl Cast {
    /// Assembles the cast for a night from its level table entry.
    #[must_use]
    pub fn new(levels: NightLevels, now: Duration, seeds: CastSeeds) -> Self {
        Self {
            tilly: Tilly::new(levels.tilly, now, seeds.tilly),
            balloona: Balloona::new(levels.balloona, now, seeds.balloona),
            crowman: Crowman::new(levels.crowman, seeds.crowman),
            dizzy: Dizzy::new(levels.dizzy, now, seeds.dizzy),
        }
    }

    /// Updates every member in a fixed order, collecting their events.
    pub fn update(&mut self, now: Duration, doors: DoorState, out: &mut Vec<BehaviorEvent>) {
        self.tilly.update(now, doors, out);
        self.balloona.update(now, out);
        self.crowman.update(now, out);
        self.dizzy.update(now, doors, out);
    }

    /// Tilly, for luring and position queries.
    #[must_use]
    pub fn tilly(&self) -> &Tilly {
        &self.tilly
    }

    /// Mutable access to Tilly for the screech lure.
    pub fn tilly_mut(&mut self) -> &mut Tilly {
        &mut self.tilly
    }

    /// Balloona, for head-size queries.
    #[must_use]
    pub fn balloona(&self) -> &Balloona {
        &self.balloona
    }

    /// Mutable access to Balloona for deflating.
    pub fn balloona_mut(&mut self) -> &mut Balloona {
        &mut self.balloona
    }

    /// Crowman, for blocked-feed queries.
    #[must_use]
    pub fn crowman(&self) -> &Crowman {
        &self.crowman
    }

    /// Mutable access to Crowman for clearing a block.
    pub fn crowman_mut(&mut self) -> &mut Crowman {
        &mut self.crowman
    }

    /// Dizzy, for position and attack queries.
    #[must_use]
    pub fn dizzy(&self) -> &Dizzy {
        &self.dizzy
    }
}
