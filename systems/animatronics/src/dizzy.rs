//! Dizzy wanders the camera graph and sieges whichever door he reaches.

use std::time::Duration;

use carnival_core::{clamp_delay, CameraId, DoorSide, JumpscareCause, Level};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{BehaviorEvent, DoorState};

/// Window after arriving at a door during which the open door is safe.
pub const PREP_TIME: Duration = Duration::from_secs(5);

/// Window after preparation during which the door state decides the night.
pub const ATTACK_DURATION: Duration = Duration::from_secs(2);

const HOME: CameraId = CameraId::new(0);
const BASE_MOVE_DELAY_MS: f32 = 20_000.0;

/// Neighbours of each camera on Dizzy's graph. Cameras 3 and 5 (indices 2
/// and 4) are dead ends facing the left and right doors.
fn adjacent(camera: CameraId) -> &'static [CameraId] {
    const N0: [CameraId; 2] = [CameraId::new(1), CameraId::new(3)];
    const N1: [CameraId; 2] = [CameraId::new(0), CameraId::new(2)];
    const N2: [CameraId; 1] = [CameraId::new(1)];
    const N3: [CameraId; 2] = [CameraId::new(0), CameraId::new(4)];
    const N4: [CameraId; 1] = [CameraId::new(3)];
    match camera.get() {
        0 => &N0,
        1 => &N1,
        2 => &N2,
        3 => &N3,
        4 => &N4,
        _ => &[],
    }
}

/// Graph-wandering animatronic with a two-phase door attack.
///
/// Movement avoids immediately backtracking, except at the door cameras
/// whose only edge leads back the way he came.
#[derive(Clone, Debug)]
pub struct Dizzy {
    level: Level,
    position: CameraId,
    previous: Option<CameraId>,
    last_move: Duration,
    next_move_delay: Option<Duration>,
    attacking: bool,
    attack_start: Duration,
    finished: bool,
    rng: ChaCha8Rng,
}

impl Dizzy {
    /// Creates Dizzy at his home camera.
    #[must_use]
    pub fn new(level: Level, now: Duration, seed: u64) -> Self {
        let mut dizzy = Self {
            level,
            position: HOME,
            previous: None,
            last_move: now,
            next_move_delay: None,
            attacking: false,
            attack_start: Duration::ZERO,
            finished: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        dizzy.next_move_delay = dizzy.roll_delay();
        dizzy
    }

    /// Camera Dizzy currently occupies.
    #[must_use]
    pub const fn position(&self) -> CameraId {
        self.position
    }

    /// Whether an attack is in progress at a door camera.
    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Evaluates one tick of wandering or attacking.
    pub fn update(&mut self, now: Duration, doors: DoorState, out: &mut Vec<BehaviorEvent>) {
        if self.finished {
            return;
        }

        if self.attacking {
            self.update_attack(now, doors, out);
            return;
        }

        let Some(delay) = self.next_move_delay else {
            return;
        };
        if now.saturating_sub(self.last_move) < delay {
            return;
        }

        let options = adjacent(self.position);
        let at_door = self.position.door_side().is_some();
        let choices: Vec<CameraId> = if at_door {
            // A door camera's single edge points back where he came from;
            // the no-backtracking rule would strand him there.
            options.to_vec()
        } else {
            options
                .iter()
                .copied()
                .filter(|option| Some(*option) != self.previous)
                .collect()
        };
        if choices.is_empty() {
            return;
        }

        self.previous = Some(self.position);
        self.position = choices[self.rng.gen_range(0..choices.len())];
        self.last_move = now;
        self.next_move_delay = self.roll_delay();

        if self.position.door_side().is_some() {
            self.attacking = true;
            self.attack_start = now;
            out.push(BehaviorEvent::DizzyAttackStarted(self.position));
        } else {
            out.push(BehaviorEvent::DizzyMoved(self.position));
        }
    }

    fn update_attack(&mut self, now: Duration, doors: DoorState, out: &mut Vec<BehaviorEvent>) {
        let elapsed = now.saturating_sub(self.attack_start);
        if elapsed < PREP_TIME {
            return;
        }

        let door_open = match self.position.door_side() {
            Some(DoorSide::Left) => !doors.left_closed,
            Some(DoorSide::Right) => !doors.right_closed,
            None => false,
        };
        if door_open {
            self.finished = true;
            out.push(BehaviorEvent::Jumpscare(JumpscareCause::Dizzy));
            return;
        }

        if elapsed >= PREP_TIME + ATTACK_DURATION {
            self.attacking = false;
            self.position = HOME;
            self.previous = None;
            self.last_move = now;
            self.next_move_delay = self.roll_delay();
            out.push(BehaviorEvent::DizzyRetreated);
        }
    }

    fn roll_delay(&mut self) -> Option<Duration> {
        if self.level.is_inert() {
            return None;
        }

        let random_factor = self.rng.gen_range(0.7..1.3);
        let pace = self.level.pace_factor(1.4, 0.7);
        Some(clamp_delay(BASE_MOVE_DELAY_MS * random_factor * pace))
    }
}
