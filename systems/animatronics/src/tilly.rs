//! Tilly walks a fixed three-stop path toward the right door.

use std::time::Duration;

use carnival_core::{clamp_delay, CameraId, JumpscareCause, Level};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{BehaviorEvent, DoorState};

/// Cameras Tilly haunts, in path order. The last stop faces the right door.
pub const TILLY_PATH: [CameraId; 3] = [CameraId::new(0), CameraId::new(3), CameraId::new(4)];

const MOVE_CHANCE_CEILING: f32 = 0.7;
const BASE_DELAY_MIN_MS: f32 = 10_000.0;
const BASE_DELAY_MAX_MS: f32 = 30_000.0;

/// Path-walking animatronic that defeats a shut door exactly once per night.
#[derive(Clone, Debug)]
pub struct Tilly {
    level: Level,
    position: CameraId,
    move_chance: f64,
    last_move: Duration,
    next_move_delay: Duration,
    last_evaluation: Option<Duration>,
    resolved: bool,
    rng: ChaCha8Rng,
}

impl Tilly {
    /// Creates Tilly at the start of her path.
    #[must_use]
    pub fn new(level: Level, now: Duration, seed: u64) -> Self {
        let mut tilly = Self {
            level,
            position: TILLY_PATH[0],
            move_chance: level.chance(MOVE_CHANCE_CEILING),
            last_move: now,
            next_move_delay: Duration::MAX,
            last_evaluation: None,
            resolved: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        tilly.reroll_delay();
        tilly
    }

    /// Camera Tilly currently haunts.
    #[must_use]
    pub const fn position(&self) -> CameraId {
        self.position
    }

    /// Evaluates one tick. At most one path advance or door resolution can
    /// happen per distinct instant.
    pub fn update(&mut self, now: Duration, doors: DoorState, out: &mut Vec<BehaviorEvent>) {
        if self.resolved {
            return;
        }
        if now.saturating_sub(self.last_move) < self.next_move_delay {
            return;
        }
        if self.last_evaluation == Some(now) {
            return;
        }
        self.last_evaluation = Some(now);

        // The base chance carries an extra ±20% jitter on top of the
        // already-randomized delay. Kept as shipped; candidates for
        // simplification should re-tune the level curve first.
        let jitter = self.rng.gen_range(0.8..1.2_f64);
        if self.rng.gen::<f64>() >= self.move_chance * jitter {
            return;
        }

        let index = TILLY_PATH
            .iter()
            .position(|stop| *stop == self.position)
            .unwrap_or(0);
        if index + 1 < TILLY_PATH.len() {
            self.position = TILLY_PATH[index + 1];
            self.last_move = now;
            self.reroll_delay();
            out.push(BehaviorEvent::TillyMoved(self.position));
        } else if doors.right_closed {
            self.resolved = true;
            out.push(BehaviorEvent::DoorSmashed);
        } else {
            self.resolved = true;
            out.push(BehaviorEvent::Jumpscare(JumpscareCause::Tilly));
        }
    }

    /// Redirects Tilly to `camera` if it neighbours her current stop.
    ///
    /// Returns whether the lure took. Path adjacency only; the screech
    /// cooldown and power cost are the caller's business.
    pub fn lure_to(&mut self, camera: CameraId) -> bool {
        let adjacent: &[CameraId] = match self.position.get() {
            0 => &[CameraId::new(3)],
            3 => &[CameraId::new(0), CameraId::new(4)],
            4 => &[CameraId::new(3)],
            _ => &[],
        };
        if adjacent.contains(&camera) {
            self.position = camera;
            true
        } else {
            false
        }
    }

    fn reroll_delay(&mut self) {
        let base = self.rng.gen_range(BASE_DELAY_MIN_MS..=BASE_DELAY_MAX_MS);
        let factor = self.level.pace_factor(1.5, 0.7);
        self.next_move_delay = clamp_delay(base * factor);
    }

    #[cfg(test)]
    fn set_move_chance(&mut self, chance: f64) {
        self.move_chance = chance;
    }
}
