//! Crowman blinds camera feeds instead of approaching the office.

use std::time::Duration;

use carnival_core::{CameraId, Level, CAMERA_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::BehaviorEvent;

/// Cooldown between two dual blocks, independent of the block interval.
pub const DUAL_BLOCK_COOLDOWN: Duration = Duration::from_secs(180);

const BLOCK_INTERVAL_SLOW_MS: f32 = 180_000.0;
const BLOCK_INTERVAL_FAST_MS: f32 = 45_000.0;
const BLOCK_DURATION_SHORT_MS: f32 = 30_000.0;
const BLOCK_DURATION_LONG_MS: f32 = 60_000.0;
const DUAL_CHANCE_CEILING: f32 = 0.5;

/// Feed-blocking animatronic.
///
/// Picks one camera (or, rarely, two distinct cameras) to black out for a
/// level-scaled duration, then rests for a level-scaled interval. Higher
/// levels block more often *and* for longer.
#[derive(Clone, Debug)]
pub struct Crowman {
    block_interval: Option<Duration>,
    block_duration: Option<Duration>,
    dual_block_chance: f64,
    blocked: Vec<CameraId>,
    last_block: Duration,
    last_dual: Option<Duration>,
    rng: ChaCha8Rng,
}

impl Crowman {
    /// Creates Crowman with every feed clear.
    #[must_use]
    pub fn new(level: Level, seed: u64) -> Self {
        Self {
            block_interval: level.interval_between(BLOCK_INTERVAL_SLOW_MS, BLOCK_INTERVAL_FAST_MS),
            block_duration: level.interval_between(BLOCK_DURATION_SHORT_MS, BLOCK_DURATION_LONG_MS),
            dual_block_chance: level.chance(DUAL_CHANCE_CEILING),
            blocked: Vec::new(),
            last_block: Duration::ZERO,
            last_dual: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Feeds currently blacked out.
    #[must_use]
    pub fn blocked(&self) -> &[CameraId] {
        &self.blocked
    }

    /// Reports whether a specific feed is blacked out.
    #[must_use]
    pub fn is_blocked(&self, camera: CameraId) -> bool {
        self.blocked.contains(&camera)
    }

    /// Clears the block on one feed, reporting whether one was present.
    pub fn unblock(&mut self, camera: CameraId) -> bool {
        let before = self.blocked.len();
        self.blocked.retain(|blocked| *blocked != camera);
        self.blocked.len() != before
    }

    /// Evaluates one tick of blocking.
    pub fn update(&mut self, now: Duration, out: &mut Vec<BehaviorEvent>) {
        let (Some(interval), Some(duration)) = (self.block_interval, self.block_duration) else {
            return;
        };

        if !self.blocked.is_empty() && now.saturating_sub(self.last_block) > duration {
            self.blocked.clear();
            out.push(BehaviorEvent::CamerasCleared);
        }

        if self.blocked.is_empty() && now.saturating_sub(self.last_block) > interval {
            let dual_ready = self
                .last_dual
                .map_or(true, |at| now.saturating_sub(at) > DUAL_BLOCK_COOLDOWN);
            if dual_ready && self.rng.gen::<f64>() < self.dual_block_chance {
                let first = self.pick_camera();
                let mut second = self.pick_camera();
                while second == first {
                    second = self.pick_camera();
                }
                self.blocked = vec![first, second];
                self.last_dual = Some(now);
            } else {
                self.blocked = vec![self.pick_camera()];
            }
            self.last_block = now;
            out.push(BehaviorEvent::CamerasBlocked(self.blocked.clone()));
        }
    }

    fn pick_camera(&mut self) -> CameraId {
        CameraId::new(self.rng.gen_range(0..CAMERA_COUNT))
    }

    #[cfg(test)]
    fn set_dual_block_chance(&mut self, chance: f64) {
        self.dual_block_chance = chance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_crowman(seed: u64) -> Crowman {
        Crowman::new(Level::new(10), seed)
    }

    #[test]
    fn zero_dual_chance_never_blocks_two_feeds() {
        let mut crowman = active_crowman(17);
        crowman.set_dual_block_chance(0.0);
        let mut events = Vec::new();

        let mut now = Duration::ZERO;
        for _ in 0..50 {
            now += Duration::from_secs(200);
            crowman.update(now, &mut events);
            assert!(crowman.blocked().len() <= 1);
        }
    }

    #[test]
    fn blocks_clear_after_exactly_the_block_duration() {
        let mut crowman = active_crowman(4);
        let mut events = Vec::new();

        let interval = crowman.block_interval.expect("active");
        let duration = crowman.block_duration.expect("active");

        let set_at = interval + Duration::from_millis(1);
        crowman.update(set_at, &mut events);
        assert!(!crowman.blocked().is_empty());

        // Still blocked through the whole duration...
        crowman.update(set_at + duration, &mut events);
        assert!(!crowman.blocked().is_empty());

        // ...and clear the tick after it elapses.
        crowman.update(set_at + duration + Duration::from_millis(1), &mut events);
        assert!(crowman.blocked().is_empty());
        assert!(events.contains(&BehaviorEvent::CamerasCleared));
    }

    #[test]
    fn dual_blocks_pick_distinct_cameras_and_respect_the_cooldown() {
        let mut crowman = active_crowman(8);
        crowman.set_dual_block_chance(1.0);
        let mut events = Vec::new();

        let interval = crowman.block_interval.expect("active");
        let first_set = interval + Duration::from_millis(1);
        crowman.update(first_set, &mut events);

        match events.as_slice() {
            [BehaviorEvent::CamerasBlocked(cameras)] => {
                assert_eq!(cameras.len(), 2);
                assert_ne!(cameras[0], cameras[1]);
            }
            other => panic!("expected a dual block, got {other:?}"),
        }

        // Wait out the block, then re-block inside the dual cooldown: the
        // fallback single block must be chosen even at certain dual chance.
        let duration = crowman.block_duration.expect("active");
        let cleared_at = first_set + duration + Duration::from_millis(1);
        events.clear();
        crowman.update(cleared_at, &mut events);

        events.clear();
        crowman.update(cleared_at + interval + Duration::from_millis(1), &mut events);
        match events.as_slice() {
            [BehaviorEvent::CamerasBlocked(cameras)] => assert_eq!(cameras.len(), 1),
            other => panic!("expected a single block, got {other:?}"),
        }
    }

    #[test]
    fn unblock_clears_only_the_targeted_feed() {
        let mut crowman = active_crowman(2);
        crowman.blocked = vec![CameraId::new(1), CameraId::new(3)];

        assert!(crowman.unblock(CameraId::new(1)));
        assert!(!crowman.unblock(CameraId::new(1)));
        assert_eq!(crowman.blocked(), &[CameraId::new(3)]);
    }

    #[test]
    fn level_zero_never_blocks() {
        let mut crowman = Crowman::new(Level::new(0), 1);
        let mut events = Vec::new();
        crowman.update(Duration::from_secs(10_000), &mut events);
        assert!(events.is_empty());
        assert!(crowman.blocked().is_empty());
    }
}
