//! Balloona inflates in the office until someone lets the air out.

use std::time::Duration;

use carnival_core::Level;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::BehaviorEvent;

const HEAD_CAPACITY: u8 = 100;
const GROWTH_STEP: u8 = 10;
const ABOUT_TO_POP: u8 = 90;
const BASE_INFLATE_MIN_MS: f32 = 10_000.0;
const BASE_INFLATE_MAX_MS: f32 = 20_000.0;

/// Slowly-inflating head that pops once when it reaches capacity.
///
/// Balloona never attacks; her only output is the pop, which the session
/// turns into a sound cue. Deflating is free, instant and eventless.
#[derive(Clone, Debug)]
pub struct Balloona {
    level: Level,
    base_inflate_ms: f32,
    inflate_interval: Option<Duration>,
    last_inflate: Duration,
    head_size: u8,
    rng: ChaCha8Rng,
}

impl Balloona {
    /// Creates Balloona fully deflated.
    #[must_use]
    pub fn new(level: Level, now: Duration, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let base_inflate_ms = rng.gen_range(BASE_INFLATE_MIN_MS..BASE_INFLATE_MAX_MS);
        Self {
            level,
            base_inflate_ms,
            inflate_interval: level.interval_between(base_inflate_ms * 1.5, base_inflate_ms * 0.7),
            last_inflate: now,
            head_size: 0,
            rng,
        }
    }

    /// Current head size in the 0-100 range.
    #[must_use]
    pub const fn head_size(&self) -> u8 {
        self.head_size
    }

    /// Evaluates one tick of growth.
    pub fn update(&mut self, now: Duration, out: &mut Vec<BehaviorEvent>) {
        let Some(interval) = self.inflate_interval else {
            return;
        };
        if now.saturating_sub(self.last_inflate) < interval {
            return;
        }

        let was_full = self.head_size >= HEAD_CAPACITY;
        let about_to_pop = self.head_size >= ABOUT_TO_POP;
        self.head_size = self.head_size.saturating_add(GROWTH_STEP).min(HEAD_CAPACITY);
        self.last_inflate = now;
        self.reroll_interval();

        if was_full {
            // Saturated: the timer keeps cycling but nothing audible happens.
            return;
        }
        if about_to_pop && self.head_size == HEAD_CAPACITY {
            out.push(BehaviorEvent::HeadPopped);
        } else {
            out.push(BehaviorEvent::HeadInflated {
                head_size: self.head_size,
            });
        }
    }

    /// Lets the air out. Works from any size, silently, with no cooldown.
    pub fn deflate(&mut self, now: Duration) {
        self.head_size = 0;
        self.last_inflate = now;
    }

    fn reroll_interval(&mut self) {
        let slow = self.base_inflate_ms * self.rng.gen_range(0.8..1.2);
        let fast = self.base_inflate_ms * self.rng.gen_range(0.6..0.9);
        self.inflate_interval = self.level.interval_between(slow, fast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_once(balloona: &mut Balloona, now: &mut Duration) -> Vec<BehaviorEvent> {
        let interval = balloona.inflate_interval.expect("active balloona");
        *now += interval + Duration::from_millis(1);
        let mut events = Vec::new();
        balloona.update(*now, &mut events);
        events
    }

    #[test]
    fn ten_growth_steps_fill_the_head_and_pop_once() {
        let mut balloona = Balloona::new(Level::new(8), Duration::ZERO, 21);
        let mut now = Duration::ZERO;
        let mut pops = 0;

        for step in 1..=10u8 {
            let events = step_once(&mut balloona, &mut now);
            assert_eq!(balloona.head_size(), step * 10);
            match events.as_slice() {
                [BehaviorEvent::HeadPopped] => pops += 1,
                [BehaviorEvent::HeadInflated { head_size }] => {
                    assert_eq!(*head_size, step * 10);
                }
                other => panic!("unexpected events: {other:?}"),
            }
        }

        assert_eq!(pops, 1);
        assert_eq!(balloona.head_size(), 100);

        // Saturated intervals stay silent.
        let events = step_once(&mut balloona, &mut now);
        assert!(events.is_empty());
        assert_eq!(balloona.head_size(), 100);
    }

    #[test]
    fn deflate_resets_from_any_size_without_events() {
        let mut balloona = Balloona::new(Level::new(12), Duration::ZERO, 5);
        let mut now = Duration::ZERO;
        for _ in 0..4 {
            let _ = step_once(&mut balloona, &mut now);
        }
        assert_eq!(balloona.head_size(), 40);

        balloona.deflate(now);
        assert_eq!(balloona.head_size(), 0);

        // The deflation also restarts the growth window.
        let mut events = Vec::new();
        balloona.update(now + Duration::from_millis(1), &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn updates_within_the_interval_do_nothing() {
        let mut balloona = Balloona::new(Level::new(8), Duration::ZERO, 9);
        let mut events = Vec::new();

        balloona.update(Duration::from_millis(10), &mut events);
        balloona.update(Duration::from_millis(10), &mut events);
        assert!(events.is_empty());
        assert_eq!(balloona.head_size(), 0);
    }

    #[test]
    fn level_zero_never_inflates() {
        let mut balloona = Balloona::new(Level::new(0), Duration::ZERO, 2);
        let mut events = Vec::new();
        balloona.update(Duration::from_secs(3_600), &mut events);
        assert!(events.is_empty());
        assert_eq!(balloona.head_size(), 0);
    }
}
