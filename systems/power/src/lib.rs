#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Throttled power-drain system for the office's shared reserve.
//!
//! The economy is pure over a [`Loads`] description of the player's active
//! defenses; the session owns the [`carnival_core::Power`] gauge and applies
//! whatever a tick reports. Draining happens at most once per window of
//! simulated time, and an idle window costs nothing while still resetting
//! the throttle, so briefly raising the cameras never back-bills the player.

use std::time::Duration;

/// Minimum simulated time between two consecutive drains.
pub const DRAIN_WINDOW: Duration = Duration::from_secs(1);

/// Charge consumed per window just for keeping the lights on.
pub const DRAIN_BASE: f32 = 0.1;

/// Additional charge per window while the camera feeds are up.
pub const DRAIN_CAMERAS: f32 = 0.2;

/// Additional charge per window for each door held shut.
pub const DRAIN_DOOR: f32 = 0.15;

/// Defensive actions currently drawing power.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Loads {
    /// Camera feeds are up.
    pub cameras: bool,
    /// Left door is held shut.
    pub left_door: bool,
    /// Right door is held shut.
    pub right_door: bool,
}

impl Loads {
    /// Creates a load description from the three defensive flags.
    #[must_use]
    pub const fn new(cameras: bool, left_door: bool, right_door: bool) -> Self {
        Self {
            cameras,
            left_door,
            right_door,
        }
    }

    /// Reports whether any defense is active at all.
    #[must_use]
    pub const fn any_active(&self) -> bool {
        self.cameras || self.left_door || self.right_door
    }
}

/// Result of a single economy tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrainOutcome {
    /// The drain window has not elapsed yet; nothing happened.
    Throttled,
    /// The window elapsed with no defense active; the window reset for free.
    Idle,
    /// The window elapsed and charge was consumed.
    Drained {
        /// Total charge consumed for the window.
        amount: f32,
    },
}

/// Per-night drain state. Built fresh at every night start.
#[derive(Clone, Copy, Debug)]
pub struct PowerEconomy {
    last_drain: Duration,
}

impl PowerEconomy {
    /// Creates an economy whose first window opens at `now`.
    #[must_use]
    pub const fn new(now: Duration) -> Self {
        Self { last_drain: now }
    }

    /// Evaluates one tick of the economy.
    ///
    /// Idempotent for repeated calls at the same instant: the first call in
    /// a window consumes it, every later call is throttled.
    pub fn tick(&mut self, now: Duration, loads: Loads) -> DrainOutcome {
        if now.saturating_sub(self.last_drain) < DRAIN_WINDOW {
            return DrainOutcome::Throttled;
        }

        self.last_drain = now;
        if !loads.any_active() {
            return DrainOutcome::Idle;
        }

        let mut amount = DRAIN_BASE;
        if loads.cameras {
            amount += DRAIN_CAMERAS;
        }
        if loads.left_door {
            amount += DRAIN_DOOR;
        }
        if loads.right_door {
            amount += DRAIN_DOOR;
        }

        DrainOutcome::Drained { amount }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Loads = Loads::new(false, false, false);
    const EVERYTHING: Loads = Loads::new(true, true, true);

    #[test]
    fn drains_at_most_once_per_window() {
        let mut economy = PowerEconomy::new(Duration::ZERO);
        let loads = Loads::new(true, false, false);

        assert_eq!(
            economy.tick(Duration::from_millis(999), loads),
            DrainOutcome::Throttled
        );
        assert!(matches!(
            economy.tick(Duration::from_millis(1_000), loads),
            DrainOutcome::Drained { .. }
        ));
        assert_eq!(
            economy.tick(Duration::from_millis(1_500), loads),
            DrainOutcome::Throttled
        );
    }

    #[test]
    fn repeated_ticks_at_the_same_instant_drain_once() {
        let mut economy = PowerEconomy::new(Duration::ZERO);
        let now = Duration::from_secs(2);

        assert!(matches!(
            economy.tick(now, EVERYTHING),
            DrainOutcome::Drained { .. }
        ));
        assert_eq!(economy.tick(now, EVERYTHING), DrainOutcome::Throttled);
    }

    #[test]
    fn idle_window_costs_nothing_but_resets_the_throttle() {
        let mut economy = PowerEconomy::new(Duration::ZERO);

        assert_eq!(economy.tick(Duration::from_secs(1), IDLE), DrainOutcome::Idle);

        // Closing a door right after the idle reset must wait out a full
        // window before billing.
        let loads = Loads::new(false, true, false);
        assert_eq!(
            economy.tick(Duration::from_millis(1_500), loads),
            DrainOutcome::Throttled
        );
        assert_eq!(
            economy.tick(Duration::from_secs(2), loads),
            DrainOutcome::Drained { amount: DRAIN_BASE + DRAIN_DOOR }
        );
    }

    #[test]
    fn drain_amount_is_additive_across_defenses() {
        let mut economy = PowerEconomy::new(Duration::ZERO);
        let outcome = economy.tick(Duration::from_secs(1), EVERYTHING);

        let DrainOutcome::Drained { amount } = outcome else {
            panic!("expected a drain, got {outcome:?}");
        };
        let expected = DRAIN_BASE + DRAIN_CAMERAS + 2.0 * DRAIN_DOOR;
        assert!((amount - expected).abs() < 1e-6);
    }
}
