//! Keepalive timer and the clock it runs on.
//!
//! There are no background tasks: the timer is a plain value owned by the
//! session and is checked whenever the client is polled. Every outbound packet
//! other than PINGREQ pushes the deadline back, so an active connection never
//! pings.

/// A monotonic millisecond clock.
///
/// Implement this over whatever timer the platform has (a SysTick counter, an
/// RTC, `embassy_time::Instant`, ...). Values must never go backwards.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_millis(&mut self) -> u64;
}

/// A [`Clock`] backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_millis(&mut self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A cancellable, debounced periodic timer.
///
/// The timer is either disarmed or holds the instant at which it next fires.
/// An interval of zero keeps it permanently disarmed, matching a keep-alive
/// of zero seconds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    interval_ms: u64,
    deadline: Option<u64>,
}

impl KeepAlive {
    /// A disarmed timer firing every `interval_seconds` once armed.
    pub const fn new(interval_seconds: u16) -> Self {
        Self {
            interval_ms: interval_seconds as u64 * 1000,
            deadline: None,
        }
    }

    /// Start the timer, or restart it if it is already running.
    pub fn arm(&mut self, now: u64) {
        if self.interval_ms > 0 {
            self.deadline = Some(now + self.interval_ms);
        }
    }

    /// Push the deadline back a full interval. Does nothing while disarmed.
    pub fn reset(&mut self, now: u64) {
        if self.deadline.is_some() {
            self.arm(now);
        }
    }

    /// Stop the timer.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether the timer is running.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Milliseconds until the timer fires, if armed.
    pub fn remaining(&self, now: u64) -> Option<u64> {
        self.deadline.map(|d| d.saturating_sub(now))
    }

    /// Returns `true` once per elapsed interval, re-arming from `now`.
    pub fn poll(&mut self, now: u64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.interval_ms);
                true
            }
            _ => false,
        }
    }
}
