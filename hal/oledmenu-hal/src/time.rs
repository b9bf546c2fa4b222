//! Time source for the poll loop
//!
//! The loop only ever compares instants and sleeps between polls, so a
//! clock is a monotonic offset from an arbitrary origin plus a blocking
//! sleep. Tests substitute a manual clock that advances on `sleep`.

use core::time::Duration;

/// Monotonic clock with a blocking sleep
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Block the caller for `duration`
    fn sleep(&mut self, duration: Duration);
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}
