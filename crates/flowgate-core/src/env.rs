//! Environment abstraction for deterministic testing.
//!
//! Data providers stamp orders with the current time and generate order ids
//! from random bytes. Both come from an [`Environment`] so tests can pin the
//! clock and seed the RNG, while production uses the system clock and OS
//! entropy.

use chrono::{DateTime, Utc};

/// Abstract environment providing wall-clock time and randomness.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `now()` returns UTC
/// - `random_bytes()` uses cryptographically secure entropy in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u32`.
    fn random_u32(&self) -> u32 {
        let mut bytes = [0u8; 4];
        self.random_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }
}

/// Order id of the form `BTQ-1A2B3C4D`.
pub fn new_order_id<E: Environment>(env: &E) -> String {
    format!("BTQ-{:08X}", env.random_u32())
}
