//! Production Environment implementation using the system clock and OS RNG.
//!
//! Order timestamps come from the wall clock in UTC and order ids from
//! getrandom, so production behavior is not reproducible. Tests use their own
//! [`Environment`] with a pinned clock and seeded bytes instead.

use chrono::{DateTime, Utc};
use flowgate_core::Environment;

/// Production environment using system time and cryptographic RNG.
///
/// # Panics
///
/// Panics if the OS RNG fails. A gateway without working entropy cannot mint
/// unguessable order ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).expect("invariant: OS RNG failure is unrecoverable");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_env_clock_is_recent() {
        let now = SystemEnv::new().now();

        assert!(now.timestamp() > 1_700_000_000, "clock should be past 2023");
    }
}
