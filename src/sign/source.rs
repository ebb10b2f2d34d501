//! Injectable nonce and timestamp sources.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const NONCE_LEN: usize = 32;

/// Produces the `oauth_nonce` value for each signature.
pub trait NonceSource
where
	Self: Send + Sync,
{
	/// Returns a fresh nonce.
	fn nonce(&self) -> String;
}

/// Produces the `oauth_timestamp` instant for each signature.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current UTC instant.
	fn now(&self) -> OffsetDateTime;
}

/// Thread-RNG nonce of 32 alphanumeric characters (~190 bits).
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomNonce;
impl NonceSource for RandomNonce {
	fn nonce(&self) -> String {
		rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
	}
}

/// Wall clock read at call time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Constant nonce for reproducible signatures.
#[derive(Clone, Debug)]
pub struct FixedNonce(String);
impl FixedNonce {
	/// Pins every nonce to `value`.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}
}
impl NonceSource for FixedNonce {
	fn nonce(&self) -> String {
		self.0.clone()
	}
}

/// Constant clock for reproducible signatures.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(OffsetDateTime);
impl FixedClock {
	/// Pins the clock to `instant`.
	pub fn new(instant: OffsetDateTime) -> Self {
		Self(instant)
	}

	/// Pins the clock to `secs` seconds after the Unix epoch; out-of-range values clamp to the
	/// epoch.
	pub fn from_unix(secs: i64) -> Self {
		Self(OffsetDateTime::from_unix_timestamp(secs).unwrap_or(OffsetDateTime::UNIX_EPOCH))
	}
}
impl Clock for FixedClock {
	fn now(&self) -> OffsetDateTime {
		self.0
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn random_nonces_are_long_and_distinct() {
		let first = RandomNonce.nonce();
		let second = RandomNonce.nonce();

		assert_eq!(first.len(), NONCE_LEN);
		assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(first, second);
	}

	#[test]
	fn fixed_sources_are_stable() {
		let nonce = FixedNonce::new("abc");
		let clock = FixedClock::from_unix(1_318_622_958);

		assert_eq!(nonce.nonce(), nonce.nonce());
		assert_eq!(clock.now().unix_timestamp(), 1_318_622_958);
	}
}
