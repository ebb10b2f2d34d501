//! Shared helpers for the reqwest-backed integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// self
use oauth1_broker::{
	auth::ConsumerIdentity,
	flows::Broker,
	http::ReqwestHttpClient,
	service::ServiceDescriptor,
	sign::{FixedClock, FixedNonce},
};

/// Broker type alias used by reqwest-backed integration tests.
pub type ReqwestTestBroker = Broker<ReqwestHttpClient>;

/// Nonce pinned by [`build_reqwest_test_broker`].
pub const TEST_NONCE: &str = "test-nonce-0123456789abcdef";
/// Timestamp pinned by [`build_reqwest_test_broker`].
pub const TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Constructs a [`Broker`] with a pinned nonce + clock over the default reqwest transport.
pub fn build_reqwest_test_broker(
	descriptor: ServiceDescriptor,
	consumer_key: &str,
	consumer_secret: &str,
) -> ReqwestTestBroker {
	let consumer = ConsumerIdentity::new(consumer_key, consumer_secret);

	Broker::with_http_client(descriptor, consumer, ReqwestHttpClient::default())
		.with_nonce_source(Arc::new(FixedNonce::new(TEST_NONCE)))
		.with_clock(Arc::new(FixedClock::from_unix(TEST_TIMESTAMP)))
}
