#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::Duration;
use url::Url;
// self
use common::*;
use oauth1_broker::{
	auth::{ConsumerIdentity, CredentialPair},
	error::{Error, ProtocolError, TransportError},
	flows::Broker,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	query::{BatchError, CallSpec},
	service::ServiceDescriptor,
	store::TokenStateKind,
};

fn build_descriptor(server: &MockServer) -> ServiceDescriptor {
	ServiceDescriptor::from_base(
		&Url::parse(&server.url("/api/")).expect("Mock base URL should parse successfully."),
	)
	.expect("Service descriptor should build successfully.")
}

fn authorized_broker(server: &MockServer) -> ReqwestTestBroker {
	let broker = build_reqwest_test_broker(build_descriptor(server), "K", "S");

	broker.restore_access_token(
		CredentialPair::new("AT", "AS").expect("Access pair fixture should build."),
	);

	broker
}

fn call(name: &str) -> CallSpec {
	CallSpec::new(name).expect("Call name should be valid.")
}

#[tokio::test]
async fn batch_preserves_order_filters_and_extra_result_keys() {
	let server = MockServer::start_async().await;
	let broker = authorized_broker(&server);
	let body = "request=%5B%7B%22call%22%3A%22urc.getClans%22%2C%22params%22%3A%7B%22limit%22%3A2%7D%2C%22itemsFilter%22%3A%5B%22name%22%5D%7D%2C%7B%22call%22%3A%22urc.leave%22%2C%22params%22%3A%7B%7D%7D%5D";
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/query.php").body(body);
			then.status(200).header("content-type", "application/json").body(
				"{\"urc.getClans\":{\"context\":{\"total\":2},\"items\":{\"1\":{\"name\":\"A\"},\"2\":{\"name\":\"B\"}}},\"urc.leave\":{\"context\":{\"ok\":true}},\"server.notice\":{\"context\":{}}}",
			);
		})
		.await;
	let results = broker
		.execute([call("urc.getClans").param("limit", 2).items_filter(["name"]), call("urc.leave")])
		.await
		.expect("Batch query should succeed.");

	mock.assert_async().await;

	assert_eq!(results.len(), 3);
	assert_eq!(
		results["urc.getClans"].items.as_ref().map(|items| items.len()),
		Some(2)
	);
	assert_eq!(results["urc.leave"].items, None);
	assert!(results.contains_key("server.notice"));
}

#[tokio::test]
async fn invalid_batches_and_missing_tokens_never_reach_the_server() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/query.php");
			then.status(200).body("{}");
		})
		.await;
	let anonymous = build_reqwest_test_broker(build_descriptor(&server), "K", "S");

	assert!(matches!(
		anonymous.execute([call("urc.getClans")]).await,
		Err(Error::NotAuthenticated { state: TokenStateKind::Unauthenticated })
	));

	let broker = authorized_broker(&server);

	assert!(matches!(
		broker.execute(Vec::<CallSpec>::new()).await,
		Err(Error::Batch(BatchError::Empty))
	));
	assert!(matches!(
		broker.execute([call("urc.getClans"), call("urc.getClans")]).await,
		Err(Error::Batch(BatchError::DuplicateCall { ref call })) if call == "urc.getClans"
	));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn server_errors_and_malformed_bodies_are_typed() {
	let server = MockServer::start_async().await;
	let broker = authorized_broker(&server);
	let unavailable = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/query.php");
			then.status(503).header("retry-after", "12").body("{\"urc.getClans\":{}}");
		})
		.await;

	match broker.execute([call("urc.getClans")]).await {
		Err(Error::Transport(TransportError::Status { status, retry_after })) => {
			assert_eq!(status, 503);
			assert_eq!(retry_after, Some(Duration::seconds(12)));
		},
		other => panic!("Unexpected query outcome: {other:?}."),
	}

	unavailable.assert_async().await;
	unavailable.delete_async().await;

	let _garbage = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/query.php");
			then.status(200).body("{\"urc.getClans\":{\"items\":[1,2]}}");
		})
		.await;

	match broker.execute([call("urc.getClans")]).await {
		Err(Error::Protocol(ProtocolError::InvalidResult { path, .. })) => {
			assert_eq!(path, "urc.getClans.items");
		},
		other => panic!("Unexpected query outcome: {other:?}."),
	}
}

#[tokio::test]
async fn proxy_call_reports_missing_result() {
	let server = MockServer::start_async().await;
	let broker = authorized_broker(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/query.php");
			then.status(200).body("{\"urc.somethingElse\":{\"context\":{}}}");
		})
		.await;
	let err = broker
		.group("urc")
		.expect("Group should be valid.")
		.method("getClans")
		.expect("Method should be valid.")
		.context_filter(["total"])
		.send()
		.await
		.expect_err("Absent result should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::MissingResult { ref call } if call == "urc.getClans"));
}

struct CannedTransport;
impl HttpTransport for CannedTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			assert!(request.header("authorization").is_some_and(|value| value.starts_with("OAuth ")));

			Ok(HttpResponse::new(200, "{\"urc.ping\":{\"context\":{\"pong\":true}}}"))
		})
	}
}

#[tokio::test]
async fn custom_transport_plugs_in_behind_a_trait_object() {
	let descriptor = ServiceDescriptor::from_base(
		&Url::parse("https://api.example.com/").expect("Base URL should parse successfully."),
	)
	.expect("Service descriptor should build successfully.");
	let transport: Arc<dyn HttpTransport> = Arc::new(CannedTransport);
	let broker: Broker<dyn HttpTransport> =
		Broker::with_http_client(descriptor, ConsumerIdentity::new("K", "S"), transport);

	broker.restore_access_token(
		CredentialPair::new("AT", "AS").expect("Access pair fixture should build."),
	);

	let result = broker
		.call("urc", "ping", Default::default())
		.await
		.expect("Canned transport should answer.");

	assert_eq!(result.context.get("pong"), Some(&serde_json::Value::Bool(true)));
}
