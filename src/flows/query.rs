//! Signed batch query execution.
//!
//! Every batch is a single signed `POST` to the query endpoint whose only form field is
//! `request`, carrying the JSON array of calls. The access pair is cloned out of the token store
//! under a short read lock, so concurrent queries never contend with each other or wait on a
//! handshake in progress.

// self
use crate::{
	_prelude::*,
	error::TransportError,
	flows::Broker,
	http::{HttpMethod, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	query::{self as batch, BatchEnvelope, CallSpec, QueryResult, QueryResults},
};

const REQUEST_FIELD: &str = "request";

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Executes `calls` as one batch and returns the per-call results.
	///
	/// The batch is validated (non-empty, distinct names) and the access token is required
	/// before anything is sent.
	pub async fn execute<I>(&self, calls: I) -> Result<QueryResults>
	where
		I: IntoIterator<Item = CallSpec>,
	{
		let envelope = BatchEnvelope::new(calls)?;

		self.execute_envelope(&envelope).await
	}

	/// Executes a pre-validated batch.
	pub async fn execute_envelope(&self, envelope: &BatchEnvelope) -> Result<QueryResults> {
		const KIND: FlowKind = FlowKind::Query;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let access = self.tokens.read().require_access_token()?.clone();
				let params = vec![(REQUEST_FIELD.to_owned(), envelope.encode()?)];
				let request = self.signed_request(
					HttpMethod::Post,
					&self.descriptor.endpoints.query,
					&params,
					Some(&access),
					&[],
				)?;
				let response = self.http_client.send(request).await?;

				if !response.is_success() {
					return Err(TransportError::Status {
						status: response.status,
						retry_after: response.retry_after,
					}
					.into());
				}

				Ok(batch::decode_response(&response.body)?)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Executes a one-call batch and returns that call's result.
	///
	/// Fails with [`Error::MissingResult`] when the response has no entry for the call.
	pub async fn single(&self, call: CallSpec) -> Result<QueryResult> {
		let name = call.name.clone();
		let mut results = self.execute([call]).await?;

		results.remove(&name).ok_or(Error::MissingResult { call: name })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		error::ProtocolError,
		flows::test_support::*,
		http::HttpResponse,
		query::BatchError,
		store::TokenStateKind,
	};

	fn call(name: &str) -> CallSpec {
		CallSpec::new(name).expect("Call fixture should be valid.")
	}

	fn authorized(
		responses: Vec<Result<HttpResponse, TransportError>>,
	) -> (Broker<RecordingTransport>, Arc<RecordingTransport>) {
		let (broker, transport) = broker(RecordingTransport::replying(responses));

		broker.restore_access_token(pair_of("AT", "AS"));

		(broker, transport)
	}

	#[tokio::test]
	async fn execute_posts_signed_request_field_and_decodes_results() {
		let body = json!({ "urc.getClans": { "context": { "ok": true }, "items": { "1": "Clan A" } } });
		let (broker, transport) = authorized(vec![Ok(HttpResponse::new(200, body.to_string()))]);
		let results = broker
			.execute([call("urc.getClans").param("limit", 5)])
			.await
			.expect("Batch should succeed.");

		assert_eq!(results["urc.getClans"].context.get("ok"), Some(&json!(true)));

		let sent = transport.sent();

		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].url.as_str(), "https://api.example.com/oauth/query.php");

		let form = url::form_urlencoded::parse(&sent[0].body).into_owned().collect::<Vec<_>>();

		assert_eq!(
			form,
			vec![(
				"request".to_owned(),
				"[{\"call\":\"urc.getClans\",\"params\":{\"limit\":5}}]".to_owned()
			)]
		);
		assert!(
			sent[0]
				.header("authorization")
				.is_some_and(|value| value.contains("oauth_token=\"AT\""))
		);
	}

	#[tokio::test]
	async fn preconditions_fail_before_any_request() {
		let (broker, transport) = broker(RecordingTransport::default());

		assert!(matches!(
			broker.execute([call("urc.getClans")]).await,
			Err(Error::NotAuthenticated { state: TokenStateKind::Unauthenticated })
		));

		broker.restore_access_token(pair_of("AT", "AS"));

		assert!(matches!(
			broker.execute(Vec::<CallSpec>::new()).await,
			Err(Error::Batch(BatchError::Empty))
		));
		assert!(matches!(
			broker.execute([call("a.b"), call("a.b")]).await,
			Err(Error::Batch(BatchError::DuplicateCall { .. }))
		));
		assert!(transport.sent().is_empty());
	}

	#[tokio::test]
	async fn non_success_status_is_a_transport_error() {
		let (broker, _) = authorized(vec![Ok(HttpResponse {
			status: 503,
			retry_after: Some(Duration::seconds(30)),
			body: b"{\"urc.getClans\":{}}".to_vec(),
		})]);
		let err = broker.execute([call("urc.getClans")]).await.expect_err("503 should fail.");

		match err {
			Error::Transport(TransportError::Status { status, retry_after }) => {
				assert_eq!(status, 503);
				assert_eq!(retry_after, Some(Duration::seconds(30)));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[tokio::test]
	async fn malformed_body_is_a_protocol_error() {
		let (broker, _) = authorized(vec![Ok(HttpResponse::new(200, "not json"))]);

		assert!(matches!(
			broker.execute([call("urc.getClans")]).await,
			Err(Error::Protocol(ProtocolError::InvalidJson { .. }))
		));
	}

	#[tokio::test]
	async fn results_do_not_depend_on_call_order() {
		let body = json!({
			"a.b": { "context": { "n": 1 } },
			"c.d": { "context": { "n": 2 }, "items": { "1": "x" } },
		})
		.to_string();
		let (broker, transport) = authorized(vec![
			Ok(HttpResponse::new(200, body.clone())),
			Ok(HttpResponse::new(200, body)),
		]);
		let forward =
			broker.execute([call("a.b"), call("c.d")]).await.expect("Forward batch should succeed.");
		let reversed =
			broker.execute([call("c.d"), call("a.b")]).await.expect("Reversed batch should succeed.");

		assert_eq!(forward, reversed);
		assert_eq!(forward.keys().map(String::as_str).collect::<Vec<_>>(), ["a.b", "c.d"]);

		let sent = transport.sent();

		assert_ne!(sent[0].body, sent[1].body);
	}

	#[tokio::test]
	async fn single_reports_missing_results() {
		let (broker, _) = authorized(vec![
			Ok(HttpResponse::new(200, "{\"urc.leave\":{\"context\":{\"ok\":true}}}")),
			Ok(HttpResponse::new(200, "{\"other.call\":{\"context\":{}}}")),
		]);
		let result = broker.single(call("urc.leave")).await.expect("Result should be present.");

		assert_eq!(result.items, None);
		assert!(matches!(
			broker.single(call("urc.getClans")).await,
			Err(Error::MissingResult { call }) if call == "urc.getClans"
		));
	}
}
