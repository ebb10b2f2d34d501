//! Namespaced call helpers that turn `group` + `method` into single-call batches.
//!
//! ```no_run
//! # async fn run(broker: oauth1_broker::flows::ReqwestBroker) -> oauth1_broker::error::Result<()> {
//! let clans = broker.group("urc")?.method("getClans")?.param("limit", 10).send().await?;
//! # let _ = clans;
//! # Ok(())
//! # }
//! ```

// self
use crate::{
	_prelude::*,
	flows::Broker,
	http::HttpTransport,
	query::{self as batch, BatchError, CallSpec, QueryResult},
};

/// Calls sharing one namespace prefix.
pub struct CallGroup<'a, C>
where
	C: ?Sized + HttpTransport,
{
	broker: &'a Broker<C>,
	name: String,
}
impl<'a, C> CallGroup<'a, C>
where
	C: ?Sized + HttpTransport,
{
	/// Group prefix.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Binds `method` into a call named `group.method`.
	pub fn method(&self, method: &str) -> Result<BoundCall<'a, C>, BatchError> {
		validate_segment(method)?;

		let spec = CallSpec::new(format!("{}.{method}", self.name))?;

		Ok(BoundCall { broker: self.broker, spec })
	}

	/// Sends `group.method` with `params` as a single-call batch.
	pub async fn call(&self, method: &str, params: JsonMap<String, JsonValue>) -> Result<QueryResult> {
		self.method(method)?.with_params(params).send().await
	}
}
impl<C> Debug for CallGroup<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallGroup").field("name", &self.name).finish()
	}
}

/// A named call waiting for parameters and filters before it is sent.
pub struct BoundCall<'a, C>
where
	C: ?Sized + HttpTransport,
{
	broker: &'a Broker<C>,
	spec: CallSpec,
}
impl<C> BoundCall<'_, C>
where
	C: ?Sized + HttpTransport,
{
	/// Call specification built so far.
	pub fn spec(&self) -> &CallSpec {
		&self.spec
	}

	/// Adds or replaces a single parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.spec = self.spec.param(key, value);

		self
	}

	/// Replaces every parameter.
	pub fn with_params(mut self, params: JsonMap<String, JsonValue>) -> Self {
		self.spec = self.spec.with_params(params);

		self
	}

	/// Restricts the returned context fields.
	pub fn context_filter<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.spec = self.spec.context_filter(fields);

		self
	}

	/// Restricts the returned item fields.
	pub fn items_filter<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.spec = self.spec.items_filter(fields);

		self
	}

	/// Returns the call specification without sending it, e.g. to join a larger batch.
	pub fn into_spec(self) -> CallSpec {
		self.spec
	}

	/// Sends the call as a single-call batch.
	pub async fn send(self) -> Result<QueryResult> {
		self.broker.single(self.spec).await
	}
}
impl<C> Debug for BoundCall<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BoundCall").field("spec", &self.spec).finish()
	}
}

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Opens the call namespace `name`.
	pub fn group(&self, name: &str) -> Result<CallGroup<'_, C>, BatchError> {
		validate_segment(name)?;

		Ok(CallGroup { broker: self, name: name.to_owned() })
	}

	/// Sends `group.method` with `params` as a single-call batch.
	pub async fn call(
		&self,
		group: &str,
		method: &str,
		params: JsonMap<String, JsonValue>,
	) -> Result<QueryResult> {
		self.group(group)?.call(method, params).await
	}
}

fn validate_segment(segment: &str) -> Result<(), BatchError> {
	batch::validate_call_name(segment)?;

	if segment.contains('.') {
		return Err(BatchError::InvalidCallName { call: segment.to_owned() });
	}

	Ok(())
}
