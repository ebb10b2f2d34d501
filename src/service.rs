//! Service descriptor: the fixed endpoints and callback of the remote API.
//!
//! The descriptor is validated once at construction and then shared read-only by every flow.

/// Builder API for assembling service descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Relative path of the request-token endpoint used by [`ServiceDescriptor::from_base`].
pub const DEFAULT_REQUEST_TOKEN_PATH: &str = "request_token.php";
/// Relative path of the access-token endpoint used by [`ServiceDescriptor::from_base`].
pub const DEFAULT_ACCESS_TOKEN_PATH: &str = "access_token.php";
/// Relative path of the user-facing authorize page used by [`ServiceDescriptor::from_base`].
pub const DEFAULT_AUTHORIZE_PATH: &str = "authorize.php";
/// Relative path of the batch query endpoint used by [`ServiceDescriptor::from_base`].
pub const DEFAULT_QUERY_PATH: &str = "query.php";

/// Endpoint set declared by a service descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
	/// Request-token endpoint (first handshake leg).
	pub request_token: Url,
	/// Access-token endpoint (third handshake leg).
	pub access_token: Url,
	/// Authorize page the user is redirected to.
	pub authorize: Url,
	/// Batch query endpoint.
	pub query: Url,
}

/// Immutable service descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
	/// Endpoint definitions exposed by the service.
	pub endpoints: ServiceEndpoints,
	/// Post-authorization callback sent as `oauth_callback`; `oob` is sent when unset.
	pub callback: Option<Url>,
	/// Optional `realm` advertised in the `Authorization` header.
	pub realm: Option<String>,
}
impl ServiceDescriptor {
	/// Creates a new builder.
	pub fn builder() -> ServiceDescriptorBuilder {
		ServiceDescriptorBuilder::new()
	}

	/// Derives all four endpoints from `base` using the default relative paths.
	///
	/// `base` should end with `/` when the endpoints live below a directory; otherwise its last
	/// path segment is replaced, following [`Url::join`] semantics.
	pub fn from_base(base: &Url) -> Result<Self, ServiceDescriptorError> {
		ServiceDescriptorBuilder::from_base(base)?.build()
	}
}
