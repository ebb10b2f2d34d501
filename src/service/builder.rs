// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	service::{
		DEFAULT_ACCESS_TOKEN_PATH, DEFAULT_AUTHORIZE_PATH, DEFAULT_QUERY_PATH,
		DEFAULT_REQUEST_TOKEN_PATH, ServiceDescriptor, ServiceEndpoints,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ServiceDescriptorError {
	/// A required endpoint was not configured.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A default endpoint path could not be joined onto the base URL.
	#[error("The {endpoint} endpoint cannot be derived from the base URL.")]
	InvalidBase {
		/// Which endpoint failed to derive.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Builder for [`ServiceDescriptor`] values.
#[derive(Debug, Default)]
pub struct ServiceDescriptorBuilder {
	/// Request-token endpoint.
	pub request_token_endpoint: Option<Url>,
	/// Access-token endpoint.
	pub access_token_endpoint: Option<Url>,
	/// Authorize page.
	pub authorize_endpoint: Option<Url>,
	/// Batch query endpoint.
	pub query_endpoint: Option<Url>,
	/// Post-authorization callback.
	pub callback: Option<Url>,
	/// `Authorization` header realm.
	pub realm: Option<String>,
}
impl ServiceDescriptorBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds every endpoint from `base` and the default relative paths.
	pub fn from_base(base: &Url) -> Result<Self, ServiceDescriptorError> {
		let join = |endpoint: &'static str, path: &str| {
			base.join(path).map_err(|source| ServiceDescriptorError::InvalidBase { endpoint, source })
		};

		Ok(Self {
			request_token_endpoint: Some(join("request_token", DEFAULT_REQUEST_TOKEN_PATH)?),
			access_token_endpoint: Some(join("access_token", DEFAULT_ACCESS_TOKEN_PATH)?),
			authorize_endpoint: Some(join("authorize", DEFAULT_AUTHORIZE_PATH)?),
			query_endpoint: Some(join("query", DEFAULT_QUERY_PATH)?),
			..Self::default()
		})
	}

	/// Sets the request-token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the access-token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the authorize page.
	pub fn authorize_endpoint(mut self, url: Url) -> Self {
		self.authorize_endpoint = Some(url);

		self
	}

	/// Sets the batch query endpoint.
	pub fn query_endpoint(mut self, url: Url) -> Self {
		self.query_endpoint = Some(url);

		self
	}

	/// Sets the post-authorization callback.
	pub fn callback(mut self, url: Url) -> Self {
		self.callback = Some(url);

		self
	}

	/// Sets the `Authorization` header realm.
	pub fn realm(mut self, realm: impl Into<String>) -> Self {
		self.realm = Some(realm.into());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ServiceDescriptor, ServiceDescriptorError> {
		let missing = |endpoint| ServiceDescriptorError::MissingEndpoint { endpoint };
		let endpoints = ServiceEndpoints {
			request_token: self.request_token_endpoint.ok_or_else(|| missing("request_token"))?,
			access_token: self.access_token_endpoint.ok_or_else(|| missing("access_token"))?,
			authorize: self.authorize_endpoint.ok_or_else(|| missing("authorize"))?,
			query: self.query_endpoint.ok_or_else(|| missing("query"))?,
		};
		let descriptor = ServiceDescriptor { endpoints, callback: self.callback, realm: self.realm };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ServiceDescriptor {
	fn validate(&self) -> Result<(), ServiceDescriptorError> {
		validate_endpoint("request_token", &self.endpoints.request_token)?;
		validate_endpoint("access_token", &self.endpoints.access_token)?;
		validate_endpoint("authorize", &self.endpoints.authorize)?;
		validate_endpoint("query", &self.endpoints.query)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ServiceDescriptorError> {
	if url.scheme() == "https" || (url.scheme() == "http" && is_loopback(url)) {
		Ok(())
	} else {
		Err(ServiceDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}
