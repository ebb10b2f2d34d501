//! Consumer identity and token credential pairs.

// self
use crate::{_prelude::*, auth::Secret, error::SigningError};

/// Error returned when a credential pair would be partially populated.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// Token identifier was empty.
	#[error("Credential token cannot be empty.")]
	EmptyToken,
	/// Token secret was empty.
	#[error("Credential secret cannot be empty.")]
	EmptySecret,
}

/// Token identifier plus its shared secret.
///
/// A pair only exists fully populated: [`CredentialPair::new`] rejects an empty token or
/// secret. Both the request pair and the access pair use this type.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
	token: String,
	secret: Secret,
}
impl CredentialPair {
	/// Creates a pair after rejecting empty components.
	pub fn new(
		token: impl Into<String>,
		secret: impl Into<String>,
	) -> Result<Self, CredentialError> {
		let token = token.into();
		let secret = secret.into();

		if token.is_empty() {
			return Err(CredentialError::EmptyToken);
		}
		if secret.is_empty() {
			return Err(CredentialError::EmptySecret);
		}

		Ok(Self { token, secret: Secret::new(secret) })
	}

	/// Public token identifier (`oauth_token`).
	pub fn token(&self) -> &str {
		&self.token
	}

	/// Redacted token secret.
	pub fn secret(&self) -> &Secret {
		&self.secret
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("token", &self.token)
			.field("secret", &self.secret)
			.finish()
	}
}

/// Signature methods understood by the signer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// HMAC over SHA-1 (OAuth 1.0a default).
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// HMAC over SHA-256.
	#[serde(rename = "HMAC-SHA256")]
	HmacSha256,
	/// Signing key sent verbatim; only safe over TLS.
	#[serde(rename = "PLAINTEXT")]
	Plaintext,
}
impl SignatureMethod {
	/// Returns the `oauth_signature_method` label.
	pub const fn as_str(self) -> &'static str {
		match self {
			SignatureMethod::HmacSha1 => "HMAC-SHA1",
			SignatureMethod::HmacSha256 => "HMAC-SHA256",
			SignatureMethod::Plaintext => "PLAINTEXT",
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SignatureMethod {
	type Err = SigningError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"HMAC-SHA1" => Ok(Self::HmacSha1),
			"HMAC-SHA256" => Ok(Self::HmacSha256),
			"PLAINTEXT" => Ok(Self::Plaintext),
			_ => Err(SigningError::UnsupportedMethod { method: s.to_owned() }),
		}
	}
}

/// Application-level credentials identifying the client to the service.
#[derive(Clone, PartialEq, Eq)]
pub struct ConsumerIdentity {
	key: String,
	secret: Secret,
	signature_method: SignatureMethod,
}
impl ConsumerIdentity {
	/// Creates an identity that signs with HMAC-SHA1.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			secret: Secret::new(secret),
			signature_method: SignatureMethod::default(),
		}
	}

	/// Overrides the signature method.
	pub fn with_signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Consumer key (`oauth_consumer_key`).
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Redacted consumer secret.
	pub fn secret(&self) -> &Secret {
		&self.secret
	}

	/// Signature method applied to every request.
	pub fn signature_method(&self) -> SignatureMethod {
		self.signature_method
	}
}
impl Debug for ConsumerIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConsumerIdentity")
			.field("key", &self.key)
			.field("secret", &self.secret)
			.field("signature_method", &self.signature_method)
			.finish()
	}
}
