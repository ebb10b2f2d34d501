//! Walks through the three-legged handshake against a live service and sends one batch query
//! with the resulting access token.
//!
//! Configure the service through `OAUTH1_BASE_URL`, `OAUTH1_CONSUMER_KEY`,
//! `OAUTH1_CONSUMER_SECRET`, and optionally `OAUTH1_CALLBACK` and `OAUTH1_CALL`.

// std
use std::{env, io};
// crates.io
use color_eyre::{Result, eyre::WrapErr};
use url::Url;
// self
use oauth1_broker::{
	auth::ConsumerIdentity, flows::Broker, query::CallSpec, service::ServiceDescriptorBuilder,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let base = Url::parse(&env::var("OAUTH1_BASE_URL").wrap_err("OAUTH1_BASE_URL is required")?)?;
	let consumer = ConsumerIdentity::new(
		env::var("OAUTH1_CONSUMER_KEY").wrap_err("OAUTH1_CONSUMER_KEY is required")?,
		env::var("OAUTH1_CONSUMER_SECRET").wrap_err("OAUTH1_CONSUMER_SECRET is required")?,
	);
	let mut descriptor = ServiceDescriptorBuilder::from_base(&base)?;

	if let Ok(callback) = env::var("OAUTH1_CALLBACK") {
		descriptor = descriptor.callback(Url::parse(&callback)?);
	}

	let broker = Broker::new(descriptor.build()?, consumer);
	let request = broker.request_token().await?;

	println!("Request token {} issued.", request.token());
	println!("Send your user to {}.", broker.authorize_url_for_current(None)?);
	println!("Paste the verifier shown after approval:");

	let mut verifier = String::new();

	io::stdin().read_line(&mut verifier)?;

	let access = broker.access_token(verifier.trim()).await?;

	println!("Access token {} obtained; state is {}.", access.token(), broker.token_state());

	let call = env::var("OAUTH1_CALL").unwrap_or_else(|_| "urc.getClans".into());
	let results = broker.execute([CallSpec::new(call)?]).await?;

	for (name, result) in results {
		println!("{name}: context={:?} items={:?}", result.context, result.items);
	}

	Ok(())
}
