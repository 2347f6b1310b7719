//! Demonstrates wrapping the default reqwest transport so every API call carries a bearer token
//! obtained through a JWT-bearer exchange, including the single retry after a rejected token.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use jwt_bearer_transport::{
	auth::Assertion,
	client::AuthenticatedClient,
	http::ReqwestHttpClient,
	provider::ExchangeDescriptor,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/o/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let feed_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/feeds/spreadsheets/private/full")
				.header("authorization", "Bearer demo-access");
			then.status(200).body("<feed><entry>Budget</entry></feed>");
		})
		.await;
	let descriptor = ExchangeDescriptor::builder()
		.token_endpoint(Url::parse(&server.url("/o/oauth2/token"))?)
		.extra_param("scope", "https://spreadsheets.google.com/feeds")
		.build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let client = <AuthenticatedClient<ReqwestHttpClient>>::with_http_client(
		Assertion::new("eyJhbGciOiJSUzI1NiJ9.eyJpc3MiOiJkZW1vIn0.c2ln")?,
		descriptor,
		http_client,
	);
	let url = Url::parse(&server.url("/feeds/spreadsheets/private/full"))?;

	for _ in 0..3 {
		let response = client.get(&url).await?;

		println!("{} {}", response.status(), String::from_utf8_lossy(response.body()));
	}

	println!("Token exchanges performed: {}.", client.transport().metrics().exchanges());

	token_mock.assert_async().await;
	feed_mock.assert_calls_async(3).await;

	Ok(())
}
