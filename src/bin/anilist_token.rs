//! Mints an AniList access token with the client-credentials grant.
//!
//! Reads `CLIENT_ID` and `CLIENT_SECRET` from the environment (or `.env`)
//! and prints the token to put into `ACCESS_TOKEN`.

use anyhow::{bail, Context, Result};
use console::style;
use reqwest::blocking::Client;
use serde::Deserialize;

const TOKEN_URL: &str = "https://anilist.co/api/v2/oauth/token";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let client_id = std::env::var("CLIENT_ID").context("CLIENT_ID is not set")?;
    let client_secret = std::env::var("CLIENT_SECRET").context("CLIENT_SECRET is not set")?;

    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id.as_str()),
        ("client_secret", client_secret.as_str()),
    ];

    let response = Client::new().post(TOKEN_URL).form(&params).send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        bail!("token request failed ({}): {}", status, body);
    }

    let token: TokenResponse = response.json()?;
    println!("{} {}", style("Access token:").green(), token.access_token);

    Ok(())
}
