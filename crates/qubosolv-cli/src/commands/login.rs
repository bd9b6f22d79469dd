//! Login command implementation.
//!
//! Stores username and password in the credential file and checks them by
//! requesting an access token.

use anyhow::Result;
use console::style;

use qubosolv::{CredentialStore, SolverBuilder};
use tracing::debug;

/// Execute the login command.
pub async fn execute(username: &str, password: &str, file: Option<&str>) -> Result<()> {
    let store = CredentialStore::resolve(file);
    debug!("Credential file: {}", store.path().display());

    println!(
        "{} Logging in as {}",
        style("→").cyan().bold(),
        style(username).green()
    );

    let mut builder = SolverBuilder::new().username(username).password(password);
    if let Some(file) = file {
        builder = builder.credentials_file(file);
    }

    builder
        .connect()
        .await
        .map_err(|e| anyhow::anyhow!("Login failed: {e}"))?;

    println!("\n{} Authentication successful!", style("✓").green().bold());
    println!(
        "  Credentials saved to {}",
        style(store.path().display()).yellow()
    );

    Ok(())
}
