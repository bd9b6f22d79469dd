//! Credentials command implementation.

use anyhow::Result;
use console::style;

use qubosolv::CredentialStore;

use super::common::mask;

/// Execute the credentials show subcommand.
pub fn execute_show(file: Option<&str>) -> Result<()> {
    let store = CredentialStore::resolve(file);

    if !store.exists() {
        println!("  No credentials stored at {}.", store.path().display());
        println!(
            "  Run {} to store them.",
            style("qubosolv login --username <user> --password <password>").dim()
        );
        return Ok(());
    }

    let credentials = store.load()?;
    println!(
        "{} Credentials in {}:\n",
        style("→").cyan().bold(),
        style(store.path().display()).yellow()
    );
    println!("  {}: {}", style("username").bold(), credentials.username);
    println!(
        "  {}: {}",
        style("password").bold(),
        mask(&credentials.password)
    );

    Ok(())
}

/// Execute the credentials clear subcommand.
pub fn execute_clear(file: Option<&str>) -> Result<()> {
    let store = CredentialStore::resolve(file);
    let existed = store.exists();
    store.clear()?;

    if existed {
        println!(
            "{} Removed {}",
            style("✓").green().bold(),
            style(store.path().display()).yellow()
        );
    } else {
        println!("  Nothing to remove at {}.", store.path().display());
    }

    Ok(())
}
