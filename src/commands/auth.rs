//! Strava authorization command handlers

use chrono::DateTime;
use colored::Colorize;
use prettytable::{row, Table};

use crate::config::Config;
use crate::error::Result;

/// Run the browser authorization flow for `user` and store the tokens.
pub async fn login(config: Config, user: String) -> Result<()> {
    let auth = super::build_auth_manager(&config)?;
    let record = auth.login(&user).await?;

    println!("{}", format!("Authorized '{}'.", user).green());
    if let Some(name) = record
        .athlete
        .as_ref()
        .and_then(|a| a.get("firstname"))
        .and_then(|n| n.as_str())
    {
        println!("Connected athlete: {}", name);
    }
    Ok(())
}

/// List users with stored credentials and their token status.
pub fn list(config: Config) -> Result<()> {
    let auth = super::build_auth_manager(&config)?;
    let records = auth.list_records()?;
    if records.is_empty() {
        println!("No stored credentials. Run `stridecoach auth login --user <id>` first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["User", "Token", "Expires"]);
    for record in records {
        let status = if record.is_valid() { "valid" } else { "stale" };
        let expires = DateTime::from_timestamp(record.expires_at, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| record.expires_at.to_string());
        table.add_row(row![record.user_id, status, expires]);
    }
    table.printstd();
    Ok(())
}

/// Show stored credential status for one user.
pub fn status(config: Config, user: String) -> Result<()> {
    let auth = super::build_auth_manager(&config)?;
    match auth.token_info(&user)? {
        Some(record) => {
            if record.is_valid() {
                println!("{}", format!("'{}' has a valid access token.", user).green());
            } else {
                println!(
                    "{}",
                    format!("'{}' has a stale token; it will refresh on next use.", user)
                        .yellow()
                );
            }
            println!(
                "Expires in {} seconds (at epoch {}).",
                record.seconds_until_expiry(),
                record.expires_at
            );
            if let Some(updated) = record.updated_at {
                println!("Last updated: {}", updated.to_rfc3339());
            }
        }
        None => {
            println!(
                "No stored credentials for '{}'. Run `stridecoach auth login --user {}`.",
                user, user
            );
        }
    }
    Ok(())
}

/// Revoke remote access and delete stored credentials for `user`.
pub async fn revoke(config: Config, user: String) -> Result<()> {
    let auth = super::build_auth_manager(&config)?;
    if auth.revoke(&user).await? {
        println!("{}", format!("Revoked access for '{}'.", user).green());
    } else {
        println!("No stored credentials for '{}'; nothing to revoke.", user);
    }
    Ok(())
}
