//! Interactive coaching session handler
//!
//! Obtains an access token, pulls recent activities, opens a session with
//! the opening analysis, and runs a readline loop. Besides free-form
//! questions the loop understands `/stats`, `/export [path]`, `/help`, and
//! `/quit`.

use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::default_export_path;
use crate::config::Config;
use crate::error::Result;
use crate::providers::{ChatOptions, OpenAiBackend};
use crate::session::{ActivityContext, CoachSession, SessionRegistry};
use crate::strava::StravaClient;

/// Start an interactive coaching session for `user`.
pub async fn run_chat(
    config: Config,
    user: String,
    feedback: String,
    limit: Option<usize>,
) -> Result<()> {
    let auth = super::build_auth_manager(&config)?;
    let access_token = auth.access_token(&user).await?;

    let strava = StravaClient::new(&config.strava)?;
    let limit = limit.unwrap_or(config.strava.max_activities);
    println!("Loading your last {} activities...", limit);
    let activities = strava.fetch_recent_activities(&access_token, limit).await;
    if activities.is_empty() {
        println!(
            "{}",
            "No activities found; the coach will work from your feedback alone.".yellow()
        );
    } else {
        println!("Loaded {} activities.", activities.len());
    }

    let backend = Arc::new(OpenAiBackend::new(&config.openai)?);
    let options = ChatOptions::from_config(&config.openai);
    let mut registry = SessionRegistry::new();
    let session = registry.create(CoachSession::new(
        backend,
        options,
        config.session.clone(),
        user.clone(),
        ActivityContext::Batch(activities),
        feedback,
    ));

    println!();
    println!("{}", "Analyzing your training...".cyan());
    let analysis = session.start_analysis().await?;
    println!();
    println!("{} {}", "Coach:".green().bold(), analysis);
    println!();
    println!("Ask follow-up questions, or /help for commands.");

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "/quit" | "/exit" => break,
                    "/help" => {
                        print_help();
                        continue;
                    }
                    "/stats" => {
                        print_stats(session);
                        continue;
                    }
                    _ if trimmed.starts_with("/export") => {
                        let path = trimmed
                            .strip_prefix("/export")
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(std::path::PathBuf::from)
                            .unwrap_or_else(|| default_export_path(&user));
                        match export_to(session, &path) {
                            Ok(()) => println!("Conversation saved to {}", path.display()),
                            Err(e) => println!("{} {}", "Export failed:".red(), e),
                        }
                        continue;
                    }
                    _ => {}
                }

                let reply = session.ask(trimmed).await?;
                println!();
                println!("{} {}", "Coach:".green().bold(), reply);
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    if let Some(export) = registry.end(&user) {
        tracing::info!(
            user,
            messages = export.stats.total_messages,
            "session ended"
        );
    }
    println!("Good luck with your training!");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /stats          Show conversation statistics");
    println!("  /export [path]  Save the conversation to a JSON file");
    println!("  /quit           End the session");
}

fn print_stats(session: &CoachSession) {
    let stats = session.stats();
    println!("Messages: {} total ({} from you, {} from the coach)",
        stats.total_messages, stats.user_messages, stats.assistant_messages);
    println!("Estimated tokens: {}", stats.estimated_tokens);
    println!("Session length: {:.1} minutes", stats.session_duration_minutes);
    println!("Activities in context: {}", stats.activities_count);
}

fn export_to(session: &CoachSession, path: &std::path::Path) -> Result<()> {
    let export = session.export();
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)?;
    Ok(())
}
