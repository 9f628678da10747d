//! Recent activity listing

use prettytable::{row, Table};

use crate::config::Config;
use crate::error::Result;
use crate::strava::StravaClient;

/// Print a table of `user`'s most recent activities.
pub async fn run(config: Config, user: String, limit: Option<usize>) -> Result<()> {
    let auth = super::build_auth_manager(&config)?;
    let access_token = auth.access_token(&user).await?;

    let strava = StravaClient::new(&config.strava)?;
    let limit = limit.unwrap_or(config.strava.max_activities);
    let activities = strava.fetch_recent_activities(&access_token, limit).await;

    if activities.is_empty() {
        println!("No recent activities found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["Date", "Name", "Type", "Distance (km)", "Time (min)"]);
    for activity in &activities {
        table.add_row(row![
            str_field(activity, "start_date_local"),
            str_field(activity, "name"),
            str_field(activity, "type"),
            format!("{:.1}", num_field(activity, "distance") / 1000.0),
            format!("{:.0}", num_field(activity, "moving_time") / 60.0),
        ]);
    }
    table.printstd();
    Ok(())
}

fn str_field<'a>(activity: &'a serde_json::Value, key: &str) -> &'a str {
    activity.get(key).and_then(|v| v.as_str()).unwrap_or("-")
}

fn num_field(activity: &serde_json::Value, key: &str) -> f64 {
    activity.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0)
}
