//! Stats command.

use chrono::Utc;
use std::path::Path;
use wadesk_core::{ContactStatus, DashboardStats};
use wadesk_store::Store;

use super::{load_config, open_store};

/// Run the stats command.
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config, false).await?;

    let stats = store.stats(Utc::now().date_naive()).await?;
    print!("{}", render(&stats));
    Ok(())
}

fn render(stats: &DashboardStats) -> String {
    let mut out = format!(
        "Contacts:        {}\nMessages:        {}\nMessages today:  {}\n",
        stats.total_contacts, stats.total_messages, stats.today_messages
    );
    for status in ContactStatus::ALL {
        let count = stats.contacts_by_status.get(&status).copied().unwrap_or(0);
        out.push_str(&format!("  {:<14} {}\n", status.as_str(), count));
    }
    out
}
