//! Server health and readiness

use anyhow::Result;
use colored::Colorize;
use risk_lib::{ComponentStatus, HealthResponse, ReadinessResponse};
use serde_json::json;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_success, print_warning, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

fn status_name(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "healthy",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "unhealthy",
    }
}

fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn component_rows(health: &HealthResponse) -> Vec<ComponentRow> {
    let mut names: Vec<&String> = health.components.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| {
            let component = &health.components[name];
            ComponentRow {
                name: name.clone(),
                status: color_status(status_name(component.status)),
                message: component.message.clone().unwrap_or_else(|| "-".to_string()),
                last_check: format_timestamp(component.last_check_timestamp),
            }
        })
        .collect()
}

/// Show server health and readiness.
///
/// Returns `false` when the server is unhealthy or not ready.
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<bool> {
    let (_, health): (u16, HealthResponse) = client.get("healthz").await?;
    let (_, readiness): (u16, ReadinessResponse) = client.get("readyz").await?;

    let ok = health.status.is_operational() && readiness.ready;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&json!({
                "health": health,
                "readiness": readiness,
            }))?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            println!("{}", "Server Status".bold());
            println!("{}", "=".repeat(50));
            println!("Health:     {}", color_status(status_name(health.status)));
            let ready = if readiness.ready { "ready" } else { "not ready" };
            println!("Readiness:  {}", color_status(ready));
            if let Some(reason) = &readiness.reason {
                println!("Reason:     {}", reason);
            }
            println!();

            if !health.components.is_empty() {
                let table = tabled::Table::new(component_rows(&health))
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                println!("{}", table);
                println!();
            }

            if ok {
                print_success("Server is accepting predictions");
            } else {
                print_warning("Server is not fully operational");
            }
        }
    }

    Ok(ok)
}
