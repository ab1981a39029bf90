use std::path::Path;

use clap::{Args, Subcommand};

use crate::config::{AppConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the resolved configuration.
    Show,
}

pub fn run(command: ConfigCommand, explicit: Option<&Path>) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(explicit),
    }
}

fn run_show(explicit: Option<&Path>) -> AppResult<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    let config = AppConfig::from_path(&path)?;

    println!("Configuration file: {}", path.display());
    print!("{}", describe(&config));
    Ok(())
}

fn describe(config: &AppConfig) -> String {
    let tagged = config
        .tagged_projects
        .iter()
        .map(|tagged| format!("{} (tag {})", tagged.project, tagged.tag))
        .collect::<Vec<_>>();
    let mut priorities = config
        .status_priorities
        .iter()
        .map(|(status, weight)| format!("{status}={weight}"))
        .collect::<Vec<_>>();
    priorities.sort();

    let mut out = String::new();
    out.push_str(&format!("Name: {}\n", config.name));
    out.push_str(&format!("Projects: {}\n", display_list(&config.projects)));
    out.push_str(&format!("Tagged projects: {}\n", display_list(&tagged)));
    out.push_str(&format!(
        "Priority required statuses: {}\n",
        display_list(&config.priority_required_statuses)
    ));
    out.push_str(&format!("Status priorities: {}\n", display_list(&priorities)));
    out.push_str(&format!("Excluded importance: {}\n", config.excluded_importance));
    out.push_str(&format!("API base: {}\n", config.fetch.api_base));
    out.push_str(&format!(
        "Page size: {}, max concurrent requests: {}, request timeout: {}s\n",
        config.fetch.page_size, config.fetch.max_concurrency, config.fetch.request_timeout_secs
    ));
    out.push_str(&format!(
        "Cache TTL: {}s, serve stale on error: {}\n",
        config.cache.ttl_secs, config.cache.serve_stale_on_error
    ));
    out.push_str(&format!("Listen: {}:{}\n", config.server.host, config.server.port));
    out
}

fn display_list(values: &[String]) -> String {
    if values.is_empty() {
        "<none>".to_string()
    } else {
        values.join(", ")
    }
}
