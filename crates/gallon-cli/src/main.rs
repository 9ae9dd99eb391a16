//! `gallon`: command-line client for the gallon quota server.
//!
//! # Usage
//!
//! ```text
//! gallon --url http://localhost:8080 scan EMP1001 --gallons 2
//! gallon --config ~/.config/gallon/config.toml summary
//! ```

mod client;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use gallon_core::{employee::NewEmployee, store::EmployeeQuery};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "gallon", about = "Command-line client for the gallon quota server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the gallon server (default: http://localhost:8080).
  #[arg(long, env = "GALLON_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Distribute gallons to the employee with this badge identifier.
  Scan {
    identifier: String,
    /// Gallons to hand out (server default: 1).
    #[arg(short, long)]
    gallons:    Option<u32>,
    #[arg(short, long)]
    notes:      Option<String>,
  },
  /// Show the latest distributions, newest first.
  Recent {
    #[arg(short, long)]
    limit: Option<usize>,
  },
  /// List employees.
  Employees {
    /// Substring match over identifier, name and department.
    #[arg(short, long)]
    search:      Option<String>,
    #[arg(short, long)]
    department:  Option<String>,
    /// Only active employees.
    #[arg(long)]
    active_only: bool,
  },
  /// Register a new employee.
  Add {
    identifier: String,
    name:       String,
    department: String,
    /// Monthly allotment in gallons (server default: 10).
    #[arg(short, long)]
    quota:      Option<u32>,
    /// Create the employee as inactive.
    #[arg(long)]
    inactive:   bool,
  },
  /// Show dashboard totals and recent activity.
  Summary,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };
  tracing::debug!(url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Scan { identifier, gallons, notes } => {
      let receipt = client.scan(&identifier, gallons, notes).await?;
      println!("{}", render::receipt(&receipt));
    }
    Command::Recent { limit } => {
      let entries = client.recent(limit).await?;
      if entries.is_empty() {
        println!("No distributions yet.");
      }
      for entry in &entries {
        println!("{}", render::entry_row(entry));
      }
    }
    Command::Employees { search, department, active_only } => {
      let query = EmployeeQuery {
        search,
        department,
        active: active_only.then_some(true),
        ..EmployeeQuery::default()
      };
      for employee in client.list_employees(&query).await? {
        println!("{}", render::employee_row(&employee));
      }
    }
    Command::Add { identifier, name, department, quota, inactive } => {
      let input = NewEmployee {
        monthly_quota: quota,
        is_active: !inactive,
        ..NewEmployee::new(identifier, name, department)
      };
      let employee = client.create_employee(&input).await?;
      println!("Created {}", render::employee_row(&employee));
    }
    Command::Summary => {
      let dashboard = client.summary().await?;
      println!("{}", render::totals(&dashboard.totals));
      if !dashboard.recent.is_empty() {
        println!();
        for entry in &dashboard.recent {
          println!("{}", render::entry_row(entry));
        }
      }
    }
  }
  Ok(())
}
