//! Seed the 8-week base plan for one user through a running server.
//!
//! Reads APP_BASE_URL and CRON_SECRET from the environment (or `.env`).

use clap::Parser;
use serde_json::{json, Value};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Seed the 8-week base plan for a user", long_about = None)]
struct Cli {
  /// User to seed the plan for
  user_id: String,

  /// First day of the plan (YYYY-MM-DD); the server's today when omitted
  start_date: Option<String>,
}

fn env_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

async fn post_seed(base_url: &str, secret: &str, cli: &Cli) -> Result<Value, reqwest::Error> {
  let url = format!("{}/api/plan/seed", base_url.trim_end_matches('/'));

  reqwest::Client::new()
    .post(&url)
    .bearer_auth(secret)
    .json(&json!({ "user_id": cli.user_id, "start_date": cli.start_date }))
    .send()
    .await?
    .json()
    .await
}

#[tokio::main]
async fn main() -> ExitCode {
  dotenvy::dotenv().ok();
  let cli = Cli::parse();

  let (Some(base_url), Some(secret)) = (env_var("APP_BASE_URL"), env_var("CRON_SECRET")) else {
    eprintln!("APP_BASE_URL and CRON_SECRET must be set in your environment");
    return ExitCode::FAILURE;
  };

  match post_seed(&base_url, &secret, &cli).await {
    Ok(body) => {
      println!("{}", serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string()));
      ExitCode::SUCCESS
    }
    Err(e) => {
      eprintln!("Seed request failed: {}", e);
      ExitCode::FAILURE
    }
  }
}
