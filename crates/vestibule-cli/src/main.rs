//! Vestibule CLI — command-line client for the Vestibule portal shell.
//!
//! A standalone HTTP client that talks to a running shell instance.
//! No internal crate dependencies — talks exclusively via the HTTP API.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";
const BG_RED: &str = "\x1b[41m";
const BG_GREEN: &str = "\x1b[42m";

const BANNER_SMALL: &str = "⟐ Vestibule";

// ── CLI structure ────────────────────────────────────────────────────

/// Vestibule — the portal front door, from the terminal.
#[derive(Parser)]
#[command(
    name = "vestibule",
    version,
    about = "Vestibule CLI — inspect and toggle portal maintenance mode",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         VESTIBULE_ADDR   Shell address (default: http://127.0.0.1:8600)\n\n\
         {DIM}Examples:{RESET}\n  \
         vestibule status\n  \
         vestibule login ops-oncall --superadmin\n  \
         vestibule enable --message 'Back at 14:00 UTC'\n  \
         vestibule watch --interval 10"
    ),
)]
struct Cli {
    /// Vestibule shell address.
    #[arg(long, env = "VESTIBULE_ADDR", default_value = "http://127.0.0.1:8600")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the portal's live maintenance status.
    Status,
    /// Open a session on the shell's profile.
    Login {
        /// Credential to store (presence-only, never verified here).
        credential: String,
        /// Also store the maintenance bypass credential.
        #[arg(long, default_value = "false")]
        superadmin: bool,
    },
    /// Close the session and drop the bypass credential.
    Logout,
    /// Turn maintenance mode on.
    Enable {
        /// Viewer-facing message for the splash page.
        #[arg(long)]
        message: Option<String>,
    },
    /// Turn maintenance mode off.
    Disable,
    /// Poll the status endpoint and print every change.
    Watch {
        /// Seconds between polls.
        #[arg(long, default_value = "5")]
        interval: u64,
    },
}

// ── Wire shapes ──────────────────────────────────────────────────────

/// Public status endpoint payload (camelCase wire contract).
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct StatusView {
    maintenance_mode: bool,
    maintenance_message: String,
    api_reachable: bool,
}

/// Admin maintenance API payload.
#[derive(Debug, Deserialize)]
struct ToggleView {
    enabled: bool,
    message: String,
    api_reachable: bool,
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<16}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn mode_badge(enabled: bool) -> String {
    if enabled {
        format!("{BG_RED}{WHITE}{BOLD} MAINTENANCE {RESET}")
    } else {
        format!("{BG_GREEN}{WHITE}{BOLD} OPEN {RESET}")
    }
}

fn reachable_label(reachable: bool) -> String {
    if reachable {
        format!("{GREEN}yes{RESET}")
    } else {
        format!("{YELLOW}no{RESET}")
    }
}

fn print_status(status: &StatusView) {
    header("🚧", "Portal Status");
    kv_line("Mode", &mode_badge(status.maintenance_mode));
    kv_line("Message", &status.maintenance_message);
    kv_line("API reachable", &reachable_label(status.api_reachable));
    println!();
}

fn print_toggle(view: &ToggleView) {
    kv_line("Mode", &mode_badge(view.enabled));
    kv_line("Message", &view.message);
    kv_line("API reachable", &reachable_label(view.api_reachable));
    println!();
}

fn print_watch_line(status: &StatusView) {
    let mode = if status.maintenance_mode {
        format!("{RED}{BOLD}MAINTENANCE{RESET}")
    } else {
        format!("{GREEN}{BOLD}OPEN{RESET}")
    };
    println!("  {mode} {DIM}{}{RESET}", status.maintenance_message);
}

// ── HTTP client ──────────────────────────────────────────────────────

struct Client {
    http: reqwest::Client,
    addr: String,
}

impl Client {
    fn new(addr: String) -> Self {
        let http = reqwest::Client::new();
        Self { http, addr }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.addr.trim_end_matches('/'))
    }

    async fn status(&self) -> Result<StatusView> {
        let resp = self
            .http
            .get(self.url("/api/maintenance/status"))
            .send()
            .await
            .context("request failed")?;
        let value = handle_response(resp).await?;
        serde_json::from_value(value).context("unexpected status payload")
    }

    async fn toggle(&self, enabled: bool, message: Option<&str>) -> Result<ToggleView> {
        let mut body = serde_json::json!({ "enabled": enabled });
        if let Some(message) = message {
            body["message"] = Value::String(message.to_owned());
        }
        let resp = self
            .http
            .put(self.url("/superadmin/api/maintenance"))
            .json(&body)
            .send()
            .await
            .context("request failed")?;
        let value = handle_response(resp).await?;
        serde_json::from_value(value).context("unexpected maintenance payload")
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .context("request failed")?;
        handle_response(resp).await
    }

    async fn post_no_body(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .post(self.url(path))
            .send()
            .await
            .context("request failed")?;
        handle_response(resp).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    if status == reqwest::StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }
    let body = resp.text().await.context("failed to read response body")?;
    if !status.is_success() {
        bail!("server returned {status}: {body}");
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).context("failed to parse response JSON")
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let client = Client::new(cli.addr);

    match run(client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(client: Client, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status => cmd_status(&client).await,
        Commands::Login {
            credential,
            superadmin,
        } => cmd_login(&client, &credential, superadmin).await,
        Commands::Logout => cmd_logout(&client).await,
        Commands::Enable { message } => cmd_enable(&client, message.as_deref()).await,
        Commands::Disable => cmd_disable(&client).await,
        Commands::Watch { interval } => cmd_watch(&client, interval).await,
    }
}

// ── Commands ─────────────────────────────────────────────────────────

async fn cmd_status(client: &Client) -> Result<()> {
    println!();
    println!("  {BANNER_SMALL} {DIM}checking status...{RESET}");
    println!();
    let status = client.status().await?;
    print_status(&status);
    Ok(())
}

async fn cmd_login(client: &Client, credential: &str, superadmin: bool) -> Result<()> {
    let body = serde_json::json!({ "credential": credential, "superadmin": superadmin });
    client.post("/auth/login", &body).await?;
    if superadmin {
        success("signed in with the maintenance bypass");
    } else {
        success("signed in");
    }
    Ok(())
}

async fn cmd_logout(client: &Client) -> Result<()> {
    client.post_no_body("/auth/logout").await?;
    success("signed out");
    Ok(())
}

async fn cmd_enable(client: &Client, message: Option<&str>) -> Result<()> {
    let view = client.toggle(true, message).await?;
    success("maintenance mode enabled");
    println!();
    print_toggle(&view);
    Ok(())
}

async fn cmd_disable(client: &Client) -> Result<()> {
    let view = client.toggle(false, None).await?;
    success("maintenance mode disabled");
    println!();
    print_toggle(&view);
    Ok(())
}

async fn cmd_watch(client: &Client, interval: u64) -> Result<()> {
    println!();
    println!("  {BANNER_SMALL} {DIM}watching every {interval}s — ctrl-c to stop{RESET}");
    println!();

    let mut last: Option<StatusView> = None;
    loop {
        match client.status().await {
            Ok(status) => {
                if last.as_ref() != Some(&status) {
                    print_watch_line(&status);
                    last = Some(status);
                }
            }
            Err(e) => {
                println!("  {YELLOW}unreachable{RESET} {DIM}{e:#}{RESET}");
                last = None;
            }
        }
        tokio::time::sleep(Duration::from_secs(interval)).await;
    }
}
