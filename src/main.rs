//! UniFi to Pi-hole DNS Sync
//!
//! # Usage
//! ```bash
//! # Credentials from the environment, default hosts file
//! UNIFI_CONTROLLER=192.168.1.1 UNIFI_USER=admin UNIFI_PASSWORD=... unifi-pihole-sync
//!
//! # Explicit flags, custom hosts file, preview only
//! unifi-pihole-sync -c unifi.lan -u admin -f /tmp/lan.list --dry-run -v
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use unifi_pihole_sync::config::{
    StdinPrompt, DEFAULT_HOSTS_FILE, ENV_CONTROLLER, ENV_PASSWORD, ENV_USER,
};
use unifi_pihole_sync::reload::{ReloadFailurePolicy, DEFAULT_RELOAD_COMMAND};
use unifi_pihole_sync::sync::SyncReport;
use unifi_pihole_sync::{
    run_sync, CommandReloader, ControllerClient, ControllerConfig, CredentialSources, HostsFile,
    SyncOptions,
};

// ============================================================
// CLI Definition
// ============================================================

#[derive(Parser)]
#[command(name = "unifi-pihole-sync")]
#[command(about = "Fetch list of hosts from UniFi controller and update Pi-hole DNS", long_about = None)]
#[command(version)]
struct Cli {
    /// Print additional information
    #[arg(short, long)]
    verbose: bool,

    /// Hosts file to use
    #[arg(short = 'f', long, default_value = DEFAULT_HOSTS_FILE)]
    hostfile: PathBuf,

    /// Controller IP or hostname
    #[arg(short, long, env = ENV_CONTROLLER)]
    controller: Option<String>,

    /// Username
    #[arg(short, long, env = ENV_USER)]
    user: Option<String>,

    /// Password
    #[arg(short, long, env = ENV_PASSWORD, hide_env_values = true)]
    password: Option<String>,

    /// Validate the controller's TLS certificate. Without this flag
    /// self-signed controller certificates are accepted.
    #[arg(long, env = "UNIFI_VERIFY_TLS")]
    verify_tls: bool,

    /// Command that restarts the resolver after the hosts file is written
    #[arg(long, env = "PIHOLE_RELOAD_COMMAND", default_value = DEFAULT_RELOAD_COMMAND)]
    reload_command: String,

    /// Write the hosts file but do not restart the resolver
    #[arg(long)]
    no_reload: bool,

    /// What to do if the restart command fails
    #[arg(long, value_enum, default_value_t = ReloadFailurePolicy::Ignore)]
    reload_failure: ReloadFailurePolicy,

    /// Log the entries that would be written without touching anything
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

// ============================================================
// Main Entry Point
// ============================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    info!("Script started");

    match run(cli).await {
        Ok(report) => {
            debug!(
                clients = report.clients,
                entries = report.entries.len(),
                reloaded = report.reloaded,
                "Sync finished"
            );
            info!("Script completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Stage errors already carry their cause in the message
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,unifi_pihole_sync={}", level)));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<SyncReport> {
    debug!(
        hostfile = %cli.hostfile.display(),
        controller = ?cli.controller,
        user = ?cli.user,
        password_set = cli.password.is_some(),
        verify_tls = cli.verify_tls,
        reload_command = %cli.reload_command,
        dry_run = cli.dry_run,
        "Arguments"
    );

    let sources = CredentialSources {
        controller: cli.controller,
        username: cli.user,
        password: cli.password,
    };
    let credentials = sources.resolve(&mut StdinPrompt)?;

    info!(controller = %credentials.controller, "Using controller");
    info!(username = %credentials.username, "Using username");

    let config = ControllerConfig::new(&credentials.controller).verify_tls(cli.verify_tls);
    let controller = ControllerClient::new(&config)?;
    let reloader = CommandReloader::parse(&cli.reload_command)?;
    let hosts = HostsFile::new(cli.hostfile);

    let options = SyncOptions {
        dry_run: cli.dry_run,
        skip_reload: cli.no_reload,
        reload_failure: cli.reload_failure,
    };

    let report = run_sync(&controller, &credentials, &hosts, &reloader, options).await?;
    Ok(report)
}
