//! IAM controller e2e harness CLI
//!
//! Prepares and tears down the IAM principals the scenarios adopt, and exposes
//! the IAM eventual-consistency waits to shell scripts.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use aws_sdk_iam::Client as IamClient;
use clap::{Args, Parser, Subcommand, ValueEnum};

use iam_controller_e2e::aws::{group, oidc_provider, policy, role, user};
use iam_controller_e2e::bootstrap::{self, BootstrapResources};
use iam_controller_e2e::config::{BOOTSTRAP_FILE_ENV, DEFAULT_BOOTSTRAP_FILE};
use iam_controller_e2e::{Presence, WaitOptions};

#[derive(Parser, Debug)]
#[command(name = "iam-controller-e2e", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the Role and Policy used by the adoption scenarios
    Bootstrap {
        /// Where to record the created resources
        #[arg(long, env = BOOTSTRAP_FILE_ENV, default_value = DEFAULT_BOOTSTRAP_FILE)]
        output: PathBuf,
    },

    /// Delete the resources recorded by `bootstrap`
    Cleanup {
        /// File written by `bootstrap`
        #[arg(long, env = BOOTSTRAP_FILE_ENV, default_value = DEFAULT_BOOTSTRAP_FILE)]
        input: PathBuf,
    },

    /// Poll IAM until a resource exists (or, with --absent, is gone)
    Wait(WaitArgs),
}

#[derive(Args, Debug)]
struct WaitArgs {
    /// Resource kind
    #[arg(value_enum)]
    kind: WaitKind,

    /// Name for roles, groups and users; ARN for policies and OIDC providers
    identifier: String,

    /// Wait for the resource to be deleted instead
    #[arg(long)]
    absent: bool,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 600)]
    timeout_seconds: u64,

    /// Seconds between checks
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
    interval_seconds: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum WaitKind {
    Role,
    Policy,
    Group,
    User,
    OidcProvider,
}

impl WaitArgs {
    fn presence(&self) -> Presence {
        if self.absent {
            Presence::Deleted
        } else {
            Presence::Exists
        }
    }

    fn options(&self) -> WaitOptions {
        WaitOptions::new(
            Duration::from_secs(self.timeout_seconds),
            Duration::from_secs(self.interval_seconds),
        )
    }
}

async fn iam_client() -> IamClient {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    IamClient::new(&config)
}

async fn run_bootstrap(output: PathBuf) -> anyhow::Result<()> {
    let iam = iam_client().await;
    let resources = bootstrap::bootstrap(&iam)
        .await
        .context("Failed to bootstrap IAM resources")?;
    resources
        .write_to(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{}", output.display());
    Ok(())
}

async fn run_cleanup(input: PathBuf) -> anyhow::Result<()> {
    let resources = BootstrapResources::read_from(&input)?;
    let iam = iam_client().await;
    resources
        .cleanup(&iam)
        .await
        .context("Failed to clean up bootstrap resources")?;
    Ok(())
}

async fn run_wait(args: WaitArgs) -> anyhow::Result<()> {
    let iam = iam_client().await;
    let id = args.identifier.as_str();
    let options = args.options();

    match (args.kind, args.presence()) {
        (WaitKind::Role, Presence::Exists) => role::wait_until_exists(&iam, id, options).await?,
        (WaitKind::Role, Presence::Deleted) => role::wait_until_deleted(&iam, id, options).await?,
        (WaitKind::Policy, Presence::Exists) => policy::wait_until_exists(&iam, id, options).await?,
        (WaitKind::Policy, Presence::Deleted) => {
            policy::wait_until_deleted(&iam, id, options).await?;
        }
        (WaitKind::Group, Presence::Exists) => group::wait_until_exists(&iam, id, options).await?,
        (WaitKind::Group, Presence::Deleted) => group::wait_until_deleted(&iam, id, options).await?,
        (WaitKind::User, Presence::Exists) => user::wait_until_exists(&iam, id, options).await?,
        (WaitKind::User, Presence::Deleted) => user::wait_until_deleted(&iam, id, options).await?,
        (WaitKind::OidcProvider, Presence::Exists) => {
            oidc_provider::wait_until_exists(&iam, id, options).await?;
        }
        (WaitKind::OidcProvider, Presence::Deleted) => {
            oidc_provider::wait_until_deleted(&iam, id, options).await?;
        }
    }
    log::info!("{:?} {} reached the awaited state", args.kind, id);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Usage errors exit 1 like every other failure; --help and --version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            eprint!("{e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            print!("{e}");
            return ExitCode::SUCCESS;
        }
    };

    let result = match cli.command {
        Commands::Bootstrap { output } => run_bootstrap(output).await,
        Commands::Cleanup { input } => run_cleanup(input).await,
        Commands::Wait(args) => run_wait(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
