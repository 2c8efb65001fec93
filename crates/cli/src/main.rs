use clap::{Args, Parser, Subcommand};
use deploykit::compiler::SourceGroup;
use deploykit::config::DeployConfig;
use deploykit::proxy::ProxyKind;
use deploykit::types::{Address, Version, VersionSelector};
use deploykit_cli::commands::{deploy, history, inspect, reconcile, rollback, timeline, upgrade, verify};
use deploykit_cli::telemetry::init_telemetry;
use deploykit_cli::workspace::{parse_source, parse_upgradeable, Workspace};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "deploykit")]
#[command(about = "Deploy, upgrade and roll back proxied contracts with an append-only registry", long_about = None)]
struct Cli {
    #[command(flatten)]
    workspace: WorkspaceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WorkspaceArgs {
    /// Registry file (JSON array of [name, version, address, abi])
    #[arg(long, global = true, env = "DEPLOYKIT_REGISTRY", default_value = "registry.json")]
    registry: PathBuf,

    /// Simulated chain state file
    #[arg(long, global = true, env = "DEPLOYKIT_CHAIN_STATE", default_value = "chain.json")]
    chain_state: PathBuf,

    /// Artifact source group, VERSION=DIR[,DIR]. Repeatable.
    #[arg(long = "source", global = true, value_parser = parse_source)]
    sources: Vec<SourceGroup>,

    /// Extra upgradeable contract, NAME or NAME=dispatcher|router. Repeatable.
    #[arg(long = "upgradeable", global = true, value_parser = parse_upgradeable)]
    upgradeable: Vec<(String, ProxyKind)>,

    /// Blocks required on top of each receipt
    #[arg(long, global = true, env = "DEPLOYKIT_CONFIRMATIONS", default_value_t = 0)]
    confirmations: u64,

    /// Give up waiting for a receipt after this many seconds
    #[arg(long, global = true, env = "DEPLOYKIT_TIMEOUT_SECS", default_value_t = 180)]
    timeout_secs: u64,

    /// Sender address
    #[arg(long, global = true)]
    deployer: Option<Address>,
}

impl WorkspaceArgs {
    fn into_workspace(self) -> Workspace {
        let mut config = DeployConfig {
            confirmations: self.confirmations,
            timeout: Duration::from_secs(self.timeout_secs),
            ..DeployConfig::default()
        };
        for (name, kind) in self.upgradeable {
            config.proxies = config.proxies.with(name, kind);
        }

        let mut ws = Workspace::new(self.registry, self.chain_state)
            .with_sources(self.sources)
            .with_config(config);
        if let Some(deployer) = self.deployer {
            ws.deployer = deployer;
        }
        ws
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a contract; upgradeable contracts also get their proxy
    Deploy {
        name: String,

        /// latest, earliest or an exact version
        #[arg(long, default_value = "latest")]
        version: VersionSelector,

        /// Secret whose commitment guards the new proxy
        #[arg(long, env = "DEPLOYKIT_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
    /// Deploy a new implementation and point the proxy at it
    Upgrade {
        name: String,

        #[arg(long, default_value = "latest")]
        version: VersionSelector,

        /// Secret that opens the proxy's current commitment
        #[arg(long, env = "DEPLOYKIT_SECRET", hide_env_values = true)]
        secret: String,

        /// Secret for the following retarget; only its commitment is sent
        #[arg(long, env = "DEPLOYKIT_NEXT_SECRET", hide_env_values = true)]
        next_secret: String,

        /// Allow skipping intermediate versions
        #[arg(long)]
        allow_version_skip: bool,

        /// Reuse an implementation left behind by a failed upgrade
        #[arg(long)]
        resume: Option<Address>,
    },
    /// Point the proxy back at the previously enrolled implementation
    Rollback {
        name: String,

        #[arg(long, env = "DEPLOYKIT_SECRET", hide_env_values = true)]
        secret: String,

        #[arg(long, env = "DEPLOYKIT_NEXT_SECRET", hide_env_values = true)]
        next_secret: String,
    },
    /// List registry enrollments in append order
    History { name: Option<String> },
    /// List the audit journal
    Timeline,
    /// Show files and the live state of every upgradeable contract
    Inspect,
    /// Check the registry parses and matches the audit journal
    Verify,
    /// Enroll a contract that is live on-chain but missing from the registry
    Reconcile {
        name: String,
        version: Version,
        address: Address,
    },
}

fn main() -> anyhow::Result<()> {
    init_telemetry();

    let cli = Cli::parse();
    let ws = cli.workspace.into_workspace();

    match cli.command {
        Commands::Deploy { name, version, secret } => deploy::run(&ws, &name, version, secret.as_deref()),
        Commands::Upgrade {
            name,
            version,
            secret,
            next_secret,
            allow_version_skip,
            resume,
        } => upgrade::run(
            &ws,
            upgrade::UpgradeArgs {
                name: &name,
                version,
                secret: &secret,
                next_secret: &next_secret,
                allow_version_skip,
                resume,
            },
        ),
        Commands::Rollback {
            name,
            secret,
            next_secret,
        } => rollback::run(&ws, &name, &secret, &next_secret),
        Commands::History { name } => history::run(&ws.registry, name.as_deref()),
        Commands::Timeline => timeline::run(&ws.journal),
        Commands::Inspect => inspect::run(&ws),
        Commands::Verify => verify::run(&ws.registry, &ws.journal),
        Commands::Reconcile { name, version, address } => reconcile::run(&ws, &name, version, address),
    }
}
