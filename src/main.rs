//! strongbox-config
//!
//! Command-line adapter over the configuration manager. Every subcommand maps
//! to exactly one manager operation; `watch` keeps a manager open and reloads
//! the document whenever it changes on disk.

use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use strongbox_config::config::loader::{load_or_default, SettingsError};
use strongbox_config::config::watcher::ConfigWatcher;
use strongbox_config::config::Settings;
use strongbox_config::lifecycle::{signals, startup, Shutdown};
use strongbox_config::observability::{logging, metrics};
use strongbox_config::routing::{Candidate, RoutingDecision};
use strongbox_config::{
    ConfigurationError, ConfigurationManager, Document, ProxyConfiguration, Repository,
    RoutingRule, RuleKind, RuleSet, StoreError, Storage,
};

#[derive(Parser)]
#[command(name = "strongbox-config")]
#[command(about = "Manage the strongbox configuration document", long_about = None)]
struct Cli {
    /// Settings file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Configuration document path, overriding the settings file.
    #[arg(short, long)]
    document: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Server port
    Port {
        #[command(subcommand)]
        action: PortAction,
    },
    /// Server base URL
    BaseUrl {
        #[command(subcommand)]
        action: BaseUrlAction,
    },
    /// Outbound proxy configuration
    Proxy {
        #[command(subcommand)]
        action: ProxyAction,
    },
    /// Storages
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },
    /// Repositories within a storage
    Repository {
        #[command(subcommand)]
        action: RepositoryAction,
    },
    /// The whole configuration document
    Configuration {
        #[command(subcommand)]
        action: ConfigurationAction,
    },
    /// Routing rule sets and rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Keep running and reload the document when it changes
    Watch,
}

#[derive(Subcommand)]
enum PortAction {
    Get,
    Set { port: i64 },
}

#[derive(Subcommand)]
enum BaseUrlAction {
    Get,
    Set { url: String },
}

#[derive(Subcommand)]
enum ProxyAction {
    /// Print the global proxy, or a repository's with --storage/--repository
    Get {
        #[arg(long, requires = "repository")]
        storage: Option<String>,
        #[arg(long, requires = "storage")]
        repository: Option<String>,
    },
    /// Set the global proxy from a document file ('-' for stdin)
    Set { file: PathBuf },
}

#[derive(Subcommand)]
enum StorageAction {
    Add {
        file: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
    Get { id: String },
    Delete {
        id: String,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum RepositoryAction {
    /// Add or update a repository of STORAGE from a document file
    Add { storage: String, file: PathBuf },
    Get { storage: String, id: String },
    Delete {
        storage: String,
        id: String,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ConfigurationAction {
    Get,
    Set { file: PathBuf },
}

#[derive(Args)]
struct KindArg {
    /// Operate on denied instead of accepted rules
    #[arg(long)]
    denied: bool,
}

impl KindArg {
    fn kind(&self) -> RuleKind {
        if self.denied {
            RuleKind::Denied
        } else {
            RuleKind::Accepted
        }
    }
}

#[derive(Subcommand)]
enum RulesAction {
    SetAccepted { file: PathBuf },
    SetDenied { file: PathBuf },
    Get {
        group: String,
        #[command(flatten)]
        kind: KindArg,
    },
    Remove {
        group: String,
        #[command(flatten)]
        kind: KindArg,
    },
    /// Union the repositories of a rule document into the matching rule
    AddRepositories {
        group: String,
        file: PathBuf,
        #[command(flatten)]
        kind: KindArg,
    },
    RemoveRepository {
        group: String,
        repository: String,
        #[arg(long)]
        pattern: String,
        #[command(flatten)]
        kind: KindArg,
    },
    /// Replace the repositories of the matching rule
    OverrideRepositories {
        group: String,
        file: PathBuf,
        #[command(flatten)]
        kind: KindArg,
    },
    /// Evaluate the rules of GROUP for a repository and artifact path
    Match {
        group: String,
        repository: String,
        path: String,
        #[arg(long)]
        storage: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to read {}: {source}", .path.display())]
    Input { path: PathBuf, source: std::io::Error },

    #[error("watch failed: {0}")]
    Watch(#[from] notify::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Configuration(ConfigurationError::Validation(_)) => ExitCode::from(2),
            CliError::Configuration(ConfigurationError::NotFound(_)) => ExitCode::from(3),
            CliError::Configuration(ConfigurationError::Conflict(_)) => ExitCode::from(4),
            CliError::Configuration(ConfigurationError::Persistence(_)) | CliError::Store(_) => {
                ExitCode::from(5)
            }
            _ => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match load_or_default(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}", e);
            return CliError::from(e).exit_code();
        }
    };
    if let Some(document) = &cli.document {
        settings.store.path = document.display().to_string();
    }

    logging::init(&logging::directive_for(&settings.observability.log_level));

    match run(cli.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            e.exit_code()
        }
    }
}

async fn run(command: Commands, settings: &Settings) -> Result<(), CliError> {
    let manager = startup::open_manager(settings)?;

    match command {
        Commands::Port { action } => match action {
            PortAction::Get => println!("{}", manager.port()),
            PortAction::Set { port } => manager.set_port(port)?,
        },
        Commands::BaseUrl { action } => match action {
            BaseUrlAction::Get => println!("{}", manager.base_url()),
            BaseUrlAction::Set { url } => manager.set_base_url(&url)?,
        },
        Commands::Proxy { action } => match action {
            ProxyAction::Get { storage, repository } => {
                let scope = storage.as_deref().zip(repository.as_deref());
                match manager.proxy_configuration(scope)? {
                    Some(proxy) => println!("{}", proxy.encode()?),
                    None => println!("null"),
                }
            }
            ProxyAction::Set { file } => {
                manager.set_proxy_configuration(ProxyConfiguration::decode(&read_input(&file)?)?)?
            }
        },
        Commands::Storage { action } => match action {
            StorageAction::Add { file, overwrite } => {
                manager.add_or_update_storage(Storage::decode(&read_input(&file)?)?, overwrite)?
            }
            StorageAction::Get { id } => println!("{}", manager.storage(&id)?.encode()?),
            StorageAction::Delete { id, force } => manager.delete_storage(&id, force)?,
        },
        Commands::Repository { action } => match action {
            RepositoryAction::Add { storage, file } => {
                let repository = Repository::decode(&read_input(&file)?)?.in_storage(storage);
                manager.add_or_update_repository(repository)?
            }
            RepositoryAction::Get { storage, id } => {
                println!("{}", manager.repository(&storage, &id)?.encode()?)
            }
            RepositoryAction::Delete { storage, id, force } => {
                manager.delete_repository(&storage, &id, force)?
            }
        },
        Commands::Configuration { action } => match action {
            ConfigurationAction::Get => println!("{}", manager.configuration().encode()?),
            ConfigurationAction::Set { file } => {
                let config = strongbox_config::Configuration::decode(&read_input(&file)?)?;
                manager.set_configuration(config)?
            }
        },
        Commands::Rules { action } => run_rules(&manager, action)?,
        Commands::Watch => watch(manager, settings).await?,
    }
    Ok(())
}

fn run_rules(manager: &ConfigurationManager, action: RulesAction) -> Result<(), CliError> {
    match action {
        RulesAction::SetAccepted { file } => {
            manager.set_accepted_rule_set(RuleSet::decode(&read_input(&file)?)?)?
        }
        RulesAction::SetDenied { file } => {
            manager.set_denied_rule_set(RuleSet::decode(&read_input(&file)?)?)?
        }
        RulesAction::Get { group, kind } => {
            println!("{}", manager.rule_set(kind.kind(), &group)?.encode()?)
        }
        RulesAction::Remove { group, kind } => manager.remove_rule_set(kind.kind(), &group)?,
        RulesAction::AddRepositories { group, file, kind } => {
            let rule = RoutingRule::decode(&read_input(&file)?)?;
            manager.add_repositories_to_rule(kind.kind(), &group, &rule.pattern, rule.repositories)?
        }
        RulesAction::RemoveRepository { group, repository, pattern, kind } => {
            manager.remove_repository_from_rule(kind.kind(), &group, &pattern, &repository)?
        }
        RulesAction::OverrideRepositories { group, file, kind } => {
            let rule = RoutingRule::decode(&read_input(&file)?)?;
            let repositories: BTreeSet<String> = rule.repositories;
            manager.override_repositories_for_rule(kind.kind(), &group, &rule.pattern, repositories)?
        }
        RulesAction::Match { group, repository, path, storage } => {
            let matcher = manager.routing_matcher()?;
            let candidate = match storage.as_deref() {
                Some(storage) => Candidate::in_storage(storage, &repository),
                None => Candidate::new(&repository),
            };
            match matcher.decide(&group, &candidate, &path) {
                RoutingDecision::Accepted(rule) => println!("accepted by '{}'", rule.pattern),
                RoutingDecision::Denied(rule) => println!("denied by '{}'", rule.pattern),
                RoutingDecision::Unmatched => println!("unmatched"),
            }
        }
    }
    Ok(())
}

async fn watch(manager: Arc<ConfigurationManager>, settings: &Settings) -> Result<(), CliError> {
    if let Some(addr) = &settings.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);
    let mut shutdown_rx = shutdown.subscribe();

    if !settings.watch.enabled {
        tracing::info!("Watching disabled in settings, waiting for shutdown");
        let _ = shutdown_rx.recv().await;
        return Ok(());
    }

    let (watcher, mut changes) = ConfigWatcher::new(
        Path::new(&settings.store.path),
        Duration::from_secs(settings.watch.poll_interval_secs),
    );
    // Keep the watcher alive until shutdown.
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(path) = change else { break };
                tracing::debug!(path = ?path, "Reloading configuration");
                if let Err(e) = manager.reload() {
                    tracing::debug!(error = %e, "Keeping current configuration");
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn read_input(path: &Path) -> Result<String, CliError> {
    let io_err = |source| CliError::Input {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(io_err)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(io_err)
    }
}
