// src/main.rs

use anyhow::{Context, Result};
use aptpool::repository::{PruneOptions, Repository, RepositoryConfig, DEFAULT_KEEP_VERSIONS};
use aptpool::signing::{sign_release, GpgSigner};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration file looked up in the repository root
const CONFIG_FILE: &str = "aptpool.json";

#[derive(Parser)]
#[command(name = "aptpool")]
#[command(author, version, about = "Local APT repository manager", long_about = None)]
struct Cli {
    /// Repository root directory
    #[arg(long, global = true, default_value = ".")]
    repo_root: PathBuf,

    /// Configuration file (default: <repo-root>/aptpool.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Versions to keep per package and architecture
    #[arg(long, global = true, default_value_t = DEFAULT_KEEP_VERSIONS)]
    keep_versions: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the dists/ and pool/ skeleton
    Init,
    /// Add a .deb to the pool, prune, and refresh indices
    Add {
        /// Path to the package file
        package_path: PathBuf,
        /// Distribution whose indices are refreshed
        #[arg(short, long, default_value = "stable")]
        dist: String,
        /// Pool component (default: first configured component)
        #[arg(short, long)]
        component: Option<String>,
    },
    /// Regenerate Packages and Release for a distribution
    Index {
        #[arg(short, long, default_value = "stable")]
        dist: String,
    },
    /// Delete old versions from the pool
    Prune {
        /// Only report what would be deleted
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Sign the Release file of a distribution
    Sign {
        #[arg(short, long, default_value = "stable")]
        dist: String,
        /// Key ID to sign with (default: gpg's default key)
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        shell: Shell,
    },
}

fn load_config(root: &Path, explicit: Option<&Path>) -> Result<RepositoryConfig> {
    if let Some(path) = explicit {
        return Ok(RepositoryConfig::load(path)?);
    }

    let default_path = root.join(CONFIG_FILE);
    if default_path.is_file() {
        Ok(RepositoryConfig::load(&default_path)?)
    } else {
        Ok(RepositoryConfig::default())
    }
}

fn refresh_indices(repo: &Repository, dist: &str) -> Result<()> {
    repo.build_index(dist)
        .with_context(|| format!("Failed to build indices for {dist}"))?;
    let release = repo
        .build_release(dist)
        .with_context(|| format!("Failed to build Release for {dist}"))?;
    println!("Updated {}", release.display());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let open_repo = || -> Result<Repository> {
        let config = load_config(&cli.repo_root, cli.config.as_deref())?;
        Ok(Repository::new(&cli.repo_root, config))
    };
    let prune_options = PruneOptions {
        keep_versions: cli.keep_versions,
        dry_run: false,
    };

    match cli.command {
        Some(Commands::Init) => {
            let repo = open_repo()?;
            repo.init()?;
            println!("Repository initialized at: {}", repo.root().display());
        }
        Some(Commands::Add {
            package_path,
            dist,
            component,
        }) => {
            let repo = open_repo()?;
            let component =
                component.unwrap_or_else(|| repo.config().default_component().to_string());
            info!("Adding {} to {}", package_path.display(), component);

            let entry = repo.add_package(&package_path, &component)?;
            println!(
                "Added {} {} ({}) as {}",
                entry.record.name,
                entry.record.version,
                entry.record.architecture,
                entry.path.display()
            );

            if cli.keep_versions > 0 {
                let result = repo.prune(prune_options)?;
                for path in &result.deleted {
                    println!("Pruned {}", path.display());
                }
            }

            refresh_indices(&repo, &dist)?;
        }
        Some(Commands::Index { dist }) => {
            let repo = open_repo()?;
            refresh_indices(&repo, &dist)?;
        }
        Some(Commands::Prune { dry_run }) => {
            let result = open_repo()?.prune(PruneOptions {
                dry_run,
                ..prune_options
            })?;

            let verb = if dry_run { "Would delete" } else { "Deleted" };
            for path in &result.deleted {
                println!("{verb} {}", path.display());
            }
            println!(
                "{} archive(s) kept, {} {}",
                result.kept.len(),
                result.deleted.len(),
                if dry_run { "to delete" } else { "deleted" }
            );
        }
        Some(Commands::Sign { dist, key }) => {
            let repo = open_repo()?;
            let signer = GpgSigner::new(key);
            let signed = sign_release(&signer, &repo.dist_dir(&dist))?;
            println!("Wrote {}", signed.detached.display());
            println!("Wrote {}", signed.inline.display());
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "aptpool", &mut io::stdout());
        }
        None => {
            // No command provided, show help
            println!("aptpool v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'aptpool --help' for usage information");
        }
    }

    Ok(())
}
