// CLI Interface
//
// *L'Interface* (The Interface) - Command-line host for the settings search engine

use crate::config::EngineConfig;
use crate::debounce::{settle_and_search, QuerySlot};
use crate::errors::PasserelleError;
use crate::startup::{read_catalog, Engine, NoDiscovery};
use anyhow::Result as AnyhowResult;
use clap::{Parser, Subcommand};
use lerecherche::SearchResult;
use lestockage::IndexCache;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Catalog file used when `--catalog` is not given
pub const DEFAULT_CATALOG_FILE: &str = "catalog.json";

/// Reglages - Settings search engine
#[derive(Parser, Debug)]
#[command(name = "reglages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search system settings pages by name, synonym or meaning", long_about = None)]
pub struct Cli {
    /// Path to the catalog JSON document
    #[arg(global = true, long = "catalog", short = 'c')]
    pub catalog: Option<PathBuf>,

    /// Path to the TOML configuration file
    #[arg(global = true, long = "config")]
    pub config: Option<PathBuf>,

    /// Platform build number, overriding the configuration
    #[arg(global = true, long = "build")]
    pub build: Option<u32>,

    /// Skip the on-disk index cache
    #[arg(global = true, long = "no-cache")]
    pub no_cache: bool,

    /// Enable verbose logging
    #[arg(global = true, long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank catalog items for a query
    Search {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// Maximum number of results
        #[arg(long = "limit", short = 'n')]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// List items in browse order (empty query)
    Browse {
        /// Maximum number of results
        #[arg(long = "limit", short = 'n')]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Validate a catalog file and print its fingerprint
    Fingerprint {
        /// Catalog file; defaults to --catalog
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Read queries from stdin, one per line, as if typed
    Repl {
        /// Maximum number of results per query
        #[arg(long = "limit", short = 'n')]
        limit: Option<usize>,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Delete the on-disk index cache
    ClearCache,
}

impl Cli {
    /// Run the CLI
    pub async fn run(self) -> AnyhowResult<()> {
        init_logging(self.verbose);

        let config = self.effective_config()?;
        let catalog = self
            .catalog
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILE));

        match self.command {
            Commands::Search { query, limit, json } => {
                let engine = Engine::start_from_path(&catalog, &config, &NoDiscovery);
                let limit = limit.unwrap_or(engine.max_results());
                print_results(&engine.search_with_limit(&query, limit), json)
            }
            Commands::Browse { limit, json } => {
                let engine = Engine::start_from_path(&catalog, &config, &NoDiscovery);
                let limit = limit.unwrap_or(engine.max_results());
                print_results(&engine.search_with_limit("", limit), json)
            }
            Commands::Fingerprint { file } => {
                let file = file.unwrap_or(catalog);
                let (parsed, fingerprint) = read_catalog(&file).map_err(explain)?;
                println!("{}  {} items  {}", fingerprint, parsed.len(), file.display());
                Ok(())
            }
            Commands::Repl { limit } => {
                let mut config = config;
                if let Some(limit) = limit {
                    config.search.max_results = limit;
                }
                let engine = Engine::start_from_path(&catalog, &config, &NoDiscovery);
                repl(engine, config.quiet_window()).await
            }
            Commands::Config => {
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
            Commands::ClearCache => {
                let Some(dir) = config.cache_directory() else {
                    println!("No cache directory on this platform");
                    return Ok(());
                };
                let cache = IndexCache::new(&dir);
                let removed = cache
                    .clear()
                    .map_err(|e| explain(PasserelleError::from(e)))?;
                if removed {
                    println!("Removed {}", cache.path().display());
                } else {
                    println!("No cache at {}", cache.path().display());
                }
                Ok(())
            }
        }
    }

    /// Configuration file merged with command-line overrides
    pub fn effective_config(&self) -> AnyhowResult<EngineConfig> {
        let mut config = match self.config.clone().or_else(EngineConfig::default_path) {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(build) = self.build {
            config.platform.build_number = Some(build);
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
        Ok(config)
    }
}

/// Parse arguments and run
pub async fn main() -> AnyhowResult<()> {
    Cli::parse().run().await
}

/// Install the stderr subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn explain(error: PasserelleError) -> anyhow::Error {
    if let Some(hint) = error.suggestion() {
        eprintln!("hint: {}", hint);
    }
    error.into()
}

async fn repl(engine: Engine, quiet: std::time::Duration) -> AnyhowResult<()> {
    let engine = Arc::new(engine);
    let slot = Arc::new(QuerySlot::new(quiet));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let ticket = slot.submit(line);
        let (slot, engine) = (slot.clone(), engine.clone());
        pending.push(tokio::spawn(async move {
            if let Some((ticket, results)) = settle_and_search(&slot, &engine, ticket).await {
                println!("> {}", ticket.query());
                for line in render_text(&results) {
                    println!("{}", line);
                }
            }
        }));
    }

    for task in pending {
        task.await?;
    }
    Ok(())
}

fn print_results(results: &[SearchResult], json: bool) -> AnyhowResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        for line in render_text(results) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Two lines per result: rank, score and name, then match details and launch
fn render_text(results: &[SearchResult]) -> Vec<String> {
    if results.is_empty() {
        return vec!["No results".to_string()];
    }

    let mut lines = Vec::with_capacity(results.len() * 2);
    for (rank, result) in results.iter().enumerate() {
        let unavailable = if result.item.available {
            ""
        } else {
            "  (unavailable)"
        };
        lines.push(format!(
            "{:>2}. {:>6.1}  {}{}",
            rank + 1,
            result.score,
            result.item.display_name(),
            unavailable
        ));

        let hint = result
            .match_hint()
            .map(|h| format!("  {}", h))
            .unwrap_or_default();
        lines.push(format!(
            "            {}/{}{}  -> {}",
            result.kind,
            result.matched_on,
            hint,
            result.item.item.launch.command_line()
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use lecatalogue::{CatalogItem, ResolvedItem};

    #[test]
    fn test_parse_search_with_globals() {
        let cli = Cli::try_parse_from([
            "reglages", "search", "dispaly", "--limit", "3", "--build", "22631", "--no-cache",
        ])
        .expect("parse");

        assert_eq!(cli.build, Some(22631));
        assert!(cli.no_cache);
        match cli.command {
            Commands::Search { query, limit, json } => {
                assert_eq!(query, "dispaly");
                assert_eq!(limit, Some(3));
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["reglages"]).is_err());
        assert!(Cli::try_parse_from(["reglages", "search"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[platform]\nbuild_number = 19045\n").expect("write");

        let cli = Cli::try_parse_from([
            "reglages",
            "--config",
            config_path.to_str().expect("utf-8 path"),
            "--build",
            "26100",
            "--no-cache",
            "browse",
        ])
        .expect("parse");

        let config = cli.effective_config().expect("config");
        assert_eq!(config.platform.build_number, Some(26100));
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_render_text_shows_hint_and_launch() {
        let item = CatalogItem::new("sound", "Sound").with_synonyms(["volume"]);
        let results = vec![SearchResult {
            item: Arc::new(ResolvedItem::new(item, false)),
            score: 60.0,
            kind: lerecherche::MatchKind::SynonymExact,
            matched_on: lerecherche::MatchLocus::Synonym,
            matched_text: Some("volume".to_string()),
        }];

        let lines = render_text(&results);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Sound"));
        assert!(lines[0].contains("(unavailable)"));
        assert!(lines[1].contains("Matched: volume"));
        assert!(lines[1].contains("synonym-exact/synonym"));
    }

    #[test]
    fn test_render_text_empty() {
        assert_eq!(render_text(&[]), vec!["No results".to_string()]);
    }
}
