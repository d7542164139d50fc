//! # bookrec CLI
//!
//! Command-line interface for the bookrec hybrid book recommender.
//!
//! bookrec blends content-based and collaborative similarity matrices
//! exported by an offline training job, and resolves free-text titles and
//! authors against the catalog with fuzzy matching.
//!
//! ## Commands
//!
//! - `bookrec recommend <TITLE>` - Hybrid recommendations for a book
//! - `bookrec suggest <PARTIAL>` - Title suggestions for a partial query
//! - `bookrec author <NAME>` - Find a book by author
//! - `bookrec tags <TITLE>` - Descriptive tags of a book
//! - `bookrec top-rated <YEAR>` - Highest rated books of a year
//! - `bookrec years` - Publication years in the catalog
//! - `bookrec surprise` - Recommendations for a random book
//! - `bookrec status` - Catalog statistics
//!
//! ## Examples
//!
//! ```bash
//! # Recommend from a misspelled title, falling back to the author
//! bookrec recommend "harry poter" --author "rowling" -n 5
//!
//! # Pure content-based ranking, JSON output
//! bookrec recommend "Dune" --weight 1.0 --format json
//!
//! # Use a specific artifact directory
//! bookrec --artifacts ./artifacts top-rated 2005
//! ```

use anyhow::{Context, Result};
use bookrec_core::{BookKey, HybridWeight, Recommendation, SelfMatch, TopRated};
use bookrec_query::{EngineConfig, RecommendationEngine};
use bookrec_store::{Catalog, JsonArtifactSource};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "bookrec")]
#[command(about = "A hybrid content/collaborative book recommender")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/bookrec/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Artifact directory (overrides the config file)
    #[arg(short, long, global = true)]
    artifacts: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend books similar to a title
    Recommend {
        /// Book title (fuzzy matched)
        title: String,

        /// Author to fall back on when the title does not match
        #[arg(long)]
        author: Option<String>,

        /// Number of recommendations
        #[arg(short)]
        n: Option<usize>,

        /// Hybrid weight: 1.0 content-based only, 0.0 collaborative only
        #[arg(short, long)]
        weight: Option<f32>,

        /// Leave the queried book out of its own results
        #[arg(long)]
        exclude_query: bool,
    },

    /// Suggest titles for a partial query
    Suggest {
        /// Partial title
        partial: String,

        /// Maximum suggestions
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Find a book by author
    Author {
        /// Author name (fuzzy matched)
        name: String,
    },

    /// Show descriptive tags of a book
    Tags {
        /// Exact title, or book id with --id
        title: String,

        /// Treat the argument as a book id
        #[arg(long)]
        id: bool,

        /// Exclusive upper bound on tag positions
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Highest rated books of a publication year
    TopRated {
        /// Publication year
        year: i32,

        /// Maximum rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List publication years in the catalog
    Years,

    /// Recommendations for a random book
    Surprise {
        /// Number of recommendations
        #[arg(short)]
        n: Option<usize>,

        /// Hybrid weight
        #[arg(short, long)]
        weight: Option<f32>,
    },

    /// Show catalog status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Output structure for recommendations.
#[derive(Serialize)]
struct RecommendOutput {
    query: String,
    matched: String,
    weight: f32,
    recommendations: Vec<Recommendation>,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

/// Output structure for suggestions.
#[derive(Serialize)]
struct SuggestionItem {
    title: String,
    score: f64,
}

/// Output structure for author lookups.
#[derive(Serialize)]
struct AuthorOutput {
    id: i64,
    title: String,
    authors: String,
}

/// Output structure for top rated lists.
#[derive(Serialize)]
struct TopRatedOutput {
    year: i32,
    books: Vec<TopRated>,
}

/// Output structure for surprise picks.
#[derive(Serialize)]
struct SurpriseOutput {
    title: String,
    recommendations: Vec<Recommendation>,
}

/// Output structure for status.
#[derive(Serialize)]
struct StatusOutput {
    artifacts: String,
    books: u64,
    tags: u64,
    tag_associations: u64,
    matrix_dim: u64,
    loaded_at: String,
}

/// Install the tracing subscriber, writing to `logging.file` when set.
fn init_logging(verbose: bool, config: &Config) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse::<Level>()
            .with_context(|| format!("Invalid log level: {}", config.logging.level))?
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    let installed = if let Some(ref path) = config.logging.file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        let subscriber = builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = builder.with_writer(std::io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    installed.context("Failed to set tracing subscriber")
}

/// Load the artifacts and build the engine.
async fn load_engine(
    config: &Config,
    artifacts: Option<PathBuf>,
    self_match: SelfMatch,
) -> Result<(RecommendationEngine, PathBuf)> {
    let dir = artifacts
        .or_else(|| config.artifact_dir())
        .context("Failed to determine artifact directory")?;
    if !dir.exists() {
        anyhow::bail!("Artifact directory does not exist: {}", dir.display());
    }

    let source = JsonArtifactSource::with_files(dir.clone(), config.artifacts.files.clone());
    let catalog = Catalog::load(&source)
        .await
        .with_context(|| format!("Failed to load artifacts from {}", dir.display()))?;

    let engine = RecommendationEngine::new(
        Arc::new(catalog),
        EngineConfig {
            threshold: config.matching.threshold,
            self_match,
        },
    );
    Ok((engine, dir))
}

fn weight_or_default(weight: Option<f32>, config: &Config) -> Result<HybridWeight> {
    let weight = weight.unwrap_or(config.ranking.default_weight);
    HybridWeight::new(weight).context("Weight must be between 0.0 and 1.0")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

/// "Nothing found" line in the requested format.
fn not_found_message(format: OutputFormat, message: &str) -> String {
    match format {
        OutputFormat::Json => serde_json::json!({ "error": message }).to_string(),
        OutputFormat::Text => format!("{message}."),
    }
}

fn print_not_found(format: OutputFormat, message: &str) {
    println!("{}", not_found_message(format, message));
}

fn print_recommendations(recs: &[Recommendation]) {
    for (i, rec) in recs.iter().enumerate() {
        let year = rec.year.map_or_else(|| "n/a".to_string(), |y| y.to_string());
        println!(
            "{:>2}. {} by {} ({}, rating {:.2}, score {:.3})",
            i + 1,
            rec.title,
            rec.authors,
            year,
            rec.rating,
            rec.score
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config from file or CLI-specified path
    let config = if let Some(ref path) = cli.config {
        Config::load_from(Some(path.clone()))
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load().context("Failed to load config")?
    };

    init_logging(cli.verbose, &config)?;

    let self_match = match cli.command {
        Commands::Recommend {
            exclude_query: true,
            ..
        } => SelfMatch::Exclude,
        _ => config.ranking.self_match(),
    };

    if let Commands::Config { ref action } = cli.command {
        match action {
            ConfigAction::Show => match cli.format {
                OutputFormat::Json => print_json(&config)?,
                OutputFormat::Text => {
                    println!(
                        "{}",
                        toml::to_string_pretty(&config).context("Failed to serialize config")?
                    );
                }
            },
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        }
        return Ok(());
    }

    let (engine, artifacts) = load_engine(&config, cli.artifacts.clone(), self_match).await?;

    match cli.command {
        Commands::Recommend {
            title,
            author,
            n,
            weight,
            ..
        } => {
            let n = config
                .ranking
                .clamp_count(n.unwrap_or(config.ranking.default_count));
            let weight = weight_or_default(weight, &config)?;

            let resolved = engine
                .resolve_query(&title, author.as_deref())
                .map(|entry| (entry.id, entry.title.clone(), entry.image_url.clone()));
            let found = resolved.and_then(|(id, matched, image_url)| {
                engine
                    .recommend_for(id, n, weight)
                    .map(|recs| (id, matched, image_url, recs))
            });

            let (id, matched, image_url, recommendations) = match found {
                Ok(found) => found,
                Err(e) => {
                    debug!("No recommendations for {:?}: {}", title, e);
                    print_not_found(cli.format, "No recommendations found");
                    return Ok(());
                }
            };
            let tags = engine
                .tags_for(id, config.tags.max_tags)
                .context("Resolved book has no catalog entry")?;

            match cli.format {
                OutputFormat::Json => print_json(&RecommendOutput {
                    query: title,
                    matched,
                    weight: weight.value(),
                    recommendations,
                    tags,
                    image_url,
                })?,
                OutputFormat::Text => {
                    println!("Recommendations for {matched:?} (weight {:.2})\n", weight.value());
                    print_recommendations(&recommendations);
                    if !tags.is_empty() {
                        println!("\nTags: {}", tags.join(", "));
                    }
                    if let Some(url) = image_url {
                        println!("Cover: {url}");
                    }
                }
            }
        }

        Commands::Suggest { partial, limit } => {
            let limit = limit.unwrap_or(config.matching.suggestion_limit);
            let suggestions: Vec<SuggestionItem> = engine
                .resolve_suggestions(&partial, limit)
                .into_iter()
                .map(|m| SuggestionItem {
                    title: m.value,
                    score: m.score,
                })
                .collect();

            match cli.format {
                OutputFormat::Json => print_json(&suggestions)?,
                OutputFormat::Text => {
                    if suggestions.is_empty() {
                        println!("No suggestions found.");
                    }
                    for s in &suggestions {
                        println!("{:>5.1}  {}", s.score, s.title);
                    }
                }
            }
        }

        Commands::Author { name } => {
            let Some(entry) = engine.resolve_author(&name) else {
                debug!("No confident author match for {:?}", name);
                print_not_found(cli.format, "Author not found");
                return Ok(());
            };

            match cli.format {
                OutputFormat::Json => print_json(&AuthorOutput {
                    id: entry.id,
                    title: entry.title.clone(),
                    authors: entry.authors.clone(),
                })?,
                OutputFormat::Text => println!("{} by {}", entry.title, entry.authors),
            }
        }

        Commands::Tags { title, id, max } => {
            let key = if id {
                BookKey::Id(
                    title
                        .trim()
                        .parse()
                        .with_context(|| format!("Invalid book id: {title}"))?,
                )
            } else {
                BookKey::Title(title)
            };
            let tags = engine
                .tags_for(key, max.unwrap_or(config.tags.max_tags))
                .context("Tag lookup failed")?;

            match cli.format {
                OutputFormat::Json => print_json(&tags)?,
                OutputFormat::Text => {
                    if tags.is_empty() {
                        println!("No tags.");
                    }
                    for tag in &tags {
                        println!("{tag}");
                    }
                }
            }
        }

        Commands::TopRated { year, limit } => {
            let books = engine.top_rated(year, limit.unwrap_or(config.year.limit));

            match cli.format {
                OutputFormat::Json => print_json(&TopRatedOutput { year, books })?,
                OutputFormat::Text => {
                    println!("Top rated books of {year}\n");
                    if books.is_empty() {
                        println!("No books found.");
                    }
                    for (i, book) in books.iter().enumerate() {
                        println!(
                            "{:>2}. {} by {} (rating {:.2})",
                            i + 1,
                            book.title,
                            book.authors,
                            book.rating
                        );
                    }
                }
            }
        }

        Commands::Years => {
            let years = engine.publication_years();
            match cli.format {
                OutputFormat::Json => print_json(&years)?,
                OutputFormat::Text => {
                    for year in years {
                        println!("{year}");
                    }
                }
            }
        }

        Commands::Surprise { n, weight } => {
            let n = config
                .ranking
                .clamp_count(n.unwrap_or(config.ranking.default_count));
            let weight = weight_or_default(weight, &config)?;

            let Some(surprise) = engine.surprise(n, weight) else {
                print_not_found(cli.format, "No recommendations found");
                return Ok(());
            };
            info!("Surprise pick: {:?}", surprise.title);

            match cli.format {
                OutputFormat::Json => print_json(&SurpriseOutput {
                    title: surprise.title,
                    recommendations: surprise.recommendations,
                })?,
                OutputFormat::Text => {
                    println!("Surprise: {}\n", surprise.title);
                    print_recommendations(&surprise.recommendations);
                }
            }
        }

        Commands::Status => {
            let stats = engine.stats();
            match cli.format {
                OutputFormat::Json => print_json(&StatusOutput {
                    artifacts: artifacts.to_string_lossy().to_string(),
                    books: stats.books,
                    tags: stats.tags,
                    tag_associations: stats.tag_associations,
                    matrix_dim: stats.matrix_dim,
                    loaded_at: stats.loaded_at.to_rfc3339(),
                })?,
                OutputFormat::Text => {
                    println!("Catalog Status for {}", artifacts.display());
                    println!("  Books:            {}", stats.books);
                    println!("  Tags:             {}", stats.tags);
                    println!("  Tag associations: {}", stats.tag_associations);
                    println!("  Matrix dimension: {}", stats.matrix_dim);
                    println!(
                        "  Loaded:           {}",
                        stats.loaded_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
        }

        // Handled before loading artifacts
        Commands::Config { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_text() {
        assert_eq!(
            not_found_message(OutputFormat::Text, "No recommendations found"),
            "No recommendations found."
        );
    }

    #[test]
    fn test_not_found_message_json() {
        let line = not_found_message(OutputFormat::Json, "No recommendations found");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["error"], "No recommendations found");
    }

    #[test]
    fn test_surprise_and_recommend_parse_format() {
        let cli = Cli::try_parse_from(["bookrec", "surprise", "--format", "json"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Surprise { n: None, .. }));
    }
}
