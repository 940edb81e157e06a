//! # HomeMatch CLI (`homematch`)
//!
//! Drives the listing pipeline end to end: generate synthetic listings with
//! a language model, load them into a collection, search it, and produce
//! personalized listings from a questionnaire.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `homematch generate` | Generate listings to a JSON Lines file |
//! | `homematch load <file>` | Load listings from a JSON Lines file |
//! | `homematch search "<query>"` | Print the most similar listings |
//! | `homematch personalize` | Personalize listings for a questionnaire |
//! | `homematch collection` | Print the collection name, size, and items |

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

use homematch::config::{self, Config};
use homematch::embedding::create_embedder;
use homematch::generate::{generate_listings, read_listings_jsonl, write_listings_jsonl};
use homematch::inspect::see_collection;
use homematch::llm::create_model;
use homematch::load::load_listings;
use homematch::logging::init_logging;
use homematch::models::Questionnaire;
use homematch::personalize::get_personalized_listings;
use homematch::search::get_listings_from_query;
use homematch::store::memory::InMemoryCollection;

/// HomeMatch: personalized real-estate listings from a language model and
/// a vector collection.
#[derive(Parser)]
#[command(name = "homematch", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply if it is missing.
    #[arg(long, global = true, default_value = "./config/homematch.toml")]
    config: PathBuf,

    /// Enable debug logging for this crate.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic listings with the configured model.
    Generate {
        /// Number of listings to generate.
        #[arg(long, default_value_t = 10)]
        count: usize,

        /// Id of the first generated listing.
        #[arg(long, default_value_t = 1)]
        start_id: u64,

        /// RNG seed; overrides `generation.seed`.
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (JSON Lines).
        #[arg(long)]
        out: PathBuf,

        /// Also load the generated listings into the collection.
        #[arg(long)]
        load: bool,
    },

    /// Load listings from a JSON Lines file into the collection.
    Load {
        file: PathBuf,
    },

    /// Search the collection and print matches as JSON.
    Search {
        query: String,

        /// Number of results; defaults to `retrieval.n_results`.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Personalize the best listing for each questionnaire answer.
    ///
    /// The questionnaire file (TOML or JSON) holds `questions` and
    /// `answers` arrays; the first answer introduces the user.
    Personalize {
        #[arg(long)]
        questionnaire: PathBuf,
    },

    /// Print the collection name, item count, and items.
    Collection,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = read_config(&cli.config)?;

    match cli.command {
        Commands::Generate {
            count,
            start_id,
            seed,
            out,
            load,
        } => {
            let model = create_model(&cfg.model)?;
            let mut rng = match seed.or(cfg.generation.seed) {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let listings = generate_listings(
                start_id,
                count,
                model.as_ref(),
                &mut rng,
                &cfg.generation.place,
            )
            .await?;
            write_listings_jsonl(&out, &listings)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Generated {} listings to {}", listings.len(), out.display());

            if load {
                let collection = open_collection(&cfg).await?;
                let n = load_listings(&listings, &collection).await?;
                collection.persist()?;
                println!("Loaded {} listings into '{}'", n, cfg.store.collection);
            }
        }
        Commands::Load { file } => {
            let listings = read_listings_jsonl(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let collection = open_collection(&cfg).await?;
            let n = load_listings(&listings, &collection).await?;
            collection.persist()?;
            println!("Loaded {} listings into '{}'", n, cfg.store.collection);
        }
        Commands::Search { query, limit } => {
            let collection = open_collection(&cfg).await?;
            let n = limit.unwrap_or(cfg.retrieval.n_results);
            let matches = get_listings_from_query(&query, &collection, n).await?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        Commands::Personalize { questionnaire } => {
            let q = read_questionnaire(&questionnaire)?;
            let model = create_model(&cfg.model)?;
            let collection = open_collection(&cfg).await?;
            let listings =
                get_personalized_listings(&q.questions, &q.answers, model.as_ref(), &collection)
                    .await?;
            println!("{}", serde_json::to_string_pretty(&listings)?);
        }
        Commands::Collection => {
            let collection = open_collection(&cfg).await?;
            let summary = see_collection(&collection).await?;
            println!("Collection: {}", summary.name);
            println!("Number of Items: {}", summary.count);
            println!();
            println!("Items in Collection:");
            for item in &summary.items {
                println!("{}", serde_json::to_string(item)?);
            }
        }
    }

    Ok(())
}

fn read_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return config::load_config(path);
    }
    tracing::warn!(path = %path.display(), "config file not found; using defaults");
    let cfg = Config::default();
    config::validate(&cfg)?;
    Ok(cfg)
}

async fn open_collection(cfg: &Config) -> Result<InMemoryCollection> {
    let embedder = create_embedder(&cfg.embedding)?;
    match &cfg.store.snapshot {
        Some(path) => Ok(InMemoryCollection::open(&cfg.store.collection, embedder, path)
            .await
            .with_context(|| format!("Failed to open collection at {}", path.display()))?),
        None => {
            tracing::warn!("store.snapshot not set; collection will not outlive this command");
            Ok(InMemoryCollection::new(&cfg.store.collection, embedder))
        }
    }
}

fn read_questionnaire(path: &Path) -> Result<Questionnaire> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read questionnaire: {}", path.display()))?;
    let q: Questionnaire = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => toml::from_str(&content)?,
    };
    if q.questions.len() != q.answers.len() {
        tracing::warn!(
            questions = q.questions.len(),
            answers = q.answers.len(),
            "questionnaire has unequal numbers of questions and answers"
        );
    }
    Ok(q)
}
