use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use embias::analysis::association::DEFAULT_TOPN;
use embias::analysis::bias::BiasOptions;
use embias::analysis::wordlists::{self, BiasAxisKind, BiasAxisTable};
use embias::config::{Config, ModelSpec};
use embias::output::terminal;
use embias::registry::ModelRegistry;
use embias::runner::MultiModelRunner;

/// embias: compare word embedding models for associations, analogies and
/// group bias.
///
/// Models are configured with EMBIAS_MODELS (or --model) and are all
/// analysed side by side.
#[derive(Parser)]
#[command(name = "embias", version, about)]
struct Cli {
    /// Model to load as name=path[:format] (repeatable; replaces EMBIAS_MODELS)
    #[arg(long = "model", global = true)]
    models: Vec<String>,

    /// Read at most this many vectors per model
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the configured models and show their sizes
    Status,

    /// Show the words most similar to WORD in every model
    Associate {
        word: String,

        /// Number of neighbours to show (default: 10)
        #[arg(long, default_value_t = DEFAULT_TOPN)]
        topn: usize,
    },

    /// Solve "MINUS is to A as B is to ?" (A + B - MINUS) in every model
    Analogy {
        positive_a: String,
        positive_b: String,
        minus: String,

        /// Number of candidates to show (default: 10)
        #[arg(long, default_value_t = DEFAULT_TOPN)]
        topn: usize,
    },

    /// Score neutral-word categories for bias along an axis
    Bias {
        /// gender, race, religion, economic (or 0-3)
        #[arg(long, default_value = "gender")]
        axis: String,

        /// Divide scores by the distance between the two group vectors
        #[arg(long)]
        normalize: bool,

        /// Also score the entire vocabulary ("All Words" row; slow on large models)
        #[arg(long)]
        all_words: bool,

        /// Leave out categories with no words in a model instead of failing it
        #[arg(long)]
        skip_empty: bool,
    },

    /// Show the bias axes and neutral-word categories
    Wordlists,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout carries only results (and stays valid
    // JSON under --json)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("embias=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if !cli.models.is_empty() {
        config.models = cli
            .models
            .iter()
            .map(|m| m.parse::<ModelSpec>())
            .collect::<Result<Vec<_>>>()?;
    }
    if cli.limit.is_some() {
        config.model_limit = cli.limit;
    }

    match cli.command {
        Commands::Status => {
            let registry = load_registry(&config)?;
            terminal::display_status(&registry);
        }

        Commands::Associate { word, topn } => {
            let registry = load_registry(&config)?;
            let runs = MultiModelRunner::new(&registry).run_association(&word, topn);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                terminal::display_tables(&format!("Association: {word}"), &runs);
            }
        }

        Commands::Analogy {
            positive_a,
            positive_b,
            minus,
            topn,
        } => {
            let registry = load_registry(&config)?;
            let runs = MultiModelRunner::new(&registry).run_analogy(
                &positive_a,
                &positive_b,
                &minus,
                topn,
            );
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                terminal::display_tables(
                    &format!("Analogy: {positive_a} + {positive_b} - {minus}"),
                    &runs,
                );
            }
        }

        Commands::Bias {
            axis,
            normalize,
            all_words,
            skip_empty,
        } => {
            config.require_word_lists()?;
            let kind: BiasAxisKind = axis.parse()?;
            let axes = BiasAxisTable::load(&config.group_words_path)?;
            let bias_axis = axes.axis(kind)?;
            let categories = wordlists::load_categories(&config.neutral_words_path)?;

            let registry = load_registry(&config)?;
            let options = BiasOptions {
                normalize,
                limit_to_categories: !all_words,
                skip_empty_categories: skip_empty,
            };
            info!(axis = %kind, ?options, models = registry.len(), "Scoring bias");

            let runs = MultiModelRunner::new(&registry).run_bias_score(
                &bias_axis,
                &categories,
                options,
            );
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                terminal::display_bias(&runs);
            }
        }

        Commands::Wordlists => {
            config.require_word_lists()?;
            let axes = BiasAxisTable::load(&config.group_words_path)?;
            let categories = wordlists::load_categories(&config.neutral_words_path)?;
            terminal::display_word_lists(&axes, &categories);
        }
    }

    Ok(())
}

/// Load every configured model into its slot.
///
/// A model that fails to load is reported and skipped; the command only
/// fails if no model could be loaded at all.
fn load_registry(config: &Config) -> Result<ModelRegistry> {
    config.require_models()?;
    let mut registry = ModelRegistry::new(config.slots);

    for (slot, spec) in config.models.iter().enumerate() {
        let path: PathBuf = config.resolve_model_path(&spec.path);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner} {msg} ({elapsed})")
                .context("Invalid progress template")?,
        );
        pb.set_message(format!("Loading {} from {}", spec.name, path.display()));
        pb.enable_steady_tick(Duration::from_millis(120));

        let result = registry.load(slot, spec.name.as_str(), &path, spec.format, config.model_limit);
        pb.finish_and_clear();

        // Progress lines share stderr with the spinner
        match result {
            Ok(()) => eprintln!("  {} {} loaded", "✓".green(), spec.name),
            Err(e) => {
                warn!(model = spec.name.as_str(), error = %e, "Model failed to load");
                eprintln!("  {} {}: {}", "✗".red(), spec.name, e.to_string().red());
            }
        }
    }

    if registry.is_empty() {
        anyhow::bail!("No model could be loaded. Check the paths and formats above.");
    }
    Ok(registry)
}
