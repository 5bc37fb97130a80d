use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use unique_variant_engine::reference::RawUniqueItem;
use unique_variant_engine::{
    Canonicalizer, EngineConfig, ObservedItem, ReferenceBuilder, ReferenceDb, VariantEngine,
};

#[derive(Parser)]
#[command(name = "variant-engine-cli")]
#[command(about = "Unique item variant resolver CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reference database path
    #[arg(short, long, default_value = "pob_export.json")]
    db: PathBuf,

    /// Engine configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve observed items to their variants
    Resolve {
        /// JSON file with one item or an array of items
        items: PathBuf,

        /// Minimum score for a variant to be reported
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Print the full match list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every variant of a reference entry
    Variants {
        /// Item name
        name: String,

        /// Base type
        basetype: String,
    },

    /// Build a reference database from a raw unique export
    Build {
        /// Raw unique items (JSON array)
        raw: PathBuf,

        /// Output path, defaults to --db
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generated uniques to leave out
        #[arg(short, long, value_delimiter = ',')]
        generated: Vec<String>,
    },

    /// Get reference database statistics
    Stats,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsFile {
    Many(Vec<ObservedItem>),
    One(ObservedItem),
}

fn load_db(path: &Path, config: &EngineConfig) -> anyhow::Result<ReferenceDb> {
    let mut db = ReferenceDb::load(path)?;
    db.apply_patches(&config.patches);
    Ok(db)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_ref())?;

    match cli.command {
        Commands::Resolve {
            items,
            threshold,
            json,
        } => {
            let db = load_db(&cli.db, &config)?;
            let engine = VariantEngine::new(&config);
            let threshold = threshold.unwrap_or(engine.threshold());

            let text = std::fs::read_to_string(&items)?;
            let items = match serde_json::from_str::<ItemsFile>(&text)? {
                ItemsFile::Many(items) => items,
                ItemsFile::One(item) => vec![item],
            };

            let mut unresolved = 0;
            for item in &items {
                let matches = engine.resolve(item, &db)?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&matches)?);
                    continue;
                }

                let top = matches.top(threshold);
                if matches.is_empty() {
                    println!("❓ {} ({}): not in reference data", item.name, item.base_type);
                    unresolved += 1;
                } else if top.is_empty() {
                    println!(
                        "❌ {} ({}): no variant at {:.1} (best {:.1})",
                        item.name,
                        item.base_type,
                        threshold,
                        matches.best_score()
                    );
                    unresolved += 1;
                } else {
                    let names: Vec<String> = top
                        .iter()
                        .map(|(name, index)| format!("{} [{}]", name, index))
                        .collect();
                    println!("✅ {} ({}): {}", item.name, item.base_type, names.join(", "));
                }

                if matches.needs_review() {
                    println!("   ⚠️  needs review");
                }
            }

            if !json {
                println!(
                    "\n📋 {} items, {} resolved, {} unresolved",
                    items.len(),
                    items.len() - unresolved,
                    unresolved
                );
            }
        }

        Commands::Variants { name, basetype } => {
            let db = load_db(&cli.db, &config)?;
            let Some(entry) = db.find(&name, &basetype) else {
                anyhow::bail!("No reference entry for {} ({})", name, basetype);
            };

            println!("📦 {} ({} variants)", entry.name, entry.variants.len());
            for variant in entry.materialize() {
                println!(
                    "\n{}. {} [{}]",
                    variant.variant_number, variant.variant_name, variant.basetype
                );
                for generic in &variant.implicits {
                    println!("   implicit: {} {:?}", generic.line, generic.ranges);
                }
                for generic in &variant.explicits {
                    println!("   explicit: {} {:?}", generic.line, generic.ranges);
                }
            }
        }

        Commands::Build {
            raw,
            output,
            generated,
        } => {
            let text = std::fs::read_to_string(&raw)?;
            let raw_items: Vec<RawUniqueItem> = serde_json::from_str(&text)?;

            let builder = ReferenceBuilder::new(Canonicalizer::new(&config.corrections))
                .skip_generated(generated);
            let mut built = builder.build(&raw_items)?;
            built.apply_patches(&config.patches);

            let output = output.unwrap_or(cli.db);
            built.db.save(&output)?;

            println!(
                "✅ Wrote {} entries to {} ({} diagnostics)",
                built.db.len(),
                output.display(),
                built.diagnostics.len()
            );
        }

        Commands::Stats => {
            let db = load_db(&cli.db, &config)?;
            let stats = db.stats();

            println!("📊 Reference Statistics:");
            println!("   Total entries: {}", stats.entries);
            println!("   Multiple variants: {}", stats.multi_variant);
            println!("   Base type changes: {}", stats.multi_basetype);
            println!("   Multiple variant slots: {}", stats.multi_slot);
        }
    }

    Ok(())
}
