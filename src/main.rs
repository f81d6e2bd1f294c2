use clap::{Parser, Subcommand};
use pawfeed::config::{self, LoggingConfig, PawfeedConfig};
use pawfeed::feed::{FeedOrder, FeedRanker};
use pawfeed::types::Post;
use pawfeed::{output, process};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once at startup, so the leak is bounded
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pawfeed")]
#[command(about = "Feed ranking and upload compression for pet photo posts")]
#[command(long_about = "\
Feed ranking and upload compression for pet photo posts

rank      Orders a JSON array of posts by recency and engagement, with a
          random shuffle. The order is kept in a session file and reused
          until a post is added or removed, so likes and comments never
          reshuffle the feed. --refresh sorts newest-first once.

compress  Fits images into the upload box (1200x1200 by default) and
          re-encodes them as JPEG, stepping quality down from 0.8 to 0.3
          until each one is under the 800 KB budget.

Run 'pawfeed gen-config' to generate a documented pawfeed.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "pawfeed.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank a feed of posts
    Rank {
        /// JSON file holding an array of posts
        #[arg(long)]
        posts: PathBuf,
        /// Session file holding the cached order between runs
        #[arg(long, default_value = ".pawfeed-session.json")]
        session: PathBuf,
        /// Sort newest-first for this run (e.g. right after publishing)
        #[arg(long)]
        refresh: bool,
        /// Seed for the random shuffle (reproducible orders)
        #[arg(long)]
        seed: Option<u64>,
        /// Print the ranked posts as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Compress images for upload
    Compress {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Where to write the JPEGs
        #[arg(long, default_value = "compressed")]
        out_dir: PathBuf,
        /// Override compression.max_width
        #[arg(long)]
        max_width: Option<u32>,
        /// Override compression.max_height
        #[arg(long)]
        max_height: Option<u32>,
        /// Override compression.quality (0.0-1.0)
        #[arg(long)]
        quality: Option<f32>,
    },
    /// Print a stock pawfeed.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Rank {
            posts,
            session,
            refresh,
            seed,
            json,
        } => {
            let site_config = load_config(&cli.config)?;
            let content = std::fs::read_to_string(&posts)?;
            let posts: Vec<Post> = serde_json::from_str(&content)?;
            let posts = drop_unidentified(posts);

            let mut order = FeedOrder::load(&session);
            if refresh {
                order.request_refresh();
            }
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut ranker = FeedRanker::with_rng(site_config.ranking.weights(), rng);
            let ranking = ranker.rank(&posts, &mut order);
            order.save(&session)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&ranking.posts)?);
            } else {
                output::print_rank_output(&ranking, &order);
            }
        }
        Command::Compress {
            inputs,
            out_dir,
            max_width,
            max_height,
            quality,
        } => {
            let mut site_config = load_config(&cli.config)?;
            let compression = &mut site_config.compression;
            if let Some(w) = max_width {
                compression.max_width = w;
            }
            if let Some(h) = max_height {
                compression.max_height = h;
            }
            if let Some(q) = quality {
                compression.quality = q;
            }
            site_config.validate()?;

            init_thread_pool(&site_config.processing);
            let sources = process::collect_images(&inputs)?;
            let compress_config = site_config.compression.to_compress_config();

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_compress_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::compress_files(&sources, &out_dir, &compress_config, Some(tx))?;
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            println!();
            println!("{}", output::format_compress_summary(&result));
            if !result.failed.is_empty() {
                return Err(format!("{} image(s) failed to compress", result.failed.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load and validate the config, then install logging from it.
fn load_config(path: &Path) -> Result<PawfeedConfig, Box<dyn std::error::Error>> {
    let site_config = config::load_config(path)?;
    init_logging(&site_config.logging)?;
    Ok(site_config)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the config.
fn init_logging(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level_filter()?.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| format!("failed to install tracing subscriber: {err}").into())
}

/// Posts without an id can't be tracked across renders; skip them.
fn drop_unidentified(posts: Vec<Post>) -> Vec<Post> {
    let total = posts.len();
    let kept: Vec<Post> = posts
        .into_iter()
        .filter(|p| !p.id.trim().is_empty())
        .collect();
    if kept.len() != total {
        tracing::warn!(skipped = total - kept.len(), "skipping posts without an id");
    }
    kept
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores; config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
