//! Development tool that fills a forum snapshot with demo data.

mod seeder;
mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domain::DEFAULT_PAGE_SIZE;
use forum_repository::{Clock, ForumConfig, MemoryStore, ReplyStore, SystemClock, UserStore};

use crate::seeder::SeedPlan;

#[derive(Parser)]
#[command(name = "forum-seed")]
#[command(about = "Populate and inspect a forum snapshot")]
struct Cli {
    /// Snapshot file to read and write
    #[arg(long, env = "FORUM_SNAPSHOT_PATH", global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add demo users, roles, replies and moderation records
    Seed {
        #[arg(long, default_value = "12")]
        users: u32,
        #[arg(long, default_value = "3")]
        topics: i64,
        #[arg(long, default_value = "25")]
        replies_per_topic: u32,
    },
    /// Log user statistics and per-topic reply counts
    Stats {
        /// Topics to summarize
        #[arg(long, default_value = "1")]
        topic: Vec<i64>,
        /// Replies per page when counting a topic's pages
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ForumConfig::from_env();
    if let Some(path) = cli.snapshot {
        config.store.snapshot_path = Some(path);
    }
    if config.store.snapshot_path.is_none() {
        warn!("No snapshot path configured; data will not outlive this process");
    }

    let store = Arc::new(MemoryStore::open(&config.store).await?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let users = UserStore::with_config(store.clone(), clock.clone(), &config.presence);
    let replies = ReplyStore::new(store);

    match cli.command {
        Commands::Seed {
            users: user_count,
            topics,
            replies_per_topic,
        } => {
            let plan = SeedPlan {
                users: user_count,
                topics,
                replies_per_topic,
            };
            info!("Seeding {} users and {} topics", plan.users, plan.topics);

            let report = seeder::seed(&users, &replies, &plan, clock.now()).await?;
            info!(
                "Seeded {} users, {} replies, {} bans, {} warnings",
                report.users, report.replies, report.bans, report.warnings
            );

            let summary = summary::summarize_users(&users).await?;
            summary.log();
        }
        Commands::Stats { topic, page_size } => {
            summary::summarize_users(&users).await?.log();
            for topic_id in topic {
                summary::summarize_topic(&replies, topic_id, page_size).await?.log();
            }
        }
    }

    Ok(())
}
