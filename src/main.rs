use anyhow::Result;
use clap::{Parser, Subcommand};
use lexdeck::add::add;
use lexdeck::init::init;
use lexdeck::reset::reset;
use lexdeck::review::{review, ReviewOptions};
use lexdeck::select::DAILY_NEW_CARDS;
use lexdeck::stats::stats;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Subcommand)]
enum Command {
    /// Create a new card box from word lists (CSV with english,hebrew columns)
    Init {
        /// Path to card box (directory)
        path: PathBuf,
        /// One deck per word list, named after the file
        #[arg(required = true)]
        word_lists: Vec<PathBuf>,
        /// Name of the learner owning the decks
        #[arg(long)]
        owner: String,
    },
    /// Add a deck from a word list to an existing card box
    Add {
        path: PathBuf,
        word_list: PathBuf,
        /// Deck name, defaults to the file name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Review the due cards of a deck
    Review {
        path: PathBuf,
        deck: String,
        /// New cards introduced per day
        #[arg(long, default_value_t = DAILY_NEW_CARDS)]
        new_per_day: u32,
        /// Seed for a reproducible card order
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show due cards, streaks and review intervals
    Stats {
        path: PathBuf,
        #[arg(long, default_value_t = DAILY_NEW_CARDS)]
        new_per_day: u32,
    },
    /// Mark all cards of a deck (or of every deck) as new
    Reset { path: PathBuf, deck: Option<String> },
}

/// Spaced-repetition vocabulary trainer.
#[derive(Parser)]
#[command(name = "lexdeck", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexdeck=warn")),
        )
        .init();

    let args = Cli::parse();

    match args.command {
        Command::Init {
            path,
            word_lists,
            owner,
        } => init(&path, &owner, &word_lists),
        Command::Add {
            path,
            word_list,
            name,
            owner,
        } => add(&path, &word_list, name.as_deref(), owner.as_deref()),
        Command::Review {
            path,
            deck,
            new_per_day,
            seed,
        } => review(
            &path,
            &deck,
            &ReviewOptions {
                daily_new_cards: new_per_day,
                seed,
            },
        ),
        Command::Stats { path, new_per_day } => stats(&path, new_per_day),
        Command::Reset { path, deck } => reset(&path, deck.as_deref()),
    }
}
