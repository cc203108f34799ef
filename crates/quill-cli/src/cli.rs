use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for the `quill` binary.
#[derive(Debug, Parser)]
#[command(name = "quill", version, about = "Quill - federated link aggregator tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Load environment overrides from this file instead of `./.env`
    #[arg(long, global = true)]
    pub env_file: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Raw,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List items from the global feed or an actor's inbox
    Items {
        /// Item hashes
        #[arg(long = "hash")]
        hashes: Vec<String>,
        /// Submitter hashes
        #[arg(long = "author")]
        authors: Vec<String>,
        /// List the inbox of this actor hash instead of the global feed
        #[arg(long)]
        followed_by: Option<String>,
        /// Only items that originate on the hub
        #[arg(long)]
        local: bool,
        /// Include deleted items
        #[arg(long)]
        deleted: bool,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one item
    Item {
        hash: String,
    },
    /// List accounts
    Accounts {
        #[arg(long = "handle")]
        handles: Vec<String>,
        #[arg(long = "hash")]
        hashes: Vec<String>,
    },
    /// Show one account by handle
    Account {
        handle: String,
    },
    /// List open votes
    Votes {
        /// Voter hashes
        #[arg(long = "voter")]
        voters: Vec<String>,
        /// Voted item hashes
        #[arg(long = "item")]
        items: Vec<String>,
    },
    /// Cast, change, or retract a vote
    Vote {
        /// Hash of the voted item
        item: String,
        /// Handle of the voting account
        #[arg(long = "as")]
        voter: String,
        /// Access token of the voting account
        #[arg(long)]
        token: String,
        /// Positive to upvote, negative to downvote, zero to retract
        #[arg(long, allow_hyphen_values = true, default_value_t = 1)]
        weight: i64,
    },
}
