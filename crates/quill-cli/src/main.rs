use anyhow::Context;
use clap::Parser;
use quill_config::QuillConfig;
use quill_core::{
    Filters, Hash, Item, LoadAccountsFilter, LoadItemsFilter, LoadVotesFilter, OAuthToken,
    SCORE_MULTIPLIER, Vote,
};
use quill_federation::{Caller, Repository};

mod cli;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("quill error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = load_config(cli.env_file.as_deref())?;
    let repo = Repository::from_config(&config).context("failed to initialize hub client")?;
    tracing::debug!(api = config.hub.api_url(), "hub client ready");

    let anonymous = Caller::anonymous();
    match cli.command {
        Commands::Items {
            hashes,
            authors,
            followed_by,
            local,
            deleted,
            page,
        } => {
            let filters = Filters {
                items: LoadItemsFilter {
                    key: hashes.into_iter().map(Hash::from).collect(),
                    attributed_to: authors.into_iter().map(Hash::from).collect(),
                    followed_by: followed_by.into_iter().collect(),
                    federated: if local { vec![false] } else { Vec::new() },
                    deleted: if deleted { Vec::new() } else { vec![false] },
                    ..LoadItemsFilter::default()
                },
                max_items: cli.limit,
                page,
                ..Filters::default()
            };
            let items = repo
                .load_items(&anonymous, &filters)
                .await
                .context("failed to load items")?;
            output::output(&items, cli.format)
        }
        Commands::Item { hash } => {
            let item = repo
                .load_item(&anonymous, &Filters::items_by_key([Hash::from(hash)]))
                .await
                .context("failed to load item")?;
            output::output(&item, cli.format)
        }
        Commands::Accounts { handles, hashes } => {
            let filters = Filters {
                accounts: LoadAccountsFilter {
                    key: hashes.into_iter().map(Hash::from).collect(),
                    handle: handles,
                    ..LoadAccountsFilter::default()
                },
                max_items: cli.limit,
                ..Filters::default()
            };
            let accounts = repo
                .load_accounts(&anonymous, &filters)
                .await
                .context("failed to load accounts")?;
            output::output(&accounts, cli.format)
        }
        Commands::Account { handle } => {
            let account = repo
                .load_account(&anonymous, &Filters::accounts_by_handle(handle))
                .await
                .context("failed to load account")?;
            output::output(&account, cli.format)
        }
        Commands::Votes { voters, items } => {
            let filters = Filters {
                votes: LoadVotesFilter {
                    attributed_to: voters.into_iter().map(Hash::from).collect(),
                    item_key: items.into_iter().map(Hash::from).collect(),
                },
                max_items: cli.limit,
                ..Filters::default()
            };
            let votes = repo
                .load_votes(&anonymous, &filters)
                .await
                .context("failed to load votes")?;
            output::output(&votes, cli.format)
        }
        Commands::Vote {
            item,
            voter,
            token,
            weight,
        } => {
            let mut account = repo
                .load_account(&anonymous, &Filters::accounts_by_handle(&voter))
                .await
                .with_context(|| format!("failed to load voter {voter}"))?;
            account.metadata.get_or_insert_with(Default::default).oauth = Some(OAuthToken {
                access_token: token,
                refresh_token: String::new(),
            });
            let vote = Vote {
                submitted_by: Some(account.clone()),
                item: Some(Item {
                    hash: Hash::from(item),
                    ..Item::default()
                }),
                weight: weight.signum() * SCORE_MULTIPLIER,
                ..Vote::default()
            };
            let saved = repo
                .save_vote(&Caller::local(&account), &vote)
                .await
                .context("failed to save vote")?;
            output::output(&saved, cli.format)
        }
    }
}

fn load_config(env_file: Option<&str>) -> anyhow::Result<QuillConfig> {
    let Some(path) = env_file else {
        return QuillConfig::load_with_dotenv().context("failed to load configuration");
    };
    dotenvy::from_path(path).with_context(|| format!("failed to read env file {path}"))?;
    QuillConfig::load().context("failed to load configuration")
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("QUILL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
