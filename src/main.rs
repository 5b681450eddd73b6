use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reddit_atom::{Config, Error, GitPublisher};

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// TOML file overriding the defaults
    #[clap(long, short, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Regenerate every feed in the source list
    Update {
        /// Delimited file listing one subreddit per row
        #[clap(long, short)]
        source_list: Option<PathBuf>,
        /// Directory the Atom files are written to
        #[clap(long, short)]
        output_dir: Option<PathBuf>,
        /// Commit changed feed files when done
        #[clap(long, short)]
        publish: bool,
        /// Commit without pushing
        #[clap(long)]
        no_push: bool,
    },
    /// Print the subreddits in the source list with their feed URLs
    Sources {
        #[clap(long, short)]
        source_list: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let mut config = reddit_atom::load_config(cli.config).await?;
    match cli.command {
        Command::Update {
            source_list,
            output_dir,
            publish,
            no_push,
        } => {
            if let Some(path) = source_list {
                config.source_list = path;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            config.publish.enabled |= publish;
            config.publish.push &= !no_push;
            run_update(&config).await
        }
        Command::Sources { source_list } => {
            if let Some(path) = source_list {
                config.source_list = path;
            }
            run_sources(&config).await
        }
        Command::Config => {
            println!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn run_update(config: &Config) -> Result<(), Error> {
    log::debug!("{config}");
    let summary = match reddit_atom::run(config).await {
        Ok(summary) => summary,
        Err(e) if e.is_fatal() => {
            eprintln!("{e}");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    for (identifier, e) in summary.skipped() {
        match identifier {
            Some(id) => println!("Skipped {id}: {e}"),
            None => println!("Skipped row: {e}"),
        }
    }
    if config.publish.enabled {
        let publisher = GitPublisher::new(config.publish.clone());
        if let Err(e) = publisher.publish(&summary.written()).await {
            eprintln!("Publishing failed: {e}");
        }
    }
    Ok(())
}

async fn run_sources(config: &Config) -> Result<(), Error> {
    let sources = match reddit_atom::load_sources(&config.source_list).await {
        Ok(sources) => sources,
        Err(e) if e.is_fatal() => {
            eprintln!("{e}");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    for source in sources {
        match source.and_then(|id| config.feed_url(&id).map(|url| (id, url))) {
            Ok((id, url)) => println!("    `{id}`: {url}"),
            Err(e) => println!("    {e}"),
        }
    }
    Ok(())
}
