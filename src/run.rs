use std::path::PathBuf;

use reqwest::Client;

use crate::{
    emit, fetch,
    parse::parse_feed,
    source::{load_sources, FeedIdentifier},
    Config, Error, Result,
};

/// What happened to one row of the source list
#[derive(Debug)]
pub enum Outcome {
    Written(PathBuf),
    Skipped(Error),
}

#[derive(Debug)]
pub struct Processed {
    /// `None` when the row itself could not name a feed
    pub identifier: Option<FeedIdentifier>,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: Vec<Processed>,
}

impl RunSummary {
    /// Every output file written this run, in source order
    pub fn written(&self) -> Vec<PathBuf> {
        self.processed
            .iter()
            .filter_map(|p| match &p.outcome {
                Outcome::Written(path) => Some(path.clone()),
                Outcome::Skipped(_) => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (Option<&FeedIdentifier>, &Error)> {
        self.processed.iter().filter_map(|p| match &p.outcome {
            Outcome::Skipped(e) => Some((p.identifier.as_ref(), e)),
            Outcome::Written(_) => None,
        })
    }
}

/// Regenerate every feed named in the source list.
///
/// Only a missing source list fails the run; anything that goes wrong
/// for one feed is recorded in the summary and the next feed is tried.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let sources = load_sources(&config.source_list).await?;
    let client = fetch::build_client(config)?;
    let mut summary = RunSummary::default();
    for source in sources {
        let processed = match source {
            Ok(identifier) => {
                let outcome = match process_feed(config, &client, &identifier).await {
                    Ok(path) => Outcome::Written(path),
                    Err(e) => {
                        log::warn!("skipping r/{identifier}: {e}");
                        Outcome::Skipped(e)
                    }
                };
                Processed {
                    identifier: Some(identifier),
                    outcome,
                }
            }
            Err(e) => {
                log::warn!("skipping source row: {e}");
                Processed {
                    identifier: None,
                    outcome: Outcome::Skipped(e),
                }
            }
        };
        summary.processed.push(processed);
    }
    log::info!(
        "wrote {} feeds, skipped {}",
        summary.written().len(),
        summary.skipped().count()
    );
    Ok(summary)
}

/// Fetch, normalize and write a single feed
pub async fn process_feed(
    config: &Config,
    client: &Client,
    identifier: &FeedIdentifier,
) -> Result<PathBuf> {
    let url = config.feed_url(identifier)?;
    log::info!("Processing {url}");
    let raw = fetch::fetch_feed_text(client, &url).await?;
    let feed = parse_feed(&raw, identifier, &url);
    let bytes = emit::render_atom(&feed)?;
    let path = config.output_path(identifier);
    emit::write_atomic(&path, &bytes).await?;
    log::debug!("wrote {} entries to `{}`", feed.entries.len(), path.display());
    Ok(path)
}
