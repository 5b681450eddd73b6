mod config;
mod emit;
mod error;
mod feed;
mod fetch;
mod parse;
mod publish;
mod run;
mod source;

pub use config::{load_config, Config, PublishConfig};
pub use emit::{render_atom, write_atomic, ATOM_NS};
pub use error::Error;
pub use feed::{Author, Category, EntryBody, ParsedEntry, ParsedFeed};
pub use fetch::{build_client, fetch_feed_text};
pub use parse::parse_feed;
pub use publish::GitPublisher;
pub use run::{process_feed, run, Outcome, Processed, RunSummary};
pub use source::{load_sources, parse_sources, FeedIdentifier};

pub(crate) type Result<T = (), E = Error> = std::result::Result<T, E>;
