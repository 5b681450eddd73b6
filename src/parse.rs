use feed_rs::parser;
use url::Url;

use crate::{feed::ParsedFeed, source::FeedIdentifier};

/// Parse Atom, RSS or JSON feed text.
///
/// Never fails: a document that is not a recognizable feed yields the
/// placeholder feed with no entries.
pub fn parse_feed(raw: &str, identifier: &FeedIdentifier, url: &Url) -> ParsedFeed {
    // leave missing ids empty, the model falls back to the chosen link
    let parser = parser::Builder::new()
        .id_generator(|_links, _title, _uri| String::new())
        .build();
    match parser.parse(raw.as_bytes()) {
        Ok(feed) => {
            let parsed = ParsedFeed::from_model(feed, identifier, url);
            log::debug!("parsed {} entries from {url}", parsed.entries.len());
            parsed
        }
        Err(e) => {
            log::warn!("Failed to parse feed from {url}: {e}");
            ParsedFeed::placeholder(identifier, url)
        }
    }
}
