use chrono::{DateTime, Utc};
use feed_rs::model::{self, Link};
use url::Url;

use crate::source::FeedIdentifier;

pub const UNTITLED_ENTRY: &str = "No Title";

/// Feed fields with every fallback already applied, whatever dialect
/// upstream served
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    pub title: String,
    pub link: String,
    pub subtitle: String,
    pub id: String,
    pub icon: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub title: String,
    pub link: String,
    pub id: String,
    pub updated: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub author: Option<Author>,
    pub categories: Vec<Category>,
    pub body: EntryBody,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Author {
    pub name: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub term: String,
    pub label: String,
}

impl Category {
    /// `None` without a term; the label falls back to the term
    pub fn new(term: &str, label: Option<&str>) -> Option<Self> {
        if term.is_empty() {
            return None;
        }
        let label = label.filter(|l| !l.is_empty()).unwrap_or(term);
        Some(Self {
            term: term.to_string(),
            label: label.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryBody {
    /// HTML markup, written as `<content type="html">`
    Html(String),
    /// Plain summary, possibly empty
    Summary(String),
}

impl ParsedFeed {
    /// Feed-level fallbacks used when upstream is silent or unreadable
    pub fn placeholder(identifier: &FeedIdentifier, url: &Url) -> Self {
        Self {
            title: format!("r/{identifier}"),
            link: url.to_string(),
            subtitle: format!("Atom feed for r/{identifier}"),
            id: url.to_string(),
            icon: None,
            updated: None,
            entries: Vec::new(),
        }
    }

    pub fn from_model(feed: model::Feed, identifier: &FeedIdentifier, url: &Url) -> Self {
        let defaults = Self::placeholder(identifier, url);
        let link = primary_link(&feed.links).unwrap_or(defaults.link);
        let id = non_empty(feed.id).unwrap_or_else(|| link.clone());
        let entries = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let parsed = ParsedEntry::from_model(entry);
                if parsed.is_none() {
                    log::warn!("dropping entry without id or link in r/{identifier}");
                }
                parsed
            })
            .collect();
        Self {
            title: feed
                .title
                .and_then(|t| non_empty(t.content))
                .unwrap_or(defaults.title),
            link,
            subtitle: feed
                .description
                .and_then(|t| non_empty(t.content))
                .unwrap_or(defaults.subtitle),
            id,
            icon: feed.icon.and_then(|image| non_empty(image.uri)),
            updated: feed.updated,
            entries,
        }
    }
}

impl ParsedEntry {
    /// `None` when neither an id nor a link is available to identify it
    pub fn from_model(entry: model::Entry) -> Option<Self> {
        let link = primary_link(&entry.links).unwrap_or_default();
        let id = non_empty(entry.id).or_else(|| non_empty(link.clone()))?;
        let author = entry.authors.into_iter().next().and_then(|person| {
            let author = Author {
                name: non_empty(person.name),
                uri: person.uri.and_then(non_empty),
            };
            (author.name.is_some() || author.uri.is_some()).then_some(author)
        });
        let categories = entry
            .categories
            .iter()
            .filter_map(|c| Category::new(&c.term, c.label.as_deref()))
            .collect();
        // markup is kept verbatim, only a blank body counts as missing
        let body = match entry
            .content
            .and_then(|c| c.body)
            .filter(|html| !html.trim().is_empty())
        {
            Some(html) => EntryBody::Html(html),
            None => EntryBody::Summary(entry.summary.map(|s| s.content).unwrap_or_default()),
        };
        Some(Self {
            title: entry
                .title
                .and_then(|t| non_empty(t.content))
                .unwrap_or_else(|| UNTITLED_ENTRY.to_string()),
            link,
            id,
            updated: entry.updated,
            published: entry.published,
            author,
            categories,
            body,
        })
    }
}

/// The alternate link if one is marked (or unmarked), else the first
fn primary_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| links.first())
        .and_then(|l| non_empty(l.href.clone()))
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}
