use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::{
    feed::{EntryBody, ParsedEntry, ParsedFeed},
    Error, Result,
};

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const GENERATOR: &str = env!("CARGO_PKG_NAME");
const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

type XmlWriter = Writer<Vec<u8>>;

/// Render a pretty-printed Atom 1.0 document.
///
/// Optional values (`updated`, `published`, `icon`, author parts) are left
/// out entirely instead of being written empty.
pub fn render_atom(feed: &ParsedFeed) -> Result<Vec<u8>> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(
        BytesStart::new("feed").with_attributes([("xmlns", ATOM_NS)]),
    ))?;
    text_element(&mut w, "id", &[], &feed.id)?;
    text_element(&mut w, "title", &[], &feed.title)?;
    if let Some(updated) = &feed.updated {
        timestamp_element(&mut w, "updated", updated)?;
    }
    empty_element(&mut w, "link", &[("href", feed.link.as_str()), ("rel", "alternate")])?;
    if let Some(icon) = &feed.icon {
        text_element(&mut w, "icon", &[], icon)?;
    }
    text_element(
        &mut w,
        "generator",
        &[("version", GENERATOR_VERSION)],
        GENERATOR,
    )?;
    text_element(&mut w, "subtitle", &[], &feed.subtitle)?;
    for entry in &feed.entries {
        write_entry(&mut w, entry)?;
    }
    w.write_event(Event::End(BytesEnd::new("feed")))?;
    let mut bytes = w.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_entry(w: &mut XmlWriter, entry: &ParsedEntry) -> Result {
    w.write_event(Event::Start(BytesStart::new("entry")))?;
    text_element(w, "id", &[], &entry.id)?;
    text_element(w, "title", &[], &entry.title)?;
    if let Some(updated) = &entry.updated {
        timestamp_element(w, "updated", updated)?;
    }
    if let Some(author) = &entry.author {
        w.write_event(Event::Start(BytesStart::new("author")))?;
        if let Some(name) = &author.name {
            text_element(w, "name", &[], name)?;
        }
        if let Some(uri) = &author.uri {
            text_element(w, "uri", &[], uri)?;
        }
        w.write_event(Event::End(BytesEnd::new("author")))?;
    }
    match &entry.body {
        EntryBody::Html(html) => text_element(w, "content", &[("type", "html")], html)?,
        EntryBody::Summary(summary) => text_element(w, "summary", &[], summary)?,
    }
    empty_element(w, "link", &[("href", entry.link.as_str())])?;
    for category in &entry.categories {
        empty_element(
            w,
            "category",
            &[
                ("term", category.term.as_str()),
                ("label", category.label.as_str()),
            ],
        )?;
    }
    if let Some(published) = &entry.published {
        timestamp_element(w, "published", published)?;
    }
    w.write_event(Event::End(BytesEnd::new("entry")))?;
    Ok(())
}

fn text_element(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)], text: &str) -> Result {
    w.write_event(Event::Start(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn empty_element(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result {
    w.write_event(Event::Empty(
        BytesStart::new(name).with_attributes(attrs.iter().copied()),
    ))?;
    Ok(())
}

fn timestamp_element(w: &mut XmlWriter, name: &str, at: &DateTime<Utc>) -> Result {
    text_element(w, name, &[], &at.to_rfc3339())
}

/// Replace `path` with `bytes` via a hidden sibling and a rename, so a
/// reader never observes a half-written file
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    let tmp = temp_sibling(path);
    tokio::fs::write(&tmp, bytes).await.map_err(|e| {
        log::warn!("Error writing `{}`: {e}", tmp.display());
        write_err(e)
    })?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        log::warn!("Error moving `{}` into place: {e}", tmp.display());
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
