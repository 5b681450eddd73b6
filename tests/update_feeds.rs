//! End-to-end runs against a mocked upstream.
//!
//! Each test gets its own temporary directory holding the source list
//! and the output directory.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use reddit_atom::{Config, Error, Outcome};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TWO_ENTRIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>/r/test1/.rss</id>
  <title>test1</title>
  <link rel="alternate" href="https://old.reddit.com/r/test1/"/>
  <entry>
    <author><name>/u/alice</name><uri>https://old.reddit.com/user/alice</uri></author>
    <category term="funny"/>
    <category term="news" label="News"/>
    <content type="html">&lt;p&gt;first&lt;/p&gt;</content>
    <id>t3_one</id>
    <link href="https://old.reddit.com/r/test1/comments/one/"/>
    <updated>2024-03-01T11:00:00+00:00</updated>
    <title>First post</title>
  </entry>
  <entry>
    <id>t3_two</id>
    <link href="https://old.reddit.com/r/test1/comments/two/"/>
    <summary>second</summary>
    <title>Second post</title>
  </entry>
</feed>"#;

struct Fixture {
    dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new(server: &MockServer, sources: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let source_list = dir.path().join("subreddits.csv");
        std::fs::write(&source_list, sources).unwrap();
        let config = Config {
            source_list,
            output_dir: dir.path().join("feeds"),
            feed_url_template: format!("{}/r/{{identifier}}/.rss", server.uri()),
            ..Config::default()
        };
        Self { dir, config }
    }

    fn output(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }

    fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.config.output_dir)
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

async fn serve(server: &MockServer, name: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/r/{name}/.rss")))
        .respond_with(response)
        .mount(server)
        .await;
}

fn read_atom(path: &Path) -> atom_syndication::Feed {
    let bytes = std::fs::read(path).unwrap();
    atom_syndication::Feed::read_from(&bytes[..]).unwrap()
}

#[tokio::test]
async fn failed_fetch_is_skipped_and_run_continues() {
    let server = MockServer::start().await;
    serve(
        &server,
        "test1",
        ResponseTemplate::new(200).set_body_string(TWO_ENTRIES),
    )
    .await;
    serve(&server, "test2", ResponseTemplate::new(404)).await;
    let fixture = Fixture::new(&server, "test1\ntest2\n");

    let summary = reddit_atom::run(&fixture.config).await.unwrap();

    assert_eq!(summary.written(), vec![fixture.output("test1.xml")]);
    assert_eq!(fixture.output_names(), vec!["test1.xml".to_string()]);
    let skipped: Vec<_> = summary.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].0.unwrap().as_str(), "test2");
    assert!(matches!(skipped[0].1, Error::HttpStatus { .. }));

    let feed = read_atom(&fixture.output("test1.xml"));
    let ids: Vec<_> = feed.entries().iter().map(|e| e.id().to_string()).collect();
    assert_eq!(ids, vec!["t3_one", "t3_two"]);
}

#[tokio::test]
async fn emitted_entries_are_normalized() {
    let server = MockServer::start().await;
    serve(
        &server,
        "test1",
        ResponseTemplate::new(200).set_body_string(TWO_ENTRIES),
    )
    .await;
    let fixture = Fixture::new(&server, "test1\n");

    reddit_atom::run(&fixture.config).await.unwrap();
    let feed = read_atom(&fixture.output("test1.xml"));

    assert_eq!(feed.title().as_str(), "test1");
    assert_eq!(feed.id(), "/r/test1/.rss");
    let first = &feed.entries()[0];
    let categories: Vec<_> = first
        .categories()
        .iter()
        .map(|c| (c.term().to_string(), c.label().map(str::to_string)))
        .collect();
    assert_eq!(
        categories,
        vec![
            ("funny".to_string(), Some("funny".to_string())),
            ("news".to_string(), Some("News".to_string())),
        ]
    );
    let content = first.content().unwrap();
    assert_eq!(content.value(), Some("<p>first</p>"));
    assert_eq!(content.content_type(), Some("html"));
    assert!(first.summary().is_none());
    assert_eq!(first.authors()[0].name(), "/u/alice");
    assert_eq!(
        first.authors()[0].uri(),
        Some("https://old.reddit.com/user/alice")
    );

    let second = &feed.entries()[1];
    assert!(second.content().is_none());
    assert_eq!(second.summary().unwrap().as_str(), "second");
}

#[tokio::test]
async fn missing_updated_stays_missing() {
    let server = MockServer::start().await;
    serve(
        &server,
        "test1",
        ResponseTemplate::new(200).set_body_string(TWO_ENTRIES),
    )
    .await;
    let fixture = Fixture::new(&server, "test1\n");

    reddit_atom::run(&fixture.config).await.unwrap();
    let xml = std::fs::read_to_string(fixture.output("test1.xml")).unwrap();
    let feed_header = &xml[..xml.find("<entry>").unwrap()];
    assert!(!feed_header.contains("<updated>"), "{xml}");
}

#[tokio::test]
async fn blank_rows_are_ignored() {
    let server = MockServer::start().await;
    serve(
        &server,
        "test1",
        ResponseTemplate::new(200).set_body_string(TWO_ENTRIES),
    )
    .await;
    let fixture = Fixture::new(&server, "\ntest1\n\n");

    let summary = reddit_atom::run(&fixture.config).await.unwrap();
    assert_eq!(summary.processed.len(), 1);
    assert!(matches!(summary.processed[0].outcome, Outcome::Written(_)));
}

#[tokio::test]
async fn reruns_are_byte_identical() {
    let server = MockServer::start().await;
    serve(
        &server,
        "test1",
        ResponseTemplate::new(200).set_body_string(TWO_ENTRIES),
    )
    .await;
    let fixture = Fixture::new(&server, "test1\n");

    reddit_atom::run(&fixture.config).await.unwrap();
    let first = std::fs::read(fixture.output("test1.xml")).unwrap();
    reddit_atom::run(&fixture.config).await.unwrap();
    let second = std::fs::read(fixture.output("test1.xml")).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn unparsable_body_still_writes_placeholder_feed() {
    let server = MockServer::start().await;
    serve(
        &server,
        "broken",
        ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"),
    )
    .await;
    let fixture = Fixture::new(&server, "broken\n");

    let summary = reddit_atom::run(&fixture.config).await.unwrap();
    assert_eq!(summary.written(), vec![fixture.output("broken.xml")]);
    let feed = read_atom(&fixture.output("broken.xml"));
    assert_eq!(feed.title().as_str(), "r/broken");
    assert!(feed.entries().is_empty());
}

#[tokio::test]
async fn sends_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/test1/.rss"))
        .and(header("user-agent", reddit_atom::Config::default().user_agent.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_ENTRIES))
        .expect(1)
        .mount(&server)
        .await;
    let fixture = Fixture::new(&server, "test1\n");

    let summary = reddit_atom::run(&fixture.config).await.unwrap();
    assert_eq!(summary.written().len(), 1);
}

#[tokio::test]
async fn missing_source_list_aborts_without_output() {
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server, "");
    let config = Config {
        source_list: fixture.dir.path().join("absent.csv"),
        ..fixture.config.clone()
    };

    let err = reddit_atom::run(&config).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn unreachable_host_is_skipped() {
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server, "test1\n");
    let config = Config {
        feed_url_template: "http://127.0.0.1:1/r/{identifier}/.rss".to_string(),
        ..fixture.config.clone()
    };

    let summary = reddit_atom::run(&config).await.unwrap();
    assert!(summary.written().is_empty());
    assert!(matches!(
        summary.processed[0].outcome,
        Outcome::Skipped(Error::Reqwest(_))
    ));
    assert!(fixture.output_names().is_empty());
}

#[tokio::test]
async fn timed_out_fetch_is_skipped_and_run_continues() {
    let server = MockServer::start().await;
    serve(
        &server,
        "slow",
        ResponseTemplate::new(200)
            .set_body_string(TWO_ENTRIES)
            .set_delay(std::time::Duration::from_secs(5)),
    )
    .await;
    serve(
        &server,
        "test1",
        ResponseTemplate::new(200).set_body_string(TWO_ENTRIES),
    )
    .await;
    let mut fixture = Fixture::new(&server, "slow\ntest1\n");
    fixture.config.timeout_secs = 1;

    let summary = reddit_atom::run(&fixture.config).await.unwrap();

    match &summary.processed[0].outcome {
        Outcome::Skipped(Error::Reqwest(e)) => assert!(e.is_timeout(), "{e}"),
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert_eq!(summary.written(), vec![fixture.output("test1.xml")]);
    assert_eq!(fixture.output_names(), vec!["test1.xml".to_string()]);
}
