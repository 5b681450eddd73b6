use core::fmt;
use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{source::FeedIdentifier, Result};

pub const DEFAULT_URL_TEMPLATE: &str = "https://old.reddit.com/r/{identifier}/.rss";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:15.0) Gecko/20100101 Firefox/15.0.1";
const IDENTIFIER_PLACEHOLDER: &str = "{identifier}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delimited file with one feed identifier per record
    pub source_list: PathBuf,
    /// Directory receiving `<identifier>.xml`
    pub output_dir: PathBuf,
    /// Upstream feed URL, `{identifier}` is substituted per feed
    pub feed_url_template: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_list: PathBuf::from("subreddits.csv"),
            output_dir: PathBuf::from("feeds"),
            feed_url_template: DEFAULT_URL_TEMPLATE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            publish: PublishConfig::default(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sources: {}", self.source_list.display())?;
        writeln!(f, "Output: {}", self.output_dir.display())?;
        writeln!(f, "Feed URL: {}", self.feed_url_template)?;
        write!(f, "Publish: {}", self.publish.enabled)
    }
}

impl Config {
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str).inspect_err(|e| {
            log::warn!("Bad toml in config: {e} \n`{toml_str}`");
        })?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)
            .inspect_err(|e| log::warn!("Error serializing toml: {e}\n{self:#?}"))?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn feed_url(&self, identifier: &FeedIdentifier) -> Result<Url> {
        let raw = self
            .feed_url_template
            .replace(IDENTIFIER_PLACEHOLDER, identifier.as_str());
        Ok(Url::parse(&raw).inspect_err(|e| log::warn!("bad feed url `{raw}`: {e}"))?)
    }

    pub fn output_path(&self, identifier: &FeedIdentifier) -> PathBuf {
        self.output_dir.join(format!("{identifier}.xml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    pub author_name: String,
    pub author_email: String,
    pub commit_message: String,
    pub push: bool,
    /// Working tree the output files live in
    pub repo_dir: PathBuf,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            author_name: "github-actions".to_string(),
            author_email: "github-actions@github.com".to_string(),
            commit_message: "Update feeds".to_string(),
            push: true,
            repo_dir: PathBuf::from("."),
        }
    }
}

pub async fn load_config(path: impl Into<Option<PathBuf>>) -> Result<Config> {
    let Some(path) = path.into() else {
        return Ok(Config::default());
    };
    let toml_str = tokio::fs::read_to_string(&path).await.inspect_err(|e| {
        log::warn!("failed to read config at path `{}`: {e}", path.display());
    })?;
    Config::from_toml(&toml_str)
}
