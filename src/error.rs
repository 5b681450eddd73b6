use std::path::PathBuf;

use reqwest::StatusCode;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    TomlD(#[from] toml::de::Error),
    #[error(transparent)]
    TomlS(#[from] toml::ser::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// The list of feed identifiers does not exist, nothing can be done
    /// this run
    #[error("Could not find `{}`, please ensure it exists", .0.display())]
    MissingSourceList(PathBuf),
    #[error("Error fetching {url}: HTTP {status}")]
    HttpStatus { url: Url, status: StatusCode },
    #[error("Invalid feed identifier: `{0}`")]
    InvalidIdentifier(String),
    #[error("Failed to write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("`git {command}` failed: {stderr}")]
    Git { command: String, stderr: String },
}

impl Error {
    /// Errors that end the whole run instead of a single identifier
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingSourceList(_))
    }
}
