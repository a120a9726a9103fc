use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::ShowId;

/// Errors that can occur when talking to the broadcast archive API
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to fetch {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Show {show_id} has no published episodes")]
    NoEpisodes { show_id: ShowId },
}

/// Errors that can occur inside a metadata source
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Metadata source '{source_id}': request to {url} failed: {source}")]
    RequestFailed {
        source_id: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Metadata source '{source_id}': invalid response from {url}: {source}")]
    InvalidResponse {
        source_id: &'static str,
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur while building or serializing a feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to serialize feed XML: {0}")]
    WriteFailed(#[from] rss::Error),
}

/// Errors that can occur when loading the settings file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level errors for feed generation operations
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("No show with ID {0} in the catalog")]
    NoSuchShow(ShowId),

    #[error("No show matching name '{0}' in the catalog")]
    NoSuchShowName(String),

    #[error("Show '{title}' skipped by metadata source '{source_id}': {reason}")]
    ShowSkipped {
        title: String,
        source_id: &'static str,
        reason: String,
    },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

impl GenerateError {
    /// True for the conditions that drop a single show from a batch result
    /// instead of aborting the whole batch.
    pub fn skips_show(&self) -> bool {
        matches!(
            self,
            GenerateError::ShowSkipped { .. }
                | GenerateError::Catalog(CatalogError::NoEpisodes { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_skipped_counts_as_droppable() {
        let err = GenerateError::ShowSkipped {
            title: "Morning Show".to_string(),
            source_id: "show_overrides",
            reason: "disabled by local override".to_string(),
        };
        assert!(err.skips_show());
    }

    #[test]
    fn no_episodes_counts_as_droppable() {
        let err = GenerateError::Catalog(CatalogError::NoEpisodes { show_id: 7 });
        assert!(err.skips_show());
    }

    #[test]
    fn no_such_show_is_fatal() {
        assert!(!GenerateError::NoSuchShow(3).skips_show());
        assert!(!GenerateError::NoSuchShowName("x".to_string()).skips_show());
    }
}
