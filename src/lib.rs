pub mod catalog;
pub mod config;
pub mod enrich;
pub mod error;
pub mod feed;
pub mod generator;
pub mod http;
pub mod naming;
pub mod progress;

// Re-export main types for convenience
pub use catalog::{Episode, EpisodeId, EpisodeSource, RawEpisode, Show, ShowId, ShowSource};
pub use config::Settings;
pub use enrich::{
    ChainSkip, EpisodeMetadataSource, Population, ShowMetadataSource, populate_episode,
    populate_show,
};
pub use error::{CatalogError, ConfigError, EnrichError, FeedError, GenerateError};
pub use generator::PodcastFeedGenerator;
pub use http::{HttpClient, ReqwestClient, SharedHttpClient};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
