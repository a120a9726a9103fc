use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::catalog::{EpisodeId, ShowId};
use crate::error::ConfigError;

/// Default base URL of the broadcast archive API
///
/// The archive normally runs on the same host as the generator; point
/// `api.base_url` in the settings file at a remote instance otherwise.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// Default title for the combined feed with every episode
pub const DEFAULT_ALL_EPISODES_TITLE: &str = "All episodes";

/// Immutable configuration snapshot for one generator run
///
/// Loaded once from an optional JSON settings file and passed by value to
/// [`PodcastFeedGenerator`](crate::generator::PodcastFeedGenerator). Every
/// field has a usable default, so a missing settings file means "archive on
/// localhost, no website enrichment, no overrides".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub website: WebsiteSettings,
    pub durations: DurationSettings,
    pub overrides: OverrideSettings,
    pub bypass: BypassSettings,
    pub all_episodes_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            website: WebsiteSettings::default(),
            durations: DurationSettings::default(),
            overrides: OverrideSettings::default(),
            bypass: BypassSettings::default(),
            all_episodes_title: DEFAULT_ALL_EPISODES_TITLE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Broadcast archive API endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Broadcaster website API used for show and episode enrichment
///
/// The website sources are inactive until `base_url` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebsiteSettings {
    pub base_url: Option<String>,
}

/// Episode duration lookup service
///
/// The duration source is inactive until `url` is set. The endpoint returns
/// a JSON object mapping sound URLs to durations in seconds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DurationSettings {
    pub url: Option<String>,
}

/// Operator-maintained metadata overrides, applied last in each chain
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OverrideSettings {
    pub shows: HashMap<ShowId, ShowOverride>,
    pub episodes: HashMap<EpisodeId, EpisodeOverride>,
}

/// Manual metadata for one show
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShowOverride {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Url>,
    pub author: Option<String>,
    pub website: Option<Url>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub explicit: Option<bool>,
    /// Exclude this show from generated output entirely
    pub disabled: bool,
}

/// Manual metadata for one episode
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EpisodeOverride {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Url>,
    pub article_url: Option<Url>,
    /// Exclude this episode from generated feeds
    pub hidden: bool,
}

/// Entity identifiers each metadata source must never act on, keyed by the
/// source's stable id
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BypassSettings {
    pub shows: HashMap<String, HashSet<ShowId>>,
    pub episodes: HashMap<String, HashSet<EpisodeId>>,
}

impl BypassSettings {
    /// Bypassed show ids for the given source
    pub fn shows_for(&self, source_id: &str) -> HashSet<ShowId> {
        self.shows.get(source_id).cloned().unwrap_or_default()
    }

    /// Bypassed episode ids for the given source
    pub fn episodes_for(&self, source_id: &str) -> HashSet<EpisodeId> {
        self.episodes.get(source_id).cloned().unwrap_or_default()
    }
}
