// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use url::Url;

use crate::error::CatalogError;
use crate::http::SharedHttpClient;

use super::{Show, ShowId, fetch_json};

/// Stable numeric identifier the archive assigns to an episode record
pub type EpisodeId = u64;

/// Sentinel show id carried by orphaned episode records
///
/// Orphans appear in the whole-catalog list but belong to no show; they are
/// excluded both from per-show feeds and from the combined feed.
pub const ORPHAN_SHOW_ID: ShowId = 0;

/// One episode record as returned by the archive API
#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisode {
    pub id: EpisodeId,
    pub show_id: ShowId,
    pub title: String,
    /// URL of the playable sound resource
    pub url: String,
    #[serde(default)]
    pub date: Option<String>,
    /// Size of the sound resource in bytes, when the archive knows it
    #[serde(default)]
    pub size: Option<u64>,
    /// Duration in seconds, present only for re-encoded material
    #[serde(default)]
    pub duration: Option<u32>,
}

/// One installment of a show, carrying enrichment fields the episode-level
/// metadata chain fills in place
#[derive(Debug, Clone)]
pub struct Episode {
    pub id: EpisodeId,
    pub show_id: ShowId,
    pub title: String,
    pub sound_url: String,
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub size: Option<u64>,
    /// Playing time as `H:MM:SS`
    pub duration: Option<String>,
    pub description: Option<String>,
    pub image: Option<Url>,
    pub article_url: Option<Url>,
}

impl Episode {
    /// Pure construction of an episode from one raw record and its owning show
    pub fn from_raw(show: &Show, raw: &RawEpisode) -> Self {
        Self {
            id: raw.id,
            show_id: show.id,
            title: raw.title.clone(),
            sound_url: raw.url.clone(),
            pub_date: raw.date.as_deref().and_then(parse_archive_date),
            size: raw.size,
            duration: raw.duration.map(format_duration),
            description: None,
            image: None,
            article_url: None,
        }
    }
}

/// Format a duration in seconds as `H:MM:SS`
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Parse a date from the archive, RFC 3339 first with a relaxed fallback
fn parse_archive_date(date_str: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt);
    }

    let formats = ["%Y-%m-%d %H:%M:%S %z", "%a, %d %b %Y %H:%M:%S %z"];
    for format in formats {
        if let Ok(dt) = DateTime::parse_from_str(date_str, format) {
            return Some(dt);
        }
    }

    None
}

/// Episode lists for shows, fetched on demand or once for a whole batch
///
/// One instance lives for one generation run. `populate_all_episodes_list`
/// caches the whole-catalog list so a batch over N shows costs one episode
/// request instead of N; single-show lookups without that cache issue one
/// dedicated request each and are cached per show.
pub struct EpisodeSource {
    client: SharedHttpClient,
    base_url: String,
    all: Option<Vec<RawEpisode>>,
    per_show: HashMap<ShowId, Vec<RawEpisode>>,
}

impl EpisodeSource {
    pub fn new(client: SharedHttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            all: None,
            per_show: HashMap::new(),
        }
    }

    /// Fetch and cache every episode across every show with one request
    ///
    /// Idempotent: a second call does not re-fetch.
    pub async fn populate_all_episodes_list(&mut self) -> Result<(), CatalogError> {
        if self.all.is_some() {
            return Ok(());
        }

        let url = format!("{}/episodes", self.base_url);
        let episodes: Vec<RawEpisode> = fetch_json(self.client.as_ref(), &url).await?;
        self.all = Some(episodes);
        Ok(())
    }

    /// The cached whole-catalog episode list
    ///
    /// Empty until [`populate_all_episodes_list`](Self::populate_all_episodes_list)
    /// has run.
    pub fn all_episodes(&self) -> &[RawEpisode] {
        self.all.as_deref().unwrap_or(&[])
    }

    /// The ordered episode records for one show
    ///
    /// Served from the whole-catalog cache when a batch prefetch has
    /// happened, otherwise fetched with one dedicated request and cached for
    /// this source's lifetime.
    pub async fn episode_list(&mut self, show: &Show) -> Result<Vec<RawEpisode>, CatalogError> {
        let episodes = if let Some(all) = &self.all {
            all.iter()
                .filter(|e| e.show_id == show.id)
                .cloned()
                .collect()
        } else if let Some(cached) = self.per_show.get(&show.id) {
            cached.clone()
        } else {
            let url = format!("{}/shows/{}/episodes", self.base_url, show.id);
            let fetched: Vec<RawEpisode> = fetch_json(self.client.as_ref(), &url).await?;
            self.per_show.insert(show.id, fetched.clone());
            fetched
        };

        if episodes.is_empty() {
            return Err(CatalogError::NoEpisodes { show_id: show.id });
        }

        Ok(episodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::http::HttpClient;

    struct CountingClient {
        routes: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl CountingClient {
        fn new(routes: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                routes: routes
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpClient for CountingClient {
        async fn get_bytes(&self, url: &str) -> Result<Bytes, reqwest::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = self
                .routes
                .get(url)
                .unwrap_or_else(|| panic!("unexpected URL {url}"));
            Ok(Bytes::from(body.clone()))
        }
    }

    const BASE: &str = "https://archive.test/api";

    const ALL_EPISODES: &str = r#"[
        {"id": 1, "show_id": 10, "title": "Ep1", "url": "https://archive.test/sound/1.mp3"},
        {"id": 2, "show_id": 10, "title": "Ep2", "url": "https://archive.test/sound/2.mp3"},
        {"id": 3, "show_id": 20, "title": "Other", "url": "https://archive.test/sound/3.mp3"},
        {"id": 4, "show_id": 0, "title": "Orphan", "url": "https://archive.test/sound/4.mp3"}
    ]"#;

    #[tokio::test]
    async fn batch_cache_serves_per_show_lists_without_new_requests() {
        let client = CountingClient::new(&[(
            "https://archive.test/api/episodes",
            ALL_EPISODES,
        )]);
        let mut source = EpisodeSource::new(client.clone(), BASE);

        source.populate_all_episodes_list().await.unwrap();
        source.populate_all_episodes_list().await.unwrap();
        assert_eq!(client.calls(), 1, "prefetch must be issued exactly once");

        let episodes = source.episode_list(&Show::new(10, "A")).await.unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].title, "Ep1");
        assert_eq!(episodes[1].title, "Ep2");
        assert_eq!(client.calls(), 1, "per-show list must come from the cache");
    }

    #[tokio::test]
    async fn single_show_lookup_issues_one_dedicated_request() {
        let client = CountingClient::new(&[(
            "https://archive.test/api/shows/10/episodes",
            r#"[{"id": 1, "show_id": 10, "title": "Ep1", "url": "https://archive.test/sound/1.mp3"}]"#,
        )]);
        let mut source = EpisodeSource::new(client.clone(), BASE);

        let show = Show::new(10, "A");
        let episodes = source.episode_list(&show).await.unwrap();
        assert_eq!(episodes.len(), 1);

        // Second lookup for the same show hits the per-show cache
        source.episode_list(&show).await.unwrap();
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn empty_episode_list_is_an_error() {
        let client = CountingClient::new(&[(
            "https://archive.test/api/episodes",
            ALL_EPISODES,
        )]);
        let mut source = EpisodeSource::new(client, BASE);
        source.populate_all_episodes_list().await.unwrap();

        let result = source.episode_list(&Show::new(99, "Empty")).await;
        assert!(matches!(
            result,
            Err(CatalogError::NoEpisodes { show_id: 99 })
        ));
    }

    #[tokio::test]
    async fn all_episodes_is_empty_before_prefetch() {
        let client = CountingClient::new(&[]);
        let source = EpisodeSource::new(client.clone(), BASE);
        assert!(source.all_episodes().is_empty());
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn from_raw_carries_identity_and_parses_date() {
        let show = Show::new(10, "A");
        let raw = RawEpisode {
            id: 7,
            show_id: 10,
            title: "Ep7".to_string(),
            url: "https://archive.test/sound/7.mp3".to_string(),
            date: Some("2024-03-01T12:30:00+01:00".to_string()),
            size: Some(1234),
            duration: Some(3725),
        };

        let episode = Episode::from_raw(&show, &raw);
        assert_eq!(episode.id, 7);
        assert_eq!(episode.show_id, 10);
        assert_eq!(episode.sound_url, "https://archive.test/sound/7.mp3");
        assert!(episode.pub_date.is_some());
        assert_eq!(episode.duration.as_deref(), Some("1:02:05"));
        assert!(episode.description.is_none());
    }

    #[test]
    fn format_duration_pads_minutes_and_seconds() {
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(59), "0:00:59");
        assert_eq!(format_duration(600), "0:10:00");
        assert_eq!(format_duration(3661), "1:01:01");
    }

    #[test]
    fn relaxed_date_fallback_accepts_space_separated_format() {
        let raw = RawEpisode {
            id: 1,
            show_id: 1,
            title: "t".to_string(),
            url: "u".to_string(),
            date: Some("2024-03-01 12:30:00 +0100".to_string()),
            size: None,
            duration: None,
        };
        let episode = Episode::from_raw(&Show::new(1, "A"), &raw);
        assert!(episode.pub_date.is_some());

        let bad = RawEpisode {
            date: Some("yesterday".to_string()),
            ..raw
        };
        let episode = Episode::from_raw(&Show::new(1, "A"), &bad);
        assert!(episode.pub_date.is_none());
    }
}
