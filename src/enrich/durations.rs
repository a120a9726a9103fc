// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::catalog::{Episode, EpisodeId, format_duration};
use crate::config::DurationSettings;
use crate::error::EnrichError;
use crate::http::SharedHttpClient;

use super::source::{EpisodeMetadataSource, Population};

/// Fills in missing episode durations from the duration sidecar service
///
/// The service exposes one JSON object mapping sound URLs to durations in
/// seconds. The table is fetched once per source lifetime, in
/// `prepare_batch` for batches or lazily on the first accepted episode
/// otherwise. Episodes that already carry a duration are not touched.
pub struct DurationSource {
    url: Option<String>,
    bypass: HashSet<EpisodeId>,
    client: SharedHttpClient,
    table: Option<HashMap<String, u32>>,
}

impl DurationSource {
    pub const ID: &'static str = "durations";

    pub fn new(
        settings: &DurationSettings,
        bypass: HashSet<EpisodeId>,
        client: SharedHttpClient,
    ) -> Self {
        Self {
            url: settings.url.clone(),
            bypass,
            client,
            table: None,
        }
    }

    async fn fetch_table(&mut self, url: &str) -> Result<(), EnrichError> {
        let bytes = self
            .client
            .get_bytes(url)
            .await
            .map_err(|e| EnrichError::RequestFailed {
                source_id: Self::ID,
                url: url.to_string(),
                source: e,
            })?;

        let table: HashMap<String, u32> =
            serde_json::from_slice(&bytes).map_err(|e| EnrichError::InvalidResponse {
                source_id: Self::ID,
                url: url.to_string(),
                source: e,
            })?;

        self.table = Some(table);
        Ok(())
    }
}

#[async_trait]
impl EpisodeMetadataSource for DurationSource {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn bypass(&self) -> &HashSet<EpisodeId> {
        &self.bypass
    }

    fn accepts(&self, episode: &Episode) -> bool {
        self.url.is_some() && episode.duration.is_none()
    }

    async fn populate(&mut self, episode: &mut Episode) -> Result<Population, EnrichError> {
        let Some(url) = self.url.clone() else {
            return Ok(Population::Populated);
        };

        if self.table.is_none() {
            self.fetch_table(&url).await?;
        }

        if let Some(seconds) = self
            .table
            .as_ref()
            .and_then(|table| table.get(&episode.sound_url))
        {
            episode.duration = Some(format_duration(*seconds));
        }

        Ok(Population::Populated)
    }

    async fn prepare_batch(&mut self) -> Result<(), EnrichError> {
        let Some(url) = self.url.clone() else {
            return Ok(());
        };
        self.fetch_table(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;

    use crate::catalog::{RawEpisode, Show};
    use crate::http::HttpClient;

    struct TableClient {
        body: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpClient for TableClient {
        async fn get_bytes(&self, url: &str) -> Result<Bytes, reqwest::Error> {
            assert_eq!(url, "https://archive.test/durations.json");
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from(self.body.clone()))
        }
    }

    fn make_source(client: Arc<TableClient>) -> DurationSource {
        DurationSource::new(
            &DurationSettings {
                url: Some("https://archive.test/durations.json".to_string()),
            },
            HashSet::new(),
            client,
        )
    }

    fn make_episode(duration: Option<u32>) -> Episode {
        let show = Show::new(1, "Show");
        let raw = RawEpisode {
            id: 1,
            show_id: 1,
            title: "Ep".to_string(),
            url: "https://archive.test/sound/1.mp3".to_string(),
            date: None,
            size: None,
            duration,
        };
        Episode::from_raw(&show, &raw)
    }

    #[tokio::test]
    async fn fills_missing_duration_from_table() {
        let client = Arc::new(TableClient {
            body: r#"{"https://archive.test/sound/1.mp3": 1830}"#.to_string(),
            calls: AtomicUsize::new(0),
        });
        let mut source = make_source(client.clone());

        let mut episode = make_episode(None);
        assert!(source.accepts(&episode));

        source.populate(&mut episode).await.unwrap();
        assert_eq!(episode.duration.as_deref(), Some("0:30:30"));

        // Lazily fetched table is reused
        let mut second = make_episode(None);
        source.populate(&mut second).await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_accept_episodes_with_a_duration() {
        let client = Arc::new(TableClient {
            body: "{}".to_string(),
            calls: AtomicUsize::new(0),
        });
        let source = make_source(client);

        let episode = make_episode(Some(60));
        assert!(!source.accepts(&episode));
    }

    #[tokio::test]
    async fn prepare_batch_warms_the_table() {
        let client = Arc::new(TableClient {
            body: r#"{"https://archive.test/sound/1.mp3": 90}"#.to_string(),
            calls: AtomicUsize::new(0),
        });
        let mut source = make_source(client.clone());

        source.prepare_batch().await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        let mut episode = make_episode(None);
        source.populate(&mut episode).await.unwrap();
        assert_eq!(episode.duration.as_deref(), Some("0:01:30"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unconfigured_source_is_inert() {
        let client = Arc::new(TableClient {
            body: "{}".to_string(),
            calls: AtomicUsize::new(0),
        });
        let mut source = DurationSource::new(&DurationSettings::default(), HashSet::new(), client);

        assert!(!source.accepts(&make_episode(None)));
        source.prepare_batch().await.unwrap();
    }
}
