// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::catalog::{Episode, EpisodeId, Show, ShowId};
use crate::config::WebsiteSettings;
use crate::error::EnrichError;
use crate::http::SharedHttpClient;

use super::source::{EpisodeMetadataSource, Population, ShowMetadataSource};

/// GET a JSON document, treating 404 as "not published on the website"
async fn lookup_json<T: DeserializeOwned>(
    client: &SharedHttpClient,
    source_id: &'static str,
    url: &str,
) -> Result<Option<T>, EnrichError> {
    let bytes = match client.get_bytes(url).await {
        Ok(bytes) => bytes,
        Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => return Ok(None),
        Err(e) => {
            return Err(EnrichError::RequestFailed {
                source_id,
                url: url.to_string(),
                source: e,
            });
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| EnrichError::InvalidResponse {
            source_id,
            url: url.to_string(),
            source: e,
        })
}

/// One show page as published by the broadcaster website
#[derive(Debug, Clone, Deserialize)]
struct WebsiteShow {
    id: ShowId,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<Url>,
    #[serde(default)]
    page_url: Option<Url>,
    #[serde(default)]
    archived: bool,
}

/// Show enrichment from the broadcaster website
///
/// Inactive until a website base URL is configured. `prepare_batch` pulls
/// the whole show index with one request; outside a batch each show costs a
/// single lookup. Shows the website has archived are skipped.
pub struct WebsiteShowMetadata {
    base_url: Option<String>,
    bypass: HashSet<ShowId>,
    client: SharedHttpClient,
    index: Option<HashMap<ShowId, WebsiteShow>>,
}

impl WebsiteShowMetadata {
    pub const ID: &'static str = "website_show";

    pub fn new(
        settings: &WebsiteSettings,
        bypass: HashSet<ShowId>,
        client: SharedHttpClient,
    ) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            bypass,
            client,
            index: None,
        }
    }

    async fn lookup(&self, base_url: &str, id: ShowId) -> Result<Option<WebsiteShow>, EnrichError> {
        if let Some(index) = &self.index {
            return Ok(index.get(&id).cloned());
        }

        let url = format!("{base_url}/shows/{id}");
        lookup_json(&self.client, Self::ID, &url).await
    }
}

#[async_trait]
impl ShowMetadataSource for WebsiteShowMetadata {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn bypass(&self) -> &HashSet<ShowId> {
        &self.bypass
    }

    fn accepts(&self, _show: &Show) -> bool {
        self.base_url.is_some()
    }

    async fn populate(&mut self, show: &mut Show) -> Result<Population, EnrichError> {
        let Some(base_url) = self.base_url.clone() else {
            return Ok(Population::Populated);
        };

        let Some(entry) = self.lookup(&base_url, show.id).await? else {
            // Not published on the website, nothing to add
            return Ok(Population::Populated);
        };

        if entry.archived {
            return Ok(Population::Skipped(
                "show is archived on the website".to_string(),
            ));
        }

        if entry.description.is_some() {
            show.description = entry.description;
        }
        if entry.image.is_some() {
            show.image = entry.image;
        }
        if entry.page_url.is_some() {
            show.website = entry.page_url;
        }

        Ok(Population::Populated)
    }

    async fn prepare_batch(&mut self) -> Result<(), EnrichError> {
        let Some(base_url) = &self.base_url else {
            return Ok(());
        };

        let url = format!("{base_url}/shows");
        let entries: Option<Vec<WebsiteShow>> = lookup_json(&self.client, Self::ID, &url).await?;
        let entries = entries.unwrap_or_default();

        self.index = Some(entries.into_iter().map(|e| (e.id, e)).collect());
        Ok(())
    }
}

/// One episode article as published by the broadcaster website
#[derive(Debug, Clone, Deserialize)]
struct WebsiteEpisode {
    id: EpisodeId,
    #[serde(default)]
    lead: Option<String>,
    #[serde(default)]
    article_url: Option<Url>,
    #[serde(default)]
    image: Option<Url>,
}

/// Episode enrichment from the broadcaster website
///
/// Fills description, article link and image from the episode's article
/// page. Same batch/single-lookup split as [`WebsiteShowMetadata`].
pub struct WebsiteEpisodeMetadata {
    base_url: Option<String>,
    bypass: HashSet<EpisodeId>,
    client: SharedHttpClient,
    index: Option<HashMap<EpisodeId, WebsiteEpisode>>,
}

impl WebsiteEpisodeMetadata {
    pub const ID: &'static str = "website_episode";

    pub fn new(
        settings: &WebsiteSettings,
        bypass: HashSet<EpisodeId>,
        client: SharedHttpClient,
    ) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            bypass,
            client,
            index: None,
        }
    }

    async fn lookup(
        &self,
        base_url: &str,
        id: EpisodeId,
    ) -> Result<Option<WebsiteEpisode>, EnrichError> {
        if let Some(index) = &self.index {
            return Ok(index.get(&id).cloned());
        }

        let url = format!("{base_url}/episodes/{id}");
        lookup_json(&self.client, Self::ID, &url).await
    }
}

#[async_trait]
impl EpisodeMetadataSource for WebsiteEpisodeMetadata {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn bypass(&self) -> &HashSet<EpisodeId> {
        &self.bypass
    }

    fn accepts(&self, _episode: &Episode) -> bool {
        self.base_url.is_some()
    }

    async fn populate(&mut self, episode: &mut Episode) -> Result<Population, EnrichError> {
        let Some(base_url) = self.base_url.clone() else {
            return Ok(Population::Populated);
        };

        let Some(entry) = self.lookup(&base_url, episode.id).await? else {
            return Ok(Population::Populated);
        };

        if entry.lead.is_some() {
            episode.description = entry.lead;
        }
        if entry.article_url.is_some() {
            episode.article_url = entry.article_url;
        }
        if entry.image.is_some() {
            episode.image = entry.image;
        }

        Ok(Population::Populated)
    }

    async fn prepare_batch(&mut self) -> Result<(), EnrichError> {
        let Some(base_url) = &self.base_url else {
            return Ok(());
        };

        let url = format!("{base_url}/episodes");
        let entries: Option<Vec<WebsiteEpisode>> =
            lookup_json(&self.client, Self::ID, &url).await?;
        let entries = entries.unwrap_or_default();

        self.index = Some(entries.into_iter().map(|e| (e.id, e)).collect());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;

    use crate::catalog::RawEpisode;
    use crate::http::HttpClient;

    struct RoutedClient {
        routes: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl RoutedClient {
        fn shared(routes: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                routes: routes
                    .iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl HttpClient for RoutedClient {
        async fn get_bytes(&self, url: &str) -> Result<Bytes, reqwest::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = self
                .routes
                .get(url)
                .unwrap_or_else(|| panic!("unexpected URL {url}"));
            Ok(Bytes::from(body.clone()))
        }
    }

    fn configured(base: &str) -> WebsiteSettings {
        WebsiteSettings {
            base_url: Some(base.to_string()),
        }
    }

    const SHOW_INDEX: &str = r#"[
        {"id": 10, "description": "A fine show", "page_url": "https://site.test/shows/fine"},
        {"id": 20, "archived": true}
    ]"#;

    #[tokio::test]
    async fn unconfigured_source_accepts_nothing() {
        let client = RoutedClient::shared(&[]);
        let source =
            WebsiteShowMetadata::new(&WebsiteSettings::default(), HashSet::new(), client.clone());

        assert!(!source.accepts(&Show::new(10, "A")));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn warmed_index_enriches_without_further_requests() {
        let client = RoutedClient::shared(&[("https://site.test/api/shows", SHOW_INDEX)]);
        let mut source = WebsiteShowMetadata::new(
            &configured("https://site.test/api"),
            HashSet::new(),
            client.clone(),
        );

        source.prepare_batch().await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        let mut show = Show::new(10, "Fine Show");
        let outcome = source.populate(&mut show).await.unwrap();
        assert_eq!(outcome, Population::Populated);
        assert_eq!(show.description.as_deref(), Some("A fine show"));
        assert_eq!(
            show.website.as_ref().map(Url::as_str),
            Some("https://site.test/shows/fine")
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn archived_show_is_skipped() {
        let client = RoutedClient::shared(&[("https://site.test/api/shows", SHOW_INDEX)]);
        let mut source = WebsiteShowMetadata::new(
            &configured("https://site.test/api"),
            HashSet::new(),
            client,
        );
        source.prepare_batch().await.unwrap();

        let mut show = Show::new(20, "Old Show");
        let outcome = source.populate(&mut show).await.unwrap();
        assert_eq!(
            outcome,
            Population::Skipped("show is archived on the website".to_string())
        );
    }

    #[tokio::test]
    async fn show_absent_from_index_is_left_untouched() {
        let client = RoutedClient::shared(&[("https://site.test/api/shows", SHOW_INDEX)]);
        let mut source = WebsiteShowMetadata::new(
            &configured("https://site.test/api"),
            HashSet::new(),
            client,
        );
        source.prepare_batch().await.unwrap();

        let mut show = Show::new(99, "Unknown");
        let outcome = source.populate(&mut show).await.unwrap();
        assert_eq!(outcome, Population::Populated);
        assert!(show.description.is_none());
    }

    #[tokio::test]
    async fn single_episode_lookup_hits_the_article_endpoint() {
        let client = RoutedClient::shared(&[(
            "https://site.test/api/episodes/7",
            r#"{"id": 7, "lead": "What a night", "article_url": "https://site.test/articles/7"}"#,
        )]);
        let mut source = WebsiteEpisodeMetadata::new(
            &configured("https://site.test/api"),
            HashSet::new(),
            client,
        );

        let show = Show::new(1, "Show");
        let raw = RawEpisode {
            id: 7,
            show_id: 1,
            title: "Ep7".to_string(),
            url: "https://archive.test/sound/7.mp3".to_string(),
            date: None,
            size: None,
            duration: None,
        };
        let mut episode = Episode::from_raw(&show, &raw);

        assert!(source.accepts(&episode));
        source.populate(&mut episode).await.unwrap();
        assert_eq!(episode.description.as_deref(), Some("What a night"));
        assert_eq!(
            episode.article_url.as_ref().map(Url::as_str),
            Some("https://site.test/articles/7")
        );
    }

    #[tokio::test]
    async fn prepare_batch_without_base_url_is_a_noop() {
        let client = RoutedClient::shared(&[]);
        let mut source =
            WebsiteEpisodeMetadata::new(&WebsiteSettings::default(), HashSet::new(), client.clone());
        source.prepare_batch().await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
