// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;

use crate::catalog::{
    Episode, EpisodeSource, ORPHAN_SHOW_ID, RawEpisode, Show, ShowId, ShowSource,
};
use crate::config::Settings;
use crate::enrich::{
    self, EpisodeMetadataSource, ShowMetadataSource, populate_episode, populate_show,
};
use crate::error::{CatalogError, GenerateError};
use crate::feed;
use crate::http::SharedHttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Generates podcast feeds for shows in the broadcast archive
///
/// Owns one instance of every configured metadata source, constructed
/// eagerly and reused for the generator's lifetime, and sequences them over
/// shows and episodes. Construction performs the single show-catalog fetch.
pub struct PodcastFeedGenerator {
    client: SharedHttpClient,
    settings: Settings,
    show_source: ShowSource,
    show_chain: Vec<Box<dyn ShowMetadataSource>>,
    episode_chain: Vec<Box<dyn EpisodeMetadataSource>>,
    reporter: SharedProgressReporter,
    pretty: bool,
}

impl PodcastFeedGenerator {
    /// Create a generator: fetch the show catalog and build both source
    /// chains from the settings snapshot
    pub async fn new(
        client: SharedHttpClient,
        settings: Settings,
        pretty: bool,
        reporter: SharedProgressReporter,
    ) -> Result<Self, GenerateError> {
        reporter.report(ProgressEvent::FetchingCatalog {
            url: format!("{}/shows", settings.api.base_url),
        });
        let show_source = ShowSource::load(client.as_ref(), &settings.api.base_url).await?;

        let show_chain = enrich::configured_show_sources(&settings, &client);
        let episode_chain = enrich::configured_episode_sources(&settings, &client);

        Ok(Self {
            client,
            settings,
            show_source,
            show_chain,
            episode_chain,
            reporter,
            pretty,
        })
    }

    /// The show catalog, keyed by identifier, in ascending id order
    pub fn shows(&self) -> &BTreeMap<ShowId, Show> {
        self.show_source.shows()
    }

    /// Generate the feed for one show.
    ///
    /// With `force` set, a show with zero episodes yields an empty feed
    /// instead of failing, and a voluntary show-level skip is overridden.
    /// Without it, both conditions are returned as errors.
    pub async fn generate_feed(
        &mut self,
        show_id: ShowId,
        force: bool,
    ) -> Result<Vec<u8>, GenerateError> {
        let show = self
            .show_source
            .get(show_id)
            .cloned()
            .ok_or(GenerateError::NoSuchShow(show_id))?;

        let mut episodes = self.episode_source();
        self.generate_show_feed(show, &mut episodes, !force, !force)
            .await
    }

    /// Generate feeds for the given shows, one at a time, in the given order.
    ///
    /// Batch preparation (the whole-catalog episode download and per-source
    /// setup) happens exactly once up front. A show that turns out to have no
    /// episodes or gets skipped by a show-level source is silently omitted
    /// from the result; any other failure aborts the whole batch.
    pub async fn generate_feeds_sequence(
        &mut self,
        show_ids: &[ShowId],
    ) -> Result<BTreeMap<ShowId, Vec<u8>>, GenerateError> {
        let shows: Vec<Show> = show_ids
            .iter()
            .map(|&id| {
                self.show_source
                    .get(id)
                    .cloned()
                    .ok_or(GenerateError::NoSuchShow(id))
            })
            .collect::<Result<_, _>>()?;

        let mut episodes = self.episode_source();
        self.prepare_for_batch(&mut episodes).await?;

        let total = shows.len();
        let mut feeds = BTreeMap::new();
        for (i, show) in shows.into_iter().enumerate() {
            self.reporter.report(ProgressEvent::ShowStarting {
                title: show.title.clone(),
                index: i + 1,
                total,
            });

            let show_id = show.id;
            match self.generate_show_feed(show, &mut episodes, true, true).await {
                Ok(feed) => {
                    feeds.insert(show_id, feed);
                }
                // Skip this show
                Err(e) if e.skips_show() => {}
                Err(e) => return Err(e),
            }
        }

        Ok(feeds)
    }

    /// Generate feeds for every show in the catalog
    pub async fn generate_all_feeds_sequence(
        &mut self,
    ) -> Result<BTreeMap<ShowId, Vec<u8>>, GenerateError> {
        let ids: Vec<ShowId> = self.show_source.shows().keys().copied().collect();
        self.generate_feeds_sequence(&ids).await
    }

    /// Generate one synthetic feed containing every episode of every show.
    ///
    /// Orphaned records (sentinel show id) are excluded. An episode the
    /// chain skips is reported with its originating source and left out
    /// while the scan continues.
    pub async fn generate_feed_with_all_episodes(
        &mut self,
        title: Option<&str>,
    ) -> Result<Vec<u8>, GenerateError> {
        let title = title.unwrap_or(&self.settings.all_episodes_title);
        let show = Show::new(0, title);

        let mut episodes = self.episode_source();
        self.prepare_for_batch(&mut episodes).await?;

        let records: Vec<RawEpisode> = episodes
            .all_episodes()
            .iter()
            .filter(|e| e.show_id != ORPHAN_SHOW_ID)
            .cloned()
            .collect();

        let total = records.len();
        let mut populated = Vec::with_capacity(total);
        for (i, record) in records.iter().enumerate() {
            self.reporter.report(ProgressEvent::EpisodePopulating {
                index: i + 1,
                total,
            });

            let owner = self
                .show_source
                .get(record.show_id)
                .ok_or(GenerateError::NoSuchShow(record.show_id))?;
            let mut episode = Episode::from_raw(owner, record);

            match populate_episode(&mut self.episode_chain, &mut episode).await? {
                Some(skip) => self.reporter.report(ProgressEvent::EpisodeSkipped {
                    episode_title: episode.title.clone(),
                    sound_url: episode.sound_url.clone(),
                    source_id: skip.source_id,
                    reason: skip.reason,
                }),
                None => populated.push(episode),
            }
        }

        let channel = feed::feed_for_show(&show, &populated);
        Ok(feed::render(&channel, self.pretty)?)
    }

    /// Resolve a show by display name, ignoring case, whitespace and
    /// punctuation
    pub fn get_show_id_by_name(&self, name: &str) -> Result<ShowId, GenerateError> {
        let wanted = normalize_name(name);
        self.show_source
            .show_names()
            .iter()
            .find(|(title, _)| normalize_name(title) == wanted)
            .map(|(_, show)| show.id)
            .ok_or_else(|| GenerateError::NoSuchShowName(name.to_string()))
    }

    fn episode_source(&self) -> EpisodeSource {
        EpisodeSource::new(self.client.clone(), self.settings.api.base_url.clone())
    }

    /// One-time batch preparation: download the whole episode list, then let
    /// every source do its own setup
    async fn prepare_for_batch(
        &mut self,
        episodes: &mut EpisodeSource,
    ) -> Result<(), GenerateError> {
        self.reporter.report(ProgressEvent::BatchPrefetch);

        episodes.populate_all_episodes_list().await?;
        for source in &mut self.episode_chain {
            source.prepare_batch().await?;
        }
        for source in &mut self.show_chain {
            source.prepare_batch().await?;
        }
        Ok(())
    }

    async fn generate_show_feed(
        &mut self,
        mut show: Show,
        episodes: &mut EpisodeSource,
        skip_empty: bool,
        enable_skip_show: bool,
    ) -> Result<Vec<u8>, GenerateError> {
        self.reporter.report(ProgressEvent::FindingShowMetadata {
            title: show.title.clone(),
        });

        if let Some(skip) = populate_show(&mut self.show_chain, &mut show, enable_skip_show).await?
        {
            return Err(GenerateError::ShowSkipped {
                title: show.title,
                source_id: skip.source_id,
                reason: skip.reason,
            });
        }

        let records = match episodes.episode_list(&show).await {
            Ok(records) => records,
            // Go on and generate an empty feed
            Err(CatalogError::NoEpisodes { .. }) if !skip_empty => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut populated = Vec::with_capacity(records.len());
        for record in &records {
            let mut episode = Episode::from_raw(&show, record);
            match populate_episode(&mut self.episode_chain, &mut episode).await? {
                Some(skip) => self.reporter.report(ProgressEvent::EpisodeSkipped {
                    episode_title: episode.title.clone(),
                    sound_url: episode.sound_url.clone(),
                    source_id: skip.source_id,
                    reason: skip.reason,
                }),
                None => populated.push(episode),
            }
        }

        let channel = feed::feed_for_show(&show, &populated);
        Ok(feed::render(&channel, self.pretty)?)
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
