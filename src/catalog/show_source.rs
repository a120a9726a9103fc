// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use url::Url;

use crate::error::CatalogError;
use crate::http::HttpClient;

use super::fetch_json;

/// Stable numeric identifier the archive assigns to a show
pub type ShowId = u32;

/// A program/series in the broadcast archive
///
/// The catalog only knows id and title; every other field starts empty and is
/// filled in place by the show-level metadata chain. Later sources overwrite
/// earlier ones.
#[derive(Debug, Clone)]
pub struct Show {
    pub id: ShowId,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<Url>,
    pub author: Option<String>,
    pub website: Option<Url>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub explicit: Option<bool>,
}

impl Show {
    /// Create a show with no enrichment metadata yet
    pub fn new(id: ShowId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            image: None,
            author: None,
            website: None,
            category: None,
            language: None,
            explicit: None,
        }
    }
}

/// One show record as returned by the archive API
#[derive(Debug, Deserialize)]
struct RawShow {
    id: ShowId,
    name: String,
}

/// The full show catalog, fetched once and kept for the source's lifetime
///
/// Construction performs the single catalog fetch; afterwards every lookup is
/// pure. A failure during that first fetch is fatal and propagates; there is
/// no retry.
#[derive(Debug, Clone)]
pub struct ShowSource {
    shows: BTreeMap<ShowId, Show>,
}

impl ShowSource {
    /// Fetch the catalog from `{base_url}/shows`
    pub async fn load(client: &dyn HttpClient, base_url: &str) -> Result<Self, CatalogError> {
        let url = format!("{base_url}/shows");
        let raw: Vec<RawShow> = fetch_json(client, &url).await?;

        let shows = raw
            .into_iter()
            .map(|r| (r.id, Show::new(r.id, r.name)))
            .collect();

        Ok(Self { shows })
    }

    /// All known shows, keyed by identifier, in ascending id order
    pub fn shows(&self) -> &BTreeMap<ShowId, Show> {
        &self.shows
    }

    /// Look up one show by identifier
    pub fn get(&self, id: ShowId) -> Option<&Show> {
        self.shows.get(&id)
    }

    /// Display-name lookup, case-sensitive as stored
    ///
    /// Callers wanting fuzzy matching normalize on their side, see
    /// [`PodcastFeedGenerator::get_show_id_by_name`](crate::generator::PodcastFeedGenerator::get_show_id_by_name).
    pub fn show_names(&self) -> HashMap<&str, &Show> {
        self.shows
            .values()
            .map(|show| (show.title.as_str(), show))
            .collect()
    }
}
