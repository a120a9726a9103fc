// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::catalog::{Episode, EpisodeId, Show, ShowId};
use crate::config::{EpisodeOverride, ShowOverride};
use crate::error::EnrichError;

use super::source::{EpisodeMetadataSource, Population, ShowMetadataSource};

/// Operator-maintained show metadata from the settings file
///
/// Accepts exactly the shows present in its table. Configured last in the
/// chain, so its writes win over anything the remote sources provided. A
/// `disabled` entry opts the show out of generation entirely.
pub struct ShowOverrides {
    table: HashMap<ShowId, ShowOverride>,
    bypass: HashSet<ShowId>,
}

impl ShowOverrides {
    pub const ID: &'static str = "show_overrides";

    pub fn new(table: HashMap<ShowId, ShowOverride>, bypass: HashSet<ShowId>) -> Self {
        Self { table, bypass }
    }
}

#[async_trait]
impl ShowMetadataSource for ShowOverrides {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn bypass(&self) -> &HashSet<ShowId> {
        &self.bypass
    }

    fn accepts(&self, show: &Show) -> bool {
        self.table.contains_key(&show.id)
    }

    async fn populate(&mut self, show: &mut Show) -> Result<Population, EnrichError> {
        let Some(entry) = self.table.get(&show.id) else {
            return Ok(Population::Populated);
        };

        if entry.disabled {
            return Ok(Population::Skipped(
                "disabled by local override".to_string(),
            ));
        }

        if let Some(title) = &entry.title {
            show.title = title.clone();
        }
        if entry.description.is_some() {
            show.description = entry.description.clone();
        }
        if entry.image.is_some() {
            show.image = entry.image.clone();
        }
        if entry.author.is_some() {
            show.author = entry.author.clone();
        }
        if entry.website.is_some() {
            show.website = entry.website.clone();
        }
        if entry.category.is_some() {
            show.category = entry.category.clone();
        }
        if entry.language.is_some() {
            show.language = entry.language.clone();
        }
        if entry.explicit.is_some() {
            show.explicit = entry.explicit;
        }

        Ok(Population::Populated)
    }
}

/// Operator-maintained episode metadata from the settings file
///
/// A `hidden` entry excludes the episode from every generated feed.
pub struct EpisodeOverrides {
    table: HashMap<EpisodeId, EpisodeOverride>,
    bypass: HashSet<EpisodeId>,
}

impl EpisodeOverrides {
    pub const ID: &'static str = "episode_overrides";

    pub fn new(table: HashMap<EpisodeId, EpisodeOverride>, bypass: HashSet<EpisodeId>) -> Self {
        Self { table, bypass }
    }
}

#[async_trait]
impl EpisodeMetadataSource for EpisodeOverrides {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn bypass(&self) -> &HashSet<EpisodeId> {
        &self.bypass
    }

    fn accepts(&self, episode: &Episode) -> bool {
        self.table.contains_key(&episode.id)
    }

    async fn populate(&mut self, episode: &mut Episode) -> Result<Population, EnrichError> {
        let Some(entry) = self.table.get(&episode.id) else {
            return Ok(Population::Populated);
        };

        if entry.hidden {
            return Ok(Population::Skipped("hidden by local override".to_string()));
        }

        if let Some(title) = &entry.title {
            episode.title = title.clone();
        }
        if entry.description.is_some() {
            episode.description = entry.description.clone();
        }
        if entry.image.is_some() {
            episode.image = entry.image.clone();
        }
        if entry.article_url.is_some() {
            episode.article_url = entry.article_url.clone();
        }

        Ok(Population::Populated)
    }
}
