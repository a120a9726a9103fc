// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::catalog::{Episode, EpisodeId, Show, ShowId};
use crate::error::EnrichError;

/// Outcome of one populate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Population {
    /// The entity stays in the output, whether or not any field was written
    Populated,
    /// The source voluntarily excludes the entity from the output;
    /// the string is a human-readable reason
    Skipped(String),
}

/// A voluntary skip, attributed to the chain source that signalled it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSkip {
    /// Stable id of the source that signalled the skip
    pub source_id: &'static str,
    pub reason: String,
}

/// A unit of enrichment logic for shows
///
/// One instance per configured source type lives inside a generator. An
/// instance may cache state between `prepare_batch` and later `populate`
/// calls, but state never crosses generator instances.
#[async_trait]
pub trait ShowMetadataSource: Send + Sync {
    /// Stable identifier, used to key configuration and bypass sets
    fn id(&self) -> &'static str;

    /// Show ids this source must never act on
    ///
    /// Enforced by the chain runner before `accepts` is even consulted.
    fn bypass(&self) -> &HashSet<ShowId>;

    /// Pure applicability predicate
    fn accepts(&self, show: &Show) -> bool;

    /// Mutate the show in place with enrichment data
    async fn populate(&mut self, show: &mut Show) -> Result<Population, EnrichError>;

    /// One-time setup before a batch begins
    ///
    /// Must be safe to call even if the source will accept zero entities
    /// that batch.
    async fn prepare_batch(&mut self) -> Result<(), EnrichError> {
        Ok(())
    }
}

/// A unit of enrichment logic for episodes
#[async_trait]
pub trait EpisodeMetadataSource: Send + Sync {
    /// Stable identifier, used to key configuration and bypass sets
    fn id(&self) -> &'static str;

    /// Episode ids this source must never act on
    fn bypass(&self) -> &HashSet<EpisodeId>;

    /// Pure applicability predicate
    fn accepts(&self, episode: &Episode) -> bool;

    /// Mutate the episode in place with enrichment data
    async fn populate(&mut self, episode: &mut Episode) -> Result<Population, EnrichError>;

    /// One-time setup before a batch begins
    async fn prepare_batch(&mut self) -> Result<(), EnrichError> {
        Ok(())
    }
}
