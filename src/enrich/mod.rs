// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod chain;
mod durations;
mod overrides;
mod source;
mod website;

pub use chain::{populate_episode, populate_show};
pub use durations::DurationSource;
pub use overrides::{EpisodeOverrides, ShowOverrides};
pub use source::{ChainSkip, EpisodeMetadataSource, Population, ShowMetadataSource};
pub use website::{WebsiteEpisodeMetadata, WebsiteShowMetadata};

use crate::config::Settings;
use crate::http::SharedHttpClient;

/// The configured show-level chain, in the order the sources run
///
/// Overrides come last so operator edits win over remote metadata.
pub fn configured_show_sources(
    settings: &Settings,
    client: &SharedHttpClient,
) -> Vec<Box<dyn ShowMetadataSource>> {
    vec![
        Box::new(WebsiteShowMetadata::new(
            &settings.website,
            settings.bypass.shows_for(WebsiteShowMetadata::ID),
            client.clone(),
        )),
        Box::new(ShowOverrides::new(
            settings.overrides.shows.clone(),
            settings.bypass.shows_for(ShowOverrides::ID),
        )),
    ]
}

/// The configured episode-level chain, in the order the sources run
pub fn configured_episode_sources(
    settings: &Settings,
    client: &SharedHttpClient,
) -> Vec<Box<dyn EpisodeMetadataSource>> {
    vec![
        Box::new(WebsiteEpisodeMetadata::new(
            &settings.website,
            settings.bypass.episodes_for(WebsiteEpisodeMetadata::ID),
            client.clone(),
        )),
        Box::new(DurationSource::new(
            &settings.durations,
            settings.bypass.episodes_for(DurationSource::ID),
            client.clone(),
        )),
        Box::new(EpisodeOverrides::new(
            settings.overrides.episodes.clone(),
            settings.bypass.episodes_for(EpisodeOverrides::ID),
        )),
    ]
}
