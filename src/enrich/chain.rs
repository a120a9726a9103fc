// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::catalog::{Episode, Show};
use crate::error::EnrichError;

use super::source::{ChainSkip, EpisodeMetadataSource, Population, ShowMetadataSource};

/// Run the show-level chain over one show, in configured order.
///
/// A bypassed or non-accepted show is invisible to a source. When
/// `enable_skip` is set, the first voluntary skip aborts the remainder of the
/// chain and is returned; in forced mode the skip is swallowed and the chain
/// continues with the next source. Field overwrite order follows chain
/// order, last writer wins.
pub async fn populate_show(
    sources: &mut [Box<dyn ShowMetadataSource>],
    show: &mut Show,
    enable_skip: bool,
) -> Result<Option<ChainSkip>, EnrichError> {
    for source in sources {
        if source.bypass().contains(&show.id) {
            continue;
        }
        if !source.accepts(show) {
            continue;
        }

        if let Population::Skipped(reason) = source.populate(show).await? {
            if enable_skip {
                return Ok(Some(ChainSkip {
                    source_id: source.id(),
                    reason,
                }));
            }
        }
    }

    Ok(None)
}

/// Run the episode-level chain over one episode, in configured order.
///
/// A voluntary skip aborts the remainder of the chain; the caller decides
/// what omitting the episode means in its context.
pub async fn populate_episode(
    sources: &mut [Box<dyn EpisodeMetadataSource>],
    episode: &mut Episode,
) -> Result<Option<ChainSkip>, EnrichError> {
    for source in sources {
        if source.bypass().contains(&episode.id) {
            continue;
        }
        if !source.accepts(episode) {
            continue;
        }

        if let Population::Skipped(reason) = source.populate(episode).await? {
            return Ok(Some(ChainSkip {
                source_id: source.id(),
                reason,
            }));
        }
    }

    Ok(None)
}
