// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod episode_source;
mod show_source;

pub use episode_source::{
    Episode, EpisodeId, EpisodeSource, ORPHAN_SHOW_ID, RawEpisode, format_duration,
};
pub use show_source::{Show, ShowId, ShowSource};

use serde::de::DeserializeOwned;

use crate::error::CatalogError;
use crate::http::HttpClient;

/// Fetch a JSON document from the archive API and decode it
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &dyn HttpClient,
    url: &str,
) -> Result<T, CatalogError> {
    let bytes = client
        .get_bytes(url)
        .await
        .map_err(|e| CatalogError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;

    serde_json::from_slice(&bytes).map_err(|e| CatalogError::InvalidResponse {
        url: url.to_string(),
        source: e,
    })
}
