// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rss::extension::itunes::{
    ITunesCategoryBuilder, ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder,
};
use rss::{Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder, Item, ItemBuilder};

use crate::catalog::{Episode, Show};
use crate::error::FeedError;

/// Build an RSS 2.0 channel for a populated show and its populated episodes
///
/// The episodes are expected to have survived the episode-level chain;
/// skipped ones are simply not in the slice.
pub fn feed_for_show(show: &Show, episodes: &[Episode]) -> Channel {
    let itunes = ITunesChannelExtensionBuilder::default()
        .author(show.author.clone())
        .image(show.image.as_ref().map(|u| u.to_string()))
        .explicit(show.explicit.map(|e| yes_no(e).to_string()))
        .categories(
            show.category
                .as_deref()
                .map(|c| vec![ITunesCategoryBuilder::default().text(c).build()])
                .unwrap_or_default(),
        )
        .build();

    let items: Vec<Item> = episodes.iter().map(item_for_episode).collect();

    ChannelBuilder::default()
        .title(show.title.clone())
        .link(
            show.website
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_default(),
        )
        .description(show.description.clone().unwrap_or_default())
        .language(show.language.clone())
        .itunes_ext(itunes)
        .items(items)
        .build()
}

/// Build one feed entry from a populated episode
pub fn item_for_episode(episode: &Episode) -> Item {
    let enclosure = EnclosureBuilder::default()
        .url(episode.sound_url.clone())
        .length(
            episode
                .size
                .map(|s| s.to_string())
                .unwrap_or_default(),
        )
        .mime_type("audio/mpeg".to_string())
        .build();

    let guid = GuidBuilder::default()
        .value(episode.sound_url.clone())
        .permalink(false)
        .build();

    let itunes = ITunesItemExtensionBuilder::default()
        .duration(episode.duration.clone())
        .image(episode.image.as_ref().map(|u| u.to_string()))
        .build();

    ItemBuilder::default()
        .title(episode.title.clone())
        .description(episode.description.clone())
        .link(episode.article_url.as_ref().map(|u| u.to_string()))
        .pub_date(episode.pub_date.map(|dt| dt.to_rfc2822()))
        .guid(guid)
        .enclosure(enclosure)
        .itunes_ext(itunes)
        .build()
}

/// Serialize a channel to XML bytes, minified or pretty
pub fn render(channel: &Channel, pretty: bool) -> Result<Vec<u8>, FeedError> {
    let mut buf = Vec::new();
    if pretty {
        channel.pretty_write_to(&mut buf, b' ', 2)?;
    } else {
        channel.write_to(&mut buf)?;
    }
    Ok(buf)
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
