mod build;

pub use build::{feed_for_show, item_for_episode, render};
