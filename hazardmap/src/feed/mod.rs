//! Loading of the hazard feeds.
//!
//! A [`FeedLoader`] returns raw response bodies. A [`DataFetcher`] turns one
//! body into a [`FeatureCollection`](crate::feature::FeatureCollection),
//! renders it into its layer group and reports the result in its status text.

mod fetcher;
mod loader;

pub use fetcher::{DataFetcher, FeedRefresh, RefreshOutcome, StatusMessages};
pub use loader::{FeedLoader, WebFeedLoader};
