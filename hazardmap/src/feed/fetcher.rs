//! Fetch, decode and render cycle of one feed.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::{render_count, FeedConfig};
use crate::error::FetchError;
use crate::feature::{FeatureCollection, FeedFeature};
use crate::feed::FeedLoader;
use crate::layer::{Annotate, LayerBuilder, LayerGroup, OverlayKind};
use crate::ui::StatusText;

/// Result of one refresh. Failures are already reported through the status
/// text when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The group now holds this many annotations.
    Loaded(usize),
    /// The fetch failed and the group was left untouched.
    Failed,
}

/// Status strings of one feed.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessages {
    /// Shown after a successful load, with a `{count}` field.
    pub loaded_template: String,
    /// Shown after a failed load.
    pub failed: String,
}

impl StatusMessages {
    fn loaded(&self, count: usize) -> String {
        render_count(&self.loaded_template, count).unwrap_or_else(|err| {
            log::error!("Invalid status template {:?}: {err}", self.loaded_template);
            count.to_string()
        })
    }
}

impl From<&FeedConfig> for StatusMessages {
    fn from(feed: &FeedConfig) -> Self {
        Self {
            loaded_template: feed.loaded_template.clone(),
            failed: feed.failed_message.clone(),
        }
    }
}

/// Fetches one feed and keeps its layer group and status text up to date.
pub struct DataFetcher<F> {
    kind: OverlayKind,
    url: String,
    loader: Arc<dyn FeedLoader>,
    builder: Arc<LayerBuilder>,
    group: Arc<LayerGroup>,
    status: Arc<StatusText>,
    messages: StatusMessages,
    _feature: PhantomData<fn() -> F>,
}

impl<F> DataFetcher<F>
where
    F: FeedFeature + Annotate,
{
    /// Creates a fetcher that renders `url` into `group`.
    pub fn new(
        kind: OverlayKind,
        url: impl Into<String>,
        loader: Arc<dyn FeedLoader>,
        builder: Arc<LayerBuilder>,
        group: Arc<LayerGroup>,
        status: Arc<StatusText>,
        messages: StatusMessages,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            loader,
            builder,
            group,
            status,
            messages,
            _feature: PhantomData,
        }
    }

    /// Loads and decodes the feed once, without touching the group.
    pub async fn fetch(&self) -> Result<FeatureCollection<F>, FetchError> {
        let bytes = self.loader.load(&self.url).await?;
        FeatureCollection::from_slice(&bytes)
    }

    /// Fetches the feed and replaces the group content with it.
    ///
    /// On failure the group keeps whatever it showed before and the status
    /// shows the failure message. No error escapes this call.
    pub async fn refresh(&self) -> RefreshOutcome {
        match self.fetch().await {
            Ok(collection) => {
                let count = self.builder.build(&collection, &self.group);
                log::info!("Rendered {count} {} into '{}'", F::KIND, self.kind);
                self.status.set_text(self.messages.loaded(count));
                RefreshOutcome::Loaded(count)
            }
            Err(err) => {
                log::error!("Failed to load {} from {}: {err}", F::KIND, self.url);
                self.status.set_text(self.messages.failed.clone());
                RefreshOutcome::Failed
            }
        }
    }
}

/// Type-erased handle used by the controller to drive fetchers of different
/// feature kinds.
#[async_trait::async_trait]
pub trait FeedRefresh: Send + Sync {
    /// Overlay fed by this fetcher.
    fn kind(&self) -> OverlayKind;

    /// See [`DataFetcher::refresh`].
    async fn refresh(&self) -> RefreshOutcome;
}

#[async_trait::async_trait]
impl<F> FeedRefresh for DataFetcher<F>
where
    F: FeedFeature + Annotate + Send + Sync,
{
    fn kind(&self) -> OverlayKind {
        self.kind
    }

    async fn refresh(&self) -> RefreshOutcome {
        DataFetcher::refresh(self).await
    }
}
