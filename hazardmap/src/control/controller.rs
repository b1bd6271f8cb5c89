//! Map session controller.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::{FeedConfig, MapConfig};
use crate::control::ToggleController;
use crate::error::HazardMapError;
use crate::feature::{AlertFeature, QuakeFeature};
use crate::feed::{DataFetcher, FeedLoader, FeedRefresh, RefreshOutcome, StatusMessages};
use crate::layer::tiles::{TileSource, WmsSource};
use crate::layer::{Layer, LayerBuilder, LayerGroup, OverlayKind, TileLayer};
use crate::map::{Map, MapView};
use crate::popup::PopupFormatter;
use crate::ui::UiSurface;

/// Highest zoom requested from the radar WMS.
const RADAR_MAX_ZOOM: u32 = 18;

const LOADING_STATUS: &str = "Loading...";

/// Owns everything that makes up one map session: the map, the overlay layers,
/// the page elements and the feed fetchers.
pub struct MapController {
    config: MapConfig,
    map: Arc<Mutex<Map>>,
    overlays: BTreeMap<OverlayKind, Arc<dyn Layer>>,
    groups: BTreeMap<OverlayKind, Arc<LayerGroup>>,
    ui: Arc<UiSurface>,
    toggles: ToggleController,
    fetchers: Vec<Arc<dyn FeedRefresh>>,
}

impl MapController {
    /// Builds the session: creates the viewport with the base tiles, an empty
    /// group and page elements for every configured overlay, and the fetchers.
    ///
    /// Nothing is fetched or attached before [`start`](Self::start).
    pub fn new(config: MapConfig, loader: Arc<dyn FeedLoader>) -> Result<Self, HazardMapError> {
        config.validate()?;

        let map = Map::new(config.view, TileLayer::osm());
        let builder = Arc::new(LayerBuilder::new(
            PopupFormatter::new(config.time_formatter()?),
            config.size_policy,
        ));

        let mut ui = UiSurface::new();
        let mut overlays: BTreeMap<OverlayKind, Arc<dyn Layer>> = BTreeMap::new();
        let mut groups = BTreeMap::new();
        let mut fetchers: Vec<Arc<dyn FeedRefresh>> = Vec::new();

        if let Some(feed) = &config.weather {
            let (group, fetcher) = feed_overlay::<AlertFeature>(
                OverlayKind::Weather,
                feed,
                &mut ui,
                loader.clone(),
                builder.clone(),
            );
            overlays.insert(OverlayKind::Weather, group.clone());
            groups.insert(OverlayKind::Weather, group);
            fetchers.push(fetcher);
        }

        if let Some(feed) = &config.earthquakes {
            let (group, fetcher) = feed_overlay::<QuakeFeature>(
                OverlayKind::Earthquakes,
                feed,
                &mut ui,
                loader.clone(),
                builder.clone(),
            );
            overlays.insert(OverlayKind::Earthquakes, group.clone());
            groups.insert(OverlayKind::Earthquakes, group);
            fetchers.push(fetcher);
        }

        if let Some(radar) = &config.radar {
            let layer = TileLayer::new(
                OverlayKind::Radar.layer_id(),
                TileSource::Wms(WmsSource {
                    url: radar.url.clone(),
                    layers: radar.layers.clone(),
                    format: radar.format.clone(),
                    transparent: radar.transparent,
                }),
                RADAR_MAX_ZOOM,
            )
            .with_opacity(radar.opacity);

            ui.add_control(OverlayKind::Radar, radar.initially_checked);
            overlays.insert(OverlayKind::Radar, Arc::new(layer));
        }

        let mut toggles = ToggleController::new();
        for (kind, layer) in &overlays {
            if let Some(control) = ui.control(*kind) {
                toggles.bind(control.clone(), layer.clone(), ui.legend(*kind).cloned());
            }
        }

        Ok(Self {
            config,
            map: Arc::new(Mutex::new(map)),
            overlays,
            groups,
            ui: Arc::new(ui),
            toggles,
            fetchers,
        })
    }

    /// Spawns one fetch task per feed and attaches the overlays.
    ///
    /// Returns immediately; the feeds are applied when their tasks run. The
    /// handles can be awaited to wait for the initial load. Must be called from
    /// within a tokio runtime.
    pub fn start(&self) -> Vec<JoinHandle<RefreshOutcome>> {
        log::info!("Starting map session '{}'", self.config.title);

        let handles = self
            .fetchers
            .iter()
            .map(|fetcher| {
                let fetcher = fetcher.clone();
                tokio::spawn(async move { fetcher.refresh().await })
            })
            .collect();

        // Attached in overlay order: alert regions, quake markers, radar on top.
        let mut map = self.map.lock();
        for (kind, layer) in &self.overlays {
            let checked = self
                .ui
                .control(*kind)
                .map(|control| control.is_checked())
                .unwrap_or(true);

            if !checked {
                if self.config.honor_initial_toggles {
                    log::info!("Overlay '{kind}' starts hidden because its control is unchecked");
                    if let Some(legend) = self.ui.legend(*kind) {
                        legend.set_visible(false);
                    }
                    continue;
                }
                log::warn!("Overlay '{kind}' is attached although its control is unchecked");
            }

            map.add_layer(layer.clone());
        }

        for feed in [&self.config.weather, &self.config.earthquakes]
            .into_iter()
            .flatten()
        {
            map.add_attribution(feed.attribution.clone());
        }

        handles
    }

    /// Refreshes all feeds concurrently and waits for them to finish.
    pub async fn refresh_all(&self) -> Vec<(OverlayKind, RefreshOutcome)> {
        join_all(self.fetchers.iter().map(|fetcher| async move {
            (fetcher.kind(), fetcher.refresh().await)
        }))
        .await
    }

    /// Refreshes one feed. Returns `None` if the overlay has no feed.
    pub async fn refresh(&self, kind: OverlayKind) -> Option<RefreshOutcome> {
        let fetcher = self.fetchers.iter().find(|fetcher| fetcher.kind() == kind)?;
        Some(fetcher.refresh().await)
    }

    /// Handles a change of the toggle control of `kind`.
    ///
    /// Returns false if the overlay is not part of this session.
    pub fn set_toggle(&self, kind: OverlayKind, checked: bool) -> bool {
        let Some(control) = self.ui.control(kind) else {
            return false;
        };

        let mut map = self.map.lock();
        self.toggles.set(control.id(), checked, &mut map)
    }

    /// Popup of the `index`-th annotation of a feed overlay.
    pub fn popup(&self, kind: OverlayKind, index: usize) -> Option<String> {
        self.groups.get(&kind)?.popup(index)
    }

    /// Layer group of a feed overlay.
    pub fn group(&self, kind: OverlayKind) -> Option<&Arc<LayerGroup>> {
        self.groups.get(&kind)
    }

    /// Page elements.
    pub fn ui(&self) -> &UiSurface {
        &self.ui
    }

    /// Session config.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Locks the map.
    pub fn map(&self) -> MutexGuard<'_, Map> {
        self.map.lock()
    }

    /// Current state of the page.
    pub fn snapshot(&self) -> PageSnapshot {
        let map = self.map.lock();

        let layers = map
            .layers()
            .iter()
            .map(|layer| LayerSnapshot {
                id: layer.id().to_string(),
                annotations: layer.annotation_count(),
            })
            .collect();

        let controls = self
            .ui
            .overlays()
            .map(|kind| ControlSnapshot {
                overlay: kind,
                checked: self
                    .ui
                    .control(kind)
                    .map(|control| control.is_checked())
                    .unwrap_or(false),
                legend_visible: self.ui.legend(kind).map(|legend| legend.is_visible()),
                status: self.ui.status(kind).map(|status| status.text()),
            })
            .collect();

        PageSnapshot {
            title: self.config.title.clone(),
            view: map.view(),
            base_layer: map.base_layer().id().to_string(),
            layers,
            controls,
            attributions: map.attributions().to_vec(),
        }
    }
}

fn feed_overlay<F>(
    kind: OverlayKind,
    feed: &FeedConfig,
    ui: &mut UiSurface,
    loader: Arc<dyn FeedLoader>,
    builder: Arc<LayerBuilder>,
) -> (Arc<LayerGroup>, Arc<dyn FeedRefresh>)
where
    F: crate::feature::FeedFeature + crate::layer::Annotate + Send + Sync + 'static,
{
    let group = Arc::new(LayerGroup::new(kind.layer_id()));
    ui.add_control(kind, feed.initially_checked);
    ui.add_legend(kind);
    let status = ui.add_status(kind, LOADING_STATUS);

    let fetcher = DataFetcher::<F>::new(
        kind,
        feed.url.clone(),
        loader,
        builder,
        group.clone(),
        status,
        StatusMessages::from(feed),
    );

    (group, Arc::new(fetcher))
}

/// Serializable view of one attached layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSnapshot {
    /// Layer id.
    pub id: String,
    /// Number of annotations for feature layers.
    pub annotations: Option<usize>,
}

/// Serializable view of one toggle control and its companions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSnapshot {
    /// Controlled overlay.
    pub overlay: OverlayKind,
    /// Control state.
    pub checked: bool,
    /// Legend visibility, if the overlay has a legend.
    pub legend_visible: Option<bool>,
    /// Status text, if the overlay has one.
    pub status: Option<String>,
}

/// Serializable view of the whole page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSnapshot {
    /// Page title.
    pub title: String,
    /// Current viewport.
    pub view: MapView,
    /// Id of the base layer.
    pub base_layer: String,
    /// Attached overlays, bottom first.
    pub layers: Vec<LayerSnapshot>,
    /// Toggle controls in display order.
    pub controls: Vec<ControlSnapshot>,
    /// Credit lines.
    pub attributions: Vec<String>,
}

impl PageSnapshot {
    /// Returns true if the overlay layer is attached.
    pub fn is_attached(&self, kind: OverlayKind) -> bool {
        self.layers.iter().any(|layer| layer.id == kind.layer_id())
    }

    /// Status text of an overlay.
    pub fn status(&self, kind: OverlayKind) -> Option<&str> {
        self.controls
            .iter()
            .find(|control| control.overlay == kind)?
            .status
            .as_deref()
    }
}
