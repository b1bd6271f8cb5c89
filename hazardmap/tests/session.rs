mod common;

use hazardmap::config::{MapConfig, NWS_ACTIVE_LAND_ALERTS_URL, USGS_ALL_DAY_URL};
use hazardmap::feed::RefreshOutcome;
use hazardmap::layer::{OverlayKind, Shape};
use hazardmap::{Color, MapController};

use common::{combined_config, fixture_loader, init_logger, MemoryLoader, EARTHQUAKES};

async fn start_and_wait(controller: &MapController) -> Vec<RefreshOutcome> {
    let mut outcomes = Vec::new();
    for handle in controller.start() {
        outcomes.push(handle.await.expect("fetch task panicked"));
    }
    outcomes
}

#[tokio::test]
async fn startup_renders_both_feeds() {
    init_logger();
    let controller = MapController::new(combined_config(), fixture_loader()).expect("valid config");

    let outcomes = start_and_wait(&controller).await;
    assert_eq!(outcomes, vec![RefreshOutcome::Loaded(2), RefreshOutcome::Loaded(2)]);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.status(OverlayKind::Earthquakes), Some("2 earthquakes loaded"));
    assert_eq!(snapshot.status(OverlayKind::Weather), Some("2 weather alerts loaded"));
    assert!(snapshot.is_attached(OverlayKind::Weather));
    assert!(snapshot.is_attached(OverlayKind::Earthquakes));
    assert!(snapshot.is_attached(OverlayKind::Radar));
    assert_eq!(snapshot.base_layer, "base");
    assert_eq!(
        snapshot.attributions,
        vec![
            "© OpenStreetMap contributors".to_string(),
            "Weather data from NWS".to_string(),
            "Earthquake data from USGS".to_string(),
        ]
    );
}

#[tokio::test]
async fn start_attaches_overlays_before_feeds_arrive() {
    let controller = MapController::new(combined_config(), fixture_loader()).expect("valid config");

    let handles = controller.start();

    let snapshot = controller.snapshot();
    for kind in OverlayKind::ALL {
        assert!(snapshot.is_attached(kind), "{kind} is not attached");
    }
    assert_eq!(snapshot.status(OverlayKind::Earthquakes), Some("Loading..."));
    assert_eq!(snapshot.status(OverlayKind::Weather), Some("Loading..."));
    assert!(controller
        .group(OverlayKind::Earthquakes)
        .expect("earthquake group")
        .is_empty());
    assert!(controller
        .group(OverlayKind::Weather)
        .expect("weather group")
        .is_empty());

    for handle in handles {
        handle.await.expect("fetch task panicked");
    }

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.status(OverlayKind::Earthquakes), Some("2 earthquakes loaded"));
    assert_eq!(snapshot.status(OverlayKind::Weather), Some("2 weather alerts loaded"));
}

#[tokio::test]
async fn quake_markers_follow_style_rules() {
    let controller = MapController::new(combined_config(), fixture_loader()).expect("valid config");
    start_and_wait(&controller).await;

    let group = controller
        .group(OverlayKind::Earthquakes)
        .expect("earthquake group");
    let annotations = group.annotations();
    assert_eq!(annotations.len(), 2);

    let colors: Vec<Color> = annotations.iter().map(|a| a.style.fill_color).collect();
    assert_eq!(colors, vec![Color::DARK_RED, Color::GREEN]);

    assert_eq!(annotations[0].style.radius, Some(20.0));
    let small = annotations[1].style.radius.expect("marker radius");
    assert!(approx::relative_eq!(small, 6.3, epsilon = 1e-9));

    match &annotations[0].shape {
        Shape::CircleMarker { center } => {
            assert_eq!(center.lat, 37.5531);
            assert_eq!(center.lon, 142.3725);
            assert_eq!(center.depth_km, Some(35.2));
        }
        shape => panic!("unexpected shape {shape:?}"),
    }
}

#[tokio::test]
async fn alert_regions_skip_features_without_geometry() {
    let controller = MapController::new(combined_config(), fixture_loader()).expect("valid config");
    start_and_wait(&controller).await;

    let group = controller.group(OverlayKind::Weather).expect("weather group");
    let annotations = group.annotations();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].style.fill_color, Color::DARK_RED);
    assert_eq!(annotations[1].style.fill_color, Color::ORANGE);
    assert!(annotations
        .iter()
        .all(|a| matches!(a.shape, Shape::Region { .. }) && a.style.radius.is_none()));

    let popup = controller
        .popup(OverlayKind::Weather, 0)
        .expect("popup of first alert");
    assert!(popup.contains("<strong>Event:</strong> Tornado Warning"));
    assert!(popup.contains("<strong>Area:</strong> Cleveland, OK; McClain, OK"));
    assert!(popup.contains("<strong>Effective:</strong> "));
    assert!(!popup.contains("<strong>Effective:</strong> N/A"));
}

#[tokio::test]
async fn failed_weather_feed_does_not_affect_earthquakes() {
    let loader = MemoryLoader::new();
    loader.respond(USGS_ALL_DAY_URL, EARTHQUAKES);
    loader.fail(NWS_ACTIVE_LAND_ALERTS_URL, 503);

    let controller = MapController::new(combined_config(), loader).expect("valid config");
    start_and_wait(&controller).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.status(OverlayKind::Weather), Some("Failed to load weather alerts"));
    assert_eq!(snapshot.status(OverlayKind::Earthquakes), Some("2 earthquakes loaded"));
    assert!(controller
        .group(OverlayKind::Weather)
        .expect("weather group")
        .is_empty());
    assert_eq!(
        controller
            .group(OverlayKind::Earthquakes)
            .expect("earthquake group")
            .len(),
        2
    );
    // The base map and the overlays stay attached.
    assert!(snapshot.is_attached(OverlayKind::Weather));
}

#[tokio::test]
async fn failed_refresh_keeps_rendered_content() {
    let loader = fixture_loader();
    let controller = MapController::new(combined_config(), loader.clone()).expect("valid config");
    start_and_wait(&controller).await;
    let before = controller
        .group(OverlayKind::Earthquakes)
        .expect("earthquake group")
        .annotations();

    loader.respond(USGS_ALL_DAY_URL, "{\"type\": \"FeatureCollection\", \"features\": [");
    assert_eq!(
        controller.refresh(OverlayKind::Earthquakes).await,
        Some(RefreshOutcome::Failed)
    );

    let group = controller.group(OverlayKind::Earthquakes).expect("earthquake group");
    assert_eq!(group.annotations(), before);
    assert_eq!(
        controller.snapshot().status(OverlayKind::Earthquakes),
        Some("Failed to load earthquake data")
    );
    assert_eq!(loader.request_count(USGS_ALL_DAY_URL), 2);
}

#[tokio::test]
async fn refresh_is_a_full_replacement() {
    let loader = fixture_loader();
    let controller = MapController::new(combined_config(), loader.clone()).expect("valid config");
    start_and_wait(&controller).await;
    let first = controller
        .group(OverlayKind::Earthquakes)
        .expect("earthquake group")
        .annotations();

    let outcomes = controller.refresh_all().await;
    assert!(outcomes.contains(&(OverlayKind::Earthquakes, RefreshOutcome::Loaded(2))));
    assert!(outcomes.contains(&(OverlayKind::Weather, RefreshOutcome::Loaded(2))));
    assert_eq!(
        controller
            .group(OverlayKind::Earthquakes)
            .expect("earthquake group")
            .annotations(),
        first
    );

    loader.respond(
        USGS_ALL_DAY_URL,
        r#"{"type": "FeatureCollection", "features": []}"#,
    );
    controller.refresh(OverlayKind::Earthquakes).await;
    assert!(controller
        .group(OverlayKind::Earthquakes)
        .expect("earthquake group")
        .is_empty());
    assert_eq!(
        controller.snapshot().status(OverlayKind::Earthquakes),
        Some("0 earthquakes loaded")
    );
}

#[tokio::test]
async fn radar_toggle_is_idempotent() {
    let controller = MapController::new(combined_config(), fixture_loader()).expect("valid config");
    start_and_wait(&controller).await;

    for _ in 0..2 {
        assert!(controller.set_toggle(OverlayKind::Radar, false));
        assert!(!controller.snapshot().is_attached(OverlayKind::Radar));
        assert!(controller.set_toggle(OverlayKind::Radar, true));
    }
    assert!(controller.set_toggle(OverlayKind::Radar, true));

    let snapshot = controller.snapshot();
    let radar_layers = snapshot
        .layers
        .iter()
        .filter(|layer| layer.id == "radar")
        .count();
    assert_eq!(radar_layers, 1);
}

#[tokio::test]
async fn legend_mirrors_control_state() {
    let controller = MapController::new(combined_config(), fixture_loader()).expect("valid config");
    start_and_wait(&controller).await;

    controller.set_toggle(OverlayKind::Earthquakes, false);
    let legend = controller
        .ui()
        .legend(OverlayKind::Earthquakes)
        .expect("earthquake legend");
    assert!(!legend.is_visible());
    assert!(!controller.snapshot().is_attached(OverlayKind::Earthquakes));
    // Hiding a layer keeps its content.
    assert_eq!(
        controller
            .group(OverlayKind::Earthquakes)
            .expect("earthquake group")
            .len(),
        2
    );

    controller.set_toggle(OverlayKind::Earthquakes, true);
    assert!(legend.is_visible());
    assert!(controller.snapshot().is_attached(OverlayKind::Earthquakes));
    assert!(controller.ui().legend(OverlayKind::Radar).is_none());
}

#[tokio::test]
async fn unchecked_controls_do_not_hide_overlays_by_default() {
    let mut config = combined_config();
    if let Some(weather) = config.weather.as_mut() {
        weather.initially_checked = false;
    }

    let controller = MapController::new(config.clone(), fixture_loader()).expect("valid config");
    start_and_wait(&controller).await;
    assert!(controller.snapshot().is_attached(OverlayKind::Weather));

    config.honor_initial_toggles = true;
    let controller = MapController::new(config, fixture_loader()).expect("valid config");
    start_and_wait(&controller).await;
    let snapshot = controller.snapshot();
    assert!(!snapshot.is_attached(OverlayKind::Weather));
    assert!(snapshot.is_attached(OverlayKind::Earthquakes));
    assert_eq!(
        controller
            .ui()
            .legend(OverlayKind::Weather)
            .map(|legend| legend.is_visible()),
        Some(false)
    );
}

#[tokio::test]
async fn earthquake_only_map() {
    let config = MapConfig {
        time_zone: hazardmap::popup::DisplayZone::Utc,
        ..MapConfig::earthquake_only()
    };
    let loader = fixture_loader();
    let controller = MapController::new(config, loader.clone()).expect("valid config");
    start_and_wait(&controller).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.layers.len(), 1);
    assert_eq!(
        snapshot.status(OverlayKind::Earthquakes),
        Some("Displaying 2 earthquakes from the past 24 hours worldwide")
    );
    assert_eq!(loader.request_count(NWS_ACTIVE_LAND_ALERTS_URL), 0);
    assert!(!controller.set_toggle(OverlayKind::Radar, false));

    let radii: Vec<Option<f64>> = controller
        .group(OverlayKind::Earthquakes)
        .expect("earthquake group")
        .annotations()
        .iter()
        .map(|a| a.style.radius)
        .collect();
    assert_eq!(radii, vec![Some(20.0), Some(6.0)]);

    let popup = controller
        .popup(OverlayKind::Earthquakes, 0)
        .expect("popup of first quake");
    assert!(popup.contains("<strong>Magnitude:</strong> 7.2"));
    assert!(popup.contains("<strong>Location:</strong> 112 km E of Namie, Japan"));
    assert!(popup.contains("<strong>Depth:</strong> 35.2 km"));
    assert!(popup.contains("<strong>Coordinates:</strong> 37.553, "));
    assert!(popup.contains("More details"));
}
