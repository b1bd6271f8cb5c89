//! Loads the worldwide earthquake map once and prints its status and markers.

use std::sync::Arc;

use hazardmap::feed::WebFeedLoader;
use hazardmap::layer::OverlayKind;
use hazardmap::{MapConfig, MapController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = MapConfig::earthquake_only();
    let loader = Arc::new(WebFeedLoader::from_config(&config)?);
    let controller = MapController::new(config, loader)?;

    for handle in controller.start() {
        handle.await?;
    }

    let snapshot = controller.snapshot();
    if let Some(status) = snapshot.status(OverlayKind::Earthquakes) {
        println!("{status}");
    }

    if let Some(group) = controller.group(OverlayKind::Earthquakes) {
        for annotation in group.annotations().iter().take(5) {
            println!(
                "{} r={:?}",
                annotation.style.fill_color,
                annotation.style.radius
            );
        }
    }

    Ok(())
}
