#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use hazardmap::config::{MapConfig, NWS_ACTIVE_LAND_ALERTS_URL, USGS_ALL_DAY_URL};
use hazardmap::error::FetchError;
use hazardmap::feed::FeedLoader;
use hazardmap::popup::DisplayZone;
use parking_lot::Mutex;

pub const EARTHQUAKES: &str = include_str!("../data/earthquakes.geojson");
pub const ALERTS: &str = include_str!("../data/alerts.geojson");

/// Serves canned responses by URL. Unknown URLs answer with 404.
#[derive(Default)]
pub struct MemoryLoader {
    responses: Mutex<HashMap<String, Result<Bytes, u16>>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, body: &'static str) {
        self.responses
            .lock()
            .insert(url.to_string(), Ok(Bytes::from_static(body.as_bytes())));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.responses.lock().insert(url.to_string(), Err(status));
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| *r == url).count()
    }
}

#[async_trait::async_trait]
impl FeedLoader for MemoryLoader {
    async fn load(&self, url: &str) -> Result<Bytes, FetchError> {
        self.requests.lock().push(url.to_string());
        let response = self.responses.lock().get(url).cloned();
        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(FetchError::Status(status)),
            None => Err(FetchError::Status(404)),
        }
    }
}

/// Loader answering both feeds with the bundled fixtures.
pub fn fixture_loader() -> Arc<MemoryLoader> {
    let loader = MemoryLoader::new();
    loader.respond(USGS_ALL_DAY_URL, EARTHQUAKES);
    loader.respond(NWS_ACTIVE_LAND_ALERTS_URL, ALERTS);
    loader
}

/// Combined preset with timestamps in UTC so that tests do not depend on the
/// machine zone.
pub fn combined_config() -> MapConfig {
    MapConfig {
        time_zone: DisplayZone::Utc,
        ..MapConfig::combined()
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
