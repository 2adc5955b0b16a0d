//! Shared test doubles: a camera with countable tracks and fast timings.

use async_trait::async_trait;
use mirror_booth::camera::{CameraDevice, CameraError, MediaStream, MediaTrack};
use mirror_booth::BoothConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// Initialize logging for tests
pub fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

/// Millisecond-scale timings so a full narrative runs in well under a second.
pub fn fast_config() -> BoothConfig {
    BoothConfig {
        type_interval_ms: Some(1),
        read_hold_ms: Some(5),
        fade_out_ms: Some(8),
        fade_in_ms: Some(8),
        camera_hold_ms: Some(20),
        camera_settle_ms: Some(1),
        camera_placement: None,
        branch: None,
        rain_glyphs: Some(10),
        geo_lookup: Some(false),
        script_path: None,
    }
}

pub struct MockTrack {
    live: AtomicBool,
}

impl MediaTrack for MockTrack {
    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

struct MockStream {
    tracks: Vec<Arc<dyn MediaTrack>>,
}

#[async_trait]
impl MediaStream for MockStream {
    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks.clone()
    }
    async fn wait_ready(&self) -> Result<(), CameraError> {
        Ok(())
    }
    async fn grab_frame(&self) -> Result<Vec<u8>, CameraError> {
        Ok(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
    }
}

/// Camera double. Every opened stream's track is remembered so tests can
/// assert the zero-live-tracks property after the fact.
pub struct MockCamera {
    pub deny: bool,
    opened: Mutex<Vec<Arc<MockTrack>>>,
}

impl MockCamera {
    pub fn granting() -> Arc<Self> {
        Arc::new(Self {
            deny: false,
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn denying() -> Arc<Self> {
        Arc::new(Self {
            deny: true,
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn opened_streams(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn live_tracks(&self) -> usize {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.is_live())
            .count()
    }
}

#[async_trait]
impl CameraDevice for MockCamera {
    async fn open_front(&self) -> Result<Box<dyn MediaStream>, CameraError> {
        if self.deny {
            return Err(CameraError::PermissionDenied);
        }
        let track = Arc::new(MockTrack {
            live: AtomicBool::new(true),
        });
        self.opened.lock().unwrap().push(track.clone());
        Ok(Box::new(MockStream {
            tracks: vec![track],
        }))
    }
}
