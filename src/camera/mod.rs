//! Camera capture.
//!
//! One grab per run: acquire the front-facing stream, wait for it to report
//! metadata-ready, let it settle for one fixed delay, pull a single frame,
//! encode it as a `data:` URL, and get out.
//!
//! The one invariant this module exists to enforce: **no media track stays
//! live past the capture step** — success, failure, or cancellation. Track
//! release rides a drop guard, so every early-return path is covered.
//!
//! Permission denial and absent hardware are not errors at this boundary;
//! they resolve to `CaptureResult { succeeded: false }` and the narrative
//! moves on.

use crate::core::cancel::CancelToken;
use crate::core::types::CaptureResult;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Internal camera failure taxonomy. Never crosses the `capture()` boundary.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("no camera available on this machine")]
    Unavailable,
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera stream error: {0}")]
    Stream(String),
}

/// One track of a media stream. `stop()` must be idempotent.
pub trait MediaTrack: Send + Sync {
    fn stop(&self);
    fn is_live(&self) -> bool;
}

/// An open camera stream.
#[async_trait]
pub trait MediaStream: Send + Sync {
    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;
    /// Resolves once the stream has a decodable frame (the metadata-loaded
    /// moment). The settle delay comes after this, in `capture()`.
    async fn wait_ready(&self) -> Result<(), CameraError>;
    /// Pull one encoded PNG frame.
    async fn grab_frame(&self) -> Result<Vec<u8>, CameraError>;
}

/// Camera hardware seam. The kiosk injects whatever device integration it
/// has; tests inject mocks with countable tracks.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open_front(&self) -> Result<Box<dyn MediaStream>, CameraError>;
}

/// Device for booths without camera hardware: every open attempt resolves
/// `Unavailable`, which `capture()` turns into a silent failed result.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

#[async_trait]
impl CameraDevice for NoCamera {
    async fn open_front(&self) -> Result<Box<dyn MediaStream>, CameraError> {
        Err(CameraError::Unavailable)
    }
}

/// Stops every track when dropped. Holding the stream exclusively inside the
/// guard is what makes the release invariant unconditional.
struct StreamGuard(Box<dyn MediaStream>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        for track in self.0.tracks() {
            track.stop();
        }
    }
}

/// Take one frame from `device`.
///
/// Never returns an error: any failure (open, ready-wait, grab) or a
/// cancellation mid-capture resolves to `CaptureResult::failed()`, with all
/// tracks stopped either way.
pub async fn capture(
    device: &dyn CameraDevice,
    settle: Duration,
    cancel: &CancelToken,
) -> CaptureResult {
    let stream = match device.open_front().await {
        Ok(s) => s,
        Err(e) => {
            warn!("camera: open failed, skipping capture: {}", e);
            return CaptureResult::failed();
        }
    };
    let guard = StreamGuard(stream);

    let ready = tokio::select! {
        r = guard.0.wait_ready() => r,
        _ = cancel.cancelled() => {
            debug!("camera: cancelled while waiting for stream readiness");
            return CaptureResult::failed(); // guard drop stops the tracks
        }
    };
    if let Err(e) = ready {
        warn!("camera: stream never became ready: {}", e);
        return CaptureResult::failed();
    }

    // Metadata-ready first, then one fixed settle delay — the two strategies
    // the source kiosks mixed, standardized into a single order.
    if !cancel.sleep(settle).await {
        debug!("camera: cancelled during settle delay");
        return CaptureResult::failed();
    }

    let frame = tokio::select! {
        f = guard.0.grab_frame() => f,
        _ = cancel.cancelled() => {
            debug!("camera: cancelled during frame grab");
            return CaptureResult::failed();
        }
    };
    let bytes = match frame {
        Ok(b) => b,
        Err(e) => {
            warn!("camera: frame grab failed: {}", e);
            return CaptureResult::failed();
        }
    };

    // Release before the result exists: by the time anyone can look at the
    // frame, the camera light is off.
    drop(guard);

    debug!("camera: captured {} bytes", bytes.len());
    CaptureResult {
        image_data: format!("data:image/png;base64,{}", BASE64.encode(&bytes)),
        succeeded: true,
        captured_at: Some(chrono::Utc::now().to_rfc3339()),
    }
}
