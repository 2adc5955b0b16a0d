use crate::camera::{CameraDevice, NoCamera};
use crate::core::config::BoothConfig;
use crate::core::types::{BranchMode, CameraPlacement, Timings};
use crate::probe::{EnvironmentProber, HostProber};
use crate::script::ScriptSet;
use crate::stage::Stage;
use std::sync::Arc;

/// The collaborator bundle one run is wired with. Explicit and passed in —
/// the original kiosks kept all of this in module-level globals, which is
/// exactly how twenty drifting copies happened.
#[derive(Clone)]
pub struct Booth {
    pub stage: Arc<dyn Stage>,
    pub prober: Arc<dyn EnvironmentProber>,
    pub camera: Arc<dyn CameraDevice>,
    pub scripts: Arc<ScriptSet>,
    pub timings: Timings,
    pub camera_placement: CameraPlacement,
    pub branch: BranchMode,
    pub rain_glyphs: usize,
}

impl std::fmt::Debug for Booth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Booth")
            .field("timings", &self.timings)
            .field("camera_placement", &self.camera_placement)
            .field("branch", &self.branch)
            .field("rain_glyphs", &self.rain_glyphs)
            .finish()
    }
}

impl Booth {
    /// Wire a booth from config with the default collaborators: host
    /// prober, no camera hardware, built-in decks. Swap pieces with the
    /// `with_*` builders.
    pub fn new(stage: Arc<dyn Stage>, config: &BoothConfig) -> Self {
        let scripts = match &config.script_path {
            Some(path) => match ScriptSet::from_json_file(std::path::Path::new(path)) {
                Ok(set) => set,
                Err(e) => {
                    tracing::warn!("booth: {} — falling back to built-in decks", e);
                    ScriptSet::builtin()
                }
            },
            None => ScriptSet::builtin(),
        };
        Self {
            stage,
            prober: Arc::new(HostProber::new(config.resolve_geo_lookup())),
            camera: Arc::new(NoCamera),
            scripts: Arc::new(scripts),
            timings: config.timings(),
            camera_placement: config.resolve_camera_placement(),
            branch: config.resolve_branch(),
            rain_glyphs: config.resolve_rain_glyphs(),
        }
    }

    pub fn with_prober(mut self, prober: Arc<dyn EnvironmentProber>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_camera(mut self, camera: Arc<dyn CameraDevice>) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_scripts(mut self, scripts: ScriptSet) -> Self {
        self.scripts = Arc::new(scripts);
        self
    }
}
