pub mod camera;
pub mod core;
pub mod fx;
pub mod probe;
pub mod script;
pub mod sequencer;
pub mod stage;

// --- Primary core exports ---
pub use self::core::cancel::{cancel_pair, CancelHandle, CancelToken};
pub use self::core::config::{load_booth_config, BoothConfig};
pub use self::core::error::BoothError;
pub use self::core::types::*;
pub use self::core::Booth;

pub use self::script::{PhraseScript, ScriptSet};
pub use self::sequencer::Sequencer;
pub use self::stage::{Slot, Stage};
