use thiserror::Error;

/// The only ways a run can end other than reaching its terminal state.
///
/// Collaborator failures (prober, camera) are not errors — they degrade the
/// narrative and the sequence continues. Nothing here is retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoothError {
    #[error("run cancelled")]
    Cancelled,
    #[error("input source closed before a selection was made")]
    InputClosed,
}
