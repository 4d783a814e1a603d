use tokio::sync::oneshot;

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the inference client actor.
#[derive(Debug)]
pub enum InferenceMessage {
    /// A request for one completion against the inference service.
    Complete {
        /// Task instruction (system-style prompt).
        prompt: String,
        /// Input payload the instruction operates on.
        input: String,
        /// Sampling temperature for this attempt.
        temperature: f32,
        /// A channel to send the extracted JSON payload back.
        responder: oneshot::Sender<Result<String, AppError>>,
    },
}
