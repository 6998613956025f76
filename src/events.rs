// Event types for async communication

/// Events sent from the streaming task back to the UI loop.
///
/// Every event carries the sequence number of the generation that produced
/// it, so events from an aborted stream that were already in flight can be
/// recognized and dropped instead of mutating newer state.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A fragment of idea text received from the endpoint
    IdeaChunk { seq: u64, text: String },
    /// The endpoint closed the stream normally
    StreamEnded { seq: u64 },
    /// The stream failed to start or broke mid-transfer
    StreamFailed { seq: u64 },
}
