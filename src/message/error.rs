use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised while decoding or encoding a candidate payload.
pub enum MessageError {
    /// Payload is not a valid candidate (bad UTF-8/JSON, missing or ill-typed field).
    ///
    /// Retrying cannot fix these; the controller treats them as poison messages.
    #[error("malformed candidate payload: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },

    /// Candidate could not be serialized for publishing.
    #[error("failed to encode candidate '{id}': {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
