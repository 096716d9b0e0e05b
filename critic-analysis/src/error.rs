use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The model's reply contained no recognizable JSON object.
    #[error("no JSON object found in model response")]
    NoJsonObject,
    #[error("malformed model response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    /// A highlight named a category outside the fixed taxonomy.
    #[error("unknown highlight category `{0}`")]
    UnknownCategory(String),
    /// A required field was present but unusable (empty quote, empty
    /// explanation).
    #[error("invalid highlight: {0}")]
    InvalidHighlight(String),
    /// The vendor reply did not have the expected envelope shape.
    #[error("unexpected {vendor} response shape: missing {field}")]
    UnexpectedEnvelope {
        vendor: &'static str,
        field: &'static str,
    },
    #[error("transport error: {0}")]
    Transport(String),
}
