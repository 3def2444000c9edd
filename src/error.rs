use thiserror::Error;

/// Errors raised by the statistics engine and its layer boundary.
#[derive(Error, Debug)]
pub enum CoverageError {
    /// A single layer could not be obtained or normalized. Non-fatal for a run.
    #[error("failed to read layer {layer:?}: {source}")]
    LayerRead {
        layer: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// No layers at all, or none of them produced usable statistics.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    #[error("unsupported coordinate reference system: EPSG:{0}")]
    UnknownCrs(u32),

    #[error("projection from {from} to {to} failed: {message}")]
    Projection { from: String, to: String, message: String },

    #[error("invalid geometry: {0}")]
    Geometry(String),
}

impl CoverageError {
    /// Wrap any error raised while reading `layer` as a [`CoverageError::LayerRead`].
    pub fn layer_read(layer: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::LayerRead { layer: layer.to_string(), source: source.into() }
    }
}
