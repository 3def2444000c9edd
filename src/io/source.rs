use std::path::Path;

use anyhow::{anyhow, bail, Result};

use crate::{
    config::ColumnNames,
    io::{gpkg::GeoPackage, shp::ShapefileDir},
    layer::Layer,
};

/// An ordered collection of named survey layers.
pub trait LayerSource {
    /// Layer names in processing order.
    fn layer_names(&self) -> Result<Vec<String>>;

    /// Read one layer with its records, schema, and CRS tag.
    fn read_layer(&self, name: &str) -> Result<Layer>;
}

/// Open `path` as a layer source: a directory of shapefiles, or a GeoPackage file.
pub fn open_source(path: &Path, columns: &ColumnNames) -> Result<Box<dyn LayerSource>> {
    if path.is_dir() {
        return Ok(Box::new(ShapefileDir::open(path, columns.clone())?));
    }
    if !path.exists() {
        bail!("[io::source] Input does not exist: {}", path.display());
    }
    Ok(Box::new(GeoPackage::open(path, columns.clone())?))
}

/// Layers held in memory, with optional injected read failures.
#[derive(Debug, Default)]
pub struct InMemorySource {
    layers: Vec<(String, std::result::Result<Layer, String>)>,
}

impl InMemorySource {
    pub fn new() -> Self { Self::default() }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push((layer.name.clone(), Ok(layer)));
        self
    }

    /// Register a layer that fails to read with `message`.
    pub fn with_failing_layer(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.layers.push((name.into(), Err(message.into())));
        self
    }
}

impl LayerSource for InMemorySource {
    fn layer_names(&self) -> Result<Vec<String>> {
        Ok(self.layers.iter().map(|(name, _)| name.clone()).collect())
    }

    fn read_layer(&self, name: &str) -> Result<Layer> {
        match self.layers.iter().find(|(n, _)| n == name) {
            Some((_, Ok(layer))) => Ok(layer.clone()),
            Some((_, Err(message))) => Err(anyhow!("{message}")),
            None => bail!("[io::source] No layer named {name:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerSchema;

    #[test]
    fn in_memory_source_keeps_order_and_failures() {
        let source = InMemorySource::new()
            .with_layer(Layer::new("b", None, LayerSchema::FULL, Vec::new()))
            .with_failing_layer("broken", "corrupt")
            .with_layer(Layer::new("a", None, LayerSchema::default(), Vec::new()));

        assert_eq!(source.layer_names().unwrap(), vec!["b", "broken", "a"]);
        assert_eq!(source.read_layer("a").unwrap().schema, LayerSchema::default());
        assert_eq!(source.read_layer("broken").unwrap_err().to_string(), "corrupt");
        assert!(source.read_layer("missing").is_err());
    }

    #[test]
    fn missing_input_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_source(&dir.path().join("nope.gpkg"), &ColumnNames::default()).is_err());
    }
}
