use std::collections::HashMap;

use geo::Geometry;

use crate::{layer::Layer, stats::Availability};

/// One drawable survey feature, already in the map's reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageFeature {
    pub geometry: Geometry<f64>,
    pub availability: Availability,
}

/// Per-institution feature lists gathered from normalized layers.
#[derive(Debug, Clone, Default)]
pub struct CoverageCollector {
    index: HashMap<String, usize>,
    institutions: Vec<(String, Vec<CoverageFeature>)>, // In order of first appearance.
}

impl CoverageCollector {
    pub fn new() -> Self { Self::default() }

    /// Collect every record that names an institution. Layers without an institution column add nothing.
    pub fn add_layer(&mut self, layer: &Layer) {
        if !layer.schema.has_institution { return }

        for record in &layer.records {
            let Some(institution) = record.institution.as_deref() else { continue };
            let i = match self.index.get(institution) {
                Some(&i) => i,
                None => {
                    self.index.insert(institution.to_string(), self.institutions.len());
                    self.institutions.push((institution.to_string(), Vec::new()));
                    self.institutions.len() - 1
                }
            };
            self.institutions[i].1.push(CoverageFeature {
                geometry: record.geometry.clone(),
                availability: Availability::of_record(record, &layer.schema),
            });
        }
    }

    #[inline] pub fn len(&self) -> usize { self.institutions.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.institutions.is_empty() }

    /// Institutions with their features, in order of first appearance.
    pub fn institutions(&self) -> impl Iterator<Item = (&str, &[CoverageFeature])> + '_ {
        self.institutions.iter().map(|(name, features)| (name.as_str(), features.as_slice()))
    }

    pub fn features(&self, institution: &str) -> Option<&[CoverageFeature]> {
        self.index.get(institution).map(|&i| self.institutions[i].1.as_slice())
    }

    /// Every collected feature across institutions.
    pub fn all_features(&self) -> impl Iterator<Item = &CoverageFeature> + '_ {
        self.institutions.iter().flat_map(|(_, features)| features)
    }
}
