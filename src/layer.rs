use geo::Geometry;

use crate::geom::Crs;

/// Layer-wide presence of the optional attribute columns.
///
/// Absence of a column is a layer-level fact and is resolved once per layer,
/// while a null value inside a present column is a per-record fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerSchema {
    pub has_institution: bool,
    pub has_campaign: bool,
    pub has_availability: bool,
}

impl LayerSchema {
    /// Schema with every optional column present.
    pub const FULL: Self = Self { has_institution: true, has_campaign: true, has_availability: true };
}

/// One surveyed feature with its raw attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    pub geometry: Geometry<f64>,
    pub institution: Option<String>,
    pub campaign: Option<String>,
    /// Raw availability code (`s`, `u`, `o`, or anything else).
    pub availability: Option<String>,
}

impl SurveyRecord {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self { geometry: geometry.into(), institution: None, campaign: None, availability: None }
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    pub fn with_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.campaign = Some(campaign.into());
        self
    }

    pub fn with_availability(mut self, availability: impl Into<String>) -> Self {
        self.availability = Some(availability.into());
        self
    }
}

/// A named batch of records sharing one schema and one (optional) CRS tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub crs: Option<Crs>,
    pub schema: LayerSchema,
    pub records: Vec<SurveyRecord>,
}

impl Layer {
    pub fn new(name: impl Into<String>, crs: Option<Crs>, schema: LayerSchema, records: Vec<SurveyRecord>) -> Self {
        Self { name: name.into(), crs, schema, records }
    }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }
}
