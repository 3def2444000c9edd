use std::fmt;

use crate::{geom::distance_km, layer::{Layer, LayerSchema, SurveyRecord}};

/// Availability state of a surveyed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Availability {
    /// Data currently obtainable (`s`).
    Yes,
    /// Data known to be unobtainable (`u`).
    No,
    /// Unspecified or stale (`o`, unknown codes, or no availability column).
    Outdated,
}

impl Availability {
    pub const ALL: [Availability; 3] = [Availability::Yes, Availability::No, Availability::Outdated];

    /// Classify a raw code from a layer that has an availability column.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("s") => Self::Yes,
            Some("u") => Self::No,
            _ => Self::Outdated,
        }
    }

    /// Classify a record, honouring the layer-wide absence of the column.
    pub fn of_record(record: &SurveyRecord, schema: &LayerSchema) -> Self {
        if !schema.has_availability { return Self::Outdated }
        Self::from_code(record.availability.as_deref())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Outdated => "outdated",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record attributed to an (institution, campaign) with its distance metrics.
///
/// `available_distance_km <= total_distance_km`, and a positive available
/// distance implies [`Availability::Yes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRecord {
    pub institution: String,
    pub campaign: String,
    pub availability: Availability,
    pub total_distance_km: u64,
    pub available_distance_km: u64,
}

/// All attributable records of one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLayer {
    pub name: String,
    /// Whether the source layer had an institution column at all.
    pub has_institution: bool,
    pub records: Vec<ClassifiedRecord>,
}

/// Classify a single record, or `None` when it cannot be attributed.
///
/// Records without an institution are dropped. When the layer has a campaign
/// column, records with a null campaign are dropped too; when it has none,
/// every record falls under `default_campaign`.
pub fn classify_record(record: &SurveyRecord, schema: &LayerSchema, default_campaign: &str) -> Option<ClassifiedRecord> {
    let institution = record.institution.as_ref()?;
    let campaign = if schema.has_campaign {
        record.campaign.clone()?
    } else {
        default_campaign.to_string()
    };

    let availability = Availability::of_record(record, schema);
    let total_distance_km = distance_km(&record.geometry);
    let available_distance_km = match availability {
        Availability::Yes => total_distance_km,
        Availability::No | Availability::Outdated => 0,
    };

    Some(ClassifiedRecord {
        institution: institution.clone(),
        campaign,
        availability,
        total_distance_km,
        available_distance_km,
    })
}

/// Classify every record of a (normalized) layer.
pub fn classify_layer(layer: &Layer, default_campaign: &str) -> ClassifiedLayer {
    let records = if layer.schema.has_institution {
        layer.records.iter()
            .filter_map(|record| classify_record(record, &layer.schema, default_campaign))
            .collect()
    } else {
        Vec::new()
    };

    ClassifiedLayer { name: layer.name.clone(), has_institution: layer.schema.has_institution, records }
}

#[cfg(test)]
mod tests {
    use geo::{point, LineString};

    use super::*;

    fn line_m(length: f64) -> LineString<f64> {
        LineString::from(vec![(0.0, 0.0), (length, 0.0)])
    }

    fn record(code: Option<&str>) -> SurveyRecord {
        SurveyRecord {
            geometry: line_m(4000.0).into(),
            institution: Some("BAS".into()),
            campaign: Some("2019".into()),
            availability: code.map(str::to_string),
        }
    }

    #[test]
    fn codes_map_to_classes() {
        assert_eq!(Availability::from_code(Some("s")), Availability::Yes);
        assert_eq!(Availability::from_code(Some("u")), Availability::No);
        assert_eq!(Availability::from_code(Some("o")), Availability::Outdated);
        assert_eq!(Availability::from_code(Some("S")), Availability::Outdated);
        assert_eq!(Availability::from_code(Some("x")), Availability::Outdated);
        assert_eq!(Availability::from_code(None), Availability::Outdated);
    }

    #[test]
    fn only_available_records_contribute_available_distance() {
        let yes = classify_record(&record(Some("s")), &LayerSchema::FULL, "Unknown").unwrap();
        let no = classify_record(&record(Some("u")), &LayerSchema::FULL, "Unknown").unwrap();
        let old = classify_record(&record(Some("o")), &LayerSchema::FULL, "Unknown").unwrap();

        assert_eq!((yes.availability, yes.total_distance_km, yes.available_distance_km), (Availability::Yes, 4, 4));
        assert_eq!((no.availability, no.total_distance_km, no.available_distance_km), (Availability::No, 4, 0));
        assert_eq!((old.availability, old.total_distance_km, old.available_distance_km), (Availability::Outdated, 4, 0));
    }

    #[test]
    fn missing_availability_column_means_outdated() {
        let schema = LayerSchema { has_availability: false, ..LayerSchema::FULL };
        // A stray value is ignored when the layer has no such column.
        let classified = classify_record(&record(Some("s")), &schema, "Unknown").unwrap();

        assert_eq!(classified.availability, Availability::Outdated);
        assert_eq!(classified.available_distance_km, 0);
        assert_eq!(classified.total_distance_km, 4);
    }

    #[test]
    fn missing_campaign_column_uses_default() {
        let schema = LayerSchema { has_campaign: false, ..LayerSchema::FULL };
        let classified = classify_record(&record(Some("s")), &schema, "Unknown").unwrap();
        assert_eq!(classified.campaign, "Unknown");
    }

    #[test]
    fn null_campaign_in_present_column_is_dropped() {
        let mut r = record(Some("s"));
        r.campaign = None;
        assert!(classify_record(&r, &LayerSchema::FULL, "Unknown").is_none());
    }

    #[test]
    fn records_without_institution_are_excluded() {
        let layer = Layer::new("mixed", None, LayerSchema::FULL, vec![
            record(Some("s")),
            SurveyRecord { institution: None, ..record(Some("s")) },
            SurveyRecord::new(point!(x: 0.0, y: 0.0)).with_institution("AWI").with_campaign("2020"),
        ]);

        let classified = classify_layer(&layer, "Unknown");
        assert_eq!(classified.records.len(), 2);
        assert_eq!(classified.records[1].institution, "AWI");
        assert_eq!(classified.records[1].total_distance_km, 0);
    }

    #[test]
    fn layer_without_institution_column_classifies_nothing() {
        let schema = LayerSchema { has_institution: false, ..LayerSchema::FULL };
        let layer = Layer::new("anonymous", None, schema, vec![record(Some("s"))]);

        let classified = classify_layer(&layer, "Unknown");
        assert!(!classified.has_institution);
        assert!(classified.records.is_empty());
    }

    #[test]
    fn classified_records_uphold_distance_invariants() {
        let layer = Layer::new("all", None, LayerSchema::FULL, ["s", "u", "o", "?"].iter()
            .map(|&code| record(Some(code)))
            .collect());

        for r in classify_layer(&layer, "Unknown").records {
            assert!(r.available_distance_km <= r.total_distance_km);
            if r.available_distance_km > 0 { assert_eq!(r.availability, Availability::Yes) }
        }
    }
}
