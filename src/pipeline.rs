//! One pass over a layer source: normalize, classify, aggregate, accumulate, reduce.

use anyhow::Result;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::CoverageError,
    geom::{normalize_layer, Crs},
    io::LayerSource,
    layer::Layer,
    render::CoverageCollector,
    stats::{aggregate_layer, classify_layer, InstitutionAccumulator, InstitutionTable, OverviewTable},
};

/// Receives statistics tables as they are produced.
pub trait StatisticsSink {
    /// Called with a fresh snapshot whenever a layer touches the institution.
    fn institution_table(&mut self, table: &InstitutionTable) -> Result<()>;

    /// Called once, after every layer has been processed.
    fn overview(&mut self, overview: &OverviewTable) -> Result<()>;
}

/// Keeps every emitted table in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub tables: Vec<InstitutionTable>,
    pub overview: Option<OverviewTable>,
}

impl MemorySink {
    /// The most recent snapshot of `institution`.
    pub fn latest(&self, institution: &str) -> Option<&InstitutionTable> {
        self.tables.iter().rev().find(|table| table.institution == institution)
    }
}

impl StatisticsSink for MemorySink {
    fn institution_table(&mut self, table: &InstitutionTable) -> Result<()> {
        self.tables.push(table.clone());
        Ok(())
    }

    fn overview(&mut self, overview: &OverviewTable) -> Result<()> {
        self.overview = Some(overview.clone());
        Ok(())
    }
}

/// A layer that could not be read or normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLayer {
    pub name: String,
    pub reason: String,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Layers read and normalized, in processing order (including those that contributed nothing).
    pub processed: Vec<String>,
    pub skipped: Vec<SkippedLayer>,
    pub accumulator: InstitutionAccumulator,
    pub overview: OverviewTable,
}

/// Read and normalize one layer, folding every failure into [`CoverageError::LayerRead`].
fn load_layer(source: &dyn LayerSource, name: &str, target: Crs) -> Result<Layer, CoverageError> {
    let layer = source.read_layer(name)
        .map_err(|e| CoverageError::layer_read(name, e))?;
    normalize_layer(layer, target)
        .map_err(|e| CoverageError::layer_read(name, e))
}

/// Layer names of `source`; a source without layers is an empty dataset.
fn list_layers(source: &dyn LayerSource) -> Result<Vec<String>> {
    let names = source.layer_names()?;
    if names.is_empty() {
        return Err(CoverageError::EmptyDataset("no layers found".to_string()).into());
    }
    Ok(names)
}

/// Process every layer of `source` in order.
///
/// Each layer's institution snapshots go to `sink` as soon as the layer is
/// done; the overview goes to `sink` at the end. A layer that fails to read is
/// logged and skipped. When no layer is listed, or none yields statistics, the
/// run halts with [`CoverageError::EmptyDataset`] and no overview is written.
/// If a `collector` is given it receives every normalized layer, for maps.
pub fn run(
    source: &dyn LayerSource,
    config: &Config,
    sink: &mut dyn StatisticsSink,
    mut collector: Option<&mut CoverageCollector>,
) -> Result<RunReport> {
    let target = config.target_crs()?;
    let names = list_layers(source)?;
    info!(layers = names.len(), target = %target, "processing layers");

    let mut accumulator = InstitutionAccumulator::new();
    let mut processed = Vec::with_capacity(names.len());
    let mut skipped = Vec::new();

    for name in names {
        let layer = match load_layer(source, &name, target) {
            Ok(layer) => layer,
            Err(error) => {
                warn!(layer = %name, error = %error, "skipping layer");
                skipped.push(SkippedLayer { name, reason: error.to_string() });
                continue;
            }
        };

        if let Some(collector) = collector.as_deref_mut() {
            collector.add_layer(&layer);
        }

        if !layer.schema.has_institution {
            info!(layer = %name, "no institution column, layer contributes nothing");
            processed.push(name);
            continue;
        }

        let classified = classify_layer(&layer, &config.default_campaign);
        let aggregates = aggregate_layer(&classified);
        info!(layer = %name, records = classified.records.len(), rows = aggregates.len(), "aggregated layer");

        for table in accumulator.append_layer(aggregates) {
            sink.institution_table(&table)?;
        }
        processed.push(name);
    }

    if accumulator.is_empty() {
        return Err(CoverageError::EmptyDataset("no layer produced institution statistics".to_string()).into());
    }

    let overview = OverviewTable::from_accumulator(&accumulator);
    sink.overview(&overview)?;
    info!(institutions = overview.len(), skipped = skipped.len(), "run complete");

    Ok(RunReport { processed, skipped, accumulator, overview })
}

/// Read and normalize every layer of `source` into `collector`, without statistics.
///
/// Only a source with no layers at all is an empty dataset; layers that name no
/// institution still leave an overview map to draw. Unreadable layers are
/// skipped and returned.
pub fn collect_coverage(source: &dyn LayerSource, config: &Config, collector: &mut CoverageCollector) -> Result<Vec<SkippedLayer>> {
    let target = config.target_crs()?;
    let names = list_layers(source)?;
    info!(layers = names.len(), target = %target, "collecting map features");

    let mut skipped = Vec::new();
    for name in names {
        match load_layer(source, &name, target) {
            Ok(layer) => collector.add_layer(&layer),
            Err(error) => {
                warn!(layer = %name, error = %error, "skipping layer");
                skipped.push(SkippedLayer { name, reason: error.to_string() });
            }
        }
    }
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point};

    use super::*;
    use crate::{
        io::InMemorySource,
        layer::{LayerSchema, SurveyRecord},
        stats::{CampaignAggregate, DistanceTotals},
    };

    fn line(length_m: f64) -> geo::LineString<f64> {
        line_string![(x: 0.0, y: 0.0), (x: length_m, y: 0.0)]
    }

    #[test]
    fn snapshots_then_overview() {
        let source = InMemorySource::new()
            .with_layer(Layer::new("a", None, LayerSchema::FULL, vec![
                SurveyRecord::new(line(5000.0)).with_institution("X").with_campaign("2020").with_availability("s"),
            ]))
            .with_layer(Layer::new("b", None, LayerSchema { has_availability: false, ..LayerSchema::FULL }, vec![
                SurveyRecord::new(line(3000.0)).with_institution("X").with_campaign("2021"),
            ]));

        let mut sink = MemorySink::default();
        let report = run(&source, &Config::default(), &mut sink, None).unwrap();

        assert_eq!(sink.tables.len(), 2);
        let latest = sink.latest("X").unwrap();
        assert_eq!(latest.rows, vec![CampaignAggregate::new("X", "2020", 5, 5), CampaignAggregate::new("X", "2021", 3, 0)]);
        assert_eq!(latest.total, DistanceTotals::new(8, 5));
        assert_eq!(sink.overview.unwrap().get("X"), Some(DistanceTotals::new(8, 5)));
        assert_eq!(report.processed, vec!["a", "b"]);
    }

    #[test]
    fn failing_layer_is_skipped() {
        let source = InMemorySource::new()
            .with_failing_layer("broken", "truncated file")
            .with_layer(Layer::new("ok", None, LayerSchema::FULL, vec![
                SurveyRecord::new(point!(x: 0.0, y: 0.0)).with_institution("Y").with_campaign("1"),
            ]));

        let mut sink = MemorySink::default();
        let report = run(&source, &Config::default(), &mut sink, None).unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "broken");
        assert!(report.skipped[0].reason.contains("truncated file"));
        assert_eq!(report.overview.get("Y"), Some(DistanceTotals::new(0, 0)));
    }

    #[test]
    fn no_layers_is_an_empty_dataset() {
        let err = run(&InMemorySource::new(), &Config::default(), &mut MemorySink::default(), None).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoverageError>(), Some(CoverageError::EmptyDataset(_))));
    }

    #[test]
    fn no_institution_anywhere_is_an_empty_dataset() {
        let schema = LayerSchema { has_institution: false, ..LayerSchema::FULL };
        let source = InMemorySource::new()
            .with_layer(Layer::new("anon", None, schema, vec![SurveyRecord::new(line(1000.0))]));

        let mut sink = MemorySink::default();
        let err = run(&source, &Config::default(), &mut sink, None).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoverageError>(), Some(CoverageError::EmptyDataset(_))));
        assert!(sink.overview.is_none());
    }

    #[test]
    fn geographic_layers_are_reprojected_before_measuring() {
        // 1 degree of latitude along the 0° meridian near 80°S is roughly 111 km on the ground.
        let geographic = Layer::new("geo", Some(Crs::WGS84), LayerSchema::FULL, vec![
            SurveyRecord::new(line_string![(x: 0.0, y: -80.0), (x: 0.0, y: -81.0)])
                .with_institution("Z").with_campaign("c").with_availability("s"),
        ]);

        let mut collector = CoverageCollector::new();
        let report = run(&InMemorySource::new().with_layer(geographic), &Config::default(), &mut MemorySink::default(), Some(&mut collector)).unwrap();

        let totals = report.overview.get("Z").unwrap();
        assert!((105..=125).contains(&totals.total_distance_km), "got {}", totals.total_distance_km);
        assert_eq!(totals.available_distance_km, totals.total_distance_km);
        assert_eq!(collector.features("Z").unwrap().len(), 1);
    }

    #[test]
    fn projected_layers_in_other_polar_systems_are_counted() {
        // 100 km straight north of the pole in UPS South.
        let ups = Crs::from_epsg(32761).unwrap();
        let layer = Layer::new("ups", Some(ups), LayerSchema::FULL, vec![
            SurveyRecord::new(line_string![(x: 2.0e6, y: 3.0e6), (x: 2.0e6, y: 3.1e6)])
                .with_institution("Y").with_campaign("2019").with_availability("s"),
        ]);
        let source = InMemorySource::new()
            .with_layer(Layer::new("ok", Some(Crs::ANTARCTIC_POLAR_STEREOGRAPHIC), LayerSchema::FULL, vec![
                SurveyRecord::new(line(1000.0)).with_institution("X").with_campaign("1"),
            ]))
            .with_layer(layer);

        let report = run(&source, &Config::default(), &mut MemorySink::default(), None).unwrap();

        assert!(report.skipped.is_empty());
        let totals = report.overview.get("Y").unwrap();
        assert!((95..=101).contains(&totals.total_distance_km), "got {}", totals.total_distance_km);
    }

    #[test]
    fn coverage_collection_does_not_need_statistics() {
        let schema = LayerSchema { has_institution: false, ..LayerSchema::FULL };
        let source = InMemorySource::new()
            .with_layer(Layer::new("anon", None, schema, vec![SurveyRecord::new(line(1000.0))]))
            .with_failing_layer("broken", "truncated file");

        let mut collector = CoverageCollector::new();
        let skipped = collect_coverage(&source, &Config::default(), &mut collector).unwrap();

        assert!(collector.is_empty());
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].name, "broken");

        let err = collect_coverage(&InMemorySource::new(), &Config::default(), &mut collector).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoverageError>(), Some(CoverageError::EmptyDataset(_))));
    }
}
