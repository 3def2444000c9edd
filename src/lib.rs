#![doc = "Survey coverage statistics: per-institution surveyed distance by campaign and availability, over multi-layer polar datasets."]
mod common;
mod geom;
mod layer;
mod pipeline;
mod render;
mod stats;

pub mod config;
pub mod error;
pub mod io;

#[doc(inline)]
pub use config::{ColumnNames, Config, MapConfig};

#[doc(inline)]
pub use error::CoverageError;

#[doc(inline)]
pub use geom::{distance_km, normalize_layer, Crs};

#[doc(inline)]
pub use layer::{Layer, LayerSchema, SurveyRecord};

#[doc(inline)]
pub use pipeline::{collect_coverage, run, MemorySink, RunReport, SkippedLayer, StatisticsSink};

#[doc(inline)]
pub use render::{
    availability_color, availability_label, category_color, write_coverage_maps, Basemap, BasemapFeature,
    CoverageCollector, CoverageFeature, CoverageMap,
};

#[doc(inline)]
pub use stats::{
    aggregate_layer, classify_layer, classify_record, format_thousands, Availability, CampaignAggregate,
    ClassifiedLayer, ClassifiedRecord, DistanceTotals, InstitutionAccumulator, InstitutionHistory,
    InstitutionState, InstitutionTable, OverviewRow, OverviewTable, TotalRowLabels,
};
