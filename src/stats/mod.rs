//! The statistics engine: classify, aggregate, accumulate, and reduce.

mod accumulator;
mod aggregate;
mod classify;
mod overview;
mod table;

pub use accumulator::{InstitutionAccumulator, InstitutionHistory, InstitutionState, InstitutionTable};
pub use aggregate::{aggregate_layer, CampaignAggregate, DistanceTotals};
pub use classify::{classify_layer, classify_record, Availability, ClassifiedLayer, ClassifiedRecord};
pub use overview::{OverviewRow, OverviewTable};
pub use table::{format_thousands, TotalRowLabels};
