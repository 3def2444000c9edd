use std::collections::HashMap;

use crate::stats::{CampaignAggregate, DistanceTotals, InstitutionAccumulator};

/// One institution's totals across the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRow {
    pub institution: String,
    pub totals: DistanceTotals,
}

/// Per-institution totals over every layer, without a grand-total row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewTable {
    rows: Vec<OverviewRow>,
}

impl OverviewTable {
    /// Sum raw campaign rows per institution, in order of first appearance.
    pub fn from_aggregates<'a>(aggregates: impl IntoIterator<Item = &'a CampaignAggregate>) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut rows: Vec<OverviewRow> = Vec::new();

        for aggregate in aggregates {
            let i = *index.entry(aggregate.institution.as_str()).or_insert_with(|| {
                rows.push(OverviewRow { institution: aggregate.institution.clone(), totals: DistanceTotals::default() });
                rows.len() - 1
            });
            rows[i].totals += aggregate.totals();
        }

        Self { rows }
    }

    /// Fold the accumulator's raw rows (never its `Total` rows) into an overview.
    pub fn from_accumulator(accumulator: &InstitutionAccumulator) -> Self {
        Self::from_aggregates(accumulator.histories().iter().flat_map(|history| history.rows()))
    }

    #[inline] pub fn rows(&self) -> &[OverviewRow] { &self.rows }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn get(&self, institution: &str) -> Option<DistanceTotals> {
        self.rows.iter()
            .find(|row| row.institution == institution)
            .map(|row| row.totals)
    }
}
