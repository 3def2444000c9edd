use std::collections::HashMap;

use tracing::debug;

use crate::stats::{CampaignAggregate, DistanceTotals};

/// Lifecycle of an institution within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstitutionState {
    /// No processed layer has mentioned the institution yet.
    Unseen,
    /// At least one layer contributed rows; stays active for the rest of the run.
    Active,
}

/// Append-only log of every campaign batch one institution received, one batch per layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionHistory {
    institution: String,
    batches: Vec<Vec<CampaignAggregate>>,
}

impl InstitutionHistory {
    fn new(institution: String) -> Self {
        Self { institution, batches: Vec::new() }
    }

    #[inline] pub fn institution(&self) -> &str { &self.institution }

    /// Batches in the order their layers were processed.
    #[inline] pub fn batches(&self) -> &[Vec<CampaignAggregate>] { &self.batches }

    /// All raw campaign rows so far. Same-campaign rows from different layers stay separate.
    pub fn rows(&self) -> impl Iterator<Item = &CampaignAggregate> + '_ {
        self.batches.iter().flatten()
    }

    /// Sum over the raw rows, recomputed from scratch on every call.
    pub fn totals(&self) -> DistanceTotals {
        self.rows().map(CampaignAggregate::totals).sum()
    }

    /// Current table: every raw row plus a freshly computed total.
    pub fn snapshot(&self) -> InstitutionTable {
        InstitutionTable {
            institution: self.institution.clone(),
            rows: self.rows().cloned().collect(),
            total: self.totals(),
        }
    }

    fn append(&mut self, batch: Vec<CampaignAggregate>) {
        self.batches.push(batch);
    }
}

/// Snapshot of one institution's table, as emitted after each update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionTable {
    pub institution: String,
    pub rows: Vec<CampaignAggregate>,
    /// Values of the synthetic `Total` row.
    pub total: DistanceTotals,
}

/// Running per-institution histories across the sequence of layers.
#[derive(Debug, Clone, Default)]
pub struct InstitutionAccumulator {
    index: HashMap<String, usize>, // Map between institution names and positions in `histories`.
    histories: Vec<InstitutionHistory>, // In order of first appearance.
}

impl InstitutionAccumulator {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn len(&self) -> usize { self.histories.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.histories.is_empty() }

    /// Histories in order of first appearance.
    #[inline] pub fn histories(&self) -> &[InstitutionHistory] { &self.histories }

    pub fn history(&self, institution: &str) -> Option<&InstitutionHistory> {
        self.index.get(institution).map(|&i| &self.histories[i])
    }

    pub fn state(&self, institution: &str) -> InstitutionState {
        if self.index.contains_key(institution) { InstitutionState::Active } else { InstitutionState::Unseen }
    }

    /// Append one layer's aggregates and return a fresh snapshot for every
    /// institution the layer touched, in order of first appearance in `aggregates`.
    pub fn append_layer(&mut self, aggregates: Vec<CampaignAggregate>) -> Vec<InstitutionTable> {
        // Split the layer output into one batch per institution, keeping order.
        let mut batches: Vec<(String, Vec<CampaignAggregate>)> = Vec::new();
        for aggregate in aggregates {
            match batches.iter_mut().find(|(name, _)| *name == aggregate.institution) {
                Some((_, batch)) => batch.push(aggregate),
                None => batches.push((aggregate.institution.clone(), vec![aggregate])),
            }
        }

        batches.into_iter()
            .map(|(institution, batch)| {
                let i = match self.index.get(&institution) {
                    Some(&i) => i,
                    None => {
                        debug!(institution = %institution, "first layer for institution");
                        self.index.insert(institution.clone(), self.histories.len());
                        self.histories.push(InstitutionHistory::new(institution));
                        self.histories.len() - 1
                    }
                };
                self.histories[i].append(batch);
                self.histories[i].snapshot()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(institution: &str, campaign: &str, total: u64, available: u64) -> CampaignAggregate {
        CampaignAggregate::new(institution, campaign, total, available)
    }

    #[test]
    fn first_layer_activates_institution() {
        let mut acc = InstitutionAccumulator::new();
        assert_eq!(acc.state("X"), InstitutionState::Unseen);

        let snapshots = acc.append_layer(vec![agg("X", "2020", 5, 5)]);

        assert_eq!(acc.state("X"), InstitutionState::Active);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].rows, vec![agg("X", "2020", 5, 5)]);
        assert_eq!(snapshots[0].total, DistanceTotals::new(5, 5));
    }

    #[test]
    fn snapshots_accumulate_across_layers() {
        let mut acc = InstitutionAccumulator::new();
        acc.append_layer(vec![agg("X", "2020", 5, 5)]);
        let snapshots = acc.append_layer(vec![agg("X", "2021", 3, 0)]);

        assert_eq!(snapshots[0].rows, vec![agg("X", "2020", 5, 5), agg("X", "2021", 3, 0)]);
        assert_eq!(snapshots[0].total, DistanceTotals::new(8, 5));
    }

    #[test]
    fn same_campaign_from_two_layers_is_not_merged() {
        let mut acc = InstitutionAccumulator::new();
        acc.append_layer(vec![agg("Y", "2019", 4, 1)]);
        let snapshots = acc.append_layer(vec![agg("Y", "2019", 6, 0)]);

        let table = &snapshots[0];
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|row| row.campaign == "2019"));
        assert_eq!(table.total, DistanceTotals::new(10, 1));
        assert_eq!(acc.history("Y").unwrap().batches().len(), 2);
    }

    #[test]
    fn only_touched_institutions_get_snapshots() {
        let mut acc = InstitutionAccumulator::new();
        acc.append_layer(vec![agg("A", "1", 1, 0), agg("B", "1", 2, 0)]);
        let snapshots = acc.append_layer(vec![agg("B", "2", 3, 3)]);

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].institution, "B");
        assert_eq!(acc.history("A").unwrap().batches().len(), 1);
    }

    #[test]
    fn histories_keep_first_appearance_order() {
        let mut acc = InstitutionAccumulator::new();
        acc.append_layer(vec![agg("M", "1", 1, 0)]);
        acc.append_layer(vec![agg("A", "1", 1, 0), agg("M", "2", 1, 0), agg("Z", "1", 1, 0)]);

        let order = acc.histories().iter().map(InstitutionHistory::institution).collect::<Vec<_>>();
        assert_eq!(order, vec!["M", "A", "Z"]);
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn totals_never_include_previous_totals() {
        let mut acc = InstitutionAccumulator::new();
        for _ in 0..5 {
            acc.append_layer(vec![agg("R", "c", 2, 1)]);
        }
        let history = acc.history("R").unwrap();
        assert_eq!(history.totals(), DistanceTotals::new(10, 5));
        assert_eq!(history.snapshot().rows.len(), 5);
    }

    #[test]
    fn empty_layer_produces_no_snapshots() {
        let mut acc = InstitutionAccumulator::new();
        assert!(acc.append_layer(Vec::new()).is_empty());
        assert!(acc.is_empty());
    }
}
