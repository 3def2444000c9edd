use std::{collections::BTreeMap, iter::Sum, ops::{Add, AddAssign}};

use crate::stats::ClassifiedLayer;

/// Total and available survey distance, in whole kilometres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DistanceTotals {
    pub total_distance_km: u64,
    pub available_distance_km: u64,
}

impl DistanceTotals {
    pub fn new(total_distance_km: u64, available_distance_km: u64) -> Self {
        Self { total_distance_km, available_distance_km }
    }
}

impl Add for DistanceTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total_distance_km: self.total_distance_km + other.total_distance_km,
            available_distance_km: self.available_distance_km + other.available_distance_km,
        }
    }
}

impl AddAssign for DistanceTotals {
    fn add_assign(&mut self, other: Self) { *self = *self + other }
}

impl Sum for DistanceTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Summed distances of one (institution, campaign) group within one layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CampaignAggregate {
    pub institution: String,
    pub campaign: String,
    pub total_distance_km: u64,
    pub available_distance_km: u64,
}

impl CampaignAggregate {
    pub fn new(institution: impl Into<String>, campaign: impl Into<String>, total_distance_km: u64, available_distance_km: u64) -> Self {
        Self { institution: institution.into(), campaign: campaign.into(), total_distance_km, available_distance_km }
    }

    #[inline]
    pub fn totals(&self) -> DistanceTotals {
        DistanceTotals::new(self.total_distance_km, self.available_distance_km)
    }
}

/// Group a classified layer by (institution, campaign) and sum each group.
///
/// Keys compare as exact strings (case and whitespace significant). Groups
/// come out ordered by institution, then campaign. A layer without an
/// institution column yields nothing.
pub fn aggregate_layer(layer: &ClassifiedLayer) -> Vec<CampaignAggregate> {
    if !layer.has_institution { return Vec::new() }

    let mut groups: BTreeMap<(&str, &str), DistanceTotals> = BTreeMap::new();
    for record in &layer.records {
        *groups.entry((record.institution.as_str(), record.campaign.as_str())).or_default() +=
            DistanceTotals::new(record.total_distance_km, record.available_distance_km);
    }

    groups.into_iter()
        .map(|((institution, campaign), totals)| CampaignAggregate::new(
            institution,
            campaign,
            totals.total_distance_km,
            totals.available_distance_km,
        ))
        .collect()
}
