//! Conversion of statistics tables into display-ready polars DataFrames.
//!
//! Numbers are formatted with thousands separators here and only here; all
//! arithmetic upstream works on raw integers.

use polars::{frame::DataFrame, prelude::{Column, PolarsResult}};

use crate::stats::{InstitutionTable, OverviewTable};

/// Format an integer with `,` thousands separators (`1234567` → `"1,234,567"`).
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 { out.push(',') }
        out.push(ch);
    }
    out
}

/// Labels of the synthetic row appended to every institution table.
#[derive(Debug, Clone, Copy)]
pub struct TotalRowLabels<'a> {
    pub campaign: &'a str,
    pub availability: &'a str,
}

impl Default for TotalRowLabels<'_> {
    fn default() -> Self {
        Self { campaign: "Total", availability: "N/A" }
    }
}

impl InstitutionTable {
    /// Columns `institution, campaign, total_distance_km, available_distance_km, availability`,
    /// one row per campaign row plus the total row.
    pub fn to_dataframe(&self, labels: TotalRowLabels<'_>) -> PolarsResult<DataFrame> {
        let n = self.rows.len() + 1;

        let mut institutions = Vec::with_capacity(n);
        let mut campaigns = Vec::with_capacity(n);
        let mut totals = Vec::with_capacity(n);
        let mut available = Vec::with_capacity(n);
        let mut availability: Vec<Option<&str>> = Vec::with_capacity(n);

        for row in &self.rows {
            institutions.push(row.institution.as_str());
            campaigns.push(row.campaign.as_str());
            totals.push(format_thousands(row.total_distance_km));
            available.push(format_thousands(row.available_distance_km));
            availability.push(None);
        }

        institutions.push(self.institution.as_str());
        campaigns.push(labels.campaign);
        totals.push(format_thousands(self.total.total_distance_km));
        available.push(format_thousands(self.total.available_distance_km));
        availability.push(Some(labels.availability));

        DataFrame::new(vec![
            Column::new("institution".into(), institutions),
            Column::new("campaign".into(), campaigns),
            Column::new("total_distance_km".into(), totals),
            Column::new("available_distance_km".into(), available),
            Column::new("availability".into(), availability),
        ])
    }
}

impl OverviewTable {
    /// Columns `institution, total_distance_km, available_distance_km`.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = self.rows();
        DataFrame::new(vec![
            Column::new(
                "institution".into(),
                rows.iter().map(|row| row.institution.as_str()).collect::<Vec<_>>(),
            ),
            Column::new(
                "total_distance_km".into(),
                rows.iter().map(|row| format_thousands(row.totals.total_distance_km)).collect::<Vec<_>>(),
            ),
            Column::new(
                "available_distance_km".into(),
                rows.iter().map(|row| format_thousands(row.totals.available_distance_km)).collect::<Vec<_>>(),
            ),
        ])
    }
}
