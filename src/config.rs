use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::CoverageError, geom::Crs, stats::TotalRowLabels};

/// Names of the attribute columns looked up in every source layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub institution: String,
    pub campaign: String,
    pub availability: String,
    /// Basemap column holding the land-cover category.
    pub category: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            institution: "institution".to_string(),
            campaign: "campaign".to_string(),
            availability: "availability".to_string(),
            category: "Category".to_string(),
        }
    }
}

/// Layout of the coverage maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Canvas width and height in pixels.
    pub size: f64,
    pub margin: f64,
    /// Half-width of the square view around the pole, in metres.
    pub extent_m: f64,
    pub scale_bar_km: f64,
    pub line_width: f64,
    pub point_radius: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            size: 1000.0,
            margin: 20.0,
            extent_m: 3.0e6,
            scale_bar_km: 1000.0,
            line_width: 0.25,
            point_radius: 0.55,
        }
    }
}

/// Run configuration; every field has a default so a partial JSON file is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Projected system every layer is normalized into before measuring.
    pub target_epsg: u32,
    /// Campaign assigned to every record of a layer without a campaign column.
    pub default_campaign: String,
    pub total_label: String,
    pub total_availability: String,
    pub columns: ColumnNames,
    pub map: MapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_epsg: Crs::ANTARCTIC_POLAR_STEREOGRAPHIC.epsg(),
            default_campaign: "Unknown".to_string(),
            total_label: "Total".to_string(),
            total_availability: "N/A".to_string(),
            columns: ColumnNames::default(),
            map: MapConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file, defaulting any missing field.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("[config] Invalid configuration in {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn target_crs(&self) -> Result<Crs, CoverageError> {
        Crs::from_epsg(self.target_epsg)
    }

    pub fn total_row_labels(&self) -> TotalRowLabels<'_> {
        TotalRowLabels { campaign: &self.total_label, availability: &self.total_availability }
    }
}
