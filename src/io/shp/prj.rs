//! EPSG detection from `.prj` WKT sidecar files.

use std::{fs, path::Path, sync::LazyLock};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::warn;

use crate::geom::Crs;

static AUTHORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid regex")
});

/// EPSG code named by a WKT string.
///
/// The last `AUTHORITY["EPSG", ...]` clause belongs to the outermost system. ESRI-flavoured WKT has
/// no authority clauses, so a few well-known system names are recognised as well.
pub(crate) fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    if let Some(code) = AUTHORITY.captures_iter(wkt).last().and_then(|caps| caps[1].parse().ok()) {
        return Some(code);
    }

    let normalized = wkt.replace(' ', "_");
    if normalized.contains("Antarctic_Polar_Stereographic") {
        Some(3031)
    } else if !normalized.contains("PROJCS") && (normalized.contains("WGS_1984") || normalized.contains("WGS_84")) {
        Some(4326)
    } else {
        None
    }
}

/// CRS of a shapefile from its `.prj` sidecar. No sidecar, or an unrecognised one, means untagged.
pub(crate) fn crs_from_prj(shp_path: &Path) -> Result<Option<Crs>> {
    let prj_path = shp_path.with_extension("prj");
    if !prj_path.exists() { return Ok(None) }

    let wkt = fs::read_to_string(&prj_path)
        .with_context(|| format!("[io::shp::prj] Failed to read {}", prj_path.display()))?;

    match epsg_from_wkt(&wkt) {
        Some(code) => Ok(Some(Crs::from_epsg(code)?)),
        None => {
            warn!(path = %prj_path.display(), "unrecognised projection, layer left untagged");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_authority_wins() {
        let wkt = r#"PROJCS["WGS 84 / Antarctic Polar Stereographic",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]],PROJECTION["Polar_Stereographic"],AUTHORITY["EPSG","3031"]]"#;
        assert_eq!(epsg_from_wkt(wkt), Some(3031));
    }

    #[test]
    fn esri_names_are_recognised() {
        let geographic = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        assert_eq!(epsg_from_wkt(geographic), Some(4326));

        let polar = r#"PROJCS["WGS_1984_Antarctic_Polar_Stereographic",GEOGCS["GCS_WGS_1984"],PROJECTION["Stereographic_South_Pole"]]"#;
        assert_eq!(epsg_from_wkt(polar), Some(3031));

        assert_eq!(epsg_from_wkt(r#"LOCAL_CS["grid"]"#), None);
    }

    #[test]
    fn missing_sidecar_is_untagged() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(crs_from_prj(&dir.path().join("lines.shp")).unwrap(), None);

        fs::write(dir.path().join("lines.prj"), r#"GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]]"#).unwrap();
        assert_eq!(crs_from_prj(&dir.path().join("lines.shp")).unwrap(), Some(Crs::WGS84));
    }
}
