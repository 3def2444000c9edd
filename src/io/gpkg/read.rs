//! GeoPackage layer reading through SQLite.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use geo::{Geometry, GeometryCollection};
use rusqlite::{types::ValueRef, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, warn};

use crate::{
    config::ColumnNames,
    geom::Crs,
    io::{source::LayerSource, wkb},
    layer::{Layer, LayerSchema, SurveyRecord},
};

/// A GeoPackage file opened read-only. Each feature table is one layer.
pub struct GeoPackage {
    conn: Connection,
    columns: ColumnNames,
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Stringify an attribute cell; NULL becomes `None`.
fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

impl GeoPackage {
    pub fn open(path: &Path, columns: ColumnNames) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .with_context(|| format!("[io::gpkg::read] Failed to open GeoPackage: {}", path.display()))?;

        conn.query_row("SELECT COUNT(*) FROM gpkg_contents", [], |row| row.get::<_, i64>(0))
            .with_context(|| format!("[io::gpkg::read] Not a GeoPackage (no gpkg_contents): {}", path.display()))?;

        Ok(Self { conn, columns })
    }

    /// Geometry column name and srs id of a feature table.
    fn geometry_column(&self, table: &str) -> Result<(String, i64)> {
        self.conn
            .query_row(
                "SELECT column_name, srs_id FROM gpkg_geometry_columns WHERE table_name = ?1",
                [table],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| anyhow!("[io::gpkg::read] No geometry column registered for {table:?}"))
    }

    /// Resolve an srs id to an EPSG tag. Undefined and non-EPSG systems yield `None`.
    fn layer_crs(&self, srs_id: i64) -> Result<Option<Crs>> {
        if srs_id <= 0 { return Ok(None) }

        let srs = self.conn
            .query_row(
                "SELECT organization, organization_coordsys_id FROM gpkg_spatial_ref_sys WHERE srs_id = ?1",
                [srs_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match srs {
            Some((organization, code)) if organization.eq_ignore_ascii_case("EPSG") => {
                let code = u32::try_from(code)
                    .map_err(|_| anyhow!("[io::gpkg::read] Invalid EPSG code: {code}"))?;
                Ok(Some(Crs::from_epsg(code)?))
            }
            Some((organization, code)) => {
                warn!(srs_id, organization = %organization, code, "non-EPSG spatial reference, layer left untagged");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Column names of a table, in declaration order.
    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
}

impl LayerSource for GeoPackage {
    fn layer_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn
            .prepare("SELECT table_name FROM gpkg_contents WHERE data_type = 'features' ORDER BY rowid")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("[io::gpkg::read] Failed to list feature tables")?;
        Ok(names)
    }

    fn read_layer(&self, name: &str) -> Result<Layer> {
        let (geometry_column, srs_id) = self.geometry_column(name)?;
        let crs = self.layer_crs(srs_id)
            .with_context(|| format!("[io::gpkg::read] Failed to resolve CRS of {name:?}"))?;

        let available = self.table_columns(name)?;
        let present = |column: &str| available.iter().any(|c| c == column);
        let schema = LayerSchema {
            has_institution: present(&self.columns.institution),
            has_campaign: present(&self.columns.campaign),
            has_availability: present(&self.columns.availability),
        };

        // Absent attribute columns are selected as NULL so positions stay fixed.
        let attribute = |column: &str, has: bool| if has { quote_ident(column) } else { "NULL".to_string() };
        let sql = format!(
            "SELECT {}, {}, {}, {} FROM {}",
            quote_ident(&geometry_column),
            attribute(&self.columns.institution, schema.has_institution),
            attribute(&self.columns.campaign, schema.has_campaign),
            attribute(&self.columns.availability, schema.has_availability),
            quote_ident(name),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let geometry = match row.get_ref(0)? {
                ValueRef::Blob(blob) => wkb::decode_gpkg_geometry(blob)
                    .with_context(|| format!("[io::gpkg::read] Bad geometry in row {} of {name:?}", records.len()))?,
                _ => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
            };
            records.push(SurveyRecord {
                geometry,
                institution: value_to_string(row.get_ref(1)?),
                campaign: value_to_string(row.get_ref(2)?),
                availability: value_to_string(row.get_ref(3)?),
            });
        }

        debug!(layer = %name, records = records.len(), crs = ?crs, "read GeoPackage layer");
        Ok(Layer::new(name, crs, schema, records))
    }
}
