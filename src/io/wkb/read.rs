//! WKB and GeoPackage geometry blob reading.

use std::io::{Cursor, Read};

use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};

/// WKB byte order: little endian
const WKB_LE: u8 = 1;

const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;
const WKB_POLYGON: u32 = 3;
const WKB_MULTIPOINT: u32 = 4;
const WKB_MULTILINESTRING: u32 = 5;
const WKB_MULTIPOLYGON: u32 = 6;

/// EWKB dimension and SRID flags.
const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

/// Magic bytes opening every GeoPackage geometry blob.
const GPKG_MAGIC: &[u8] = b"GP";

/// Placeholder for geometries that exist but are not decoded (curves, collections, empties).
fn unmeasured() -> Geometry<f64> {
    Geometry::GeometryCollection(GeometryCollection(Vec::new()))
}

/// Decode a GeoPackage binary geometry (header, optional envelope, WKB body).
pub(crate) fn decode_gpkg_geometry(blob: &[u8]) -> Result<Geometry<f64>> {
    let mut cursor = Cursor::new(blob);

    let mut header = [0u8; 4];
    cursor.read_exact(&mut header)
        .context("[io::wkb::read] Failed to read GeoPackage header")?;
    ensure!(&header[..2] == GPKG_MAGIC, "[io::wkb::read] Invalid GeoPackage geometry: bad magic bytes");

    // Bit 0 is the header byte order; the WKB body carries its own.
    let flags = header[3];
    let envelope_doubles = match (flags >> 1) & 0x07 {
        0 => 0,
        1 => 4,
        2 | 3 => 6,
        4 => 8,
        other => bail!("[io::wkb::read] Invalid envelope indicator: {}", other),
    };
    let is_empty = flags & 0x10 != 0;

    // srs_id is redundant with the layer's geometry column entry.
    let mut srs_id = [0u8; 4];
    cursor.read_exact(&mut srs_id)
        .context("[io::wkb::read] Failed to read srs id")?;

    let mut envelope = vec![0u8; envelope_doubles * 8];
    cursor.read_exact(&mut envelope)
        .context("[io::wkb::read] Failed to read envelope")?;

    if is_empty { return Ok(unmeasured()) }

    let body = &blob[cursor.position() as usize..];
    read_wkb(body).context("[io::wkb::read] Failed to decode geometry body")
}

/// Decode one WKB geometry (ISO or EWKB flavour).
pub(crate) fn read_wkb(bytes: &[u8]) -> Result<Geometry<f64>> {
    let mut reader = WkbReader { cursor: Cursor::new(bytes), is_le: true };
    reader.read_geometry(true)
}

/// Kind and coordinate dimension of one WKB geometry header.
struct WkbHeader {
    kind: u32,
    dims: usize,
}

struct WkbReader<'a> {
    cursor: Cursor<&'a [u8]>,
    is_le: bool,
}

impl WkbReader<'_> {
    fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.cursor.read_exact(&mut byte)
            .context("[io::wkb::read] Failed to read byte order")?;
        Ok(byte[0])
    }

    fn read_u32(&mut self, what: &str) -> Result<u32> {
        let mut bytes = [0u8; 4];
        self.cursor.read_exact(&mut bytes)
            .with_context(|| format!("[io::wkb::read] Failed to read {what}"))?;
        Ok(if self.is_le { u32::from_le_bytes(bytes) } else { u32::from_be_bytes(bytes) })
    }

    fn read_f64(&mut self) -> Result<f64> {
        let mut bytes = [0u8; 8];
        self.cursor.read_exact(&mut bytes)
            .context("[io::wkb::read] Failed to read coordinate")?;
        Ok(if self.is_le { f64::from_le_bytes(bytes) } else { f64::from_be_bytes(bytes) })
    }

    /// Read the byte order and type word, resolving ISO (+1000/2000/3000) and EWKB flag dimensions.
    fn read_header(&mut self) -> Result<WkbHeader> {
        self.is_le = self.read_u8()? == WKB_LE;
        let raw = self.read_u32("geometry type")?;

        let mut has_z = raw & EWKB_Z != 0;
        let mut has_m = raw & EWKB_M != 0;
        if raw & EWKB_SRID != 0 {
            self.read_u32("srid")?;
        }

        let code = raw & 0x0FFF_FFFF;
        match code / 1000 {
            0 => {}
            1 => has_z = true,
            2 => has_m = true,
            3 => { has_z = true; has_m = true }
            _ => bail!("[io::wkb::read] Invalid geometry type: {}", raw),
        }

        Ok(WkbHeader { kind: code % 1000, dims: 2 + has_z as usize + has_m as usize })
    }

    /// Read one coordinate, keeping x and y only.
    fn read_coord(&mut self, dims: usize) -> Result<Coord<f64>> {
        let x = self.read_f64()?;
        let y = self.read_f64()?;
        for _ in 2..dims {
            self.read_f64()?;
        }
        Ok(Coord { x, y })
    }

    fn read_line_string(&mut self, dims: usize) -> Result<LineString<f64>> {
        let len = self.read_u32("point count")?;
        let coords = (0..len)
            .map(|_| self.read_coord(dims))
            .collect::<Result<Vec<_>>>()?;
        Ok(LineString::from(coords))
    }

    fn read_polygon(&mut self, dims: usize) -> Result<Polygon<f64>> {
        let num_rings = self.read_u32("number of rings")?;
        if num_rings == 0 {
            return Ok(Polygon::new(LineString::new(Vec::new()), Vec::new()));
        }
        let exterior = self.read_line_string(dims)?;
        let interiors = (1..num_rings)
            .map(|_| self.read_line_string(dims))
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    /// Read the members of a multi-geometry, each carrying its own header.
    ///
    /// Members must be of the single `expected` kind, which is always a leaf,
    /// so a member is never itself a multi-geometry.
    fn read_members<T>(&mut self, expected: u32, member: impl Fn(Geometry<f64>) -> Option<T>) -> Result<Vec<T>> {
        let count = self.read_u32("member count")?;
        (0..count)
            .map(|i| {
                let header = self.read_header()?;
                ensure!(header.kind == expected,
                    "[io::wkb::read] Member {} has type {}, expected {}", i, header.kind, expected);
                let geometry = self.read_body(header, false)?;
                member(geometry)
                    .ok_or_else(|| anyhow!("[io::wkb::read] Member {} is not of type {}", i, expected))
            })
            .collect()
    }

    fn read_geometry(&mut self, top_level: bool) -> Result<Geometry<f64>> {
        let header = self.read_header()?;
        self.read_body(header, top_level)
    }

    /// Decode the geometry following an already-read header.
    fn read_body(&mut self, WkbHeader { kind, dims }: WkbHeader, top_level: bool) -> Result<Geometry<f64>> {
        let geometry = match kind {
            WKB_POINT => {
                let coord = self.read_coord(dims)?;
                // Empty points are encoded with NaN coordinates.
                if coord.x.is_nan() || coord.y.is_nan() {
                    if top_level { return Ok(unmeasured()) }
                    bail!("[io::wkb::read] Empty point inside a multi-geometry");
                }
                Geometry::Point(Point(coord))
            }
            WKB_LINESTRING => Geometry::LineString(self.read_line_string(dims)?),
            WKB_POLYGON => Geometry::Polygon(self.read_polygon(dims)?),
            WKB_MULTIPOINT => Geometry::MultiPoint(MultiPoint(
                self.read_members(WKB_POINT, |g| match g { Geometry::Point(p) => Some(p), _ => None })?,
            )),
            WKB_MULTILINESTRING => Geometry::MultiLineString(MultiLineString(
                self.read_members(WKB_LINESTRING, |g| match g { Geometry::LineString(l) => Some(l), _ => None })?,
            )),
            WKB_MULTIPOLYGON => Geometry::MultiPolygon(MultiPolygon(
                self.read_members(WKB_POLYGON, |g| match g { Geometry::Polygon(p) => Some(p), _ => None })?,
            )),
            // Unsupported kinds cannot be skipped inside a collection, only at the top.
            other if top_level => {
                tracing::debug!(kind = other, "unsupported WKB geometry type, kept unmeasured");
                unmeasured()
            }
            other => bail!("[io::wkb::read] Unsupported nested geometry type: {}", other),
        };

        Ok(geometry)
    }
}
