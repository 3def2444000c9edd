//! WKB and GeoPackage blob encoding, used to build fixtures.

use geo::{Coord, Geometry, LineString, Polygon};

fn put_u32(out: &mut Vec<u8>, value: u32, le: bool) {
    out.extend(if le { value.to_le_bytes() } else { value.to_be_bytes() });
}

fn put_coord(out: &mut Vec<u8>, coord: Coord<f64>, le: bool) {
    for v in [coord.x, coord.y] {
        out.extend(if le { v.to_le_bytes() } else { v.to_be_bytes() });
    }
}

fn put_ring(out: &mut Vec<u8>, ring: &LineString<f64>, le: bool) {
    put_u32(out, ring.0.len() as u32, le);
    for &coord in &ring.0 { put_coord(out, coord, le) }
}

fn put_polygon(out: &mut Vec<u8>, polygon: &Polygon<f64>, le: bool) {
    put_u32(out, 1 + polygon.interiors().len() as u32, le);
    put_ring(out, polygon.exterior(), le);
    for interior in polygon.interiors() { put_ring(out, interior, le) }
}

/// Encode a 2D geometry as ISO WKB. Collections are not supported.
pub(crate) fn write_wkb(geometry: &Geometry<f64>, le: bool) -> Vec<u8> {
    let mut out = vec![if le { 1 } else { 0 }];
    match geometry {
        Geometry::Point(p) => { put_u32(&mut out, 1, le); put_coord(&mut out, p.0, le) }
        Geometry::LineString(l) => { put_u32(&mut out, 2, le); put_ring(&mut out, l, le) }
        Geometry::Polygon(p) => { put_u32(&mut out, 3, le); put_polygon(&mut out, p, le) }
        Geometry::MultiPoint(mp) => {
            put_u32(&mut out, 4, le);
            put_u32(&mut out, mp.0.len() as u32, le);
            for p in &mp.0 { out.extend(write_wkb(&Geometry::Point(*p), le)) }
        }
        Geometry::MultiLineString(ml) => {
            put_u32(&mut out, 5, le);
            put_u32(&mut out, ml.0.len() as u32, le);
            for l in &ml.0 { out.extend(write_wkb(&Geometry::LineString(l.clone()), le)) }
        }
        Geometry::MultiPolygon(mp) => {
            put_u32(&mut out, 6, le);
            put_u32(&mut out, mp.0.len() as u32, le);
            for p in &mp.0 { out.extend(write_wkb(&Geometry::Polygon(p.clone()), le)) }
        }
        other => panic!("unsupported fixture geometry: {other:?}"),
    }
    out
}

/// Wrap a geometry in a little-endian GeoPackage header, optionally with an xy envelope.
pub(crate) fn encode_gpkg_geometry(geometry: &Geometry<f64>, srs_id: i32, with_envelope: bool) -> Vec<u8> {
    let mut out = b"GP".to_vec();
    out.push(0);
    out.push(if with_envelope { 0b0000_0011 } else { 0b0000_0001 });
    out.extend(srs_id.to_le_bytes());
    if with_envelope {
        // Contents are not checked by the reader.
        for v in [0.0f64, 1.0, 0.0, 1.0] { out.extend(v.to_le_bytes()) }
    }
    out.extend(write_wkb(geometry, true));
    out
}
