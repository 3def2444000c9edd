use std::{io::Write, path::{Path, PathBuf}};

use anyhow::Result;
use geo::{Coord, Geometry};
use tracing::info;

use crate::{
    common::{ensure_dir_exists, sanitize_file_name},
    config::MapConfig,
    io::svg::{self, SvgWriter},
    render::{category_color, Basemap, CoverageCollector, CoverageFeature},
    stats::Availability,
};

/// Height of the title band above the map.
const TITLE_BAND: f64 = 40.0;

/// Stroke and fill color of survey features by availability.
pub fn availability_color(availability: Availability) -> &'static str {
    match availability {
        Availability::Yes => "#1f78bc",
        Availability::No => "#fb9a99",
        Availability::Outdated => "grey",
    }
}

/// Legend label of an availability class.
pub fn availability_label(availability: Availability) -> &'static str {
    match availability {
        Availability::Yes => "Available",
        Availability::No => "Unavailable",
        Availability::Outdated => "Outdated",
    }
}

/// A square polar view of `±extent_m` around the origin, drawn over a basemap.
pub struct CoverageMap<'a> {
    basemap: &'a Basemap,
    config: &'a MapConfig,
}

impl<'a> CoverageMap<'a> {
    pub fn new(basemap: &'a Basemap, config: &'a MapConfig) -> Self {
        Self { basemap, config }
    }

    /// Pixels per metre.
    fn scale(&self) -> f64 {
        (self.config.size - 2.0 * self.config.margin) / (2.0 * self.config.extent_m)
    }

    /// Map metres -> SVG coords (Y down, below the title band).
    fn projection(&self) -> impl Fn(&Coord<f64>) -> (f64, f64) + use<> {
        let (margin, extent, scale) = (self.config.margin, self.config.extent_m, self.scale());
        move |coord: &Coord<f64>| {
            let x = margin + (coord.x + extent) * scale;
            let y = TITLE_BAND + margin + (extent - coord.y) * scale; // invert vertically
            (x, y)
        }
    }

    /// Write a complete map titled `"{name} Data Availability"`.
    /// Features are drawn yes first, then no, then outdated.
    pub fn write_svg(&self, writer: &mut impl Write, name: &str, features: &[&CoverageFeature]) -> Result<()> {
        let MapConfig { size, margin, extent_m, scale_bar_km, line_width, point_radius } = *self.config;
        let project = self.projection();
        let (width, height) = (size, size + TITLE_BAND);
        let (cx, cy) = project(&Coord { x: 0.0, y: 0.0 });
        let view = size - 2.0 * margin;

        svg::write_svg_header(writer, width, height, extent_m)?;
        svg::write_svg_styles(writer, line_width)?;

        writeln!(writer, r#"<clipPath id="view"><rect x="{margin}" y="{top}" width="{view}" height="{view}"/></clipPath>"#,
            top = TITLE_BAND + margin)?;
        writeln!(writer, r#"<g clip-path="url(#view)">"#)?;

        // Basemap
        writeln!(writer, r#"<g id="basemap">"#)?;
        for feature in self.basemap.features() {
            let d = match &feature.geometry {
                Geometry::Polygon(p) => svg::polygons_to_path([p], &project),
                Geometry::MultiPolygon(mp) => svg::polygons_to_path(&mp.0, &project),
                _ => continue,
            };
            if d.is_empty() { continue }
            writeln!(writer, r#"<path class="base" fill="{}" d="{d}"/>"#, category_color(feature.category.as_deref()))?;
        }
        writeln!(writer, "</g>")?;

        // Survey features by availability
        for availability in Availability::ALL {
            let color = availability_color(availability);
            writeln!(writer, r#"<g id="{availability}" fill="{color}" stroke="{color}">"#)?;
            for feature in features.iter().filter(|f| f.availability == availability) {
                svg::draw_geometry(writer, &feature.geometry, point_radius, &project)?;
            }
            writeln!(writer, "</g>")?;
        }
        writeln!(writer, "</g>")?;

        // Circular boundary
        writeln!(writer, r#"<circle class="frame" cx="{cx:.3}" cy="{cy:.3}" r="{:.3}"/>"#, extent_m * self.scale())?;

        // Title
        writeln!(writer, r#"<text class="title" x="{:.3}" y="{:.3}">{} Data Availability</text>"#,
            width / 2.0, TITLE_BAND * 0.7, svg::escape_xml(name))?;

        // Legend (upper right)
        let (lx, ly) = (width - margin - 110.0, TITLE_BAND + margin);
        writeln!(writer, r##"<g id="legend"><rect x="{lx:.1}" y="{ly:.1}" width="110" height="70" fill="#ffffff" stroke="#cccccc"/>"##)?;
        writeln!(writer, r#"<text class="label" x="{:.1}" y="{:.1}">Availability</text>"#, lx + 8.0, ly + 14.0)?;
        for (i, availability) in Availability::ALL.into_iter().enumerate() {
            let y = ly + 22.0 + 14.0 * i as f64;
            writeln!(writer, r#"<rect x="{:.1}" y="{y:.1}" width="10" height="10" fill="{}"/>"#, lx + 8.0, availability_color(availability))?;
            writeln!(writer, r#"<text class="label" x="{:.1}" y="{:.1}">{}</text>"#, lx + 24.0, y + 9.0, availability_label(availability))?;
        }
        writeln!(writer, "</g>")?;

        // Scale bar (lower right)
        let bar = scale_bar_km * 1000.0 * self.scale();
        let (x1, y1) = (width - margin - 10.0 - bar, height - margin - 10.0);
        writeln!(writer, r##"<g id="scale-bar"><line x1="{x1:.3}" y1="{y1:.3}" x2="{:.3}" y2="{y1:.3}" stroke="#000000" stroke-width="3"/>"##, x1 + bar)?;
        writeln!(writer, r#"<text class="label" x="{:.3}" y="{:.3}" text-anchor="middle">{scale_bar_km} km</text>"#, x1 + bar / 2.0, y1 - 6.0)?;
        writeln!(writer, "</g>")?;

        svg::write_svg_footer(writer)
    }

    /// Write a map to `path`.
    pub fn write_file(&self, path: &Path, name: &str, features: &[&CoverageFeature]) -> Result<()> {
        let mut writer = SvgWriter::new(path)?;
        self.write_svg(&mut writer, name, features)?;
        writer.finish()
    }
}

/// Write `Antarctica_coverage_{institution}.svg` for every collected institution
/// and `Antarctica_coverage_overview.svg` with all of them. Returns the written paths.
pub fn write_coverage_maps(collector: &CoverageCollector, basemap: &Basemap, config: &MapConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir_exists(dir)?;
    let map = CoverageMap::new(basemap, config);
    let mut written = Vec::with_capacity(collector.len() + 1);

    for (institution, features) in collector.institutions() {
        let path = dir.join(format!("Antarctica_coverage_{}.svg", sanitize_file_name(institution)));
        map.write_file(&path, institution, &features.iter().collect::<Vec<_>>())?;
        info!(institution = %institution, path = %path.display(), "saved coverage map");
        written.push(path);
    }

    let path = dir.join("Antarctica_coverage_overview.svg");
    map.write_file(&path, "Overview", &collector.all_features().collect::<Vec<_>>())?;
    info!(path = %path.display(), "saved overview map");
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use geo::{line_string, point, polygon};

    use super::*;
    use crate::{
        layer::{Layer, LayerSchema, SurveyRecord},
        render::BasemapFeature,
    };

    fn render(features: &[&CoverageFeature], name: &str) -> String {
        let basemap = Basemap::new(vec![BasemapFeature {
            geometry: polygon![(x: -1.0e6, y: -1.0e6), (x: 1.0e6, y: -1.0e6), (x: 0.0, y: 1.0e6)].into(),
            category: Some("Land".into()),
        }]);
        let config = MapConfig::default();
        let mut out = Vec::new();
        CoverageMap::new(&basemap, &config).write_svg(&mut out, name, features).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn origin_maps_to_canvas_centre() {
        let basemap = Basemap::default();
        let config = MapConfig::default();
        let project = CoverageMap::new(&basemap, &config).projection();
        let (x, y) = project(&Coord { x: 0.0, y: 0.0 });
        assert_abs_diff_eq!(x, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 540.0, epsilon = 1e-9);

        let (x, y) = project(&Coord { x: -3.0e6, y: 3.0e6 });
        assert_abs_diff_eq!(x, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn map_has_title_legend_scale_bar_and_frame() {
        let svg = render(&[], "BAS & Co");
        assert!(svg.contains("BAS &amp; Co Data Availability"));
        assert!(svg.contains(r##"fill="#f0f0f0""##));
        assert!(svg.contains(">Available<") && svg.contains(">Unavailable<") && svg.contains(">Outdated<"));
        assert!(svg.contains("1000 km"));
        assert!(svg.contains(r#"class="frame""#));
    }

    #[test]
    fn features_are_grouped_in_availability_order() {
        let yes = CoverageFeature { geometry: line_string![(x: 0.0, y: 0.0), (x: 1.0e5, y: 0.0)].into(), availability: Availability::Yes };
        let no = CoverageFeature { geometry: point!(x: 5.0e5, y: 5.0e5).into(), availability: Availability::No };
        let svg = render(&[&no, &yes], "X");

        let yes_at = svg.find(r#"<g id="yes""#).unwrap();
        let no_at = svg.find(r#"<g id="no""#).unwrap();
        let outdated_at = svg.find(r#"<g id="outdated""#).unwrap();
        assert!(yes_at < no_at && no_at < outdated_at);

        let path_at = svg.find(r#"<path class="line""#).unwrap();
        let circle_at = svg.find(r#"<circle class="point""#).unwrap();
        assert!(yes_at < path_at && path_at < no_at && no_at < circle_at && circle_at < outdated_at);
    }

    #[test]
    fn writes_one_map_per_institution_plus_overview() {
        let layer = Layer::new("l", None, LayerSchema::FULL, vec![
            SurveyRecord::new(point!(x: 0.0, y: 0.0)).with_institution("AWI").with_availability("s"),
            SurveyRecord::new(point!(x: 1.0, y: 0.0)).with_institution("BAS/UK").with_availability("o"),
        ]);
        let mut collector = CoverageCollector::new();
        collector.add_layer(&layer);

        let dir = tempfile::tempdir().unwrap();
        let written = write_coverage_maps(&collector, &Basemap::default(), &MapConfig::default(), &dir.path().join("maps")).unwrap();

        let names = written.iter().map(|p| p.file_name().unwrap().to_str().unwrap().to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec![
            "Antarctica_coverage_AWI.svg",
            "Antarctica_coverage_BAS_UK.svg",
            "Antarctica_coverage_overview.svg",
        ]);
        let overview = std::fs::read_to_string(&written[2]).unwrap();
        assert_eq!(overview.matches(r#"<circle class="point""#).count(), 2);
    }
}
