//! SVG writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

/// Buffered SVG output to a file.
pub(crate) struct SvgWriter {
    writer: BufWriter<File>
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for SvgWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl SvgWriter {
    /// Create a new SVG writer to a file path
    pub(crate) fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;

        Ok(Self { writer: BufWriter::new(file) })
    }

    /// Flush buffered output, surfacing write errors that a drop would swallow.
    pub(crate) fn finish(mut self) -> Result<()> {
        self.writer.flush().context("[io::svg] Failed to flush SVG output")
    }
}

/// Escape text for use in SVG content and attribute values.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Write the XML declaration, the opening <svg> tag, and a white background.
pub(crate) fn write_svg_header<W: Write>(writer: &mut W, width: f64, height: f64, extent: f64) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width}" height="{height}"
        viewBox="0 0 {width} {height}"
        data-extent-m="{extent}">"##,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

/// Write the shared style sheet.
pub(crate) fn write_svg_styles<W: Write>(writer: &mut W, line_width: f64) -> Result<()> {
    writeln!(writer, r##"<defs>
<style>
    .base {{ stroke: #000000; stroke-width: 0.3; }}
    .line {{ fill: none; stroke-width: {line_width}; stroke-linecap: round; }}
    .point {{ stroke: none; }}
    .area {{ stroke: none; fill-opacity: 0.8; }}
    .frame {{ fill: none; stroke: #000000; stroke-width: 1; }}
    .title {{ font: 14pt sans-serif; text-anchor: middle; }}
    .label {{ font: 8pt sans-serif; }}
</style>
</defs>"##)?;
    Ok(())
}

/// Write SVG footer to any writer.
pub(crate) fn write_svg_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}
