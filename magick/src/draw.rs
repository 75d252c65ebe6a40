use crate::error::{Error, Result};
use std::fmt::Write as _;

/// Style triple applied to primitives recorded after it was set.
#[derive(Debug, Clone, PartialEq)]
struct Style {
    fill: String,
    stroke: String,
    stroke_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: "white".to_string(),
            stroke: "black".to_string(),
            stroke_width: 1.0,
        }
    }
}

impl Style {
    fn commands(&self, out: &mut String) {
        // writeln! to String cannot fail
        let _ = writeln!(out, "fill '{}'", self.fill);
        let _ = writeln!(out, "stroke '{}'", self.stroke);
        let _ = writeln!(out, "stroke-width {}", self.stroke_width);
    }
}

/// Accumulates vector-drawing primitives and style state until rendered
/// onto an [`crate::Image`] with [`crate::Image::draw`].
///
/// Primitives are recorded in call order. A style change affects only the
/// primitives recorded after it; earlier ones keep the style that was
/// current when they were added. After a successful draw the recorded
/// primitives are discarded but the current style carries over, so a
/// context can be reused across frames.
///
/// ```no_run
/// # fn main() -> magick::Result<()> {
/// let mut dc = magick::DrawContext::new();
/// dc.set_stroke("blue")?;
/// dc.set_fill("none")?;
/// dc.circle(50.0, 50.0, 10.0);
/// let mut img = magick::Image::read("xc:white")?;
/// img.draw(&mut dc)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DrawContext {
    /// Style in effect at the start of the current recording cycle.
    base: Style,
    /// Style in effect for the next primitive.
    current: Style,
    pending: Vec<String>,
}

/// Colors accept the forms the native parser understands: names
/// (`"red"`), hex (`"#rrggbb"`), and functional notation
/// (`"rgb(0,0,255)"`). `"none"` disables painting with that brush.
fn validate_color(color: &str) -> Result<()> {
    if color.is_empty() {
        return Err(Error::invalid("empty color"));
    }
    let ok = color
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "#(),.%-".contains(c));
    if !ok {
        return Err(Error::invalid(format!("malformed color `{}`", color)));
    }
    Ok(())
}

impl DrawContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill brush for subsequent primitives.
    pub fn set_fill(&mut self, color: &str) -> Result<()> {
        validate_color(color)?;
        self.current.fill = color.to_string();
        self.pending.push(format!("fill '{}'", color));
        Ok(())
    }

    /// Set the stroke brush for subsequent primitives.
    pub fn set_stroke(&mut self, color: &str) -> Result<()> {
        validate_color(color)?;
        self.current.stroke = color.to_string();
        self.pending.push(format!("stroke '{}'", color));
        Ok(())
    }

    /// Set the stroke width, in pixels, for subsequent primitives.
    pub fn set_stroke_width(&mut self, width: f64) -> Result<()> {
        if !(width >= 0.0) {
            return Err(Error::invalid(format!("stroke width {} out of range", width)));
        }
        self.current.stroke_width = width;
        self.pending.push(format!("stroke-width {}", width));
        Ok(())
    }

    pub fn fill(&self) -> &str {
        &self.current.fill
    }

    pub fn stroke(&self) -> &str {
        &self.current.stroke
    }

    pub fn stroke_width(&self) -> f64 {
        self.current.stroke_width
    }

    /// Circle centered at `(cx, cy)`. The native primitive takes a center
    /// and a perimeter point; any perimeter point is equivalent.
    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.pending
            .push(format!("circle {},{} {},{}", cx, cy, cx + radius, cy));
    }

    /// Ellipse arc around `(cx, cy)`, angles in degrees. A full ellipse is
    /// `start` 0 and `end` 360.
    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start: f64, end: f64) {
        self.pending.push(format!(
            "ellipse {},{} {},{} {},{}",
            cx, cy, rx, ry, start, end
        ));
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.pending
            .push(format!("line {},{} {},{}", x1, y1, x2, y2));
    }

    /// Axis-aligned rectangle between two corners.
    pub fn rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.pending
            .push(format!("rectangle {},{} {},{}", x1, y1, x2, y2));
    }

    /// Rectangle with elliptically rounded corners of radii `(rx, ry)`.
    pub fn round_rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, rx: f64, ry: f64) {
        self.pending.push(format!(
            "roundrectangle {},{} {},{} {},{}",
            x1, y1, x2, y2, rx, ry
        ));
    }

    pub fn point(&mut self, x: f64, y: f64) {
        self.pending.push(format!("point {},{}", x, y));
    }

    /// Circular arc across the rectangle spanned by the two corners,
    /// angles in degrees.
    pub fn arc(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, start: f64, end: f64) {
        self.pending.push(format!(
            "arc {},{} {},{} {},{}",
            x1, y1, x2, y2, start, end
        ));
    }

    /// Bezier curve through the given control points (at least four).
    pub fn bezier(&mut self, points: impl IntoCoords) -> Result<()> {
        self.poly("bezier", points.into_coords(), 4)
    }

    /// Closed polygon through the given vertices (at least three).
    pub fn polygon(&mut self, points: impl IntoCoords) -> Result<()> {
        self.poly("polygon", points.into_coords(), 3)
    }

    /// Open polyline through the given vertices (at least two).
    pub fn polyline(&mut self, points: impl IntoCoords) -> Result<()> {
        self.poly("polyline", points.into_coords(), 2)
    }

    fn poly(&mut self, keyword: &str, coords: Vec<f64>, min_points: usize) -> Result<()> {
        if coords.len() % 2 != 0 {
            return Err(Error::invalid(format!(
                "{} wants x,y pairs, got {} coordinates",
                keyword,
                coords.len()
            )));
        }
        if coords.len() < min_points * 2 {
            return Err(Error::invalid(format!(
                "{} wants at least {} points, got {}",
                keyword,
                min_points,
                coords.len() / 2
            )));
        }
        let mut cmd = String::from(keyword);
        for (i, c) in coords.iter().enumerate() {
            cmd.push(if i == 0 { ' ' } else { ',' });
            let _ = write!(cmd, "{}", c);
        }
        self.pending.push(cmd);
        Ok(())
    }

    /// SVG-style path, e.g. `"M 10,10 L 90,10 90,90 Z"`.
    pub fn path(&mut self, spec: &str) -> Result<()> {
        validate_path(spec)?;
        self.pending.push(format!("path '{}'", spec));
        Ok(())
    }

    /// Recorded primitives, one per line, without the style preamble.
    pub fn primitives(&self) -> String {
        self.pending.join("\n")
    }

    /// True when no primitives have been recorded since the last draw.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Discard recorded primitives. The current style is kept and becomes
    /// the base style of the next recording cycle.
    pub fn clear(&mut self) {
        self.base = self.current.clone();
        self.pending.clear();
    }

    /// Full drawing program: base-style preamble plus recorded primitives.
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        self.base.commands(&mut out);
        out.push_str(&self.pending.join("\n"));
        out
    }
}

fn validate_path(spec: &str) -> Result<()> {
    let trimmed = spec.trim_start();
    if !(trimmed.starts_with('M') || trimmed.starts_with('m')) {
        return Err(Error::invalid("path must start with a moveto (M or m)"));
    }
    let ok = spec.chars().all(|c| {
        c.is_ascii_digit()
            || c.is_ascii_whitespace()
            || ",.-+".contains(c)
            || "MmLlHhVvCcSsQqTtAaZz".contains(c)
    });
    if !ok {
        return Err(Error::invalid(format!("malformed path `{}`", spec)));
    }
    Ok(())
}

/// Coordinate lists accepted by [`DrawContext::bezier`],
/// [`DrawContext::polygon`] and [`DrawContext::polyline`]: flat
/// `x,y,x,y,...` slices or lists of pairs.
pub trait IntoCoords {
    fn into_coords(self) -> Vec<f64>;
}

impl IntoCoords for Vec<f64> {
    fn into_coords(self) -> Vec<f64> {
        self
    }
}

impl IntoCoords for &[f64] {
    fn into_coords(self) -> Vec<f64> {
        self.to_vec()
    }
}

impl<const N: usize> IntoCoords for [f64; N] {
    fn into_coords(self) -> Vec<f64> {
        self.to_vec()
    }
}

impl IntoCoords for &[(f64, f64)] {
    fn into_coords(self) -> Vec<f64> {
        self.iter().flat_map(|&(x, y)| [x, y]).collect()
    }
}

impl<const N: usize> IntoCoords for [(f64, f64); N] {
    fn into_coords(self) -> Vec<f64> {
        self.as_slice().into_coords()
    }
}

impl IntoCoords for &[[f64; 2]] {
    fn into_coords(self) -> Vec<f64> {
        self.iter().flatten().copied().collect()
    }
}

impl<const N: usize> IntoCoords for [[f64; 2]; N] {
    fn into_coords(self) -> Vec<f64> {
        self.as_slice().into_coords()
    }
}
