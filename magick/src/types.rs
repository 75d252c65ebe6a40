use crate::error::{Error, Result};
use crate::sys;
use std::str::FromStr;

/// Maximum channel intensity for the quantum depth the native library was
/// built with (255 for 8-bit builds, 65535 for 16-bit builds).
pub const MAX_RGB: u32 = (1u32 << sys::QuantumDepth) - 1;

/// A color in the native quantum range, `0..=MAX_RGB` per channel.
///
/// `opacity` follows the library's convention: 0 is fully opaque and
/// `MAX_RGB` is fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub opacity: u32,
}

impl Color {
    /// Fully opaque color from channel intensities.
    pub fn rgb(red: u32, green: u32, blue: u32) -> Self {
        Self {
            red,
            green,
            blue,
            opacity: 0,
        }
    }

    pub(crate) fn from_packet(p: &sys::PixelPacket) -> Self {
        Self {
            red: p.red as u32,
            green: p.green as u32,
            blue: p.blue as u32,
            opacity: p.opacity as u32,
        }
    }

    pub(crate) fn to_packet(self) -> sys::PixelPacket {
        // Zero-initialize so padding and any build-specific extra fields are
        // well defined, then fill the channels by name.
        let mut p: sys::PixelPacket = unsafe { std::mem::zeroed() };
        p.red = self.red as sys::Quantum;
        p.green = self.green as sys::Quantum;
        p.blue = self.blue as sys::Quantum;
        p.opacity = self.opacity as sys::Quantum;
        p
    }

    /// Channels scaled to `0.0..=1.0`, in (red, green, blue, opacity) order.
    pub fn as_fractions(&self) -> (f64, f64, f64, f64) {
        let max = f64::from(MAX_RGB);
        (
            f64::from(self.red) / max,
            f64::from(self.green) / max,
            f64::from(self.blue) / max,
            f64::from(self.opacity) / max,
        )
    }
}

/// One axis of a target geometry.
///
/// Numeric conversions make call sites read naturally: positive integers are
/// absolute pixel counts, any negative integer means [`Dim::Keep`], and
/// floats are scale factors relative to the current size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dim {
    /// Absolute size in pixels.
    Px(u64),
    /// Derive this axis from the other one, preserving aspect ratio.
    Keep,
    /// Multiply the current size by this factor, truncating.
    Scale(f64),
}

macro_rules! dim_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Dim {
            fn from(v: $t) -> Self {
                #[allow(unused_comparisons)]
                if v < 0 { Dim::Keep } else { Dim::Px(v as u64) }
            }
        }
    )*};
}
dim_from_int!(i32, i64, u32, u64);

impl From<f64> for Dim {
    fn from(v: f64) -> Self {
        if v < 0.0 { Dim::Keep } else { Dim::Scale(v) }
    }
}

impl From<f32> for Dim {
    fn from(v: f32) -> Self {
        Dim::from(f64::from(v))
    }
}

/// Resolve a `(width, height)` request against the current frame geometry.
pub(crate) fn resolve_dims(current: (u64, u64), width: Dim, height: Dim) -> Result<(u64, u64)> {
    let (cur_w, cur_h) = current;
    let scale = |axis: u64, f: f64| (axis as f64 * f) as u64;
    let (w, h) = match (width, height) {
        (Dim::Keep, Dim::Keep) => (cur_w, cur_h),
        (Dim::Px(w), Dim::Keep) => {
            check_axis(w, "width")?;
            (w, keep_aspect(cur_h, w, cur_w))
        }
        (Dim::Scale(f), Dim::Keep) => {
            let w = scale(cur_w, f);
            check_axis(w, "width")?;
            (w, keep_aspect(cur_h, w, cur_w))
        }
        (Dim::Keep, Dim::Px(h)) => {
            check_axis(h, "height")?;
            (keep_aspect(cur_w, h, cur_h), h)
        }
        (Dim::Keep, Dim::Scale(f)) => {
            let h = scale(cur_h, f);
            check_axis(h, "height")?;
            (keep_aspect(cur_w, h, cur_h), h)
        }
        (w, h) => {
            let w = match w {
                Dim::Px(w) => w,
                Dim::Scale(f) => scale(cur_w, f),
                Dim::Keep => unreachable!(),
            };
            let h = match h {
                Dim::Px(h) => h,
                Dim::Scale(f) => scale(cur_h, f),
                Dim::Keep => unreachable!(),
            };
            check_axis(w, "width")?;
            check_axis(h, "height")?;
            (w, h)
        }
    };
    Ok((w, h))
}

fn check_axis(v: u64, name: &str) -> Result<()> {
    if v == 0 {
        return Err(Error::invalid(format!("target {} must be nonzero", name)));
    }
    Ok(())
}

/// Scale `other` by the same ratio the fixed axis was scaled, rounding to
/// nearest.
fn keep_aspect(other: u64, fixed_new: u64, fixed_cur: u64) -> u64 {
    (other as f64 * fixed_new as f64 / fixed_cur as f64 + 0.5) as u64
}

/// Resampling filter for [`crate::resize_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    Point,
    Box,
    Triangle,
    Hermite,
    Hanning,
    Hamming,
    Blackman,
    Gaussian,
    Quadratic,
    Cubic,
    Catrom,
    Mitchell,
    #[default]
    Lanczos,
    Bessel,
    Sinc,
}

impl Filter {
    pub(crate) fn to_sys(self) -> sys::FilterTypes {
        use sys::FilterTypes::*;
        match self {
            Filter::Point => PointFilter,
            Filter::Box => BoxFilter,
            Filter::Triangle => TriangleFilter,
            Filter::Hermite => HermiteFilter,
            Filter::Hanning => HanningFilter,
            Filter::Hamming => HammingFilter,
            Filter::Blackman => BlackmanFilter,
            Filter::Gaussian => GaussianFilter,
            Filter::Quadratic => QuadraticFilter,
            Filter::Cubic => CubicFilter,
            Filter::Catrom => CatromFilter,
            Filter::Mitchell => MitchellFilter,
            Filter::Lanczos => LanczosFilter,
            Filter::Bessel => BesselFilter,
            Filter::Sinc => SincFilter,
        }
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let f = match s.to_ascii_lowercase().as_str() {
            "point" => Filter::Point,
            "box" => Filter::Box,
            "triangle" => Filter::Triangle,
            "hermite" => Filter::Hermite,
            "hanning" => Filter::Hanning,
            "hamming" => Filter::Hamming,
            "blackman" => Filter::Blackman,
            "gaussian" => Filter::Gaussian,
            "quadratic" => Filter::Quadratic,
            "cubic" => Filter::Cubic,
            "catrom" => Filter::Catrom,
            "lanczos" => Filter::Lanczos,
            "mitchell" => Filter::Mitchell,
            "bessel" => Filter::Bessel,
            "sinc" => Filter::Sinc,
            _ => return Err(Error::invalid(format!("unknown filter `{}`", s))),
        };
        Ok(f)
    }
}

/// Pixel combination rule for [`crate::Image::composite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    Over,
    In,
    Out,
    Atop,
    Xor,
    Plus,
    Minus,
    Add,
    Subtract,
    Difference,
    Multiply,
    Bumpmap,
    Copy,
    CopyRed,
    CopyGreen,
    CopyBlue,
    CopyOpacity,
    Clear,
    Dissolve,
    Displace,
    Modulate,
    Threshold,
    Darken,
    Lighten,
    Hue,
    Saturate,
    Colorize,
    Luminize,
    Screen,
    Overlay,
}

impl CompositeOp {
    pub(crate) fn to_sys(self) -> sys::CompositeOperator {
        use sys::CompositeOperator::*;
        match self {
            CompositeOp::Over => OverCompositeOp,
            CompositeOp::In => InCompositeOp,
            CompositeOp::Out => OutCompositeOp,
            CompositeOp::Atop => AtopCompositeOp,
            CompositeOp::Xor => XorCompositeOp,
            CompositeOp::Plus => PlusCompositeOp,
            CompositeOp::Minus => MinusCompositeOp,
            CompositeOp::Add => AddCompositeOp,
            CompositeOp::Subtract => SubtractCompositeOp,
            CompositeOp::Difference => DifferenceCompositeOp,
            CompositeOp::Multiply => MultiplyCompositeOp,
            CompositeOp::Bumpmap => BumpmapCompositeOp,
            CompositeOp::Copy => CopyCompositeOp,
            CompositeOp::CopyRed => CopyRedCompositeOp,
            CompositeOp::CopyGreen => CopyGreenCompositeOp,
            CompositeOp::CopyBlue => CopyBlueCompositeOp,
            CompositeOp::CopyOpacity => CopyOpacityCompositeOp,
            CompositeOp::Clear => ClearCompositeOp,
            CompositeOp::Dissolve => DissolveCompositeOp,
            CompositeOp::Displace => DisplaceCompositeOp,
            CompositeOp::Modulate => ModulateCompositeOp,
            CompositeOp::Threshold => ThresholdCompositeOp,
            CompositeOp::Darken => DarkenCompositeOp,
            CompositeOp::Lighten => LightenCompositeOp,
            CompositeOp::Hue => HueCompositeOp,
            CompositeOp::Saturate => SaturateCompositeOp,
            CompositeOp::Colorize => ColorizeCompositeOp,
            CompositeOp::Luminize => LuminizeCompositeOp,
            CompositeOp::Screen => ScreenCompositeOp,
            CompositeOp::Overlay => OverlayCompositeOp,
        }
    }
}

impl FromStr for CompositeOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        const TABLE: &[(&str, CompositeOp)] = &[
            ("over", CompositeOp::Over),
            ("in", CompositeOp::In),
            ("out", CompositeOp::Out),
            ("atop", CompositeOp::Atop),
            ("xor", CompositeOp::Xor),
            ("plus", CompositeOp::Plus),
            ("minus", CompositeOp::Minus),
            ("add", CompositeOp::Add),
            ("subtract", CompositeOp::Subtract),
            ("difference", CompositeOp::Difference),
            ("multiply", CompositeOp::Multiply),
            ("bumpmap", CompositeOp::Bumpmap),
            ("copy", CompositeOp::Copy),
            ("copyred", CompositeOp::CopyRed),
            ("copygreen", CompositeOp::CopyGreen),
            ("copyblue", CompositeOp::CopyBlue),
            ("copyopacity", CompositeOp::CopyOpacity),
            ("clear", CompositeOp::Clear),
            ("dissolve", CompositeOp::Dissolve),
            ("displace", CompositeOp::Displace),
            ("modulate", CompositeOp::Modulate),
            ("threshold", CompositeOp::Threshold),
            ("darken", CompositeOp::Darken),
            ("lighten", CompositeOp::Lighten),
            ("hue", CompositeOp::Hue),
            ("saturate", CompositeOp::Saturate),
            ("colorize", CompositeOp::Colorize),
            ("luminize", CompositeOp::Luminize),
            ("screen", CompositeOp::Screen),
            ("overlay", CompositeOp::Overlay),
        ];
        TABLE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, op)| op)
            .ok_or_else(|| Error::invalid(format!("unknown composite operator `{}`", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_rgb_matches_quantum_depth() {
        assert!(MAX_RGB == 255 || MAX_RGB == 65535);
    }

    #[test]
    fn absolute_dims_pass_through() {
        assert_eq!(resolve_dims((200, 100), 50.into(), 40.into()).unwrap(), (50, 40));
    }

    #[test]
    fn negative_axis_keeps_aspect() {
        assert_eq!(resolve_dims((200, 100), 50.into(), (-1).into()).unwrap(), (50, 25));
        assert_eq!(resolve_dims((100, 200), (-1).into(), 50.into()).unwrap(), (25, 50));
        // nearest rounding, not truncation
        assert_eq!(resolve_dims((3, 100), (-1).into(), 50.into()).unwrap(), (2, 50));
    }

    #[test]
    fn both_negative_keeps_size() {
        assert_eq!(
            resolve_dims((200, 100), (-1).into(), (-7).into()).unwrap(),
            (200, 100)
        );
    }

    #[test]
    fn float_axis_scales_and_truncates() {
        assert_eq!(resolve_dims((40, 20), (-1).into(), 2.0.into()).unwrap(), (80, 40));
        assert_eq!(resolve_dims((15, 10), 0.5.into(), 0.5.into()).unwrap(), (7, 5));
    }

    #[test]
    fn zero_axis_rejected() {
        assert!(resolve_dims((200, 100), 0.into(), 40.into()).is_err());
        assert!(resolve_dims((200, 100), 0.001.into(), 40.into()).is_err());
    }

    #[test]
    fn filter_parse_is_case_insensitive() {
        assert_eq!("LANCZOS".parse::<Filter>().unwrap(), Filter::Lanczos);
        assert_eq!("Mitchell".parse::<Filter>().unwrap(), Filter::Mitchell);
        assert!("smooth".parse::<Filter>().is_err());
    }

    #[test]
    fn composite_op_parse() {
        assert_eq!("over".parse::<CompositeOp>().unwrap(), CompositeOp::Over);
        assert_eq!(
            "CopyOpacity".parse::<CompositeOp>().unwrap(),
            CompositeOp::CopyOpacity
        );
        assert!("blend2".parse::<CompositeOp>().is_err());
    }

    #[test]
    fn color_fractions() {
        let c = Color::rgb(MAX_RGB, 0, MAX_RGB / 2);
        let (r, g, _b, o) = c.as_fractions();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert_eq!(o, 0.0);
    }
}
