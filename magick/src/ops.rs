//! Stateless transformations. Each function accepts either an existing
//! [`Image`] handle or a loadable specification string, and returns a new
//! image without touching the input.

use crate::draw::DrawContext;
use crate::error::{cstring, Error, Exception, Result};
use crate::image::Image;
use crate::sys;
use crate::types::{resolve_dims, Color, Dim, Filter};

/// Input accepted by the transformation functions: a borrowed handle, or a
/// specification string loaded on demand (a path, `logo:`, `xc:<color>`, …).
pub enum ImageSource<'a> {
    Handle(&'a Image),
    Spec(&'a str),
}

impl<'a> From<&'a Image> for ImageSource<'a> {
    fn from(img: &'a Image) -> Self {
        ImageSource::Handle(img)
    }
}

impl<'a> From<&'a str> for ImageSource<'a> {
    fn from(spec: &'a str) -> Self {
        ImageSource::Spec(spec)
    }
}

impl<'a> From<&'a String> for ImageSource<'a> {
    fn from(spec: &'a String) -> Self {
        ImageSource::Spec(spec)
    }
}

enum Resolved<'a> {
    Borrowed(&'a Image),
    Owned(Image),
}

impl Resolved<'_> {
    fn get(&self) -> &Image {
        match self {
            Resolved::Borrowed(img) => img,
            Resolved::Owned(img) => img,
        }
    }
}

fn resolve<'a>(src: ImageSource<'a>) -> Result<Resolved<'a>> {
    match src {
        ImageSource::Handle(img) => Ok(Resolved::Borrowed(img)),
        ImageSource::Spec(spec) => Ok(Resolved::Owned(Image::read(spec)?)),
    }
}

/// Halve both dimensions of every frame.
pub fn minify<'a>(img: impl Into<ImageSource<'a>>) -> Result<Image> {
    let src = resolve(img.into())?;
    src.get()
        .map_frames(|frame, exc| unsafe { sys::MinifyImage(frame, exc) })
}

/// Double both dimensions of every frame.
pub fn magnify<'a>(img: impl Into<ImageSource<'a>>) -> Result<Image> {
    let src = resolve(img.into())?;
    src.get()
        .map_frames(|frame, exc| unsafe { sys::MagnifyImage(frame, exc) })
}

/// Mirror every frame vertically.
pub fn flip<'a>(img: impl Into<ImageSource<'a>>) -> Result<Image> {
    let src = resolve(img.into())?;
    src.get()
        .map_frames(|frame, exc| unsafe { sys::FlipImage(frame, exc) })
}

/// Mirror every frame horizontally.
pub fn flop<'a>(img: impl Into<ImageSource<'a>>) -> Result<Image> {
    let src = resolve(img.into())?;
    src.get()
        .map_frames(|frame, exc| unsafe { sys::FlopImage(frame, exc) })
}

/// Resize every frame with the default filter (Lanczos, blur 0.9).
///
/// Geometry per axis: a positive integer is an absolute pixel count, a
/// negative integer keeps the aspect ratio, and a float is a scale factor.
pub fn resize<'a, W, H>(img: impl Into<ImageSource<'a>>, dims: (W, H)) -> Result<Image>
where
    W: Into<Dim>,
    H: Into<Dim>,
{
    resize_with(img, dims, 0.9, Filter::Lanczos)
}

/// [`resize`] with an explicit blur factor and resampling filter. Blur
/// below 1.0 sharpens, above 1.0 blurs.
pub fn resize_with<'a, W, H>(
    img: impl Into<ImageSource<'a>>,
    dims: (W, H),
    blur: f64,
    filter: Filter,
) -> Result<Image>
where
    W: Into<Dim>,
    H: Into<Dim>,
{
    let src = resolve(img.into())?;
    let src = src.get();
    let (w, h) = resolve_dims(src.dimensions()?, dims.0.into(), dims.1.into())?;
    src.map_frames(|frame, exc| unsafe {
        sys::ResizeImage(frame, w as _, h as _, filter.to_sys(), blur, exc)
    })
}

/// Resize by pixel sampling, without interpolation. Axes follow the
/// integer geometry rules: positive is absolute, negative keeps aspect.
pub fn sample<'a>(img: impl Into<ImageSource<'a>>, dims: (i64, i64)) -> Result<Image> {
    let src = resolve(img.into())?;
    let src = src.get();
    match integer_dims(src, dims)? {
        None => src.copy(),
        Some((w, h)) => {
            src.map_frames(|frame, exc| unsafe { sys::SampleImage(frame, w as _, h as _, exc) })
        }
    }
}

/// Resize with simple pixel averaging.
pub fn scale<'a>(img: impl Into<ImageSource<'a>>, dims: (i64, i64)) -> Result<Image> {
    let src = resolve(img.into())?;
    let src = src.get();
    match integer_dims(src, dims)? {
        None => src.copy(),
        Some((w, h)) => {
            src.map_frames(|frame, exc| unsafe { sys::ScaleImage(frame, w as _, h as _, exc) })
        }
    }
}

/// Fast resize for preview-sized output.
pub fn thumbnail<'a, W, H>(img: impl Into<ImageSource<'a>>, dims: (W, H)) -> Result<Image>
where
    W: Into<Dim>,
    H: Into<Dim>,
{
    let src = resolve(img.into())?;
    let src = src.get();
    let (w, h) = resolve_dims(src.dimensions()?, dims.0.into(), dims.1.into())?;
    src.map_frames(|frame, exc| unsafe { sys::ThumbnailImage(frame, w as _, h as _, exc) })
}

/// Both axes negative means "keep the current size", reported as `None`.
fn integer_dims(src: &Image, dims: (i64, i64)) -> Result<Option<(u64, u64)>> {
    let (w, h) = dims;
    if w < 0 && h < 0 {
        return Ok(None);
    }
    Ok(Some(resolve_dims(
        src.dimensions()?,
        Dim::from(w),
        Dim::from(h),
    )?))
}

/// Gaussian blur. `radius` is the kernel extent in pixels (0 selects a
/// suitable one), `sigma` the standard deviation and must be positive.
pub fn blur<'a>(img: impl Into<ImageSource<'a>>, radius: f64, sigma: f64) -> Result<Image> {
    check_kernel(radius, sigma)?;
    let src = resolve(img.into())?;
    src.get()
        .map_frames(|frame, exc| unsafe { sys::BlurImage(frame, radius, sigma, exc) })
}

/// Simulate a charcoal sketch.
pub fn charcoal<'a>(img: impl Into<ImageSource<'a>>, radius: f64, sigma: f64) -> Result<Image> {
    check_kernel(radius, sigma)?;
    let src = resolve(img.into())?;
    src.get()
        .map_frames(|frame, exc| unsafe { sys::CharcoalImage(frame, radius, sigma, exc) })
}

fn check_kernel(radius: f64, sigma: f64) -> Result<()> {
    if !(radius >= 0.0) {
        return Err(Error::invalid(format!("radius {} out of range", radius)));
    }
    if !(sigma > 0.0) {
        return Err(Error::invalid(format!("sigma {} must be positive", sigma)));
    }
    Ok(())
}

/// Rotate every frame clockwise by `degrees`, enlarging the canvas to fit.
pub fn rotate<'a>(img: impl Into<ImageSource<'a>>, degrees: f64) -> Result<Image> {
    if !degrees.is_finite() {
        return Err(Error::invalid("rotation angle must be finite"));
    }
    let src = resolve(img.into())?;
    src.get()
        .map_frames(|frame, exc| unsafe { sys::RotateImage(frame, degrees, exc) })
}

/// Surround every frame with a border `width` pixels wide on the left and
/// right and `height` pixels tall on the top and bottom. With `color` the
/// border uses that color, otherwise each frame's recorded border color.
pub fn border<'a>(
    img: impl Into<ImageSource<'a>>,
    width: u64,
    height: u64,
    color: Option<&str>,
) -> Result<Image> {
    let src = resolve(img.into())?;
    let rect = sys::RectangleInfo {
        width: width as _,
        height: height as _,
        x: 0,
        y: 0,
    };
    let run = |src: &Image| {
        src.map_frames(|frame, exc| unsafe { sys::BorderImage(frame, &rect, exc) })
    };
    match color {
        None => run(src.get()),
        Some(name) => {
            let packet = name2color(name)?;
            let mut copy = src.get().copy()?;
            copy.set_border_color(packet)?;
            run(&copy)
        }
    }
}

/// Blend every frame toward `color`. `fraction` is the blend amount per
/// channel, 0.0 (unchanged) to 1.0 (solid color).
pub fn colorize<'a>(
    img: impl Into<ImageSource<'a>>,
    color: &str,
    fraction: f64,
) -> Result<Image> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(Error::invalid(format!(
            "colorize fraction {} outside 0.0..=1.0",
            fraction
        )));
    }
    let target = name2color(color)?.to_packet();
    // The native call takes the amount as a percent string.
    let percent = (fraction * 100.0 * 1e6).round() / 1e6;
    let opacity = cstring(&format!("{}%", percent))?;
    let src = resolve(img.into())?;
    src.get().map_frames(|frame, exc| unsafe {
        sys::ColorizeImage(frame, opacity.as_ptr(), target, exc)
    })
}

/// Composite `other` onto a copy of `img` (see [`crate::Image::composite`]).
pub fn composite<'a, 'b>(
    img: impl Into<ImageSource<'a>>,
    other: impl Into<ImageSource<'b>>,
    x: i64,
    y: i64,
    mode: &str,
) -> Result<Image> {
    let src = resolve(img.into())?;
    let overlay = resolve(other.into())?;
    let mut out = src.get().copy()?;
    out.composite(overlay.get(), x, y, mode)?;
    Ok(out)
}

/// Look up a color name in the native color database. Accepts names,
/// hex (`"#rrggbb"`), and functional notation.
pub fn name2color(name: &str) -> Result<Color> {
    let c = cstring(name)?;
    let mut exc = Exception::new();
    let mut packet: sys::PixelPacket = unsafe { std::mem::zeroed() };
    // SAFETY: the packet is a plain output parameter.
    let ok = unsafe { sys::QueryColorDatabase(c.as_ptr(), &mut packet, exc.as_mut_ptr()) };
    exc.check()?;
    if ok == 0 {
        return Err(Error::invalid(format!("unrecognized color `{}`", name)));
    }
    Ok(Color::from_packet(&packet))
}

/// Fresh drawing context with default style (white fill, black stroke,
/// width 1).
pub fn newdc() -> DrawContext {
    DrawContext::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_parameters_validated() {
        assert!(check_kernel(0.0, 1.0).is_ok());
        assert!(check_kernel(2.0, 0.5).is_ok());
        assert!(check_kernel(0.0, 0.0).is_err());
        assert!(check_kernel(1.0, -1.0).is_err());
        assert!(check_kernel(-1.0, 1.0).is_err());
        assert!(check_kernel(f64::NAN, 1.0).is_err());
        assert!(check_kernel(1.0, f64::NAN).is_err());
    }
}
