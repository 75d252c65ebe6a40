use crate::draw::DrawContext;
use crate::error::{check_image, cstring, Error, Exception, Result};
use crate::sys;
use crate::types::{Color, CompositeOp, MAX_RGB};
use std::ffi::{c_char, c_void, CStr};
use std::path::Path;

/// Owned list of one or more native frames.
///
/// A single still image is a one-frame list; animations and multi-page
/// formats hold one frame per page. The empty handle (zero frames) exists
/// so sequences can be assembled with [`Image::append`].
///
/// In-place operations (`composite`, `draw`, `contrast`, `set_opacity`)
/// apply to every frame. Transformations that produce a new image live as
/// free functions at the crate root ([`crate::resize`], [`crate::blur`], …).
#[derive(Debug)]
pub struct Image {
    /// Head of the native frame list, or null for the empty handle.
    frames: *mut sys::Image,
}

impl Drop for Image {
    fn drop(&mut self) {
        if !self.frames.is_null() {
            // SAFETY: we own the whole list and nothing else aliases it.
            unsafe { sys::DestroyImageList(self.frames) };
        }
    }
}

/// Options applied while decoding an image specification.
///
/// ```no_run
/// # fn main() -> magick::Result<()> {
/// let img = magick::Image::read_with(
///     "gradient:blue-red",
///     &magick::ReadOptions::new().size("120x80"),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    size: Option<String>,
    background: Option<String>,
    border_color: Option<String>,
    quality: Option<u32>,
    adjoin: Option<bool>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target geometry hint, e.g. `"120x80"`. Required by generators that
    /// have no intrinsic size.
    pub fn size(mut self, geometry: &str) -> Self {
        self.size = Some(geometry.to_string());
        self
    }

    pub fn background(mut self, color: &str) -> Self {
        self.background = Some(color.to_string());
        self
    }

    pub fn border_color(mut self, color: &str) -> Self {
        self.border_color = Some(color.to_string());
        self
    }

    /// Compression quality for lossy coders, 0 to 100.
    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Whether multi-frame images are joined into a single file on write.
    pub fn adjoin(mut self, adjoin: bool) -> Self {
        self.adjoin = Some(adjoin);
        self
    }

    /// # Safety
    /// `info` must point to a live ImageInfo owned by the caller.
    unsafe fn apply(&self, info: *mut sys::ImageInfo, exc: &mut Exception) -> Result<()> {
        unsafe {
            if let Some(size) = &self.size {
                let c = cstring(size)?;
                sys::CloneString(&mut (*info).size, c.as_ptr());
                if (*info).size.is_null() {
                    return Err(Error::alloc());
                }
            }
            if let Some(color) = &self.background {
                let c = cstring(color)?;
                if sys::QueryColorDatabase(
                    c.as_ptr(),
                    &mut (*info).background_color,
                    exc.as_mut_ptr(),
                ) == 0
                {
                    return Err(exc.take_error("unrecognized background color"));
                }
            }
            if let Some(color) = &self.border_color {
                let c = cstring(color)?;
                if sys::QueryColorDatabase(
                    c.as_ptr(),
                    &mut (*info).border_color,
                    exc.as_mut_ptr(),
                ) == 0
                {
                    return Err(exc.take_error("unrecognized border color"));
                }
            }
            if let Some(quality) = self.quality {
                (*info).quality = quality as _;
            }
            if let Some(adjoin) = self.adjoin {
                (*info).adjoin = u32::from(adjoin) as _;
            }
        }
        Ok(())
    }
}

/// Owned ImageInfo, released on drop.
struct InfoGuard {
    ptr: *mut sys::ImageInfo,
}

impl InfoGuard {
    fn new() -> Result<Self> {
        crate::init();
        // SAFETY: a null argument asks for a fresh default ImageInfo.
        let ptr = unsafe { sys::CloneImageInfo(std::ptr::null()) };
        if ptr.is_null() {
            return Err(Error::alloc());
        }
        Ok(Self { ptr })
    }
}

impl Drop for InfoGuard {
    fn drop(&mut self) {
        unsafe { sys::DestroyImageInfo(self.ptr) }
    }
}

struct DrawInfoGuard {
    ptr: *mut sys::DrawInfo,
}

impl Drop for DrawInfoGuard {
    fn drop(&mut self) {
        unsafe { sys::DestroyDrawInfo(self.ptr) }
    }
}

/// Copy `text` into a fixed-size filename field, NUL-terminated.
///
/// # Safety
/// `dst` must point to at least `MaxTextExtent` writable bytes and `text`
/// must be shorter than `MaxTextExtent`.
unsafe fn copy_text(dst: *mut c_char, text: &str) {
    unsafe {
        std::ptr::copy_nonoverlapping(text.as_ptr() as *const c_char, dst, text.len());
        *dst.add(text.len()) = 0;
    }
}

fn checked_spec(spec: &str) -> Result<&str> {
    if spec.is_empty() {
        return Err(Error::invalid("empty image specification"));
    }
    if spec.len() >= sys::MaxTextExtent as usize {
        return Err(Error::invalid(format!(
            "image specification longer than {} bytes",
            sys::MaxTextExtent
        )));
    }
    if spec.bytes().any(|b| b == 0) {
        return Err(Error::invalid("image specification contains a NUL byte"));
    }
    Ok(spec)
}

impl Image {
    /// Decode an image from a specification: a file path, a built-in
    /// generator such as `logo:`, or an `xc:<color>` canvas. Multi-frame
    /// files load every frame.
    pub fn read(spec: &str) -> Result<Self> {
        Self::read_with(spec, &ReadOptions::default())
    }

    /// [`Image::read`] with decode options.
    pub fn read_with(spec: &str, options: &ReadOptions) -> Result<Self> {
        let spec = checked_spec(spec)?;
        let info = InfoGuard::new()?;
        let mut exc = Exception::new();
        // SAFETY: spec length was checked against the field size above.
        unsafe { copy_text((*info.ptr).filename.as_mut_ptr(), spec) };
        unsafe { options.apply(info.ptr, &mut exc)? };
        // SAFETY: info and exc are live for the duration of the call.
        let frames = unsafe { sys::ReadImage(info.ptr, exc.as_mut_ptr()) };
        exc.check()?;
        if frames.is_null() {
            return Err(exc.take_error("image read failed"));
        }
        Ok(Self { frames })
    }

    /// Build a single frame from packed 8-bit RGB samples, row-major.
    pub fn from_rgb(width: u64, height: u64, pixels: &[u8]) -> Result<Self> {
        Self::constitute(width, height, "RGB", pixels)
    }

    /// Build a single frame from packed 8-bit RGBA samples, row-major.
    pub fn from_rgba(width: u64, height: u64, pixels: &[u8]) -> Result<Self> {
        Self::constitute(width, height, "RGBA", pixels)
    }

    /// Build a single grayscale frame from 8-bit intensity samples.
    pub fn from_gray(width: u64, height: u64, pixels: &[u8]) -> Result<Self> {
        Self::constitute(width, height, "I", pixels)
    }

    fn constitute(width: u64, height: u64, map: &str, pixels: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid("frame dimensions must be nonzero"));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(map.len() as u64))
            .ok_or_else(|| Error::invalid("frame dimensions overflow"))?;
        if pixels.len() as u64 != expected {
            return Err(Error::invalid(format!(
                "expected {} samples for {}x{} {}, got {}",
                expected,
                width,
                height,
                map,
                pixels.len()
            )));
        }
        crate::init();
        let map_c = cstring(map)?;
        let mut exc = Exception::new();
        // SAFETY: the sample buffer covers width*height*channels bytes as
        // validated above; CharPixel matches u8 samples.
        let frame = unsafe {
            sys::ConstituteImage(
                width as _,
                height as _,
                map_c.as_ptr(),
                sys::StorageType::CharPixel,
                pixels.as_ptr() as *const c_void,
                exc.as_mut_ptr(),
            )
        };
        exc.check()?;
        if frame.is_null() {
            return Err(exc.take_error("constitute failed"));
        }
        Ok(Self { frames: frame })
    }

    /// Handle with zero frames, for assembling sequences with
    /// [`Image::append`].
    pub fn empty() -> Self {
        crate::init();
        Self {
            frames: std::ptr::null_mut(),
        }
    }

    /// Concatenate deep copies of every frame of every source.
    pub fn sequence(sources: &[&Image]) -> Result<Self> {
        let mut out = Self::empty();
        for src in sources {
            out.append(src)?;
        }
        Ok(out)
    }

    /// Append deep copies of all frames of `other` to this handle.
    pub fn append(&mut self, other: &Image) -> Result<()> {
        if other.frames.is_null() {
            return Ok(());
        }
        let mut exc = Exception::new();
        // SAFETY: cloning never mutates the source list.
        let cloned = unsafe { sys::CloneImageList(other.frames, exc.as_mut_ptr()) };
        exc.check()?;
        if cloned.is_null() {
            return Err(exc.take_error("frame clone failed"));
        }
        // SAFETY: both lists are owned here; AppendImageToList links them.
        unsafe { sys::AppendImageToList(&mut self.frames, cloned) };
        Ok(())
    }

    /// Deep copy of all frames.
    pub fn copy(&self) -> Result<Self> {
        let mut out = Self::empty();
        out.append(self)?;
        Ok(out)
    }

    fn first(&self) -> Result<*mut sys::Image> {
        if self.frames.is_null() {
            return Err(Error::invalid("empty image handle"));
        }
        Ok(self.frames)
    }

    /// Filename recorded on the first frame, as set by the decoder or by
    /// [`Image::set_filename`].
    pub fn filename(&self) -> Result<String> {
        let first = self.first()?;
        // SAFETY: the filename field is a NUL-terminated array inside a
        // live frame.
        let name = unsafe { CStr::from_ptr((*first).filename.as_ptr()) };
        Ok(name.to_string_lossy().into_owned())
    }

    /// Set the output filename on every frame. The extension selects the
    /// encoder on [`Image::write`].
    pub fn set_filename(&mut self, name: &str) -> Result<()> {
        let name = checked_spec(name)?;
        self.first()?;
        let mut frame = self.frames;
        while !frame.is_null() {
            // SAFETY: length checked against the field size by checked_spec.
            unsafe {
                copy_text((*frame).filename.as_mut_ptr(), name);
                frame = (*frame).next;
            }
        }
        Ok(())
    }

    /// Encode all frames to the filename recorded on the first frame.
    pub fn write(&self) -> Result<()> {
        let first = self.first()?;
        let name = self.filename()?;
        if name.is_empty() {
            return Err(Error::io("image has no filename to write to"));
        }
        let info = InfoGuard::new()?;
        // SAFETY: info and the frame list are both live; WriteImage walks
        // the list when the coder supports multiple frames.
        let ok = unsafe { sys::WriteImage(info.ptr, first) };
        check_image(first)?;
        if ok == 0 {
            return Err(Error::io(format!("failed to write `{}`", name)));
        }
        Ok(())
    }

    /// Set the filename and encode in one step.
    pub fn write_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let name = path
            .to_str()
            .ok_or_else(|| Error::invalid("non-UTF8 output path"))?;
        self.set_filename(name)?;
        self.write()
    }

    /// `(width, height)` of the first frame.
    pub fn dimensions(&self) -> Result<(u64, u64)> {
        let first = self.first()?;
        // SAFETY: first is a live frame.
        unsafe { Ok(((*first).columns as u64, (*first).rows as u64)) }
    }

    pub fn width(&self) -> Result<u64> {
        Ok(self.dimensions()?.0)
    }

    pub fn height(&self) -> Result<u64> {
        Ok(self.dimensions()?.1)
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        if self.frames.is_null() {
            return 0;
        }
        // SAFETY: the list is well formed and owned by this handle.
        unsafe { sys::GetImageListLength(self.frames) as usize }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_null()
    }

    /// Deep copy of a single frame as a standalone image.
    pub fn frame(&self, index: usize) -> Result<Self> {
        let first = self.first()?;
        // SAFETY: GetImageFromList tolerates out-of-range offsets by
        // returning null.
        let frame = unsafe { sys::GetImageFromList(first, index as _) };
        if frame.is_null() {
            return Err(Error::invalid(format!(
                "frame index {} out of range for {} frames",
                index,
                self.len()
            )));
        }
        let mut exc = Exception::new();
        // SAFETY: zero columns/rows clones at the source geometry; the
        // orphan flag detaches the copy from the list.
        let cloned = unsafe { sys::CloneImage(frame, 0, 0, 1, exc.as_mut_ptr()) };
        exc.check()?;
        if cloned.is_null() {
            return Err(exc.take_error("frame clone failed"));
        }
        Ok(Self { frames: cloned })
    }

    /// Set every pixel's opacity on every frame. 0 is opaque, [`MAX_RGB`]
    /// is transparent.
    pub fn set_opacity(&mut self, opacity: u32) -> Result<()> {
        if opacity > MAX_RGB {
            return Err(Error::invalid(format!(
                "opacity {} exceeds {}",
                opacity, MAX_RGB
            )));
        }
        self.first()?;
        let mut frame = self.frames;
        while !frame.is_null() {
            // SAFETY: each frame in the owned list is live.
            unsafe {
                sys::SetImageOpacity(frame, opacity as _);
                check_image(frame)?;
                frame = (*frame).next;
            }
        }
        Ok(())
    }

    /// Adjust contrast on every frame. A nonzero `sharpen` intensifies
    /// intensity differences, zero flattens them. Negative values are
    /// rejected.
    pub fn contrast(&mut self, sharpen: i32) -> Result<()> {
        if sharpen < 0 {
            return Err(Error::invalid("contrast amount must be non-negative"));
        }
        self.first()?;
        let mut frame = self.frames;
        while !frame.is_null() {
            // SAFETY: each frame in the owned list is live.
            unsafe {
                sys::ContrastImage(frame, sharpen as _);
                check_image(frame)?;
                frame = (*frame).next;
            }
        }
        Ok(())
    }

    /// Composite `other` onto every frame at `(x, y)` using the named
    /// operator (see [`CompositeOp`]). When `other` has fewer frames its
    /// frames are cycled.
    pub fn composite(&mut self, other: &Image, x: i64, y: i64, mode: &str) -> Result<()> {
        let op: CompositeOp = mode.parse()?;
        self.first()?;
        let src_head = other.first()?;
        let mut dst = self.frames;
        let mut src = src_head;
        while !dst.is_null() {
            if src.is_null() {
                src = src_head;
            }
            // SAFETY: dst and src are live frames from owned lists; the
            // source is not modified.
            unsafe {
                sys::CompositeImage(dst, op.to_sys(), src, x as _, y as _);
                check_image(dst)?;
                dst = (*dst).next;
                src = (*src).next;
            }
        }
        Ok(())
    }

    /// Render the primitives recorded in `dc` onto every frame. On full
    /// success the context's primitives are cleared; its style carries
    /// over. A context with no primitives is a no-op.
    pub fn draw(&mut self, dc: &mut DrawContext) -> Result<()> {
        if dc.is_empty() {
            return Ok(());
        }
        self.first()?;
        let program = cstring(&dc.render())?;
        // SAFETY: null arguments ask for default draw settings.
        let draw_info = unsafe { sys::CloneDrawInfo(std::ptr::null(), std::ptr::null()) };
        if draw_info.is_null() {
            return Err(Error::alloc());
        }
        let guard = DrawInfoGuard { ptr: draw_info };
        // SAFETY: CloneString replaces the primitive field with an owned
        // copy that DestroyDrawInfo releases.
        unsafe {
            sys::CloneString(&mut (*guard.ptr).primitive, program.as_ptr());
            if (*guard.ptr).primitive.is_null() {
                return Err(Error::alloc());
            }
        }
        let mut frame = self.frames;
        while !frame.is_null() {
            // SAFETY: each frame in the owned list is live.
            unsafe {
                sys::DrawImage(frame, guard.ptr);
                check_image(frame)?;
                frame = (*frame).next;
            }
        }
        dc.clear();
        Ok(())
    }

    /// Export the first frame as packed 8-bit RGBA samples, row-major.
    pub fn to_rgba8(&self) -> Result<Vec<u8>> {
        let first = self.first()?;
        let (w, h) = self.dimensions()?;
        let len = (w * h * 4) as usize;
        let mut out = vec![0u8; len];
        let map = cstring("RGBA")?;
        let mut exc = Exception::new();
        // SAFETY: the output buffer holds w*h*4 bytes; CharPixel matches
        // u8 samples.
        let ok = unsafe {
            sys::DispatchImage(
                first,
                0,
                0,
                w as _,
                h as _,
                map.as_ptr(),
                sys::StorageType::CharPixel,
                out.as_mut_ptr() as *mut c_void,
                exc.as_mut_ptr(),
            )
        };
        exc.check()?;
        if ok == 0 {
            return Err(exc.take_error("pixel export failed"));
        }
        Ok(out)
    }

    /// Set the border color recorded on every frame, used by subsequent
    /// framing operations.
    pub(crate) fn set_border_color(&mut self, color: Color) -> Result<()> {
        self.first()?;
        let packet = color.to_packet();
        let mut frame = self.frames;
        while !frame.is_null() {
            // SAFETY: each frame in the owned list is live.
            unsafe {
                (*frame).border_color = packet;
                frame = (*frame).next;
            }
        }
        Ok(())
    }

    /// Apply `op` to each frame, collecting the results into a new list.
    /// Stops at the first failing frame and releases partial results.
    pub(crate) fn map_frames<F>(&self, mut op: F) -> Result<Self>
    where
        F: FnMut(*mut sys::Image, *mut sys::ExceptionInfo) -> *mut sys::Image,
    {
        self.first()?;
        let mut exc = Exception::new();
        let mut out: *mut sys::Image = std::ptr::null_mut();
        let mut frame = self.frames;
        while !frame.is_null() {
            let produced = op(frame, exc.as_mut_ptr());
            let status = exc.check();
            if status.is_err() || produced.is_null() {
                // SAFETY: destroy whatever was produced so far.
                unsafe {
                    if !produced.is_null() {
                        sys::DestroyImage(produced);
                    }
                    if !out.is_null() {
                        sys::DestroyImageList(out);
                    }
                }
                return Err(match status {
                    Err(e) => e,
                    Ok(()) => exc.take_error("frame operation failed"),
                });
            }
            exc.reset();
            // SAFETY: produced is a fresh orphan frame we now own.
            unsafe { sys::AppendImageToList(&mut out, produced) };
            frame = unsafe { (*frame).next };
        }
        Ok(Self { frames: out })
    }
}
