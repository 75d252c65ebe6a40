use crate::sys;
use std::error::Error as StdError;
use std::ffi::{c_char, CStr, CString};
use std::fmt;
use std::mem::MaybeUninit;

/// Severity below which the native library reports warnings, at and above
/// which it reports errors.
const ERROR_SEVERITY: u32 = 400;

/// Broad category of a failure surfaced by the safe wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Unreadable input, unwritable output, unresolved filename.
    Io,
    /// Malformed specification, bad argument, unrecognized name.
    Validation,
    /// Allocation or resource-limit failure in the native library.
    Resource,
    Other,
}

/// Error produced by the safe wrappers around GraphicsMagick.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    /// Human-readable detail when the library or wrapper provided one.
    pub detail: Option<String>,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(msg.into()),
        }
    }

    pub(crate) fn alloc() -> Self {
        Self::new(ErrorKind::Resource, "allocation failed")
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, msg)
    }

    pub(crate) fn io(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(detail) = &self.detail {
            write!(f, "{:?}: {}", self.kind, detail)
        } else {
            write!(f, "{:?}", self.kind)
        }
    }
}

impl StdError for Error {}

/// Map a native exception severity onto the wrapper's error taxonomy.
/// Severity families repeat every 100 (error, fatal-error) with a fixed
/// per-concern offset.
pub(crate) fn classify(severity: u32) -> ErrorKind {
    match severity % 100 {
        0 | 45 => ErrorKind::Resource,
        30 | 35 | 40 => ErrorKind::Io,
        10 | 20 | 25 | 60 | 65 => ErrorKind::Validation,
        _ => ErrorKind::Other,
    }
}

fn text_at(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null reason/description strings are null-terminated and
    // owned by the exception being inspected.
    let s = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    if s.is_empty() { None } else { Some(s) }
}

fn exception_text(exc: &sys::ExceptionInfo) -> Option<String> {
    match (text_at(exc.reason), text_at(exc.description)) {
        (Some(r), Some(d)) => Some(format!("{} ({})", r, d)),
        (Some(r), None) => Some(r),
        (None, Some(d)) => Some(d),
        (None, None) => None,
    }
}

/// Convert an exception payload into a `Result`. Sub-error severities are
/// logged and treated as success, matching the library's own tools.
pub(crate) fn check(exc: &sys::ExceptionInfo) -> Result<()> {
    let severity = exc.severity as u32;
    if severity == 0 {
        return Ok(());
    }
    let detail = exception_text(exc);
    if severity < ERROR_SEVERITY {
        log::warn!(
            "graphicsmagick warning {}: {}",
            severity,
            detail.as_deref().unwrap_or("(no detail)")
        );
        return Ok(());
    }
    Err(Error {
        kind: classify(severity),
        detail,
    })
}

/// Check the per-image exception slot of a frame after an in-place call.
pub(crate) fn check_image(img: *mut sys::Image) -> Result<()> {
    debug_assert!(!img.is_null());
    // SAFETY: caller passes a live frame owned by an `Image` handle.
    let exc = unsafe { &(*img).exception };
    let result = check(exc);
    if exc.severity != 0 {
        unsafe { sys::SetExceptionInfo(&mut (*img).exception, 0) };
    }
    result
}

/// Owned native exception, released on drop.
pub(crate) struct Exception {
    inner: sys::ExceptionInfo,
}

impl Exception {
    pub(crate) fn new() -> Self {
        crate::init();
        let mut inner = MaybeUninit::<sys::ExceptionInfo>::uninit();
        // SAFETY: GetExceptionInfo fully initializes the struct.
        unsafe { sys::GetExceptionInfo(inner.as_mut_ptr()) };
        Self {
            inner: unsafe { inner.assume_init() },
        }
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut sys::ExceptionInfo {
        &mut self.inner
    }

    pub(crate) fn check(&self) -> Result<()> {
        check(&self.inner)
    }

    /// Clear a handled warning so it is not reported again when the
    /// exception is reused for the next call.
    pub(crate) fn reset(&mut self) {
        if self.inner.severity != 0 {
            unsafe { sys::SetExceptionInfo(&mut self.inner, 0) };
        }
    }

    /// Error for an operation that failed without raising past warning
    /// severity (e.g. a null return with no recorded reason).
    pub(crate) fn take_error(&self, fallback: &str) -> Error {
        match check(&self.inner) {
            Err(e) => e,
            Ok(()) => Error::new(ErrorKind::Resource, fallback),
        }
    }
}

impl Drop for Exception {
    fn drop(&mut self) {
        // Releases reason/description storage only; the struct itself is ours.
        unsafe { sys::DestroyExceptionInfo(&mut self.inner) }
    }
}

pub(crate) fn cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::invalid("string contains an interior NUL byte"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_families_classify() {
        assert_eq!(classify(400), ErrorKind::Resource); // resource limit
        assert_eq!(classify(410), ErrorKind::Validation); // option
        assert_eq!(classify(420), ErrorKind::Validation); // missing delegate
        assert_eq!(classify(430), ErrorKind::Io); // file open
        assert_eq!(classify(435), ErrorKind::Io); // blob
        assert_eq!(classify(460), ErrorKind::Validation); // draw
        assert_eq!(classify(445), ErrorKind::Resource); // cache
        assert_eq!(classify(405), ErrorKind::Other); // type
        // fatal variants share the per-concern offset
        assert_eq!(classify(730), ErrorKind::Io);
        assert_eq!(classify(700), ErrorKind::Resource);
    }

    #[test]
    fn reset_clears_handled_warnings() {
        let mut exc = Exception::new();
        exc.inner.severity = 300;
        exc.reset();
        assert_eq!(exc.inner.severity, 0);
        assert!(exc.check().is_ok());
    }

    #[test]
    fn display_includes_detail() {
        let e = Error::invalid("bad spec");
        assert_eq!(e.to_string(), "Validation: bad spec");
    }
}
