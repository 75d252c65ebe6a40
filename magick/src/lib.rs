//! Safe Rust bindings for [GraphicsMagick](http://www.graphicsmagick.org/),
//! wrapping its core C API behind owning handle types.
//!
//! The crate exposes a small, stateful API that mirrors the C library while
//! handling memory ownership and validation for you:
//! - [`Image`] owns one or more frames of native pixel data and supports
//!   in-place operations (`composite`, `draw`, `contrast`, opacity).
//! - [`DrawContext`] accumulates vector-drawing primitives and style state
//!   until rendered onto an image with [`Image::draw`].
//! - Free functions ([`minify`], [`resize`], [`blur`], …) accept an image
//!   handle or a loadable specification string (a file path, a built-in
//!   generator such as `logo:`, or an `xc:<color>` canvas) and return a new
//!   image, leaving the input unmodified.
//!
//! Everything is synchronous and single-threaded; handles are not safe to
//! share across threads. For a walkthrough, see `examples/draw_demo.rs` and
//! `examples/clock.rs`.

use std::sync::Once;

/// Low-level bindings to GraphicsMagick. Most users should favor the safe
/// wrappers re-exported from this crate.
pub use magick_sys as sys;

mod draw;
mod error;
mod image;
mod ops;
mod types;

pub use draw::{DrawContext, IntoCoords};
pub use error::{Error, ErrorKind, Result};
pub use image::{Image, ReadOptions};
pub use ops::*;
pub use types::{Color, CompositeOp, Dim, Filter, MAX_RGB};

static INIT: Once = Once::new();

/// Initialize the native library exactly once per process.
pub(crate) fn init() {
    INIT.call_once(|| unsafe { sys::InitializeMagick(std::ptr::null()) });
}
