//! Raw FFI bindings to GraphicsMagick's core C API (`magick/api.h`).
//!
//! Generated at build time with `bindgen` against the headers located by
//! the `GraphicsMagick-config` helper. Most users should favor the safe
//! wrappers in the companion `magick` crate.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
