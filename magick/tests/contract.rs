//! End-to-end tests against a real GraphicsMagick installation.

use magick::{DrawContext, ErrorKind, Image, ReadOptions, MAX_RGB};
use std::path::PathBuf;

/// Temp file removed on drop so failed assertions do not leak artifacts.
struct TempPath(PathBuf);

impl TempPath {
    fn new(name: &str) -> Self {
        Self(std::env::temp_dir().join(format!(
            "magick-test-{}-{}",
            std::process::id(),
            name
        )))
    }

    fn as_str(&self) -> &str {
        self.0.to_str().unwrap()
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn solid_rgb(width: u64, height: u64, rgb: [u8; 3]) -> Image {
    let pixels: Vec<u8> = rgb
        .iter()
        .copied()
        .cycle()
        .take((width * height * 3) as usize)
        .collect();
    Image::from_rgb(width, height, &pixels).unwrap()
}

fn pixel(rgba: &[u8], width: u64, x: u64, y: u64) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
}

#[test]
fn read_write_round_trip() {
    let path = TempPath::new("roundtrip.png");
    let mut img = solid_rgb(8, 8, [255, 0, 0]);
    img.write_to(path.as_str()).unwrap();

    let back = Image::read(path.as_str()).unwrap();
    assert_eq!(back.dimensions().unwrap(), (8, 8));
    let rgba = back.to_rgba8().unwrap();
    for y in 0..8 {
        for x in 0..8 {
            let [r, g, b, _] = pixel(&rgba, 8, x, y);
            assert_eq!((r, g, b), (255, 0, 0), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn minify_magnify_dimensions() {
    let img = solid_rgb(40, 20, [0, 0, 0]);
    assert_eq!(magick::minify(&img).unwrap().dimensions().unwrap(), (20, 10));
    assert_eq!(magick::magnify(&img).unwrap().dimensions().unwrap(), (80, 40));
    // the input is untouched
    assert_eq!(img.dimensions().unwrap(), (40, 20));
}

#[test]
fn resize_geometry_rules() {
    let img = solid_rgb(200, 100, [10, 20, 30]);
    let out = magick::resize(&img, (50, -1)).unwrap();
    assert_eq!(out.dimensions().unwrap(), (50, 25));

    let img = solid_rgb(40, 20, [10, 20, 30]);
    let out = magick::resize(&img, (-1, 2.0)).unwrap();
    assert_eq!(out.dimensions().unwrap(), (80, 40));

    let err = magick::resize(&img, (0, 10)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn sample_and_scale_keep_size_when_unspecified() {
    let img = solid_rgb(30, 12, [1, 2, 3]);
    assert_eq!(
        magick::sample(&img, (-1, -1)).unwrap().dimensions().unwrap(),
        (30, 12)
    );
    assert_eq!(
        magick::scale(&img, (15, -1)).unwrap().dimensions().unwrap(),
        (15, 6)
    );
}

#[test]
fn spec_strings_load_on_demand() {
    let out = magick::thumbnail("xc:gray", (6, 6)).unwrap();
    assert_eq!(out.dimensions().unwrap(), (6, 6));

    let err = magick::minify("xc:not-a-real-color-name").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Validation | ErrorKind::Io | ErrorKind::Other
    ));
}

#[test]
fn name2color_red_matches_hex() {
    let by_name = magick::name2color("red").unwrap();
    let by_hex = magick::name2color("#ff0000").unwrap();
    assert_eq!(by_name.red, MAX_RGB);
    assert_eq!(by_name.green, 0);
    assert_eq!(by_name.blue, 0);
    assert_eq!((by_name.red, by_name.green, by_name.blue), (by_hex.red, by_hex.green, by_hex.blue));

    let err = magick::name2color("no-such-color-at-all").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn empty_context_draw_is_noop() {
    let mut img = solid_rgb(4, 4, [9, 9, 9]);
    let before = img.to_rgba8().unwrap();
    let mut dc = DrawContext::new();
    img.draw(&mut dc).unwrap();
    assert_eq!(img.to_rgba8().unwrap(), before);
}

#[test]
fn stroked_circle_lands_where_expected() {
    let mut img = solid_rgb(150, 100, [255, 255, 255]);
    let mut dc = DrawContext::new();
    dc.set_fill("none").unwrap();
    dc.set_stroke("blue").unwrap();
    dc.set_stroke_width(3.0).unwrap();
    dc.circle(50.0, 50.0, 10.0);
    img.draw(&mut dc).unwrap();
    // drawing succeeded, so the primitives were consumed
    assert!(dc.primitives().is_empty());

    let rgba = img.to_rgba8().unwrap();
    let on_stroke = pixel(&rgba, 150, 60, 50);
    assert!(
        on_stroke[2] > on_stroke[0],
        "expected blue stroke at (60, 50), got {:?}",
        on_stroke
    );
    // fill "none" leaves the center untouched
    assert_eq!(pixel(&rgba, 150, 50, 50), [255, 255, 255, 255]);
    assert_eq!(pixel(&rgba, 150, 140, 90), [255, 255, 255, 255]);
}

#[test]
fn composite_rejects_unknown_mode() {
    let mut img = solid_rgb(4, 4, [0, 0, 0]);
    let overlay = solid_rgb(2, 2, [255, 255, 255]);
    let err = img.composite(&overlay, 0, 0, "blend2").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn composite_copies_overlay_pixels() {
    let mut img = solid_rgb(4, 4, [0, 0, 0]);
    let overlay = solid_rgb(2, 2, [255, 0, 0]);
    img.composite(&overlay, 1, 1, "over").unwrap();
    let rgba = img.to_rgba8().unwrap();
    assert_eq!(pixel(&rgba, 4, 1, 1), [255, 0, 0, 255]);
    assert_eq!(pixel(&rgba, 4, 0, 0), [0, 0, 0, 255]);
}

#[test]
fn sequence_assembly_and_frame_access() {
    let red = solid_rgb(3, 3, [255, 0, 0]);
    let green = solid_rgb(3, 3, [0, 255, 0]);
    let seq = Image::sequence(&[&red, &green]).unwrap();
    assert_eq!(seq.len(), 2);

    let second = seq.frame(1).unwrap();
    assert_eq!(second.len(), 1);
    let rgba = second.to_rgba8().unwrap();
    assert_eq!(pixel(&rgba, 3, 0, 0), [0, 255, 0, 255]);

    let err = seq.frame(2).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn multi_frame_gif_round_trip() {
    let path = TempPath::new("anim.gif");
    let mut anim = Image::empty();
    anim.append(&solid_rgb(5, 5, [255, 0, 0])).unwrap();
    anim.append(&solid_rgb(5, 5, [0, 0, 255])).unwrap();
    anim.write_to(path.as_str()).unwrap();

    let back = Image::read(path.as_str()).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back.dimensions().unwrap(), (5, 5));
}

#[test]
fn copies_are_independent() {
    let original = solid_rgb(4, 4, [0, 0, 0]);
    let mut copy = original.copy().unwrap();
    let overlay = solid_rgb(4, 4, [255, 255, 255]);
    copy.composite(&overlay, 0, 0, "over").unwrap();

    let rgba = original.to_rgba8().unwrap();
    assert_eq!(pixel(&rgba, 4, 0, 0), [0, 0, 0, 255]);
}

#[test]
fn border_grows_canvas_with_color() {
    let img = solid_rgb(10, 10, [0, 0, 255]);
    let out = magick::border(&img, 3, 2, Some("red")).unwrap();
    assert_eq!(out.dimensions().unwrap(), (16, 14));
    let rgba = out.to_rgba8().unwrap();
    assert_eq!(pixel(&rgba, 16, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&rgba, 16, 8, 7), [0, 0, 255, 255]);
}

#[test]
fn colorize_validates_fraction() {
    let img = solid_rgb(4, 4, [128, 128, 128]);
    assert!(magick::colorize(&img, "red", 1.5).is_err());
    let out = magick::colorize(&img, "red", 1.0).unwrap();
    let rgba = out.to_rgba8().unwrap();
    let [r, g, b, _] = pixel(&rgba, 4, 2, 2);
    assert!(r > 200 && g < 60 && b < 60, "got {:?}", (r, g, b));
}

#[test]
fn contrast_sharpens_or_flattens() {
    let pixels = [100u8, 100, 100, 180, 180, 180];
    let make = || Image::from_rgb(2, 1, &pixels).unwrap();
    let spread = |img: &Image| {
        let rgba = img.to_rgba8().unwrap();
        i32::from(pixel(&rgba, 2, 1, 0)[0]) - i32::from(pixel(&rgba, 2, 0, 0)[0])
    };

    let mut img = make();
    assert_eq!(img.contrast(-1).unwrap_err().kind, ErrorKind::Validation);

    // nonzero pushes the two grays apart
    let mut img = make();
    img.contrast(1).unwrap();
    assert!(spread(&img) > 80, "sharpened spread {}", spread(&img));

    // zero pulls them together
    let mut img = make();
    img.contrast(0).unwrap();
    assert!(spread(&img) < 80, "flattened spread {}", spread(&img));
}

#[test]
fn blur_and_charcoal_validate_kernel() {
    let img = solid_rgb(8, 8, [100, 100, 100]);
    assert_eq!(magick::blur(&img, 0.0, 0.0).unwrap_err().kind, ErrorKind::Validation);
    assert_eq!(magick::blur(&img, -1.0, 1.0).unwrap_err().kind, ErrorKind::Validation);
    assert_eq!(
        magick::charcoal(&img, 1.0, -2.0).unwrap_err().kind,
        ErrorKind::Validation
    );
    assert_eq!(magick::blur(&img, 0.0, 1.0).unwrap().dimensions().unwrap(), (8, 8));
    assert_eq!(
        magick::charcoal(&img, 0.0, 1.0).unwrap().dimensions().unwrap(),
        (8, 8)
    );
}

#[test]
fn rotate_grows_canvas() {
    let img = solid_rgb(20, 10, [0, 0, 0]);
    assert_eq!(
        magick::rotate(&img, 90.0).unwrap().dimensions().unwrap(),
        (10, 20)
    );
    let (w, h) = magick::rotate(&img, 45.0).unwrap().dimensions().unwrap();
    assert!(w > 20 && h > 10, "diagonal canvas {}x{}", w, h);
    assert_eq!(
        magick::rotate(&img, f64::NAN).unwrap_err().kind,
        ErrorKind::Validation
    );
}

#[test]
fn flip_and_flop_mirror_pixels() {
    #[rustfmt::skip]
    let pixels = [
        255, 0, 0,    0, 255, 0,
        0, 0, 255,    255, 255, 255,
    ];
    let img = Image::from_rgb(2, 2, &pixels).unwrap();

    let rgba = magick::flip(&img).unwrap().to_rgba8().unwrap();
    assert_eq!(pixel(&rgba, 2, 0, 0), [0, 0, 255, 255]);
    assert_eq!(pixel(&rgba, 2, 1, 1), [0, 255, 0, 255]);

    let rgba = magick::flop(&img).unwrap().to_rgba8().unwrap();
    assert_eq!(pixel(&rgba, 2, 0, 0), [0, 255, 0, 255]);
    assert_eq!(pixel(&rgba, 2, 0, 1), [255, 255, 255, 255]);
}

#[test]
fn set_opacity_broadcasts_alpha() {
    let mut img = solid_rgb(4, 4, [10, 20, 30]);
    assert_eq!(
        img.set_opacity(MAX_RGB + 1).unwrap_err().kind,
        ErrorKind::Validation
    );
    assert_eq!(pixel(&img.to_rgba8().unwrap(), 4, 0, 0)[3], 255);

    img.set_opacity(MAX_RGB).unwrap();
    assert_eq!(pixel(&img.to_rgba8().unwrap(), 4, 0, 0)[3], 0);

    img.set_opacity(0).unwrap();
    assert_eq!(pixel(&img.to_rgba8().unwrap(), 4, 0, 0)[3], 255);
}

#[test]
fn read_options_set_canvas_size() {
    let img = Image::read_with("xc:white", &ReadOptions::new().size("12x7")).unwrap();
    assert_eq!(img.dimensions().unwrap(), (12, 7));
}

#[test]
fn empty_handle_operations_fail_cleanly() {
    let empty = Image::empty();
    assert!(empty.is_empty());
    assert_eq!(empty.len(), 0);
    assert_eq!(empty.dimensions().unwrap_err().kind, ErrorKind::Validation);
    assert_eq!(empty.write().unwrap_err().kind, ErrorKind::Validation);
}
