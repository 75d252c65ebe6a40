//! Render a handful of vector primitives onto generated canvases.
//!
//! ```bash
//! cargo run --example draw_demo
//! ```
//!
//! Writes `shapes.png`, `bar.png`, `svgpath.png` and `poly.png` into the
//! current directory.

use anyhow::{Context, Result};
use magick::{DrawContext, Image, ReadOptions};

fn canvas(width: u32, height: u32) -> Result<Image> {
    Image::read_with(
        "xc:white",
        &ReadOptions::new().size(&format!("{}x{}", width, height)),
    )
    .context("failed to create canvas")
}

fn shapes() -> Result<()> {
    let mut img = canvas(300, 200)?;
    let mut dc = DrawContext::new();
    dc.set_stroke("black")?;
    dc.set_stroke_width(2.0)?;

    dc.set_fill("red")?;
    dc.rect(20.0, 20.0, 100.0, 80.0);

    dc.set_fill("green")?;
    dc.circle(180.0, 50.0, 30.0);

    dc.set_fill("blue")?;
    dc.ellipse(120.0, 140.0, 60.0, 30.0, 0.0, 360.0);

    dc.set_fill("none")?;
    dc.line(220.0, 110.0, 280.0, 180.0);

    img.draw(&mut dc)?;
    img.write_to("shapes.png").context("failed to write shapes.png")
}

fn bar_chart() -> Result<()> {
    let mut img = canvas(320, 200)?;
    let mut dc = DrawContext::new();
    dc.set_stroke("none")?;
    let heights = [40.0, 120.0, 80.0, 160.0, 60.0];
    let colors = ["#4285f4", "#ea4335", "#fbbc05", "#34a853", "#9e9e9e"];
    for (i, (&h, color)) in heights.iter().zip(colors).enumerate() {
        dc.set_fill(color)?;
        let x = 20.0 + i as f64 * 60.0;
        dc.rect(x, 190.0 - h, x + 40.0, 190.0);
    }
    img.draw(&mut dc)?;
    img.write_to("bar.png").context("failed to write bar.png")
}

fn svg_path() -> Result<()> {
    let mut img = canvas(200, 200)?;
    let mut dc = DrawContext::new();
    dc.set_stroke("purple")?;
    dc.set_stroke_width(3.0)?;
    dc.set_fill("lavender")?;
    dc.path("M 100,20 L 180,180 20,180 Z")?;
    img.draw(&mut dc)?;
    img.write_to("svgpath.png").context("failed to write svgpath.png")
}

fn poly() -> Result<()> {
    let mut img = canvas(200, 200)?;
    let mut dc = DrawContext::new();
    dc.set_stroke("darkblue")?;
    dc.set_fill("skyblue")?;
    dc.polygon([
        (100.0, 10.0),
        (40.0, 190.0),
        (190.0, 78.0),
        (10.0, 78.0),
        (160.0, 190.0),
    ])?;
    dc.set_fill("none")?;
    dc.bezier([(10.0, 100.0), (50.0, 10.0), (150.0, 190.0), (190.0, 100.0)])?;
    img.draw(&mut dc)?;
    img.write_to("poly.png").context("failed to write poly.png")
}

fn main() -> Result<()> {
    shapes()?;
    bar_chart()?;
    svg_path()?;
    poly()?;
    println!("wrote shapes.png, bar.png, svgpath.png, poly.png");
    Ok(())
}
