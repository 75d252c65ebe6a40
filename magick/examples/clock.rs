//! Build an animated clock face and write it as a GIF.
//!
//! ```bash
//! cargo run --example clock
//! ```
//!
//! Each frame draws the dial once and then a hand at a new angle, reusing
//! one drawing context across all frames.

use anyhow::{Context, Result};
use magick::{DrawContext, Image};

const SIZE: u64 = 60;
const FRAMES: u32 = 36;

fn frame(dc: &mut DrawContext, step: u32) -> Result<Image> {
    let white = vec![0xffu8; (SIZE * SIZE * 3) as usize];
    let mut img = Image::from_rgb(SIZE, SIZE, &white)?;

    let center = SIZE as f64 / 2.0;
    dc.set_fill("white")?;
    dc.set_stroke("red")?;
    dc.set_stroke_width(2.0)?;
    dc.circle(center, center, center - 4.0);
    img.draw(dc)?;

    let angle = f64::from(step) / f64::from(FRAMES) * std::f64::consts::TAU;
    let hand = center - 8.0;
    dc.set_stroke("blue")?;
    dc.line(
        center,
        center,
        center + hand * angle.sin(),
        center - hand * angle.cos(),
    );
    img.draw(dc)?;
    Ok(img)
}

fn main() -> Result<()> {
    let mut dc = DrawContext::new();
    let mut animation = Image::empty();
    for step in 0..FRAMES {
        let f = frame(&mut dc, step).with_context(|| format!("frame {}", step))?;
        animation.append(&f)?;
    }
    animation
        .write_to("clock.gif")
        .context("failed to write clock.gif")?;
    println!("wrote clock.gif ({} frames)", animation.len());
    Ok(())
}
