//! Color filters
//!
//! A clip's numeric color settings plus its named preset form an ordered
//! filter stack. The stack runs per pixel on straight (non-premultiplied)
//! RGBA and renders to a CSS-like string for diagnostics.

use std::fmt;

use image::RgbaImage;

use crate::timeline::{Clip, FilterPreset};

/// One filter primitive. Amounts are fractions (`1.0` == 100%), hue is in
/// degrees and blur radius in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    HueRotate(f32),
    Blur(f32),
    Sepia(f32),
    Grayscale(f32),
    Invert(f32),
}

impl FilterOp {
    pub fn is_identity(&self) -> bool {
        match *self {
            FilterOp::Brightness(v) | FilterOp::Contrast(v) | FilterOp::Saturate(v) => v == 1.0,
            FilterOp::HueRotate(deg) => deg.rem_euclid(360.0) == 0.0,
            FilterOp::Blur(px) => px <= 0.0,
            FilterOp::Sepia(v) | FilterOp::Grayscale(v) | FilterOp::Invert(v) => v <= 0.0,
        }
    }

    /// Apply a color primitive to one RGB triple in [0, 1]. Blur is spatial
    /// and passes through unchanged.
    fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match *self {
            FilterOp::Brightness(b) => rgb.map(|c| c * b),
            FilterOp::Contrast(k) => rgb.map(|c| (c - 0.5) * k + 0.5),
            FilterOp::Saturate(s) => mul(&saturate_matrix(s), rgb),
            FilterOp::HueRotate(deg) => mul(&hue_rotate_matrix(deg), rgb),
            FilterOp::Sepia(a) => mul(&sepia_matrix(a.clamp(0.0, 1.0)), rgb),
            FilterOp::Grayscale(a) => mul(&grayscale_matrix(a.clamp(0.0, 1.0)), rgb),
            FilterOp::Invert(a) => {
                let a = a.clamp(0.0, 1.0);
                rgb.map(|c| c * (1.0 - a) + (1.0 - c) * a)
            }
            FilterOp::Blur(_) => rgb,
        };
        out.map(|c| c.clamp(0.0, 1.0))
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterOp::Brightness(v) => write!(f, "brightness({}%)", percent(v)),
            FilterOp::Contrast(v) => write!(f, "contrast({}%)", percent(v)),
            FilterOp::Saturate(v) => write!(f, "saturate({}%)", percent(v)),
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", deg),
            FilterOp::Blur(px) => write!(f, "blur({}px)", px),
            FilterOp::Sepia(v) => write!(f, "sepia({}%)", percent(v)),
            FilterOp::Grayscale(v) => write!(f, "grayscale({}%)", percent(v)),
            FilterOp::Invert(v) => write!(f, "invert({}%)", percent(v)),
        }
    }
}

fn percent(v: f32) -> f32 {
    (v * 1000.0).round() / 10.0
}

/// Fixed filter expression of a named preset.
pub fn preset_ops(preset: FilterPreset) -> &'static [FilterOp] {
    use FilterOp::*;
    match preset {
        FilterPreset::None => &[],
        FilterPreset::Vintage => &[Sepia(0.5), Contrast(1.2), Brightness(0.9)],
        FilterPreset::Noir => &[Grayscale(1.0), Contrast(1.3), Brightness(0.9)],
        FilterPreset::Warm => &[Sepia(0.3), Saturate(1.4), HueRotate(-10.0)],
        FilterPreset::Cool => &[Saturate(1.1), HueRotate(15.0), Brightness(1.05)],
        FilterPreset::Vivid => &[Saturate(1.8), Contrast(1.1)],
        FilterPreset::Faded => &[Contrast(0.8), Brightness(1.1), Saturate(0.7)],
        FilterPreset::Cinematic => &[Contrast(1.15), Saturate(0.85), Sepia(0.15)],
    }
}

/// Ordered filters for one clip: numeric settings first, then the preset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterStack {
    ops: Vec<FilterOp>,
}

impl FilterStack {
    pub fn new(ops: Vec<FilterOp>) -> Self {
        Self { ops }
    }

    pub fn for_clip(clip: &Clip) -> Self {
        let mut ops = vec![
            FilterOp::Brightness(clip.brightness / 100.0),
            FilterOp::Contrast(clip.contrast / 100.0),
            FilterOp::Saturate(clip.saturation / 100.0),
            FilterOp::HueRotate(clip.hue_rotate),
            FilterOp::Blur(clip.blur),
        ];
        ops.extend_from_slice(preset_ops(clip.filter_preset));
        Self { ops }
    }

    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(FilterOp::is_identity)
    }

    /// CSS filter expression, e.g. `brightness(100%) contrast(120%) sepia(50%)`.
    pub fn css(&self) -> String {
        self.ops
            .iter()
            .map(FilterOp::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the stack over `image` in place. Alpha is left untouched.
    pub fn apply(&self, image: &mut RgbaImage) {
        for op in self.ops.iter().filter(|op| !op.is_identity()) {
            match *op {
                FilterOp::Blur(px) => box_blur(image, px.ceil() as u32),
                op => {
                    for pixel in image.pixels_mut() {
                        let [r, g, b, a] = pixel.0;
                        let rgb = op.apply_rgb([to_unit(r), to_unit(g), to_unit(b)]);
                        pixel.0 = [to_byte(rgb[0]), to_byte(rgb[1]), to_byte(rgb[2]), a];
                    }
                }
            }
        }
    }
}

impl fmt::Display for FilterStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

#[inline]
fn to_unit(v: u8) -> f32 {
    f32::from(v) / 255.0
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

type Matrix = [[f32; 3]; 3];

fn mul(m: &Matrix, rgb: [f32; 3]) -> [f32; 3] {
    [0usize, 1, 2].map(|row| m[row][0] * rgb[0] + m[row][1] * rgb[1] + m[row][2] * rgb[2])
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(deg: f32) -> Matrix {
    let (sin, cos) = deg.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn sepia_matrix(a: f32) -> Matrix {
    let k = 1.0 - a;
    [
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ]
}

fn grayscale_matrix(a: f32) -> Matrix {
    let k = 1.0 - a;
    [
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ]
}

/// Separable box blur with edge clamping.
fn box_blur(image: &mut RgbaImage, radius: u32) {
    if radius == 0 || image.width() == 0 || image.height() == 0 {
        return;
    }
    let (w, h) = image.dimensions();
    let r = radius as i64;
    let window = (2 * r + 1) as u32;

    let horizontal = RgbaImage::from_fn(w, h, |x, y| {
        let mut acc = [0u32; 4];
        for dx in -r..=r {
            let sx = (i64::from(x) + dx).clamp(0, i64::from(w) - 1) as u32;
            for (a, c) in acc.iter_mut().zip(image.get_pixel(sx, y).0) {
                *a += u32::from(c);
            }
        }
        image::Rgba(acc.map(|a| ((a + window / 2) / window) as u8))
    });

    *image = RgbaImage::from_fn(w, h, |x, y| {
        let mut acc = [0u32; 4];
        for dy in -r..=r {
            let sy = (i64::from(y) + dy).clamp(0, i64::from(h) - 1) as u32;
            for (a, c) in acc.iter_mut().zip(horizontal.get_pixel(x, sy).0) {
                *a += u32::from(c);
            }
        }
        image::Rgba(acc.map(|a| ((a + window / 2) / window) as u8))
    });
}
