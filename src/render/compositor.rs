//! Frame Compositor
//!
//! Draws the visuals of one [`ResolvedFrame`] into a fixed-size RGBA canvas
//! in ascending track order. Each clip is filtered, then mapped through its
//! transform (centre + offset, rotation, uniform scale) and blended onto the
//! canvas with `opacity/100 * fade`. Nothing persists between calls except
//! whatever the [`FrameSource`] chooses to cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};

use crate::config::EngineConfig;
use crate::engine::{ActiveVisual, ResolvedFrame};
use crate::error::{CutlineError, Result};
use crate::render::filter::FilterStack;
use crate::timeline::{BlendMode, Clip, ClipKind, TextStyle};

/// Supplies the current visual frame of a clip.
pub trait FrameSource {
    /// `Ok(None)` means the clip has nothing to draw at `time`.
    fn frame(&mut self, clip: &Clip, time: f64) -> Result<Option<RgbaImage>>;
}

/// Frame source for stills and text. Image clips are decoded from disk
/// once and cached by path; video clips have no frame.
#[derive(Debug, Default)]
pub struct StillFrameSource {
    base: PathBuf,
    cache: HashMap<PathBuf, RgbaImage>,
}

impl StillFrameSource {
    /// Relative clip sources resolve against `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            cache: HashMap::new(),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn load(&mut self, source: &str) -> Result<RgbaImage> {
        let path = self.base.join(source);
        if let Some(image) = self.cache.get(&path) {
            return Ok(image.clone());
        }
        if !path.exists() {
            return Err(CutlineError::FileNotFound { path });
        }
        let image = image::open(&path)?.to_rgba8();
        log::debug!(
            "Decoded still {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        self.cache.insert(path, image.clone());
        Ok(image)
    }
}

impl FrameSource for StillFrameSource {
    fn frame(&mut self, clip: &Clip, _time: f64) -> Result<Option<RgbaImage>> {
        match clip.kind {
            ClipKind::Image => match clip.source.as_deref() {
                Some(source) => self.load(source).map(Some),
                None => Ok(None),
            },
            ClipKind::Text => Ok(clip.text.as_ref().and_then(text_box)),
            ClipKind::Video | ClipKind::Audio => Ok(None),
        }
    }
}

/// Rasterize a text overlay: the background box with the content drawn over
/// it in the 8x8 bitmap face, scaled to `font_size`. Lines break on `\n`.
/// `None` when there is neither a box nor any glyph to draw.
fn text_box(style: &TextStyle) -> Option<RgbaImage> {
    let fill = parse_hex_color(&style.background_color);
    let ink = parse_hex_color(&style.color).unwrap_or(Rgba([255, 255, 255, 255]));
    let lines: Vec<Vec<Option<[u8; 8]>>> = style
        .content
        .lines()
        .map(|line| line.chars().map(glyph).collect())
        .collect();
    let has_ink = lines
        .iter()
        .flatten()
        .any(|g| matches!(g, Some(rows) if *rows != [0; 8]));
    if fill.is_none() && !has_ink {
        return None;
    }

    let size = style.font_size.max(1.0);
    let scale = size / 8.0;
    let line_height = size * 1.2;
    let padding = size * 0.25;
    let columns = lines.iter().map(Vec::len).max().unwrap_or(0).max(1) as f32;
    let width = (columns * size + 2.0 * padding).round().max(1.0) as u32;
    let height = (lines.len().max(1) as f32 * line_height + 2.0 * padding)
        .round()
        .max(1.0) as u32;

    let mut image = RgbaImage::from_pixel(width, height, fill.unwrap_or(Rgba([0, 0, 0, 0])));
    for (row, line) in lines.iter().enumerate() {
        let top = padding + row as f32 * line_height + (line_height - size) / 2.0;
        for (col, rows) in line.iter().enumerate() {
            let Some(rows) = rows else { continue };
            let left = padding + col as f32 * size;
            for y in top.floor() as u32..(top + size).ceil() as u32 {
                for x in left.floor() as u32..(left + size).ceil() as u32 {
                    if x >= width || y >= height {
                        continue;
                    }
                    let gx = ((x as f32 + 0.5 - left) / scale).floor();
                    let gy = ((y as f32 + 0.5 - top) / scale).floor();
                    if !(0.0..8.0).contains(&gx) || !(0.0..8.0).contains(&gy) {
                        continue;
                    }
                    if rows[gy as usize] & (1 << gx as u32) != 0 {
                        let under = *image.get_pixel(x, y);
                        image.put_pixel(x, y, source_over(ink, under));
                    }
                }
            }
        }
    }
    Some(image)
}

/// Bitmap rows for `c`, least significant bit leftmost.
fn glyph(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(c).or_else(|| LATIN_FONTS.get(c))
}

/// Straight-alpha `top` over `under`.
fn source_over(top: Rgba<u8>, under: Rgba<u8>) -> Rgba<u8> {
    let ta = f32::from(top[3]) / 255.0;
    let ua = f32::from(under[3]) / 255.0;
    let out_a = ta + ua * (1.0 - ta);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut px = [0u8; 4];
    for c in 0..3 {
        let v = (f32::from(top[c]) * ta + f32::from(under[c]) * ua * (1.0 - ta)) / out_a;
        px[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    px[3] = (out_a * 255.0).round() as u8;
    Rgba(px)
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. `transparent` and anything
/// unparseable yield `None`.
pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (out, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *out = v * 17;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 | 8 if hex.is_ascii() => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = if hex.len() == 8 {
                channel(&hex[6..8])?
            } else {
                255
            };
            Some(Rgba([r, g, b, a]))
        }
        _ => None,
    }
}

/// Separable blend function on one channel in [0, 1].
pub fn blend_channel(mode: BlendMode, backdrop: f32, source: f32) -> f32 {
    match mode {
        BlendMode::Normal => source,
        BlendMode::Multiply => backdrop * source,
        BlendMode::Screen => backdrop + source - backdrop * source,
        BlendMode::Overlay => {
            if backdrop <= 0.5 {
                2.0 * backdrop * source
            } else {
                1.0 - 2.0 * (1.0 - backdrop) * (1.0 - source)
            }
        }
        BlendMode::Darken => backdrop.min(source),
        BlendMode::Lighten => backdrop.max(source),
    }
}

/// Size of a `src` frame drawn inside `canvas` with its aspect ratio kept.
fn fit_size(src: (u32, u32), canvas: (u32, u32)) -> (f64, f64) {
    let (sw, sh) = (f64::from(src.0), f64::from(src.1));
    let fit = (f64::from(canvas.0) / sw).min(f64::from(canvas.1) / sh);
    (sw * fit, sh * fit)
}

#[derive(Debug, Clone)]
pub struct Compositor {
    width: u32,
    height: u32,
    background: Rgba<u8>,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Rgba([0, 0, 0, 255]),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.canvas_width, config.canvas_height)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render `frame` into a fresh canvas. Clips whose source fails are
    /// skipped with a warning.
    pub fn render(&self, frame: &ResolvedFrame, source: &mut dyn FrameSource) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, self.background);
        for visual in &frame.visuals {
            match source.frame(&visual.clip, frame.time) {
                Ok(Some(mut image)) => {
                    FilterStack::for_clip(&visual.clip).apply(&mut image);
                    self.draw(&mut canvas, visual, &image);
                }
                Ok(None) => {}
                Err(e) => log::warn!("Skipping clip {} in render: {}", visual.clip.id, e),
            }
        }
        canvas
    }

    /// Render and write a PNG still.
    pub fn render_to_file(
        &self,
        frame: &ResolvedFrame,
        source: &mut dyn FrameSource,
        path: &Path,
    ) -> Result<()> {
        self.render(frame, source).save(path)?;
        log::info!("Rendered frame at {:.3}s to {}", frame.time, path.display());
        Ok(())
    }

    fn draw(&self, canvas: &mut RgbaImage, visual: &ActiveVisual, image: &RgbaImage) {
        let clip = &visual.clip;
        let opacity = (f64::from(clip.opacity) / 100.0 * visual.fade).clamp(0.0, 1.0) as f32;
        let scale = f64::from(clip.scale) / 100.0;
        if opacity <= 0.0 || scale <= 0.0 || image.width() == 0 || image.height() == 0 {
            return;
        }

        // Text boxes keep their natural size; media frames fit the canvas.
        let (draw_w, draw_h) = if clip.kind == ClipKind::Text {
            (f64::from(image.width()), f64::from(image.height()))
        } else {
            fit_size(image.dimensions(), (self.width, self.height))
        };

        let cx = f64::from(self.width) / 2.0 + f64::from(clip.position_x);
        let cy = f64::from(self.height) / 2.0 + f64::from(clip.position_y);
        let (sin, cos) = f64::from(clip.rotation).to_radians().sin_cos();

        // Canvas-space bounding box of the transformed rectangle.
        let (hw, hh) = (draw_w * scale / 2.0, draw_h * scale / 2.0);
        let corners = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
            .map(|(x, y)| (cx + x * cos - y * sin, cy + x * sin + y * cos));
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (max_y.ceil().max(0.0) as u32).min(self.height);

        let sx_ratio = f64::from(image.width()) / draw_w;
        let sy_ratio = f64::from(image.height()) / draw_h;

        for y in y0..y1 {
            for x in x0..x1 {
                // Inverse transform: canvas pixel centre -> source texel.
                let dx = f64::from(x) + 0.5 - cx;
                let dy = f64::from(y) + 0.5 - cy;
                let ux = (dx * cos + dy * sin) / scale;
                let uy = (-dx * sin + dy * cos) / scale;
                let sx = (ux + draw_w / 2.0) * sx_ratio;
                let sy = (uy + draw_h / 2.0) * sy_ratio;
                if sx < 0.0 || sy < 0.0 {
                    continue;
                }
                let (sx, sy) = (sx as u32, sy as u32);
                if sx >= image.width() || sy >= image.height() {
                    continue;
                }

                let src = image.get_pixel(sx, sy);
                let alpha = f32::from(src[3]) / 255.0 * opacity;
                if alpha <= 0.0 {
                    continue;
                }
                let dst = canvas.get_pixel_mut(x, y);
                for c in 0..3 {
                    let cb = f32::from(dst[c]) / 255.0;
                    let cs = f32::from(src[c]) / 255.0;
                    let mixed = blend_channel(clip.blend_mode, cb, cs);
                    let out = cb * (1.0 - alpha) + mixed * alpha;
                    dst[c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
                }
            }
        }
    }
}
