//! Signature capture
//!
//! Strokes are kept as point lists and rasterized on demand. The serialized
//! value (a PNG data URI) is produced when a stroke ends, never mid-stroke.

use crate::config::SignatureConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// Data URI prefix of every non-empty value
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to encode signature: {0}")]
    Encode(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

type ChangeListener = Box<dyn Fn(&str) + Send + Sync>;

/// Freehand signature surface
pub struct SignaturePad {
    config: SignatureConfig,
    strokes: Vec<Vec<Point>>,
    current: Option<Vec<Point>>,
    value: String,
    on_change: Option<ChangeListener>,
}

impl SignaturePad {
    pub fn new(config: SignatureConfig) -> Result<Self, SignatureError> {
        if config.width == 0 || config.height == 0 {
            return Err(SignatureError::InvalidSize {
                width: config.width,
                height: config.height,
            });
        }
        Ok(Self {
            config,
            strokes: Vec::new(),
            current: None,
            value: String::new(),
            on_change: None,
        })
    }

    /// Called with the new value on every stroke end, clear and undo
    pub fn on_change(mut self, listener: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(listener));
        self
    }

    pub fn config(&self) -> &SignatureConfig { &self.config }
    pub fn value(&self) -> &str { &self.value }
    pub fn stroke_count(&self) -> usize { self.strokes.len() }
    pub fn is_drawing(&self) -> bool { self.current.is_some() }

    /// At least one completed stroke
    pub fn has_content(&self) -> bool {
        !self.strokes.is_empty()
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let point = self.clamp(x, y);
        self.current = Some(vec![point]);
    }

    /// Ignored unless a stroke is in progress
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let point = self.clamp(x, y);
        if let Some(stroke) = self.current.as_mut() {
            stroke.push(point);
        }
    }

    /// Finish the stroke and emit the new value. `None` when no stroke was open.
    pub fn pointer_up(&mut self) -> Result<Option<String>, SignatureError> {
        let Some(stroke) = self.current.take() else {
            return Ok(None);
        };
        self.strokes.push(stroke);
        self.emit().map(Some)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Blank the surface and emit ""
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
        self.value.clear();
        debug!("Signature cleared");
        self.notify();
    }

    /// Drop the last completed stroke and emit the resulting value
    pub fn undo(&mut self) -> Result<String, SignatureError> {
        if self.strokes.pop().is_none() {
            return Ok(self.value.clone());
        }
        if self.strokes.is_empty() {
            self.value.clear();
            self.notify();
            return Ok(String::new());
        }
        self.emit()
    }

    fn emit(&mut self) -> Result<String, SignatureError> {
        self.value = self.to_data_uri()?;
        self.notify();
        Ok(self.value.clone())
    }

    fn notify(&self) {
        if let Some(listener) = &self.on_change {
            listener(&self.value);
        }
    }

    fn clamp(&self, x: f32, y: f32) -> Point {
        let max_x = (self.config.width - 1) as f32;
        let max_y = (self.config.height - 1) as f32;
        Point {
            x: if x.is_finite() { x.clamp(0.0, max_x) } else { 0.0 },
            y: if y.is_finite() { y.clamp(0.0, max_y) } else { 0.0 },
        }
    }

    // =========================================================================
    // Raster
    // =========================================================================

    /// Completed strokes on a transparent background
    pub fn rasterize(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.config.width, self.config.height);
        let color = Rgba(self.config.pen_color);
        let radius = (self.config.pen_width.max(1) as f32) / 2.0;

        for stroke in &self.strokes {
            match stroke.as_slice() {
                [] => {}
                [only] => stamp(&mut image, *only, radius, color),
                points => {
                    for pair in points.windows(2) {
                        line(&mut image, pair[0], pair[1], radius, color);
                    }
                }
            }
        }
        image
    }

    /// PNG data URI of the current strokes, "" when blank
    pub fn to_data_uri(&self) -> Result<String, SignatureError> {
        if !self.has_content() {
            return Ok(String::new());
        }
        let mut png = Cursor::new(Vec::new());
        self.rasterize()
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| SignatureError::Encode(e.to_string()))?;
        Ok(format!("{}{}", PNG_DATA_URI_PREFIX, STANDARD.encode(png.into_inner())))
    }
}

fn line(image: &mut RgbaImage, from: Point, to: Point, radius: f32, color: Rgba<u8>) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = (dx.abs().max(dy.abs()) * 2.0).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let point = Point {
            x: from.x + dx * t,
            y: from.y + dy * t,
        };
        stamp(image, point, radius, color);
    }
}

/// Filled disc centred on `center`
fn stamp(image: &mut RgbaImage, center: Point, radius: f32, color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    let reach = radius.ceil() as i64;
    let cx = center.x.round() as i64;
    let cy = center.y.round() as i64;
    for y in (cy - reach)..=(cy + reach) {
        for x in (cx - reach)..=(cx + reach) {
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                continue;
            }
            let (ox, oy) = (x as f32 - center.x, y as f32 - center.y);
            if ox * ox + oy * oy <= radius * radius + 0.25 {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
