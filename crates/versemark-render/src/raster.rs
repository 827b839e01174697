//! Stroke rasterization.
//!
//! A stroke is flattened to line segments and covered with round caps and
//! joins: a pixel's coverage comes from its distance to the nearest segment.
//! Coverage is taken as a maximum over segments, so a translucent stroke
//! never darkens where it overlaps itself.

use kurbo::{BezPath, Line, ParamCurveNearest, PathEl, Point, Rect};
use peniko::Compose;
use versemark_core::color::color_or_black;
use versemark_core::stroke::{InputKind, Stroke, stroke_path};
use versemark_core::tools::DrawingSettings;

use crate::surface::Surface;

/// Flattening tolerance in device pixels.
pub const FLATTEN_TOLERANCE: f64 = 0.25;

/// Draw a committed stroke. `scale` maps CSS-pixel widths to device pixels.
pub fn draw_stroke(surface: &mut Surface, stroke: &Stroke, scale: f64) {
    let path = stroke_path(&stroke.points, stroke.input_kind);
    draw_path(surface, &path, &stroke.settings(), scale);
}

/// Draw a single straight segment, as the eraser does while moving.
pub fn draw_segment(surface: &mut Surface, settings: &DrawingSettings, from: Point, to: Point, scale: f64) {
    let path = stroke_path(&[from, to], InputKind::Mouse);
    draw_path(surface, &path, settings, scale);
}

/// Stroke `path` with the tool's color, width, opacity and compositing.
pub fn draw_path(surface: &mut Surface, path: &BezPath, settings: &DrawingSettings, scale: f64) {
    let half_width = settings.size * scale / 2.0;
    if half_width <= 0.0 || surface.width() == 0 || surface.height() == 0 {
        return;
    }
    let segments = flatten(path);
    let Some(mask) = CoverageMask::build(&segments, half_width, surface) else {
        return;
    };

    let rgba = color_or_black(&settings.color).to_rgba8();
    let alpha = f64::from(rgba.a) / 255.0 * settings.alpha();
    let compose = settings.compose();

    for (x, y, coverage) in mask.iter() {
        let Some(pixel) = surface.pixel_mut(x, y) else {
            continue;
        };
        let strength = (coverage * alpha) as f32;
        match compose {
            Compose::DestOut => {
                let da = f32::from(pixel.0[3]) / 255.0;
                pixel.0[3] = to_byte(da * (1.0 - strength));
            }
            _ => source_over(&mut pixel.0, [rgba.r, rgba.g, rgba.b], strength),
        }
    }
}

fn source_over(dst: &mut [u8; 4], src: [u8; 3], sa: f32) {
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = [0, 0, 0, 0];
        return;
    }
    for i in 0..3 {
        let s = f32::from(src[i]) / 255.0;
        let d = f32::from(dst[i]) / 255.0;
        dst[i] = to_byte((s * sa + d * da * (1.0 - sa)) / out_a);
    }
    dst[3] = to_byte(out_a);
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Flatten a path into line segments. A path without any becomes a dot.
fn flatten(path: &BezPath) -> Vec<Line> {
    let mut segments = Vec::new();
    let mut start = None;
    let mut current = None;
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            start = Some(p);
            current = Some(p);
        }
        PathEl::LineTo(p) => {
            if let Some(prev) = current {
                segments.push(Line::new(prev, p));
            }
            current = Some(p);
        }
        PathEl::ClosePath => {
            if let (Some(prev), Some(first)) = (current, start) {
                segments.push(Line::new(prev, first));
            }
            current = start;
        }
        // flatten only emits lines
        _ => {}
    });
    if segments.is_empty() {
        if let Some(p) = current {
            segments.push(Line::new(p, p));
        }
    }
    segments
}

/// Per-pixel coverage over the stroke's bounding box, clipped to the surface.
struct CoverageMask {
    x0: u32,
    y0: u32,
    width: u32,
    values: Vec<f64>,
}

impl CoverageMask {
    fn build(segments: &[Line], half_width: f64, surface: &Surface) -> Option<Self> {
        let reach = half_width + 1.0;
        let bounds = segments
            .iter()
            .map(|s| Rect::from_points(s.p0, s.p1))
            .reduce(|a, b| a.union(b))?
            .inflate(reach, reach);
        let clip = Rect::new(0.0, 0.0, f64::from(surface.width()), f64::from(surface.height()));
        let area = bounds.intersect(clip);
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return None;
        }

        let x0 = area.x0.floor() as u32;
        let y0 = area.y0.floor() as u32;
        let x1 = (area.x1.ceil() as u32).min(surface.width());
        let y1 = (area.y1.ceil() as u32).min(surface.height());
        let width = x1.saturating_sub(x0);
        let height = y1.saturating_sub(y0);
        let mut mask = Self {
            x0,
            y0,
            width,
            values: vec![0.0; (width as usize) * (height as usize)],
        };

        for segment in segments {
            let reach_box = Rect::from_points(segment.p0, segment.p1).inflate(reach, reach);
            let sx0 = (reach_box.x0.floor().max(f64::from(x0))) as u32;
            let sy0 = (reach_box.y0.floor().max(f64::from(y0))) as u32;
            let sx1 = (reach_box.x1.ceil().min(f64::from(x1))) as u32;
            let sy1 = (reach_box.y1.ceil().min(f64::from(y1))) as u32;
            for y in sy0..sy1 {
                for x in sx0..sx1 {
                    let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                    let distance = segment.nearest(center, 1e-9).distance_sq.sqrt();
                    let coverage = (half_width + 0.5 - distance).clamp(0.0, 1.0);
                    let slot = &mut mask.values[((y - y0) * width + (x - x0)) as usize];
                    if coverage > *slot {
                        *slot = coverage;
                    }
                }
            }
        }
        Some(mask)
    }

    fn iter(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        let width = self.width.max(1);
        self.values
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0.0)
            .map(move |(i, c)| {
                let i = i as u32;
                (self.x0 + i % width, self.y0 + i / width, *c)
            })
    }
}
