//! Hatch lines for bar fills.
//!
//! plotters has no fill patterns, so hatches are drawn as line segments clipped
//! to the bar. Geometry is computed in pixel-proportional space so diagonals
//! stay at 45 degrees whatever the axis scales are.

use crate::strategy::HatchPattern;

pub type Segment = [(f64, f64); 2];

/// Segments covering the rectangle between corners `from` and `to` (data units).
///
/// `scale` is pixels per data unit along each axis and `spacing` the distance
/// between neighbouring lines in pixels.
pub fn segments(
    pattern: HatchPattern,
    from: (f64, f64),
    to: (f64, f64),
    scale: (f64, f64),
    spacing: f64,
) -> Vec<Segment> {
    let (x0, x1) = (from.0.min(to.0), from.0.max(to.0));
    let (y0, y1) = (from.1.min(to.1), from.1.max(to.1));
    let (sx, sy) = scale;
    if sx <= 0.0 || sy <= 0.0 || spacing <= 0.0 {
        return Vec::new();
    }

    // Rectangle size in pixels
    let w = (x1 - x0) * sx;
    let h = (y1 - y0) * sy;
    if w <= 0.0 || h <= 0.0 {
        return Vec::new();
    }

    let mut px = Vec::new();
    match pattern {
        HatchPattern::None => {}
        HatchPattern::Vertical => px.extend(vertical(w, h, spacing)),
        HatchPattern::Horizontal => px.extend(horizontal(w, h, spacing)),
        HatchPattern::Grid => {
            px.extend(vertical(w, h, spacing));
            px.extend(horizontal(w, h, spacing));
        }
        HatchPattern::Diagonal => px.extend(diagonal(w, h, spacing)),
        HatchPattern::DiagonalCross => {
            px.extend(diagonal(w, h, spacing));
            px.extend(diagonal(w, h, spacing).into_iter().map(|s| mirror(s, w)));
        }
    }

    px.into_iter()
        .map(|s| s.map(|(u, v)| (x0 + u / sx, y0 + v / sy)))
        .collect()
}

fn offsets(extent: f64, spacing: f64) -> impl Iterator<Item = f64> {
    (1..)
        .map(move |i| i as f64 * spacing)
        .take_while(move |&o| o < extent)
}

fn vertical(w: f64, h: f64, spacing: f64) -> Vec<Segment> {
    offsets(w, spacing).map(|u| [(u, 0.0), (u, h)]).collect()
}

fn horizontal(w: f64, h: f64, spacing: f64) -> Vec<Segment> {
    offsets(h, spacing).map(|v| [(0.0, v), (w, v)]).collect()
}

/// Lines `v = u + c` clipped to `[0, w] x [0, h]`
fn diagonal(w: f64, h: f64, spacing: f64) -> Vec<Segment> {
    let step = spacing * std::f64::consts::SQRT_2;
    offsets(w + h, step)
        .map(|o| o - w)
        .filter_map(|c| {
            let u_start = (-c).max(0.0);
            let u_end = (h - c).min(w);
            (u_start < u_end).then(|| [(u_start, u_start + c), (u_end, u_end + c)])
        })
        .collect()
}

fn mirror(segment: Segment, w: f64) -> Segment {
    segment.map(|(u, v)| (w - u, v))
}
