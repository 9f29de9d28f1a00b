//! Contour line (isoline) extraction using the marching squares algorithm.
//!
//! Contours are traced on the normalized canvas raster, so segment
//! coordinates are already in pixel space.

/// A point in 2D space (pixel coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// All segments traced for one iso-level.
#[derive(Debug, Clone)]
pub struct ContourBand {
    /// Index of the level, 0-based from the lowest
    pub index: usize,
    /// Normalized iso-value in (0, 1)
    pub level: f32,
    pub segments: Vec<Segment>,
}

/// `count` evenly spaced normalized iso-levels strictly inside (0, 1).
///
/// Level `k` sits at `(k + 1) / (count + 1)`, so the band count always
/// equals `count` and no level coincides with the range endpoints.
pub fn contour_levels(count: u32) -> Vec<f32> {
    let n = count as f32 + 1.0;
    (1..=count).map(|k| k as f32 / n).collect()
}

/// Trace one band per level.
pub fn trace_bands(data: &[f32], width: usize, height: usize, levels: &[f32]) -> Vec<ContourBand> {
    levels
        .iter()
        .enumerate()
        .map(|(index, &level)| ContourBand {
            index,
            level,
            segments: march_squares(data, width, height, level),
        })
        .collect()
}

/// Marching squares algorithm to generate contour lines
///
/// # Arguments
/// * `data` - Grid data in row-major order
/// * `width` - Grid width
/// * `height` - Grid height
/// * `level` - Contour level to extract
///
/// # Returns
/// Vector of line segments representing the contour
pub fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            // Missing samples break the contour
            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0u8;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            if cell_index == 0 || cell_index == 15 {
                continue;
            }

            let corners = Corners { tl, tr, br, bl };
            cell_segments(cell_index, x as f32, y as f32, &corners, level, &mut segments);
        }
    }

    segments
}

struct Corners {
    tl: f32,
    tr: f32,
    br: f32,
    bl: f32,
}

/// Push the segments for one marching squares cell.
fn cell_segments(
    cell_index: u8,
    x: f32,
    y: f32,
    c: &Corners,
    level: f32,
    out: &mut Vec<Segment>,
) {
    let top = interpolate_edge(x, y, x + 1.0, y, c.tl, c.tr, level);
    let right = interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, c.tr, c.br, level);
    let bottom = interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, c.bl, c.br, level);
    let left = interpolate_edge(x, y, x, y + 1.0, c.tl, c.bl, level);

    let mut push = |start: Point, end: Point| out.push(Segment { start, end });

    match cell_index {
        1 | 14 => push(left, top),
        2 | 13 => push(top, right),
        3 | 12 => push(left, right),
        4 | 11 => push(right, bottom),
        5 => {
            // Saddle, resolved by the cell-center average
            let center = (c.tl + c.tr + c.br + c.bl) / 4.0;
            if center >= level {
                push(left, bottom);
                push(top, right);
            } else {
                push(left, top);
                push(right, bottom);
            }
        }
        6 | 9 => push(top, bottom),
        7 | 8 => push(left, bottom),
        10 => {
            let center = (c.tl + c.tr + c.br + c.bl) / 4.0;
            if center >= level {
                push(left, top);
                push(right, bottom);
            } else {
                push(top, right);
                push(left, bottom);
            }
        }
        _ => {}
    }
}

/// Linearly interpolate between two edge points based on data values
fn interpolate_edge(x1: f32, y1: f32, x2: f32, y2: f32, val1: f32, val2: f32, level: f32) -> Point {
    if (val2 - val1).abs() < 1e-6 {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);

    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}
