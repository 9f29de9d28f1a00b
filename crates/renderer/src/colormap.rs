//! Colormaps: normalized scalar in [0, 1] to RGB.
//!
//! Every colormap is a pure function of the input value. Inputs outside
//! [0, 1] are clamped first, and NaN is treated as 0.

use viz_common::Colormap;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// RGBA bytes with the given alpha.
    pub fn with_alpha(self, a: u8) -> [u8; 4] {
        [self.r, self.g, self.b, a]
    }
}

/// Map a normalized value through a colormap.
pub fn map(value: f32, colormap: Colormap) -> Rgb {
    let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };

    match colormap {
        Colormap::Viridis => Rgb::new(
            channel(v * 255.0 * 0.3),
            channel(v * 255.0 * 0.7),
            channel(255.0 - v * 255.0 * 0.3),
        ),
        Colormap::Coolwarm => Rgb::new(
            channel(v * 255.0),
            channel(128.0 * (1.0 - (v - 0.5).abs() * 2.0)),
            channel(255.0 * (1.0 - v)),
        ),
        Colormap::Temperature => Rgb::new(
            channel(v * 255.0),
            channel(v * 128.0),
            channel(128.0 * (1.0 - v)),
        ),
        Colormap::Plasma => piecewise(v, &PLASMA_STOPS),
        Colormap::Rainbow => rainbow(v),
        Colormap::Precipitation => piecewise(v, &PRECIPITATION_STOPS),
        Colormap::Grayscale => {
            let c = channel(v * 255.0);
            Rgb::new(c, c, c)
        }
    }
}

/// Map a value through a colormap given by name.
///
/// Unknown names fall back to grayscale.
pub fn map_named(value: f32, name: &str) -> Rgb {
    map(value, Colormap::lookup(name))
}

/// Truncate toward zero and clamp to a channel value.
#[inline(always)]
fn channel(x: f32) -> u8 {
    x.clamp(0.0, 255.0) as u8
}

/// Purple to pink to yellow.
const PLASMA_STOPS: [(f32, Rgb); 5] = [
    (0.0, Rgb::new(13, 8, 135)),
    (0.25, Rgb::new(126, 3, 168)),
    (0.5, Rgb::new(204, 71, 120)),
    (0.75, Rgb::new(248, 149, 64)),
    (1.0, Rgb::new(240, 249, 33)),
];

/// White through light blue to deep blue.
const PRECIPITATION_STOPS: [(f32, Rgb); 4] = [
    (0.0, Rgb::new(255, 255, 255)),
    (0.3, Rgb::new(198, 219, 239)),
    (0.65, Rgb::new(66, 146, 198)),
    (1.0, Rgb::new(8, 48, 107)),
];

/// Linear interpolation between sorted color stops.
fn piecewise(v: f32, stops: &[(f32, Rgb)]) -> Rgb {
    for pair in stops.windows(2) {
        let (lo, c1) = pair[0];
        let (hi, c2) = pair[1];
        if v <= hi {
            let t = if hi > lo { (v - lo) / (hi - lo) } else { 0.0 };
            return interpolate_color(c1, c2, t);
        }
    }
    stops.last().map(|(_, c)| *c).unwrap_or(Rgb::new(0, 0, 0))
}

/// Linear color interpolation
pub fn interpolate_color(color1: Rgb, color2: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Rgb::new(
        channel(color1.r as f32 * t_inv + color2.r as f32 * t),
        channel(color1.g as f32 * t_inv + color2.g as f32 * t),
        channel(color1.b as f32 * t_inv + color2.b as f32 * t),
    )
}

/// HSV sweep from blue (hue 240°) at 0 to red (hue 0°) at 1.
fn rainbow(v: f32) -> Rgb {
    let h = (1.0 - v) * 240.0;
    let x = 1.0 - ((h / 60.0) % 2.0 - 1.0).abs();

    let (r, g, b) = if h < 60.0 {
        (1.0, x, 0.0)
    } else if h < 120.0 {
        (x, 1.0, 0.0)
    } else if h < 180.0 {
        (0.0, 1.0, x)
    } else {
        (0.0, x, 1.0)
    };

    Rgb::new(channel(r * 255.0), channel(g * 255.0), channel(b * 255.0))
}
