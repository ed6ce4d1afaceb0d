//! Travel time to marker color
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Channel-wise linear blend, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;

        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fill {
    Flat(Rgb),
    /// From the color at the band's lower bound to the color at its upper bound
    Ramp(Rgb, Rgb),
}

impl Fill {
    /// Color shown for the band in the legend
    pub fn swatch(&self) -> Rgb {
        match *self {
            Fill::Flat(color) | Fill::Ramp(color, _) => color,
        }
    }
}

/// A band covers minutes from the previous band's `upper` (inclusive) up to its own `upper` (exclusive)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorStop {
    pub upper: f64,
    pub fill: Fill,
}

const BLUE: Rgb = Rgb(0x21, 0x96, 0xf3);
const GREEN: Rgb = Rgb(0x1e, 0xc4, 0x00);
const YELLOW: Rgb = Rgb(0xff, 0xe6, 0x00);
const ORANGE: Rgb = Rgb(0xff, 0x99, 0x00);
const RED: Rgb = Rgb(0xff, 0x33, 0x00);
const DARK_RED: Rgb = Rgb(0xb3, 0x00, 0x00);

pub const COLOR_STOPS: [ColorStop; 6] = [
    ColorStop {
        upper: 5.0,
        fill: Fill::Flat(BLUE),
    },
    ColorStop {
        upper: 10.0,
        fill: Fill::Flat(GREEN),
    },
    ColorStop {
        upper: 20.0,
        fill: Fill::Ramp(GREEN, YELLOW),
    },
    ColorStop {
        upper: 40.0,
        fill: Fill::Ramp(YELLOW, ORANGE),
    },
    ColorStop {
        upper: 60.0,
        fill: Fill::Ramp(ORANGE, RED),
    },
    ColorStop {
        upper: 100.0,
        fill: Fill::Ramp(RED, DARK_RED),
    },
];

/// Everything at or above the last stop
pub const OVERFLOW_COLOR: Rgb = Rgb(0x00, 0x00, 0x00);

pub fn color_for_minutes(minutes: f64) -> Rgb {
    let mut lower = f64::NEG_INFINITY;

    for stop in &COLOR_STOPS {
        if minutes < stop.upper {
            return match stop.fill {
                Fill::Flat(color) => color,
                Fill::Ramp(from, to) => from.lerp(to, (minutes - lower) / (stop.upper - lower)),
            };
        }
        lower = stop.upper;
    }

    OVERFLOW_COLOR
}

/// `#rrggbb` for a travel time in minutes
pub fn hex_color_for_minutes(minutes: f64) -> String {
    color_for_minutes(minutes).to_string()
}
