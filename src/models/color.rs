//! HSV color bands used to classify sticker colors

/// One HSV pixel on the 8-bit scale (hue 0-180, saturation and value 0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv {
    /// Hue, half degrees
    pub h: u8,
    /// Saturation
    pub s: u8,
    /// Value
    pub v: u8,
}

impl Hsv {
    /// Create an HSV triple
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Interpret a pixel of an `HsvImage`
    pub fn from_pixel(px: [u8; 3]) -> Self {
        Self::new(px[0], px[1], px[2])
    }
}

/// Named inclusive HSV band and the facelet letter it stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    /// Range name, also used for artifact file names
    pub name: &'static str,
    /// Facelet letter written into the cube string
    pub letter: char,
    /// Inclusive lower bound
    pub lower: Hsv,
    /// Inclusive upper bound
    pub upper: Hsv,
}

impl ColorRange {
    /// Create a named range
    pub const fn new(name: &'static str, letter: char, lower: Hsv, upper: Hsv) -> Self {
        Self {
            name,
            letter,
            lower,
            upper,
        }
    }

    /// True iff every channel lies inside its inclusive bounds
    #[inline]
    pub fn contains(&self, color: Hsv) -> bool {
        color.h >= self.lower.h
            && color.h <= self.upper.h
            && color.s >= self.lower.s
            && color.s <= self.upper.s
            && color.v >= self.lower.v
            && color.v <= self.upper.v
    }
}

/// Sticker color bands in application order
///
/// Red wraps around the hue circle and therefore appears twice. When two
/// ranges claim the same cell the later entry wins.
pub const DEFAULT_COLOR_RANGES: [ColorRange; 7] = [
    ColorRange::new("red-low", 'r', Hsv::new(0, 50, 50), Hsv::new(3, 255, 255)),
    ColorRange::new("orange", 'o', Hsv::new(5, 50, 50), Hsv::new(20, 255, 255)),
    ColorRange::new("yellow", 'y', Hsv::new(20, 50, 50), Hsv::new(35, 255, 255)),
    ColorRange::new("green", 'g', Hsv::new(40, 50, 50), Hsv::new(75, 255, 255)),
    ColorRange::new("blue", 'b', Hsv::new(100, 50, 50), Hsv::new(130, 255, 255)),
    ColorRange::new("red-high", 'r', Hsv::new(160, 50, 50), Hsv::new(180, 255, 255)),
    ColorRange::new("white", 'w', Hsv::new(0, 0, 80), Hsv::new(180, 30, 255)),
];

/// Ordered table of color ranges, read-only once built
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    ranges: Vec<ColorRange>,
}

impl ColorTable {
    /// Table with custom ranges, applied in the given order
    pub fn new(ranges: Vec<ColorRange>) -> Self {
        Self { ranges }
    }

    /// Ranges in application order
    pub fn ranges(&self) -> &[ColorRange] {
        &self.ranges
    }

    /// Number of ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if the table has no ranges
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// First range with the given name
    pub fn by_name(&self, name: &str) -> Option<&ColorRange> {
        self.ranges.iter().find(|r| r.name == name)
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR_RANGES.to_vec())
    }
}
