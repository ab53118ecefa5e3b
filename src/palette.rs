use plotters::style::RGBColor;

/// Color names cycled through for legend groups and expanded tensor cells
pub const PLOT_COLOR_NAMES: &[&str] = &[
    "black",
    "red",
    "blue",
    "forestgreen",
    "purple",
    "orange",
    "brown",
    "chartreuse",
    "navy",
    "cyan",
    "magenta",
    "tan",
    "salmon",
    "goldenrod",
    "skyblue",
    "pink",
];

/// Fixed, ordered list of color names indexed modulo its length
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    names: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(PLOT_COLOR_NAMES.iter().map(|s| s.to_string()).collect())
    }
}

impl Palette {
    /// An empty list falls back to the default palette.
    pub fn new(names: Vec<String>) -> Self {
        if names.is_empty() {
            return Self::default();
        }
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name at `idx`, wrapping around
    pub fn name_at(&self, idx: usize) -> &str {
        &self.names[idx % self.names.len()]
    }

    /// Resolved color at `idx`, black when the name is not recognized
    pub fn color_at(&self, idx: usize) -> RGBColor {
        parse_color(self.name_at(idx)).unwrap_or(RGBColor(0, 0, 0))
    }
}

// === Color Parsing ===

/// Parse a color string into RGBColor, supporting hex (#RRGGBB, #RGB) and named colors
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "cyan" => Some(RGBColor(0, 255, 255)),
        "magenta" => Some(RGBColor(255, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "pink" => Some(RGBColor(255, 192, 203)),
        "brown" => Some(RGBColor(165, 42, 42)),
        "forestgreen" => Some(RGBColor(34, 139, 34)),
        "chartreuse" => Some(RGBColor(127, 255, 0)),
        "navy" => Some(RGBColor(0, 0, 128)),
        "tan" => Some(RGBColor(210, 180, 140)),
        "salmon" => Some(RGBColor(250, 128, 114)),
        "goldenrod" => Some(RGBColor(218, 165, 32)),
        "skyblue" => Some(RGBColor(135, 206, 235)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "darkgray" | "darkgrey" => Some(RGBColor(64, 64, 64)),
        "lightgray" | "lightgrey" => Some(RGBColor(192, 192, 192)),
        // gray0 = black, gray100 = white
        s if s.starts_with("gray") || s.starts_with("grey") => {
            let n = s[4..].parse::<u8>().ok().filter(|n| *n <= 100)?;
            let v = (n as f64 * 2.55).round() as u8;
            Some(RGBColor(v, v, v))
        }
        _ => None,
    }
}

/// `#rrggbb` or the short `#rgb` form, where each digit is doubled
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let digits = hex.strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let width = match digits.len() {
        6 => 2,
        3 => 1,
        _ => return None,
    };
    let channel = |i: usize| {
        let v = u8::from_str_radix(&digits[i * width..(i + 1) * width], 16).ok()?;
        Some(if width == 1 { v * 17 } else { v })
    };
    Some(RGBColor(channel(0)?, channel(1)?, channel(2)?))
}

/// `#rrggbb` form of a color, used when serializing layouts
pub fn to_hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}
