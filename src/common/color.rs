use std::fmt;

/// RGB color representation.
///
/// Represents a color using red, green, and blue components, each in the range 0-255.
/// The DrawingML color transforms used by slide fills (`lumMod`, `lumOff`, `tint`,
/// `shade`) are available as methods.
///
/// # Examples
///
/// ```rust
/// use deckcraft::common::RGBColor;
///
/// let red = RGBColor::new(255, 0, 0);
/// let blue = RGBColor::from_hex("0000FF").unwrap();
/// assert_eq!(red.to_hex(), "FF0000");
/// assert_eq!(blue.b, 255);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RGBColor {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl RGBColor {
    pub const WHITE: RGBColor = RGBColor::new(255, 255, 255);
    pub const BLACK: RGBColor = RGBColor::new(0, 0, 0);

    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create an RGB color from a hex string ("FF0000" or "#FF0000").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b))
    }

    /// Convert to hex string (without # prefix).
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Apply `lumMod` and `lumOff` (both in 1/100000) to the HSL lightness.
    pub fn with_luminance(self, lum_mod: i32, lum_off: i32) -> Self {
        if lum_mod == 100_000 && lum_off == 0 {
            return self;
        }
        let (h, s, l) = self.to_hsl();
        let l = (l * lum_mod as f32 / 100_000.0 + lum_off as f32 / 100_000.0).clamp(0.0, 1.0);
        Self::from_hsl(h, s, l)
    }

    /// Lighten toward white; `tint` is in 1/100000 (100000 keeps the color).
    pub fn tinted(self, tint: i32) -> Self {
        let t = (tint as f32 / 100_000.0).clamp(0.0, 1.0);
        let channel = |c: u8| (255.0 - (255.0 - c as f32) * t).round() as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Darken toward black; `shade` is in 1/100000 (100000 keeps the color).
    pub fn shaded(self, shade: i32) -> Self {
        let s = (shade as f32 / 100_000.0).clamp(0.0, 1.0);
        let channel = |c: u8| (c as f32 * s).round() as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    fn to_hsl(self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if (max - min).abs() < f32::EPSILON {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s, l)
    }

    fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        if s <= 0.0 {
            let v = (l * 255.0).round() as u8;
            return Self::new(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let hue = |mut t: f32| {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        };
        Self::new(hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0))
    }
}

impl fmt::Display for RGBColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(RGBColor::from_hex("#4472C4"), Some(RGBColor::new(0x44, 0x72, 0xC4)));
        assert_eq!(RGBColor::from_hex("12345"), None);
        assert_eq!(RGBColor::new(1, 2, 255).to_string(), "#0102FF");
    }

    #[test]
    fn test_luminance_identity_and_extremes() {
        let c = RGBColor::new(0x44, 0x72, 0xC4);
        assert_eq!(c.with_luminance(100_000, 0), c);
        assert_eq!(c.with_luminance(0, 100_000), RGBColor::WHITE);
        assert_eq!(c.with_luminance(0, 0), RGBColor::BLACK);
    }

    #[test]
    fn test_tint_and_shade() {
        let c = RGBColor::new(100, 150, 200);
        assert_eq!(c.tinted(100_000), c);
        assert_eq!(c.tinted(0), RGBColor::WHITE);
        assert_eq!(c.shaded(0), RGBColor::BLACK);
        assert_eq!(c.shaded(50_000), RGBColor::new(50, 75, 100));
    }
}
