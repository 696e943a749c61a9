use serde::{Deserialize, Serialize};

/// Color representation.
///
/// Serializes as a HEX8 string (`#RRGGBBAA`), so no channel is lost when a style is stored and read back. When
/// parsing, CSS notations used by web map styles are accepted as well, see [`Color::parse`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid color: {value:?}"))
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs opaque color from its RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Converts the color into HEX8 string: `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Converts the color into lowercase HEX6 string without the alpha channel: `#rrggbb`.
    pub fn to_hex6(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Converts the color into KML notation: `aabbggrr`, lowercase.
    pub fn to_kml(&self) -> String {
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            self.a, self.b, self.g, self.r
        )
    }

    /// Parses a color from the hex string. Hex string can be either HEX6 (`#RRGGBB`) or HEX8 (`#RRGGBBAA`).
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if hex_string.len() != 7 && hex_string.len() != 9 || hex_string.chars().next()? != '#' {
            return None;
        }

        let r = u8::from_str_radix(hex_string.get(1..3)?, 16).ok()?;
        let g = u8::from_str_radix(hex_string.get(3..5)?, 16).ok()?;
        let b = u8::from_str_radix(hex_string.get(5..7)?, 16).ok()?;
        let a = if hex_string.len() == 9 {
            u8::from_str_radix(hex_string.get(7..9)?, 16).ok()?
        } else {
            255
        };

        Some(Self { r, g, b, a })
    }

    /// Parses a color from either hex notation (see [`Color::try_from_hex`]) or CSS functional notation:
    /// `rgb(15, 175, 255)` or `rgba(255, 255, 255, 0.5)`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::try_from_hex(value);
        }

        let (args, has_alpha) = if let Some(rest) = value.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = value.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != if has_alpha { 4 } else { 3 } {
            return None;
        }

        let channel = |s: &str| -> Option<u8> {
            let v: f64 = s.parse().ok()?;
            (0.0..=255.0).contains(&v).then(|| v.round() as u8)
        };

        let a = if has_alpha {
            let opacity: f64 = parts[3].parse().ok()?;
            if !(0.0..=1.0).contains(&opacity) {
                return None;
            }
            (opacity * 255.0).round() as u8
        } else {
            255
        };

        Some(Self {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a,
        })
    }

    /// Returns a new color instance, copied from the base one but with the given alpha channel.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// Returns a new color instance with the alpha channel set from the opacity value in `[0, 1]` range.
    pub fn with_opacity(&self, opacity: f64) -> Self {
        self.with_alpha((opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Opacity of the color in `[0, 1]` range, rounded to two decimal places.
    pub fn opacity(&self) -> f64 {
        (self.a as f64 / 255.0 * 100.0).round() / 100.0
    }

    /// Returns true if the color is fully transparent (`a == 0`).
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Red component of the color in RGBA space.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green component of the color in RGBA space.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue component of the color in RGBA space.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Opacity component of the color.
    pub fn a(&self) -> u8 {
        self.a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_serialization() {
        let hex = "#FF1000AA";
        let color = Color::try_from_hex(hex).unwrap();
        assert_eq!(&color.to_hex(), hex);

        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#FF1000AA\"");
        assert_eq!(serde_json::from_str::<Color>(&json).unwrap(), color);
    }

    #[test]
    fn parse_css() {
        assert_eq!(
            Color::parse("rgb(15, 175, 255)"),
            Some(Color::rgb(15, 175, 255))
        );
        assert_eq!(
            Color::parse("rgba(255,255,255,0.5)"),
            Some(Color::rgba(255, 255, 255, 128))
        );
        assert_eq!(Color::parse("#0faFff"), Some(Color::rgb(15, 175, 255)));
        assert_eq!(Color::parse("rgb(300, 0, 0)"), None);
        assert_eq!(Color::parse("rgba(1, 2, 3)"), None);
        assert_eq!(Color::parse("blue"), None);
    }

    #[test]
    fn invalid_color_fails_deserialization() {
        assert!(serde_json::from_str::<Color>("\"not a color\"").is_err());
    }

    #[test]
    fn kml_notation() {
        assert_eq!(Color::rgba(15, 175, 255, 128).to_kml(), "80ffaf0f");
    }

    #[test]
    fn hex6_drops_alpha() {
        assert_eq!(Color::rgba(15, 175, 255, 128).to_hex6(), "#0fafff");
        assert_eq!(Color::BLACK.to_hex6(), "#000000");
    }
}
