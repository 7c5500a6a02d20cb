use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// An opaque RGB color. Element opacity is carried separately by the
/// document model, so the color itself has no alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self { r: 0, g: 0, b: 0 }
    }
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u8) -> Self {
        Self { r: value, g: value, b: value }
    }

    /// Parse a color from any of the accepted spellings:
    /// `#RGB`, `#RRGGBB`, `rgb(r,g,b)`, or a known color name.
    pub fn parse(s: &str) -> Result<Color, String> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::parse_hex(s);
        }
        if s.to_ascii_lowercase().starts_with("rgb(") {
            return Self::parse_rgb(s);
        }
        named(s).ok_or_else(|| format!("Unknown color name: '{}'", s))
    }

    /// Parse a hex color string (#RGB or #RRGGBB format)
    fn parse_hex(s: &str) -> Result<Color, String> {
        let hex = &s[1..];
        if !hex.is_ascii() {
            return Err(format!("Invalid hex color: '{}'", s));
        }

        match hex.len() {
            3 => {
                // #RGB format - expand each digit
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16)
                    .map_err(|e| format!("Invalid red component: {}", e))?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16)
                    .map_err(|e| format!("Invalid green component: {}", e))?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16)
                    .map_err(|e| format!("Invalid blue component: {}", e))?;
                Ok(Color { r, g, b })
            }
            6 => {
                // #RRGGBB format
                let r = u8::from_str_radix(&hex[0..2], 16)
                    .map_err(|e| format!("Invalid red component: {}", e))?;
                let g = u8::from_str_radix(&hex[2..4], 16)
                    .map_err(|e| format!("Invalid green component: {}", e))?;
                let b = u8::from_str_radix(&hex[4..6], 16)
                    .map_err(|e| format!("Invalid blue component: {}", e))?;
                Ok(Color { r, g, b })
            }
            _ => Err(format!(
                "Invalid hex color length: expected 3 or 6, got {}",
                hex.len()
            )),
        }
    }

    /// Parse an `rgb(r,g,b)` functional color.
    fn parse_rgb(s: &str) -> Result<Color, String> {
        let inner = s[4..]
            .strip_suffix(')')
            .ok_or_else(|| format!("Unterminated rgb() color: '{}'", s))?;
        let mut parts = inner.split(',').map(str::trim);
        let mut next = |name: &str| -> Result<u8, String> {
            parts
                .next()
                .ok_or_else(|| format!("Missing {} component in '{}'", name, s))?
                .parse::<u8>()
                .map_err(|e| format!("Invalid {} component: {}", name, e))
        };
        let r = next("red")?;
        let g = next("green")?;
        let b = next("blue")?;
        Ok(Color { r, g, b })
    }

    /// Format as the `rgb(r,g,b)` spelling used in generated markup.
    pub fn to_rgb_string(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Components scaled to the unit interval, for PDF color operators.
    pub fn to_unit(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

fn named(s: &str) -> Option<Color> {
    let c = match s.to_ascii_lowercase().as_str() {
        "white" => Color::new(255, 255, 255),
        "black" => Color::new(0, 0, 0),
        "gray" | "grey" => Color::new(128, 128, 128),
        "silver" => Color::new(192, 192, 192),
        "lightgray" | "lightgrey" => Color::new(211, 211, 211),
        "darkgray" | "darkgrey" => Color::new(169, 169, 169),
        "red" => Color::new(255, 0, 0),
        "green" => Color::new(0, 128, 0),
        "blue" => Color::new(0, 0, 255),
        "yellow" => Color::new(255, 255, 0),
        "orange" => Color::new(255, 165, 0),
        "purple" => Color::new(128, 0, 128),
        "brown" => Color::new(165, 42, 42),
        "pink" => Color::new(255, 192, 203),
        "maroon" => Color::new(128, 0, 0),
        "tan" => Color::new(210, 180, 140),
        "cyan" => Color::new(0, 255, 255),
        "magenta" => Color::new(255, 0, 255),
        "steelblue" => Color::new(70, 130, 180),
        _ => return None,
    };
    Some(c)
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_long() {
        assert_eq!(Color::parse("#ff8000").unwrap(), Color::new(255, 128, 0));
    }

    #[test]
    fn test_parse_hex_short() {
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
    }

    #[test]
    fn test_parse_rgb_functional() {
        assert_eq!(Color::parse("rgb(10, 20,30)").unwrap(), Color::new(10, 20, 30));
    }

    #[test]
    fn test_parse_named_case_insensitive() {
        assert_eq!(Color::parse("SteelBlue").unwrap(), Color::new(70, 130, 180));
        assert_eq!(Color::parse("grey").unwrap(), Color::gray(128));
    }

    #[test]
    fn test_parse_unknown_name_fails() {
        assert!(Color::parse("notacolor").is_err());
    }

    #[test]
    fn test_rgb_round_trip_string() {
        let c = Color::new(70, 130, 180);
        assert_eq!(Color::parse(&c.to_rgb_string()).unwrap(), c);
    }
}
