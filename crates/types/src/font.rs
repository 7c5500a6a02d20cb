/// Font weight on the standard 100-900 numeric scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Medium,
    Bold,
    Black,
    Numeric(u16),
}

impl FontWeight {
    /// Returns the numeric weight value (100-900 scale).
    pub fn numeric_value(&self) -> u16 {
        match self {
            FontWeight::Light => 300,
            FontWeight::Regular => 400,
            FontWeight::Medium => 500,
            FontWeight::Bold => 700,
            FontWeight::Black => 900,
            FontWeight::Numeric(n) => *n,
        }
    }

    /// Parse a font weight from a string (e.g. "bold", "400").
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "light" => Ok(FontWeight::Light),
            "regular" | "normal" => Ok(FontWeight::Regular),
            "medium" => Ok(FontWeight::Medium),
            "bold" => Ok(FontWeight::Bold),
            "black" => Ok(FontWeight::Black),
            _ => s
                .parse::<u16>()
                .map(FontWeight::Numeric)
                .map_err(|_| format!("Invalid font weight: '{}'", s)),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.numeric_value() >= 600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_values() {
        assert_eq!(FontWeight::Regular.numeric_value(), 400);
        assert_eq!(FontWeight::Bold.numeric_value(), 700);
        assert_eq!(FontWeight::Numeric(550).numeric_value(), 550);
    }

    #[test]
    fn test_parse() {
        assert_eq!(FontWeight::parse("Bold").unwrap(), FontWeight::Bold);
        assert_eq!(FontWeight::parse("600").unwrap(), FontWeight::Numeric(600));
        assert!(FontWeight::parse("heavy-ish").is_err());
    }

    #[test]
    fn test_is_bold() {
        assert!(FontWeight::Bold.is_bold());
        assert!(!FontWeight::Regular.is_bold());
        assert!(FontWeight::Numeric(650).is_bold());
    }
}
