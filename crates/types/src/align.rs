/// Horizontal text alignment relative to the element's anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Parse the alignment spellings accepted by the deck schema.
    /// Unrecognized values fall back to left alignment.
    pub fn parse(s: &str) -> Align {
        match s.to_ascii_lowercase().as_str() {
            "center" | "centre" | "middle" | "mid" | "c" => Align::Center,
            "right" | "end" | "e" => Align::Right,
            _ => Align::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spellings() {
        assert_eq!(Align::parse("center"), Align::Center);
        assert_eq!(Align::parse("MIDDLE"), Align::Center);
        assert_eq!(Align::parse("right"), Align::Right);
        assert_eq!(Align::parse("e"), Align::Right);
        assert_eq!(Align::parse("left"), Align::Left);
        assert_eq!(Align::parse("unknown"), Align::Left);
    }
}
