//! CSS colour parsing.

use peniko::Color;
use peniko::color::{Srgb, parse_color as parse_css_color};

/// Parse any CSS colour (`#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `hsl()`,
/// named colours). Anything else is black.
pub fn parse_color(color: &str) -> Color {
    try_parse_color(color).unwrap_or(Color::BLACK)
}

/// Parse a CSS colour, returning `None` for unrecognised input.
pub fn try_parse_color(color: &str) -> Option<Color> {
    match parse_css_color(color.trim()) {
        Ok(parsed) => Some(parsed.to_alpha_color::<Srgb>()),
        Err(e) => {
            log::trace!("Unrecognised colour {:?}: {}", color, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(color: Color) -> [u8; 4] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(rgba(parse_color("#f00")), [255, 0, 0, 255]);
        assert_eq!(rgba(parse_color("#3366cc")), [0x33, 0x66, 0xcc, 255]);
        assert_eq!(rgba(parse_color("#00ff0080")), [0, 255, 0, 0x80]);
        assert_eq!(rgba(parse_color("  #FFFFFF ")), [255, 255, 255, 255]);
    }

    #[test]
    fn test_parse_css_forms() {
        for input in ["red", "rgb(255, 0, 0)", "hsl(0, 100%, 50%)"] {
            assert_eq!(rgba(parse_color(input)), [255, 0, 0, 255], "input {input:?}");
        }
        assert_eq!(rgba(parse_color("rebeccapurple")), [0x66, 0x33, 0x99, 255]);
    }

    #[test]
    fn test_invalid_falls_back_to_black() {
        for input in ["", "notacolor", "#12", "#zzzzzz", "ff0000"] {
            assert_eq!(rgba(parse_color(input)), [0, 0, 0, 255], "input {input:?}");
            assert!(try_parse_color(input).is_none());
        }
    }
}
