use pitwall_core::Compound;
use ratatui::style::Color;

pub const ACCENT: Color = Color::Rgb(225, 6, 0);
pub const BORDER: Color = Color::Cyan;
pub const BORDER_BUSY: Color = Color::Yellow;
pub const MUTED: Color = Color::Gray;
pub const FAILURE: Color = Color::Red;

pub const fn compound_color(compound: Compound) -> Color {
    match compound {
        Compound::Soft => Color::Red,
        Compound::Medium => Color::Yellow,
        Compound::Hard => Color::White,
        Compound::Intermediate => Color::Green,
        Compound::Wet => Color::Blue,
        Compound::Unknown => Color::DarkGray,
    }
}

/// `#rrggbb` or `#rgb` as sent by the server for team colours.
pub fn hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        3 => {
            let short = |at: usize| channel(hex.get(at..=at)?).map(|value| value * 17);
            Some(Color::Rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_long_and_short_hex() {
        assert_eq!(hex_color("#3671C6"), Some(Color::Rgb(0x36, 0x71, 0xc6)));
        assert_eq!(hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn rejects_anything_else() {
        assert_eq!(hex_color("red"), None);
        assert_eq!(hex_color("#12345"), None);
        assert_eq!(hex_color("#zzzzzz"), None);
    }
}
