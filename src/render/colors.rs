//! Colors for the grid's drawing surfaces.
//!
//! Canvas 2D takes CSS color strings as-is, so colors stay strings end to
//! end. Config colors pass through [`normalize_color`] once, which both
//! validates them and rewrites shorthand into the form the painter expects.

/// A CSS color string (`#RRGGBB`, `#RRGGBBAA` or `rgb()`/`rgba()`)
pub type CssColor = String;

/// Default grid colors
pub mod palette {
    pub const WHITE: &str = "#FFFFFF";

    pub const GRID_LINE: &str = "#E0E0E0";

    pub const HEADER_BG: &str = "#F1F3F4";
    pub const HEADER_TEXT: &str = "#3C4043";

    /// Odd-row stripe
    pub const STRIPE: &str = "#FAFAFA";
    pub const BODY_TEXT: &str = "#202124";

    pub const SUMMARY_BG: &str = "#E8EAED";

    /// Hovered row
    pub const ROW_HIGHLIGHT: &str = "#E8F0FE";
    /// Hovered column
    pub const COL_HIGHLIGHT: &str = "#D2E3FC";

    pub const SCROLLBAR_TRACK: &str = "#F5F5F5";
    pub const SCROLLBAR_THUMB: &str = "#B4B4B4";
}

/// Validate a configured color and bring it into canonical form.
///
/// Hex colors come back upper-case with a leading `#`, and `#RGB` expands
/// to `#RRGGBB`. `rgb()`/`rgba()` are checked component by component and
/// returned with normalized spacing. Anything else is `None`.
pub fn normalize_color(value: &str) -> Option<CssColor> {
    let value = value.trim();
    if let Some(args) = functional_args(value, "rgba") {
        let [r, g, b, a] = args.as_slice() else {
            return None;
        };
        let alpha: f64 = a.parse().ok()?;
        if !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        return Some(format!(
            "rgba({}, {}, {}, {alpha})",
            channel(r)?,
            channel(g)?,
            channel(b)?
        ));
    }
    if let Some(args) = functional_args(value, "rgb") {
        let [r, g, b] = args.as_slice() else {
            return None;
        };
        return Some(format!("rgb({}, {}, {})", channel(r)?, channel(g)?, channel(b)?));
    }
    let hex = value.strip_prefix('#').unwrap_or(value);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let hex = hex.to_ascii_uppercase();
    match hex.len() {
        3 => Some(hex.chars().fold(String::from("#"), |mut out, c| {
            out.push(c);
            out.push(c);
            out
        })),
        6 | 8 => Some(format!("#{hex}")),
        _ => None,
    }
}

/// Comma-separated arguments of `name(...)`, trimmed.
fn functional_args<'a>(value: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let inner = value.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split(',').map(str::trim).collect())
}

fn channel(text: &str) -> Option<u8> {
    text.parse().ok()
}

/// The 8-bit channels of a `#RRGGBB` color.
fn hex_channels(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let at = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some([at(0)?, at(2)?, at(4)?])
}

/// Fill for a header whose column is actively sorted: the header background
/// shaded 8% toward black. Non-hex colors are used unchanged.
pub fn sorted_header_fill(header_bg: &str) -> CssColor {
    let Some(channels) = hex_channels(header_bg) else {
        return header_bg.to_string();
    };
    channels
        .iter()
        .fold(String::from("#"), |mut out, &c| {
            let shaded = u16::from(c) * 92 / 100;
            out.push_str(&format!("{shaded:02X}"));
            out
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_defaults_are_canonical() {
        for color in [
            palette::WHITE,
            palette::GRID_LINE,
            palette::HEADER_BG,
            palette::HEADER_TEXT,
            palette::STRIPE,
            palette::BODY_TEXT,
            palette::SUMMARY_BG,
            palette::ROW_HIGHLIGHT,
            palette::COL_HIGHLIGHT,
            palette::SCROLLBAR_TRACK,
            palette::SCROLLBAR_THUMB,
        ] {
            assert_eq!(normalize_color(color).as_deref(), Some(color));
        }
    }

    #[test]
    fn test_hex_shorthand_and_case() {
        assert_eq!(normalize_color("d2e3fc").unwrap(), "#D2E3FC");
        assert_eq!(normalize_color(" #abc ").unwrap(), "#AABBCC");
        // CSS order: alpha last
        assert_eq!(normalize_color("#D2E3FC80").unwrap(), "#D2E3FC80");
        assert!(normalize_color("#D2E3F").is_none());
        assert!(normalize_color("#GGGGGG").is_none());
    }

    #[test]
    fn test_functional_colors_are_checked() {
        assert_eq!(normalize_color("rgb(232,240,254)").unwrap(), "rgb(232, 240, 254)");
        assert_eq!(
            normalize_color("rgba(210, 227, 252, 0.5)").unwrap(),
            "rgba(210, 227, 252, 0.5)"
        );
        assert!(normalize_color("rgb(256, 0, 0)").is_none());
        assert!(normalize_color("rgba(0, 0, 0, 2)").is_none());
        assert!(normalize_color("rgb(1, 2)").is_none());
        assert!(normalize_color("hover-blue").is_none());
    }

    #[test]
    fn test_sorted_header_is_shaded() {
        // F1 → DD, F3 → DF, F4 → E0
        assert_eq!(sorted_header_fill(palette::HEADER_BG), "#DDDFE0");
        assert_eq!(sorted_header_fill("#000000"), "#000000");
        assert_eq!(sorted_header_fill("rgb(1, 2, 3)"), "rgb(1, 2, 3)");
    }
}
