use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,

    LaneBackground,
    LaneBorder,
    LaneLabel,

    /// Min/max envelope fill of a decimal stripe.
    BandFill,
    /// Mean line of a decimal stripe.
    BandLine,

    MarkerLine,
    MarkerText,

    HoverHighlight,
    /// Fallback indicator for an unresolved reference entry.
    MissingEntry,

    TextPrimary,
    TextSecondary,
    TextMuted,

    // Rotating series/state palette
    Palette0,
    Palette1,
    Palette2,
    Palette3,
    Palette4,
    Palette5,
}

impl ThemeToken {
    /// Palette token for a series or state index, cycling past the end.
    pub fn palette(index: usize) -> ThemeToken {
        match index % 6 {
            0 => ThemeToken::Palette0,
            1 => ThemeToken::Palette1,
            2 => ThemeToken::Palette2,
            3 => ThemeToken::Palette3,
            4 => ThemeToken::Palette4,
            _ => ThemeToken::Palette5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        assert_eq!(ThemeToken::palette(0), ThemeToken::Palette0);
        assert_eq!(ThemeToken::palette(5), ThemeToken::Palette5);
        assert_eq!(ThemeToken::palette(6), ThemeToken::Palette0);
        assert_eq!(ThemeToken::palette(13), ThemeToken::Palette1);
    }
}
