//! Theme definitions for the news client.
//!
//! Greens carry the brand (sticky bar, word cloud, active page); everything
//! else stays neutral so article text reads comfortably.

use ratatui::style::{Color, Modifier, Style};

pub mod colors {
    use ratatui::style::Color;

    // ═══════════════════════════════════════════════════════════════════════════
    // BASE COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deep background - primary canvas color
    pub const BG_DEEP: Color = Color::Rgb(18, 24, 20); // #121814

    /// Elevated surface - cards, drawer, popups
    pub const BG_SURFACE: Color = Color::Rgb(28, 38, 31); // #1c261f

    pub const BORDER: Color = Color::Rgb(52, 74, 58); // #344a3a

    pub const BORDER_FOCUS: Color = Color::Rgb(120, 190, 140); // #78be8c

    // ═══════════════════════════════════════════════════════════════════════════
    // TEXT COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const TEXT_PRIMARY: Color = Color::Rgb(222, 232, 224); // #dee8e0

    /// Hints, placeholders, dates
    pub const TEXT_MUTED: Color = Color::Rgb(118, 140, 124); // #768c7c

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCENT COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Brand green - sticky bar, active controls
    pub const ACCENT_PRIMARY: Color = Color::Rgb(104, 186, 127); // #68ba7f

    /// Source badges and filter chips
    pub const ACCENT_SECONDARY: Color = Color::Rgb(224, 190, 110); // #e0be6e

    // ═══════════════════════════════════════════════════════════════════════════
    // STATUS COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const STATUS_ERROR: Color = Color::Rgb(232, 120, 120); // #e87878
}

/// Terminal width classification for adaptive layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalWidth {
    /// Narrow terminal (<80 cols) - phone-sized layout
    Narrow,
    /// Normal terminal (80-120 cols)
    Normal,
    /// Wide terminal (>120 cols)
    Wide,
}

impl TerminalWidth {
    pub fn from_cols(cols: u16) -> Self {
        if cols < 80 {
            Self::Narrow
        } else if cols <= 120 {
            Self::Normal
        } else {
            Self::Wide
        }
    }

    pub fn is_narrow(self) -> bool {
        matches!(self, Self::Narrow)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub bg: Color,
    pub fg: Color,
    pub surface: Color,
    pub hint: Color,
    pub border: Color,
    pub error: Color,
    /// Alternating card backgrounds
    pub stripe_even: Color,
    pub stripe_odd: Color,
}

impl ThemePalette {
    /// Light theme - paper white with forest accents
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(0, 95, 0),           // #005F00, darkest cloud green
            accent_alt: Color::Rgb(160, 110, 20),   // Ochre
            bg: Color::Rgb(250, 251, 248),          // Off-white
            fg: Color::Rgb(30, 38, 32),             // Near-black
            surface: Color::Rgb(238, 243, 236),     // Pale sage
            hint: Color::Rgb(110, 124, 112),        // Medium gray-green
            border: Color::Rgb(200, 214, 202),      // Border sage
            error: Color::Rgb(180, 40, 40),         // Brick
            stripe_even: Color::Rgb(250, 251, 248), // Same as bg
            stripe_odd: Color::Rgb(242, 246, 240),  // Slightly darker
        }
    }

    /// Dark theme - default
    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            bg: colors::BG_DEEP,
            fg: colors::TEXT_PRIMARY,
            surface: colors::BG_SURFACE,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
            error: colors::STATUS_ERROR,
            stripe_even: colors::BG_DEEP,
            stripe_odd: Color::Rgb(22, 30, 25), // #161e19
        }
    }

    /// Pure black/white with saturated accents.
    pub fn high_contrast() -> Self {
        Self {
            accent: Color::Rgb(0, 255, 127),
            accent_alt: Color::Rgb(255, 215, 0),
            bg: Color::Rgb(0, 0, 0),
            fg: Color::Rgb(255, 255, 255),
            surface: Color::Rgb(28, 28, 28),
            hint: Color::Rgb(180, 180, 180),
            border: Color::Rgb(255, 255, 255),
            error: Color::Rgb(255, 80, 80),
            stripe_even: Color::Rgb(0, 0, 0),
            stripe_odd: Color::Rgb(24, 24, 24),
        }
    }

    /// Title style - accent colored with bold modifier
    pub fn title(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_subtle(self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn border_style(self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focus_style(self) -> Style {
        Style::default().fg(colors::BORDER_FOCUS)
    }

    pub fn surface_style(self) -> Style {
        Style::default().bg(self.surface)
    }

    pub fn highlight_style(self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn stripe(self, index: usize) -> Color {
        if index % 2 == 0 {
            self.stripe_even
        } else {
            self.stripe_odd
        }
    }
}

/// Source badges and filter chips.
pub fn chip_style(palette: ThemePalette) -> Style {
    Style::default()
        .fg(palette.accent_alt)
        .add_modifier(Modifier::BOLD)
}

/// Theme presets cycled with F2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemePreset {
    #[default]
    Dark,
    Light,
    HighContrast,
}

impl ThemePreset {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
            Self::HighContrast => "High Contrast",
        }
    }

    /// Parses a persisted or configured name; unknown names fall back to dark.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::Light,
            "high contrast" | "high-contrast" | "high_contrast" => Self::HighContrast,
            _ => Self::Dark,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::HighContrast,
            Self::HighContrast => Self::Dark,
        }
    }

    pub fn to_palette(self) -> ThemePalette {
        match self {
            Self::Dark => ThemePalette::dark(),
            Self::Light => ThemePalette::light(),
            Self::HighContrast => ThemePalette::high_contrast(),
        }
    }
}
