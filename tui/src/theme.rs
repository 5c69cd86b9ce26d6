//! Color theme and glyphs for the Lico TUI.
//!
//! Uses Kanagawa Wave palette by default with an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

use lico_types::UiOptions;

/// Kanagawa Wave color palette constants.
mod colors {
    use super::Color;

    // === Backgrounds (Sumi Ink) ===
    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_PANEL: Color = Color::Rgb(31, 31, 40); // sumiInk3
    pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 42, 55); // sumiInk4
    pub const BG_POPUP: Color = Color::Rgb(54, 54, 70); // sumiInk5
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6

    // === Foregrounds (Fuji) ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_SECONDARY: Color = Color::Rgb(200, 192, 147); // oldWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray

    pub const PRIMARY: Color = Color::Rgb(149, 127, 184); // oniViolet

    // === Accent Colors ===
    pub const CYAN: Color = Color::Rgb(127, 180, 202); // springBlue
    pub const GREEN: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const YELLOW: Color = Color::Rgb(230, 195, 132); // carpYellow
    pub const ORANGE: Color = Color::Rgb(255, 160, 102); // surimiOrange
    pub const RED: Color = Color::Rgb(255, 93, 98); // peachRed
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_popup: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub peach: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_highlight: colors::BG_HIGHLIGHT,
            bg_popup: colors::BG_POPUP,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            accent: colors::CYAN,
            success: colors::GREEN,
            warning: colors::YELLOW,
            error: colors::RED,
            peach: colors::ORANGE,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_highlight: Color::DarkGray,
            bg_popup: Color::Black,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            primary: Color::White,
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            peach: Color::Yellow,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for checkboxes, markers and the progress bar.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub checked: &'static str,
    pub unchecked: &'static str,
    pub selected: &'static str,
    pub expanded: &'static str,
    pub collapsed: &'static str,
    pub search: &'static str,
    pub bar_full: &'static str,
    pub bar_empty: &'static str,
    pub bullet: &'static str,
    pub add: &'static str,
}

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            checked: "[x]",
            unchecked: "[ ]",
            selected: ">",
            expanded: "v",
            collapsed: ">",
            search: "/",
            bar_full: "#",
            bar_empty: "-",
            bullet: "*",
            add: "+",
        }
    } else {
        Glyphs {
            checked: "☑",
            unchecked: "☐",
            selected: "▸",
            expanded: "▾",
            collapsed: "▸",
            search: "⌕",
            bar_full: "█",
            bar_empty: "░",
            bullet: "•",
            add: "+",
        }
    }
}

/// Fixed-width progress bar for a list card.
#[must_use]
pub fn progress_bar(ratio: f64, width: usize, glyphs: &Glyphs) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut bar = glyphs.bar_full.repeat(filled);
    bar.push_str(&glyphs.bar_empty.repeat(width - filled));
    bar
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn selected_row(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .bg(palette.bg_highlight)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn purchased(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_muted)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    #[must_use]
    pub fn mode_normal(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.bg_dark)
            .bg(palette.text_secondary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn mode_insert(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.bg_dark)
            .bg(palette.success)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn mode_modal(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.bg_dark)
            .bg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.peach)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use lico_types::UiOptions;

    use super::{glyphs, progress_bar};

    #[test]
    fn progress_bar_fills_proportionally() {
        let g = glyphs(UiOptions {
            ascii_only: true,
            high_contrast: false,
        });
        assert_eq!(progress_bar(0.0, 4, &g), "----");
        assert_eq!(progress_bar(0.5, 4, &g), "##--");
        assert_eq!(progress_bar(1.0, 4, &g), "####");
        assert_eq!(progress_bar(3.0, 4, &g), "####");
    }

    #[test]
    fn ascii_glyphs_are_ascii() {
        let g = glyphs(UiOptions {
            ascii_only: true,
            high_contrast: false,
        });
        for glyph in [g.checked, g.unchecked, g.selected, g.expanded, g.bar_full] {
            assert!(glyph.is_ascii(), "{glyph} should be ascii");
        }
    }
}
