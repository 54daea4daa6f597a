//! Color themes for the navigator.

use ratatui::style::Color;

/// Colors used by the terminal navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    /// Borders of the active panel, header title
    pub primary: Color,
    /// Option numbers and breadcrumb separators
    pub accent: Color,
    pub text: Color,
    pub text_dim: Color,
    pub selected_bg: Color,
    pub border: Color,
    /// Identification results
    pub success: Color,
    /// Goto cycles
    pub warning: Color,
    /// Missing steps
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            primary: Color::Rgb(99, 102, 241),    // Indigo
            accent: Color::Rgb(251, 146, 60),     // Orange
            text: Color::White,
            text_dim: Color::Rgb(156, 163, 175),  // Gray-400
            selected_bg: Color::Rgb(55, 65, 81),  // Gray-700
            border: Color::Rgb(75, 85, 99),       // Gray-600
            success: Color::Rgb(34, 197, 94),     // Green
            warning: Color::Rgb(234, 179, 8),     // Yellow
            error: Color::Rgb(239, 68, 68),       // Red
        }
    }

    /// Greens and bark browns.
    pub fn forest() -> Self {
        Self {
            name: "forest".to_string(),
            primary: Color::Rgb(74, 124, 89),
            accent: Color::Rgb(196, 154, 108),
            text: Color::Rgb(233, 237, 222),
            text_dim: Color::Rgb(160, 170, 150),
            selected_bg: Color::Rgb(45, 62, 50),
            border: Color::Rgb(88, 107, 86),
            success: Color::Rgb(163, 211, 114),
            warning: Color::Rgb(230, 190, 90),
            error: Color::Rgb(214, 96, 77),
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            primary: Color::Rgb(136, 192, 208),
            accent: Color::Rgb(208, 135, 112),
            text: Color::Rgb(236, 239, 244),
            text_dim: Color::Rgb(216, 222, 233),
            selected_bg: Color::Rgb(59, 66, 82),
            border: Color::Rgb(67, 76, 94),
            success: Color::Rgb(163, 190, 140),
            warning: Color::Rgb(235, 203, 139),
            error: Color::Rgb(191, 97, 106),
        }
    }

    /// Terminal palette only, for 16-color terminals.
    pub fn mono() -> Self {
        Self {
            name: "mono".to_string(),
            primary: Color::White,
            accent: Color::Gray,
            text: Color::Reset,
            text_dim: Color::DarkGray,
            selected_bg: Color::DarkGray,
            border: Color::Gray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }

    /// Look up a built-in theme, falling back to the default.
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "forest" => Self::forest(),
            "nord" => Self::nord(),
            "mono" | "monochrome" => Self::mono(),
            "default" => Self::default_theme(),
            other => {
                tracing::warn!(theme = other, "Unknown theme, using default");
                Self::default_theme()
            }
        }
    }

    pub fn available() -> &'static [&'static str] {
        &["default", "forest", "nord", "mono"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("forest").name, "forest");
        assert_eq!(Theme::by_name("NORD").name, "nord");
        assert_eq!(Theme::by_name("monochrome").name, "mono");
        assert_eq!(Theme::by_name("unknown").name, "default");
    }

    #[test]
    fn test_every_listed_theme_resolves() {
        for name in Theme::available() {
            assert_eq!(&Theme::by_name(name).name, name);
        }
    }
}
