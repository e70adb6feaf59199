//! Theme colors, with optional overrides from the `[theme]` table of the config file

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Focused borders, key hints
    pub danger: Color,      // Error message
    pub success: Color,     // Submit button
    pub warning: Color,     // Status messages
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Bodies, hints, empty states
    pub bg_selected: Color, // Selected list entry
    pub inactive: Color,    // Unfocused borders
    pub header: Color,      // Complaint titles
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(137, 180, 250),
        }
    }
}

impl Theme {
    /// Start from the defaults and apply any valid overrides
    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let apply = |slot: &mut Color, value: &Option<String>, name: &str| {
            if let Some(raw) = value {
                match Self::parse_hex_color(raw) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid theme color {} = {:?}", name, raw),
                }
            }
        };

        apply(&mut theme.accent, &config.accent, "accent");
        apply(&mut theme.danger, &config.danger, "danger");
        apply(&mut theme.text, &config.text, "text");
        apply(&mut theme.text_dim, &config.text_dim, "text_dim");

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
