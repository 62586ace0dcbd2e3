// Color palettes and color shorthands used by marks and format strings

/// Default mark colors (D3 Category10).
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Single-letter color codes accepted in format strings.
const COLOR_CODES: [(char, &str); 7] = [
    ('b', "blue"),
    ('g', "green"),
    ('r', "red"),
    ('c', "cyan"),
    ('m', "magenta"),
    ('y', "yellow"),
    ('k', "black"),
];

/// Color palette for categorical data
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    pub fn category10() -> Self {
        ColorPalette {
            colors: CATEGORY10.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Palette from explicit colors; empty input falls back to Category10.
    pub fn from_colors(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            Self::category10()
        } else {
            ColorPalette { colors }
        }
    }

    /// Get color for a specific index (wraps around if index > palette size)
    pub fn get_color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

/// Color name for a format-string code letter.
pub fn color_code(code: char) -> Option<&'static str> {
    COLOR_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
