// Matplotlib-style format strings such as "r--", "g^" or "k:o"

use crate::palette;

// Checked in order: "-" would otherwise shadow the two-character codes.
const LINE_STYLE_CODES: [(&str, &str); 4] = [
    (":", "dotted"),
    ("-.", "dash_dotted"),
    ("--", "dashed"),
    ("-", "solid"),
];

const MARKER_CODES: [(char, &str); 6] = [
    ('o', "circle"),
    ('v', "triangle-down"),
    ('^', "triangle-up"),
    ('s', "square"),
    ('d', "diamond"),
    ('+', "cross"),
];

/// Line style, color and marker picked out of a format string.
///
/// Each component is found independently; characters that match no code are
/// ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatSpec {
    pub line_style: Option<&'static str>,
    pub color: Option<&'static str>,
    pub marker: Option<&'static str>,
}

impl FormatSpec {
    pub fn parse(format: &str) -> Self {
        let line_style = LINE_STYLE_CODES
            .iter()
            .find(|(code, _)| format.contains(code))
            .map(|(_, style)| *style);
        let color = format.chars().find_map(palette::color_code);
        let marker = MARKER_CODES
            .iter()
            .find(|(code, _)| format.contains(*code))
            .map(|(_, marker)| *marker);
        FormatSpec {
            line_style,
            color,
            marker,
        }
    }

    /// A marker without a line style draws points, not a line.
    pub fn is_marker_only(&self) -> bool {
        self.marker.is_some() && self.line_style.is_none()
    }
}
