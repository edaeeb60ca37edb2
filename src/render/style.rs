//! Colors and bars. These assume a dark background.

use crossterm::style::{Color, Stylize};
use std::hash::{DefaultHasher, Hash, Hasher};

/// Background of the sticky bar.
pub const STICKY_COLOR: Color = Color::Rgb {
    r: 0x00,
    g: 0x2b,
    b: 0xac,
};

/// Tool name color.
pub const TOOL_NAME_COLOR: Color = Color::Rgb {
    r: 0x30,
    g: 0x30,
    b: 0x30,
};

/// Seven bar colors, for a better distribution against source hashes.
pub const TOOL_BAR_COLORS: [Color; 7] = [
    Color::Rgb { r: 0x56, g: 0x00, b: 0xac },
    Color::Rgb { r: 0x56, g: 0x00, b: 0xd7 },
    Color::Rgb { r: 0x56, g: 0x2b, b: 0xd7 },
    Color::Rgb { r: 0x56, g: 0x56, b: 0xd7 },
    Color::Rgb { r: 0x56, g: 0x81, b: 0xd7 },
    Color::Rgb { r: 0x56, g: 0xac, b: 0xd7 },
    Color::Rgb { r: 0x56, g: 0xd7, b: 0xd7 },
];

/// Palette index for a source. Stable for the lifetime of the process.
pub fn source_color_index(source: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    let slots = TOOL_BAR_COLORS.len() as u64;
    usize::try_from(hasher.finish() % slots).unwrap_or(0)
}

/// Colored bar and dimmed name prefixing passthrough tool output.
pub fn tool_header(source: &str, name: &str) -> String {
    let color = TOOL_BAR_COLORS[source_color_index(source)];
    format!("{} {}", " ".on(color), name.with(TOOL_NAME_COLOR))
}

/// Bar prefixing the console's own output.
pub fn us_bar() -> String {
    " ".on(Color::Cyan).to_string()
}

/// Bar prefixing sticky content.
pub fn sticky_bar() -> String {
    " ".on(STICKY_COLOR).to_string()
}
