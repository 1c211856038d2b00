use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 90, g: 200, b: 250 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 165, b: 0 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const IPV4_ADDR: Color = Color::TrueColor { r: 120, g: 220, b: 120 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 170, g: 140, b: 250 };

pub const GOOD: Color = Color::Green;
pub const BAD: Color = Color::Red;
pub const UNKNOWN: Color = Color::Yellow;
pub const NOTE: Color = Color::BrightBlack;
