//! Number formatting for the presentation layer.
//!
//! All output strings are golden-tested; change with care.

/// `-0.0` renders as `0`, never `-0`.
fn normalise(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Fixed decimals: `fixed(81.24, 1)` → `"81.2"`.
pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, normalise(value))
}

/// Explicit sign for non-negative values: `signed(0.9, 2)` → `"+0.90"`,
/// `signed(-0.7, 2)` → `"-0.70"`.
pub fn signed(value: f64, decimals: usize) -> String {
    let value = normalise(value);
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{:.*}", decimals, value)
}

/// Shortest plain rendering: `plain(2.8)` → `"2.8"`, `plain(8.0)` → `"8"`.
pub fn plain(value: f64) -> String {
    format!("{}", normalise(value))
}

/// `"+0.90 years"`.
pub fn signed_years(value: f64, decimals: usize) -> String {
    format!("{} years", signed(value, decimals))
}

/// `"80.000 years"`.
pub fn years(value: f64, decimals: usize) -> String {
    format!("{} years", fixed(value, decimals))
}
