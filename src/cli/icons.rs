//! Console output icons.

use console::{style, StyledObject};

/// Green checkmark.
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// Cyan arrow for progress lines.
pub fn info() -> StyledObject<&'static str> {
    style("→").cyan()
}

pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Dim arrow for secondary detail lines.
pub fn dim_arrow() -> StyledObject<&'static str> {
    style("→").dim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons_render() {
        assert!(success().to_string().contains('✓'));
        assert!(info().to_string().contains('→'));
        assert!(warn().to_string().contains('!'));
        assert!(dim_arrow().to_string().contains('→'));
    }
}
