//! Output and color utilities for consistent terminal formatting
//!
//! Provides shared color functions respecting NO_COLOR environment variable.

use colored::Colorize;

/// Check if colors should be used (respects NO_COLOR env var)
pub fn use_colors() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Colorize file path (cyan)
pub fn colorize_path(text: &str, use_color: bool) -> String {
    if use_color {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

/// Colorize document or reference name (bold)
pub fn colorize_name(text: &str, use_color: bool) -> String {
    if use_color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Format a similarity with four decimals; green when high, red when negative
pub fn colorize_score(score: f32, use_color: bool) -> String {
    let text = format!("{:.4}", score);
    if !use_color {
        return text;
    }
    if score >= 0.5 {
        text.green().to_string()
    } else if score < 0.0 {
        text.red().to_string()
    } else {
        text.yellow().to_string()
    }
}

/// Colorize secondary details (dimmed)
pub fn colorize_detail(text: &str, use_color: bool) -> String {
    if use_color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Success marker (green check)
pub fn success_mark(use_color: bool) -> String {
    if use_color {
        "✓".green().to_string()
    } else {
        "✓".to_string()
    }
}

/// Warning marker (yellow exclamation)
pub fn warning_mark(use_color: bool) -> String {
    if use_color {
        "!".yellow().bold().to_string()
    } else {
        "!".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_without_color() {
        assert_eq!(colorize_score(0.81234, false), "0.8123");
        assert_eq!(colorize_score(-0.1, false), "-0.1000");
        assert_eq!(colorize_name("北京市", false), "北京市");
        assert_eq!(success_mark(false), "✓");
    }
}
