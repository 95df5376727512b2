//! Human-readable rendering of volumes, probabilities and questions.

/// Abbreviate a USD amount: `$950`, `$12.3K`, `$4.5M`, `$1.2B`.
pub fn format_volume(volume: f64) -> String {
    let abs = volume.abs();
    if abs >= 1_000_000_000.0 {
        format!("${:.1}B", volume / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("${:.1}M", volume / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("${:.1}K", volume / 1_000.0)
    } else {
        format!("${volume:.0}")
    }
}

/// Render a 0–100 probability with one decimal place, e.g. `21.9%`.
pub fn format_odds(odds: f64) -> String {
    format!("{odds:.1}%")
}

/// Shorten `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_volume_suffixes() {
        assert_eq!(format_volume(950.0), "$950");
        assert_eq!(format_volume(12_345.0), "$12.3K");
        assert_eq!(format_volume(4_500_000.0), "$4.5M");
        assert_eq!(format_volume(1_200_000_000.0), "$1.2B");
        assert_eq!(format_volume(0.0), "$0");
    }

    #[test]
    fn test_format_odds() {
        assert_eq!(format_odds(21.98), "22.0%");
        assert_eq!(format_odds(0.0), "0.0%");
        assert_eq!(format_odds(100.0), "100.0%");
    }

    #[test]
    fn test_truncate_text_is_char_safe() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("Will the Fed cut rates?", 10), "Will th...");
        assert_eq!(truncate_text("Qué pasará mañana", 8), "Qué p...");
    }
}
