//! Small formatting helpers shared by the table and report views

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct > 0.0 && pct < 0.1 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Horizontal bar for a percentage
pub fn format_bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Truncate to `max_len` characters, marking the cut with an ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "0.05%");
        assert_eq!(format_percentage(5.26), "5.3%");
        assert_eq!(format_percentage(66.6), "67%");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(50.0, 4), "██░░");
        assert_eq!(format_bar(150.0, 2), "██");
        assert_eq!(format_bar(0.0, 2), "░░");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Dishes", 10), "Dishes");
        assert_eq!(truncate("Clean the garage", 10), "Clean t...");
        assert_eq!(truncate("Ünïcödé text", 6), "Ünï...");
        assert_eq!(truncate("abcdef", 2), "..");
    }
}
