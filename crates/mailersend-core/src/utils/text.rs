use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shorten an RFC 3339 timestamp to its date part
///
/// # Examples
/// ```
/// use mailersend_core::utils::text::format_datetime;
/// assert_eq!(format_datetime("2024-01-01T00:00:00Z"), "2024-01-01");
/// ```
pub fn format_datetime(datetime: &str) -> String {
    match datetime.split_once('T') {
        Some((date_part, _)) => date_part.to_string(),
        None => datetime.to_string(),
    }
}

/// Truncate text to a display width, appending `...` when shortened.
/// Wide characters count by their terminal width.
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    let ellipsis_width = ELLIPSIS.width();

    if max_width <= ellipsis_width {
        return ELLIPSIS[..max_width].to_string();
    }

    let target_width = max_width - ellipsis_width;
    let mut result = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }

    result.push_str(ELLIPSIS);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_datetime("2023-12-25T10:30:00.000Z"), "2023-12-25");
        assert_eq!(format_datetime("2023-12-25"), "2023-12-25");
        assert_eq!(format_datetime(""), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Hello", 10), "Hello");
        assert_eq!(truncate_text("Hello World!", 8), "Hello...");
        assert_eq!(truncate_text("", 5), "");
        assert_eq!(truncate_text("abcdef", 2), "..");
    }

    #[test]
    fn test_truncate_wide_characters() {
        // Each kana is two columns wide.
        assert_eq!(truncate_text("メールアドレス", 9), "メール...");
    }
}
