//! Text codecs for edit widgets.
//!
//! Every edit form turns free text into list fields through these
//! functions. They are total: bad tokens are dropped, and a list that ends
//! up empty becomes `None` rather than an empty vector.

/// Parse a comma-separated list of positive integers.
///
/// Tokens are trimmed; anything that is not a positive integer (including
/// `0`, negatives, decimals and words) is discarded. Returns `None` when no
/// token survives.
pub fn parse_int_list(input: &str) -> Option<Vec<u32>> {
    let values: Vec<u32> = input
        .split(',')
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .collect();

    non_empty(values)
}

/// Split `input` on `delimiter`, trim each piece, and drop blank pieces.
///
/// Returns `None` when nothing but whitespace was entered.
pub fn parse_string_list(input: &str, delimiter: char) -> Option<Vec<String>> {
    let values: Vec<String> = input
        .split(delimiter)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect();

    non_empty(values)
}

/// Newline-separated list (summary bullet points, quiz options).
pub fn parse_lines(input: &str) -> Option<Vec<String>> {
    parse_string_list(input, '\n')
}

/// Free-text field: blank input means "no value".
pub fn parse_text(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

/// Inverse of [`parse_int_list`], used to pre-fill the edit widget.
pub fn format_int_list(values: Option<&[u32]>) -> String {
    values
        .unwrap_or_default()
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Inverse of [`parse_string_list`].
pub fn format_string_list(values: Option<&[String]>, separator: &str) -> String {
    values.unwrap_or_default().join(separator)
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_list_drops_zero_and_words() {
        assert_eq!(parse_int_list("1, 4, 0, abc, 6"), Some(vec![1, 4, 6]));
    }

    #[test]
    fn int_list_drops_negatives_and_decimals() {
        assert_eq!(parse_int_list("-2, 3, 2.5,,7 "), Some(vec![3, 7]));
    }

    #[test]
    fn int_list_empty_is_none() {
        assert_eq!(parse_int_list(""), None);
        assert_eq!(parse_int_list(" , 0, x"), None);
    }

    #[test]
    fn lines_drop_blank_and_trim() {
        assert_eq!(
            parse_lines("point1\n\npoint2\n  \npoint3"),
            Some(vec![
                "point1".to_string(),
                "point2".to_string(),
                "point3".to_string()
            ])
        );
    }

    #[test]
    fn lines_handle_crlf() {
        assert_eq!(
            parse_lines("a\r\nb\r\n"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn string_list_only_whitespace_is_none() {
        assert_eq!(parse_string_list("  ,  , ", ','), None);
        assert_eq!(parse_lines("\n\n  \n"), None);
    }

    #[test]
    fn comma_list_for_countries() {
        assert_eq!(
            parse_string_list("日本, フランス ,", ','),
            Some(vec!["日本".to_string(), "フランス".to_string()])
        );
    }

    #[test]
    fn text_blank_is_none() {
        assert_eq!(parse_text("   "), None);
        assert_eq!(parse_text(" kept "), Some(" kept ".to_string()));
    }

    #[test]
    fn format_is_inverse_for_clean_input() {
        let criteria = vec![1, 4, 6];
        let text = format_int_list(Some(&criteria));
        assert_eq!(text, "1, 4, 6");
        assert_eq!(parse_int_list(&text), Some(criteria));

        assert_eq!(format_int_list(None), "");
        assert_eq!(format_string_list(None, "\n"), "");
    }
}
