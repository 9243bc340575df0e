// export/width.rs
// Display-width scoring used to size workbook columns.

use crate::db::models::{Row, Value};

/// Rendered length of a temporal value (`YYYY-MM-DD HH:mm:ss`), ASCII only.
pub const TIMESTAMP_WIDTH: f64 = 19.0;

/// Column padding applied on top of the measured maximum.
pub const DEFAULT_COLUMN_PADDING: f64 = 2.0;

/// Width-scoring strategy.
///
/// `Weighted` is the canonical three-bucket scheme. `Legacy` reproduces an
/// earlier two-bucket variant of the estimator (no uppercase bucket, narrow
/// characters undercounted) and is kept selectable rather than merged away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthScheme {
    /// wide 1.8, ASCII uppercase 1.3, everything else 1.0
    #[default]
    Weighted,
    /// wide 2.0, everything else 0.5
    Legacy,
}

impl WidthScheme {
    fn char_width(self, c: char) -> f64 {
        match self {
            WidthScheme::Weighted => {
                if is_wide(c) {
                    1.8
                } else if c.is_ascii_uppercase() {
                    1.3
                } else {
                    1.0
                }
            }
            WidthScheme::Legacy => {
                if is_wide(c) {
                    2.0
                } else {
                    0.5
                }
            }
        }
    }
}

/// True for characters that render roughly double-width in spreadsheet
/// cells: Hangul, CJK ideographs, kana and the fullwidth forms block.
fn is_wide(c: char) -> bool {
    matches!(c,
        '\u{3131}'..='\u{318E}'   // Hangul compatibility jamo
        | '\u{AC00}'..='\u{D7A3}' // Hangul syllables
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{3040}'..='\u{30FF}' // hiragana, katakana
        | '\u{FF00}'..='\u{FF60}' // fullwidth forms
    )
}

/// Weighted width of a string under the given scheme.
pub fn text_width(text: &str, scheme: WidthScheme) -> f64 {
    text.chars().map(|c| scheme.char_width(c)).sum()
}

/// Width score of one scalar value. Null scores zero; temporal values score
/// their fixed rendered length regardless of scheme.
pub fn value_width(value: &Value, scheme: WidthScheme) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::DateTime(_) => TIMESTAMP_WIDTH,
        Value::Int(v) => text_width(&v.to_string(), scheme),
        Value::UInt(v) => text_width(&v.to_string(), scheme),
        Value::Float(v) => text_width(&v.to_string(), scheme),
        Value::Text(v) => text_width(v, scheme),
        Value::Bytes(v) => text_width(&String::from_utf8_lossy(v), scheme),
    }
}

/// Sizes one column: the maximum of the header length and every row value's
/// width, plus `padding`. The header alone sets the floor.
pub fn column_width(rows: &[Row], column: &str, padding: f64, scheme: WidthScheme) -> f64 {
    let mut max = column.chars().count() as f64;
    for row in rows {
        if let Some(value) = row.get(column) {
            let width = value_width(value, scheme);
            if width > max {
                max = width;
            }
        }
    }
    max + padding
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(column: &str, value: Value) -> Row {
        let mut row = Row::new();
        row.insert(column.to_string(), value);
        row
    }

    #[test]
    fn ascii_lowercase_and_digits_score_their_length() {
        let scheme = WidthScheme::Weighted;
        assert_eq!(text_width("abc123", scheme), 6.0);
        assert_eq!(text_width("order_id", scheme), 8.0);
    }

    #[test]
    fn wide_characters_score_1_8_each() {
        let scheme = WidthScheme::Weighted;
        assert!((text_width("가나다", scheme) - 5.4).abs() < 1e-9);
        assert!((text_width("漢字", scheme) - 3.6).abs() < 1e-9);
    }

    #[test]
    fn uppercase_latin_scores_1_3_each() {
        assert!((text_width("AB", WidthScheme::Weighted) - 2.6).abs() < 1e-9);
        // mixed-script value: 2 wide + 1 upper + 3 other
        assert!((text_width("가나Abcd", WidthScheme::Weighted) - (3.6 + 1.3 + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn legacy_scheme_has_no_uppercase_bucket() {
        assert_eq!(text_width("가", WidthScheme::Legacy), 2.0);
        assert_eq!(text_width("AB", WidthScheme::Legacy), 1.0);
        assert_eq!(text_width("ab", WidthScheme::Legacy), 1.0);
    }

    #[test]
    fn null_scores_zero_and_temporal_scores_nineteen() {
        let scheme = WidthScheme::Weighted;
        assert_eq!(value_width(&Value::Null, scheme), 0.0);
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(value_width(&Value::DateTime(dt), scheme), 19.0);
    }

    #[test]
    fn numbers_are_measured_on_their_rendering() {
        let scheme = WidthScheme::Weighted;
        assert_eq!(value_width(&Value::Int(-1234), scheme), 5.0);
        assert_eq!(value_width(&Value::UInt(42), scheme), 2.0);
    }

    #[test]
    fn header_sets_the_column_floor() {
        let rows = vec![row("created_at", Value::Text("x".into()))];
        let width = column_width(&rows, "created_at", 2.0, WidthScheme::Weighted);
        assert_eq!(width, "created_at".len() as f64 + 2.0);
    }

    #[test]
    fn widest_row_value_wins_over_header() {
        let rows = vec![
            row("name", Value::Text("Alice".into())),
            row("name", Value::Text("아주아주긴이름입니다".into())),
        ];
        let width = column_width(&rows, "name", 2.0, WidthScheme::Weighted);
        assert!((width - (10.0 * 1.8 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn missing_column_in_rows_still_honours_header_and_padding() {
        let rows = vec![Row::new()];
        assert_eq!(column_width(&rows, "id", 2.0, WidthScheme::Weighted), 4.0);
    }
}
