//! Lexical helpers over SQL text: placeholder rewriting and statement-body splitting.
//!
//! Both walk the text with the same small state machine, so anything inside quoted strings,
//! quoted identifiers, comments, or dollar-quoted blocks is left alone.

use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::scan_digits;
use scanner::CodeBytes;

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Dollar-numbered placeholders like `$1`.
    Dollar,
    /// Question-numbered placeholders like `?1` (SQLite).
    Question,
}

impl PlaceholderStyle {
    fn sigil(self) -> u8 {
        match self {
            PlaceholderStyle::Dollar => b'$',
            PlaceholderStyle::Question => b'?',
        }
    }

    fn other(self) -> Self {
        match self {
            PlaceholderStyle::Dollar => PlaceholderStyle::Question,
            PlaceholderStyle::Question => PlaceholderStyle::Dollar,
        }
    }
}

/// Rewrite numbered placeholders of the other style into `target`.
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    let bytes = sql.as_bytes();
    let from = target.other().sigil();
    let mut out: Option<String> = None;
    let mut copied = 0;

    for idx in CodeBytes::new(sql) {
        if bytes[idx] != from || idx < copied {
            continue;
        }
        if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
            let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
            buf.push_str(&sql[copied..idx]);
            buf.push(char::from(target.sigil()));
            buf.push_str(digits);
            copied = digits_end;
        }
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

/// Split a statement body on `;`, ignoring separators inside literals and comments.
///
/// Fragments are trimmed; blank ones are dropped.
#[must_use]
pub fn split_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut start = 0;
    for idx in CodeBytes::new(sql) {
        if sql.as_bytes()[idx] == b';' {
            statements.push(&sql[start..idx]);
            start = idx + 1;
        }
    }
    statements.push(&sql[start..]);
    statements
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_question_to_dollar() {
        let sql = "select * from t where a = ?1 and b = ?2";
        let res = translate_placeholders(sql, PlaceholderStyle::Dollar);
        assert_eq!(res, "select * from t where a = $1 and b = $2");
    }

    #[test]
    fn translates_dollar_to_question() {
        let sql = "insert into t values($1, $2)";
        let res = translate_placeholders(sql, PlaceholderStyle::Question);
        assert_eq!(res, "insert into t values(?1, ?2)");
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "select '?1', $1 -- $2\n/* ?3 */ from t where a = $1";
        let res = translate_placeholders(sql, PlaceholderStyle::Question);
        assert_eq!(res, "select '?1', ?1 -- $2\n/* ?3 */ from t where a = ?1");
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let sql = "$foo$ select $1 from t $foo$ where a = $1";
        let res = translate_placeholders(sql, PlaceholderStyle::Question);
        assert_eq!(res, "$foo$ select $1 from t $foo$ where a = ?1");
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let sql = "select 'héllo', $1 as ünïcode";
        let res = translate_placeholders(sql, PlaceholderStyle::Question);
        assert_eq!(res, "select 'héllo', ?1 as ünïcode");
    }

    #[test]
    fn untouched_sql_is_borrowed() {
        let sql = "select * from t where a = ?1";
        let res = translate_placeholders(sql, PlaceholderStyle::Question);
        assert!(matches!(res, Cow::Borrowed(_)));
    }

    #[test]
    fn splits_on_top_level_separators_only() {
        let sql = "SELECT 1; SELECT ';' -- ;\n; /* ; */ SELECT 2;;  ";
        assert_eq!(
            split_statements(sql),
            vec!["SELECT 1", "SELECT ';' -- ;", "/* ; */ SELECT 2"]
        );
    }

    #[test]
    fn single_statement_is_one_fragment() {
        assert_eq!(split_statements("  SELECT 1  "), vec!["SELECT 1"]);
        assert!(split_statements(" ; ").is_empty());
    }
}
