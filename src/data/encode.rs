//! Literal re-encoding for PostgreSQL.

use crate::schema::ColumnKind;
use std::borrow::Cow;

pub const NULL_LITERAL: &str = "NULL";
pub const FALSE_LITERAL: &str = "false";
pub const TRUE_LITERAL: &str = "true";

/// Re-encode one raw value for a column of the given kind.
///
/// `NULL` and empty values are never touched.
pub fn reencode_value(raw: &str, kind: ColumnKind) -> Cow<'_, str> {
    if raw.is_empty() || raw == NULL_LITERAL {
        return Cow::Borrowed(raw);
    }

    match kind {
        ColumnKind::Boolean => Cow::Borrowed(if raw == "0" { FALSE_LITERAL } else { TRUE_LITERAL }),
        ColumnKind::Text => Cow::Owned(format!("e{}", double_escaped_quotes(raw))),
        ColumnKind::Other => Cow::Borrowed(raw),
    }
}

/// Rewrite backslash-escaped quotes (`\'`) as doubled quotes (`''`).
///
/// Other backslash escapes are copied as pairs so that `\\'` keeps its
/// escaped backslash followed by the closing quote.
fn double_escaped_quotes(raw: &str) -> Cow<'_, str> {
    if !raw.contains("\\'") {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len() + 4);
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\'') => out.push_str("''"),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Re-encode every value of a tuple against its table's column kinds.
///
/// Values beyond the known columns pass through unchanged.
pub fn reencode_tuple(values: &[String], kinds: &[ColumnKind]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let kind = kinds.get(index).copied().unwrap_or(ColumnKind::Other);
            reencode_value(raw, kind)
        })
        .collect::<Vec<_>>()
        .join(",")
}
