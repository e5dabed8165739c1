//! MySQL → PostgreSQL line rewriting rules.
//!
//! The rules are deliberately literal:
//! - drop prefixes discard whole lines (inserts, directives, locks, drops)
//! - cleanup replacements strip table options and trigger clauses
//! - the type table maps exact MySQL type spellings to PostgreSQL names
//!
//! Rules can be extended from a YAML file, see [`DialectYamlConfig`].

mod config;

pub use config::{DialectYamlConfig, Replacement};

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Exact type spellings and their PostgreSQL replacements.
pub const DEFAULT_TYPES: &[(&str, &str)] = &[
    ("int(11)", "INTEGER"),
    ("int(2)", "INTEGER"),
    ("tinyint(1)", "BOOLEAN"),
    ("double", "REAL"),
    ("datetime", "TIMESTAMP"),
    ("varchar(120)", "TEXT"),
    ("varchar(40)", "TEXT"),
    ("int(10)", "INTEGER"),
    ("int(4)", "INTEGER"),
    ("bigint(20)", "BIGINT"),
    ("smallint(6)", "SMALLINT"),
    ("tinyint(4)", "SMALLINT"),
    ("float", "REAL"),
    ("varchar(255)", "TEXT"),
    ("tinytext", "TEXT"),
    ("mediumtext", "TEXT"),
    ("longtext", "TEXT"),
];

/// Line prefixes that are discarded by the schema pass.
pub const DEFAULT_DROP_PREFIXES: &[&str] =
    &["INSERT", "/", "LOCK TABLES", "UNLOCK TABLES", "DROP TABLE"];

/// Literal substring replacements applied before tokenizing.
pub const DEFAULT_REPLACEMENTS: &[(&str, &str)] = &[
    (" ENGINE=InnoDB DEFAULT CHARSET=latin1", ""),
    (" ON UPDATE CURRENT_TIMESTAMP", ""),
    ("enum('pre-match','in-play')", "TEXT"),
    ("enum('1st half','full time')", "TEXT"),
];

/// Closing line of a CREATE TABLE carrying storage options.
static TABLE_OPTIONS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\)\s+(?:ENGINE|AUTO_INCREMENT|DEFAULT|CHARSET|COLLATE|ROW_FORMAT|COMMENT)\b.*;")
        .unwrap()
});

/// Identifier quote character of the source dialect.
pub const IDENTIFIER_QUOTE: char = '`';

const AUTO_INCREMENT: &str = "AUTO_INCREMENT";

/// PostgreSQL serial type replacing an auto-increment integer column.
fn serial_type(type_token: &str) -> Option<&'static str> {
    match type_token.to_ascii_uppercase().as_str() {
        "INTEGER" | "INT" => Some("SERIAL"),
        "BIGINT" => Some("BIGSERIAL"),
        "SMALLINT" => Some("SMALLSERIAL"),
        _ => None,
    }
}

/// Rewriting rules consulted line by line.
#[derive(Debug, Clone)]
pub struct DialectRules {
    types: AHashMap<String, String>,
    drop_prefixes: Vec<String>,
    replacements: Vec<(String, String)>,
}

impl Default for DialectRules {
    fn default() -> Self {
        Self {
            types: DEFAULT_TYPES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            drop_prefixes: DEFAULT_DROP_PREFIXES.iter().map(|p| p.to_string()).collect(),
            replacements: DEFAULT_REPLACEMENTS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl DialectRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the built-in rules with a YAML configuration.
    ///
    /// Type entries override built-ins of the same spelling; drop prefixes and
    /// replacements are appended after the built-in ones.
    pub fn with_overrides(mut self, config: DialectYamlConfig) -> Self {
        self.types.extend(config.types);
        self.drop_prefixes.extend(config.drop_prefixes);
        self.replacements
            .extend(config.replacements.into_iter().map(|r| (r.from, r.to)));
        self
    }

    /// Whether the line starts with a drop prefix.
    pub fn is_dropped(&self, line: &str) -> bool {
        self.drop_prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }

    /// Apply the literal replacements, then collapse a table-options closing line.
    pub fn cleanup<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let mut result = Cow::Borrowed(line);
        for (from, to) in &self.replacements {
            if result.contains(from.as_str()) {
                result = Cow::Owned(result.replace(from.as_str(), to));
            }
        }

        if TABLE_OPTIONS_RE.is_match(&result) {
            return Cow::Owned(TABLE_OPTIONS_RE.replace(&result, ");").into_owned());
        }
        result
    }

    /// Translate a single token; unknown tokens pass through.
    pub fn translate_token<'a>(&'a self, token: &'a str) -> &'a str {
        self.types.get(token).map(String::as_str).unwrap_or(token)
    }

    /// Translate a token that may carry a list-separating comma.
    ///
    /// The comma is not part of the lookup and is kept after the translation.
    fn translate_list_token<'a>(&'a self, token: &'a str) -> Cow<'a, str> {
        match token.strip_suffix(',') {
            Some(bare) => match self.types.get(bare) {
                Some(translated) => Cow::Owned(format!("{},", translated)),
                None => Cow::Borrowed(token),
            },
            None => Cow::Borrowed(self.translate_token(token)),
        }
    }

    /// Strip identifier quotes, translate every token and rejoin with single spaces.
    ///
    /// A line indented with whitespace keeps exactly one leading space.
    /// A column flagged `AUTO_INCREMENT` gets the matching serial type instead.
    pub fn translate_line(&self, line: &str) -> String {
        let unquoted = line.replace(IDENTIFIER_QUOTE, "");
        let mut tokens: Vec<Cow<'_, str>> = unquoted
            .split_whitespace()
            .map(|t| self.translate_list_token(t))
            .collect();

        let mut trailing_comma = false;
        if let Some(pos) = tokens
            .iter()
            .position(|t| t.trim_end_matches(',') == AUTO_INCREMENT)
        {
            if let Some(serial) = tokens.get(1).and_then(|t| serial_type(t)) {
                tokens[1] = Cow::Borrowed(serial);
            }
            trailing_comma = tokens.remove(pos).ends_with(',');
        }

        if tokens.is_empty() {
            return String::new();
        }

        let mut joined = tokens.join(" ");
        if trailing_comma {
            joined.push(',');
        }
        if unquoted.starts_with(char::is_whitespace) {
            format!(" {}", joined)
        } else {
            joined
        }
    }
}
