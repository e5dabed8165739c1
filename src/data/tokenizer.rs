//! Quote-aware splitting of one INSERT tuple into its values.
//!
//! MySQL string literals may contain commas, so a plain split on `,` can cut a
//! literal into several fragments. The tokenizer splits naively and then
//! glues fragments back together while a quoted literal is still open.
//!
//! Known limitations: an escaped quote (`\'`) at the end of a fragment is
//! taken as the closing quote, and a fragment that starts with a quote while
//! a literal is still open begins a new value.

const QUOTE: char = '\'';
const LONE_QUOTE: &str = "'";

/// Whether the last accumulated value is an unterminated string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    Outside,
    Inside,
}

/// Splits comma-separated value lists, rejoining fragments of quoted strings.
#[derive(Debug)]
pub struct TupleTokenizer {
    values: Vec<String>,
    state: QuoteState,
}

impl Default for TupleTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TupleTokenizer {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            state: QuoteState::Outside,
        }
    }

    pub fn state(&self) -> QuoteState {
        self.state
    }

    /// Feed the next comma-delimited fragment.
    pub fn push_fragment(&mut self, fragment: &str) {
        let inside = self.state == QuoteState::Inside;

        self.state = if fragment == LONE_QUOTE {
            // A literal starting or ending with a comma leaves its quote alone
            if inside && self.append_to_last(fragment) {
                QuoteState::Outside
            } else {
                self.values.push(fragment.to_string());
                QuoteState::Inside
            }
        } else if fragment.starts_with(QUOTE) {
            self.values.push(fragment.to_string());
            if fragment.ends_with(QUOTE) {
                self.state
            } else {
                QuoteState::Inside
            }
        } else if inside && self.append_to_last(fragment) {
            if fragment.ends_with(QUOTE) {
                QuoteState::Outside
            } else {
                QuoteState::Inside
            }
        } else {
            self.values.push(fragment.to_string());
            QuoteState::Outside
        };
    }

    /// Re-attach a fragment that the naive split cut off the open literal.
    fn append_to_last(&mut self, fragment: &str) -> bool {
        match self.values.last_mut() {
            Some(last) => {
                last.push(',');
                last.push_str(fragment);
                true
            }
            None => false,
        }
    }

    pub fn finish(self) -> Vec<String> {
        self.values
    }
}

/// Split a tuple body such as `1,'a, b',NULL` into its values.
pub fn split_values(tuple: &str) -> Vec<String> {
    let mut tokenizer = TupleTokenizer::new();
    for fragment in tuple.split(',') {
        tokenizer.push_fragment(fragment);
    }
    tokenizer.finish()
}
