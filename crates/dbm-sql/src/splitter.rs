//! Migration script statement splitting
//!
//! Two strategies are available. [`SplitStrategy::Naive`] cuts the script at
//! every `;` character, so a separator inside a string literal or comment
//! produces broken fragments that fail when executed.
//! [`SplitStrategy::Tokenized`] runs the dialect tokenizer first and only
//! cuts at `;` tokens.
//!
//! Both strategies drop fragments that contain nothing but whitespace and
//! comments. The naive strategy keeps a kept fragment's text unchanged,
//! comments included.

use crate::dialect::{DuckDbDialect, SqlDialect};
use crate::error::SqlResult;
use dbm_core::SplitStrategy;
use sqlparser::tokenizer::{Location, Token};

/// Splits a migration script into individually executable statements
pub struct StatementSplitter {
    strategy: SplitStrategy,
    dialect: Box<dyn SqlDialect>,
}

impl StatementSplitter {
    /// Create a splitter using the DuckDB dialect
    pub fn new(strategy: SplitStrategy) -> Self {
        Self::with_dialect(strategy, Box::new(DuckDbDialect::new()))
    }

    /// Create a splitter using a specific dialect for tokenization
    pub fn with_dialect(strategy: SplitStrategy, dialect: Box<dyn SqlDialect>) -> Self {
        Self { strategy, dialect }
    }

    /// Naive splitter
    pub fn naive() -> Self {
        Self::new(SplitStrategy::Naive)
    }

    /// Tokenizer-aware splitter
    pub fn tokenized() -> Self {
        Self::new(SplitStrategy::Tokenized)
    }

    /// Strategy in use
    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    /// Dialect used for tokenization
    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    /// Split `script` into trimmed, non-empty statements in source order
    pub fn split(&self, script: &str) -> SqlResult<Vec<String>> {
        match self.strategy {
            SplitStrategy::Naive => Ok(split_naive(script)),
            SplitStrategy::Tokenized => self.split_tokenized(script),
        }
    }

    fn split_tokenized(&self, script: &str) -> SqlResult<Vec<String>> {
        let tokens = self.dialect.tokenize(script)?;
        let index = LineIndex::new(script);

        let mut statements = Vec::new();
        let mut start = 0;
        let mut has_code = false;

        for token in &tokens {
            match &token.token {
                Token::SemiColon => {
                    let end = index.offset(token.span.start);
                    if has_code {
                        statements.push(script[start..end].trim().to_string());
                    }
                    start = end + 1;
                    has_code = false;
                }
                Token::Whitespace(_) | Token::EOF => {}
                _ => has_code = true,
            }
        }

        if has_code {
            statements.push(script[start..].trim().to_string());
        }

        Ok(statements)
    }
}

impl Default for StatementSplitter {
    fn default() -> Self {
        Self::new(SplitStrategy::default())
    }
}

fn split_naive(script: &str) -> Vec<String> {
    script
        .split(';')
        .map(str::trim)
        .filter(|s| has_statement_text(s))
        .map(str::to_string)
        .collect()
}

/// Whether `fragment` has anything left once `--` and `/* */` comments are
/// removed. Quotes are not tracked, matching the naive split itself.
fn has_statement_text(fragment: &str) -> bool {
    let mut rest = fragment;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("--") {
            match after.find('\n') {
                Some(end) => rest = &after[end + 1..],
                None => return false,
            }
        } else if let Some(after) = rest.strip_prefix("/*") {
            match after.find("*/") {
                Some(end) => rest = &after[end + 2..],
                None => return false,
            }
        } else {
            return !rest.is_empty();
        }
    }
}

/// Maps tokenizer locations (1-based line, 1-based char column) to byte offsets
struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    fn offset(&self, location: Location) -> usize {
        let line = (location.line as usize).saturating_sub(1);
        let Some(&line_start) = self.line_starts.get(line) else {
            return self.text.len();
        };
        let column = (location.column as usize).saturating_sub(1);
        self.text[line_start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| line_start + i)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
