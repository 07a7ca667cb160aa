//! String scrubbing: replace every detected sensitive substring with its token.
//!
//! Scrubbing is a fold over the ordered pattern library. Each pattern scans
//! the whole output of the previous one, with two rules for well-formed tokens
//! already in the text:
//!
//! - a match that starts inside a token is skipped, so digests are never
//!   re-tokenized (an all-digit digest looks like an account number)
//! - a match that ends inside a token is widened to the end of that token
//!
//! Only the URL pattern can run into a token, since `\S` is the only class
//! that admits `[`. A URL whose host or path was tokenized by an earlier
//! pattern is therefore replaced as a whole, inner tokens included.
//!
//! Input that already is a well-formed token passes through unchanged.

use crate::error::{RedactionError, Result};
use crate::hash::Tokenizer;
use crate::patterns::{self, PatternKind, SensitivePattern};
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::ops::Range;

/// Per-kind match counts collected while scrubbing.
///
/// Holds counts only; matched text is never retained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrubReport {
    counts: BTreeMap<PatternKind, usize>,
    total: usize,
}

impl ScrubReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` replacements of `kind`.
    pub fn record(&mut self, kind: PatternKind, count: usize) {
        if count == 0 {
            return;
        }
        *self.counts.entry(kind).or_insert(0) += count;
        self.total += count;
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: &ScrubReport) {
        for (kind, count) in &other.counts {
            self.record(*kind, *count);
        }
    }

    /// Replacements made for `kind`.
    pub fn count(&self, kind: PatternKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total replacements across all kinds.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether nothing was replaced.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterate over (kind, count) pairs in library order.
    pub fn iter(&self) -> impl Iterator<Item = (PatternKind, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl std::fmt::Display for ScrubReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for (kind, count) in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}={}", kind, count)?;
            first = false;
        }
        Ok(())
    }
}

/// Applies the pattern library to single strings.
#[derive(Debug, Clone)]
pub struct Scrubber {
    tokenizer: Tokenizer,
    token_re: Regex,
    patterns: &'static [SensitivePattern],
}

impl Scrubber {
    /// Build a scrubber over the standard pattern library.
    pub fn new(tokenizer: Tokenizer) -> Result<Self> {
        let token_re = Regex::new(&patterns::token_pattern(tokenizer.digest_len()))
            .map_err(|e| RedactionError::PatternError(e.to_string()))?;
        Ok(Self {
            tokenizer,
            token_re,
            patterns: patterns::library(),
        })
    }

    /// The tokenizer used for replacements.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Scrub a string, returning the rewritten text.
    pub fn scrub(&self, input: &str) -> String {
        let mut report = ScrubReport::new();
        self.scrub_counting(input, &mut report)
    }

    /// Scrub a string and report how many replacements of each kind were made.
    pub fn scrub_with_report(&self, input: &str) -> (String, ScrubReport) {
        let mut report = ScrubReport::new();
        let output = self.scrub_counting(input, &mut report);
        (output, report)
    }

    pub(crate) fn scrub_counting(&self, input: &str, report: &mut ScrubReport) -> String {
        let mut current = Cow::Borrowed(input);
        for pattern in self.patterns {
            if let Some(rewritten) = self.apply(&current, pattern, report) {
                current = Cow::Owned(rewritten);
            }
        }
        current.into_owned()
    }

    /// Run one pattern over `input`, honouring the tokens already in it.
    ///
    /// Returns `None` when the pattern made no replacement.
    fn apply(
        &self,
        input: &str,
        pattern: &SensitivePattern,
        report: &mut ScrubReport,
    ) -> Option<String> {
        if !pattern.regex().is_match(input) {
            return None;
        }

        let tokens: Vec<Range<usize>> =
            self.token_re.find_iter(input).map(|m| m.range()).collect();
        let mut out = String::with_capacity(input.len());
        let mut hits = 0;
        let mut last = 0;
        let mut pos = 0;
        while let Some(m) = pattern.regex().find_at(input, pos) {
            if let Some(token) = enclosing(&tokens, m.start()) {
                pos = token.end;
                continue;
            }
            let end = enclosing(&tokens, m.end()).map_or(m.end(), |token| token.end);

            out.push_str(&input[last..m.start()]);
            let token = self.tokenizer.tokenize(pattern.kind(), &input[m.start()..end]);
            // Writing to a String cannot fail.
            let _ = write!(out, "{}", token);
            hits += 1;
            last = end;
            pos = end;
        }

        if hits == 0 {
            return None;
        }
        out.push_str(&input[last..]);
        report.record(pattern.kind(), hits);
        Some(out)
    }
}

/// The token strictly containing `offset`, if any. `tokens` is sorted.
fn enclosing(tokens: &[Range<usize>], offset: usize) -> Option<&Range<usize>> {
    let index = tokens.partition_point(|token| token.end <= offset);
    tokens.get(index).filter(|token| token.start < offset)
}
