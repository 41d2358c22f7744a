// stylepipe-core/src/dedupe.rs
//! Selector deduplication for compiled stylesheets.
//!
//! Selector algebra in the preprocessor expands the general-sibling combinator
//! (`~`) by inlining its operands. Under any operator other than OR/NAND a
//! shared sub-term is emitted twice, e.g. `.a ~ .b ~ .a`. This module collapses
//! the trailing repeat with a purely textual pattern; no CSS is parsed, so
//! input that happens to look like a duplicate is collapsed as well.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;

use fancy_regex::{Regex, RegexBuilder};
use lazy_static::lazy_static;
use log::{debug, warn};

/// Matches `<start|newline|"~ "><A>< ~middle>? ~ <A>`.
///
/// * group 1: the anchor (start of text, a newline, or a preceding `~ `)
/// * group 2: one bare selector term, no `~`, `,` or line separators
/// * group 3: an optional ` ~` clause, no `,` or `{`
pub const DUPLICATE_SELECTOR_PATTERN: &str = r"(^|\n|~ )([^~,\n\r]+)( ~[^,{]+)? ~ \2";

/// Keeps the anchor, the first occurrence and the middle clause.
pub const DUPLICATE_SELECTOR_REPLACEMENT: &str = "${1}${2}${3}";

/// Backtracking budget for one search over a whole stylesheet.
///
/// fancy-regex counts every backtrack of a search, including each skipped
/// start position, so its default of one million is spent by a few hundred
/// kilobytes of CSS. Cost grows linearly with ordinary input; this allows
/// stylesheets in the hundreds of megabytes and long `~` chains.
pub const CLEANUP_BACKTRACK_LIMIT: usize = 1_000_000_000;

lazy_static! {
    static ref DUPLICATE_SELECTOR_RE: Regex =
        build_cleanup_regex(DUPLICATE_SELECTOR_PATTERN).expect("duplicate selector pattern is valid");
}

/// Compiles a cleanup pattern with the stylesheet-sized backtrack budget.
pub fn build_cleanup_regex(pattern: &str) -> Result<Regex, fancy_regex::Error> {
    RegexBuilder::new(pattern)
        .backtrack_limit(CLEANUP_BACKTRACK_LIMIT)
        .build()
}

/// Runs one global, non-overlapping, left-to-right replace over `text`.
///
/// Returns the input borrowed when nothing matched. If the regex engine gives
/// up, the failure is logged at warn level and the text is returned unchanged.
pub fn collapse_pass(text: &str) -> Cow<'_, str> {
    collapse_with(&DUPLICATE_SELECTOR_RE, DUPLICATE_SELECTOR_REPLACEMENT, text)
}

/// Collapses duplicated selector fragments until the text is stable.
///
/// Output from a single upstream duplication is settled after the first pass;
/// further passes only happen for degenerate input such as `.a ~ .a ~ .a`.
/// Every effective pass strictly shortens the text, so this terminates.
pub fn deduplicate_selectors(text: &str) -> String {
    let mut current = text.to_string();
    let mut passes = 0usize;
    loop {
        let next = match collapse_pass(&current) {
            Cow::Borrowed(_) => break,
            Cow::Owned(next) => next,
        };
        passes += 1;
        if next == current {
            break;
        }
        current = next;
    }
    debug!(
        "Selector deduplication finished after {} effective pass(es); {} -> {} bytes.",
        passes,
        text.len(),
        current.len()
    );
    current
}

/// Applies `re` once over `text`, expanding `replacement` for each match.
pub(crate) fn collapse_with<'t>(re: &Regex, replacement: &str, text: &'t str) -> Cow<'t, str> {
    match replace_counted(re, replacement, text) {
        Ok((result, _)) => result,
        Err(e) => {
            warn!("Pattern '{}' could not be applied, leaving text unchanged: {}", re.as_str(), e);
            Cow::Borrowed(text)
        }
    }
}

/// One global replace that also reports how many matches were rewritten.
///
/// Engine errors are returned, never swallowed.
pub(crate) fn replace_counted<'t>(
    re: &Regex,
    replacement: &str,
    text: &'t str,
) -> Result<(Cow<'t, str>, usize), fancy_regex::Error> {
    let mut out = String::new();
    let mut last = 0;
    let mut count = 0usize;

    for caps in re.captures_iter(text) {
        let caps = caps?;
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        caps.expand(replacement, &mut out);
        last = whole.end();
        count += 1;
    }

    if count == 0 {
        return Ok((Cow::Borrowed(text), 0));
    }
    out.push_str(&text[last..]);
    Ok((Cow::Owned(out), count))
}
