//! Section parsing: recover structure from the model's free-text reply.
//!
//! ## Why is this necessary?
//!
//! The upstream model is *prompted*, not constrained, to follow the layout in
//! [`crate::prompts`]. Real replies drift: headings gain colons or markdown
//! decoration, bullets appear and disappear, the comparison table sometimes
//! arrives as prose. This module turns whatever came back into the fixed
//! [`ParsedReading`] shape using anchor-label segmentation.
//!
//! ## Algorithm
//!
//! 1. **Top-level segmentation** — locate the four section anchors
//!    case-insensitively; a section's span runs from its anchor to the first
//!    following terminator anchor, or end of input. A missing anchor yields
//!    an empty span, never an error.
//! 2. **Per-hand line extraction** — the same anchor-to-next-anchor rule over
//!    the four line labels, scoped to the hand's span. The fate line is last,
//!    so its terminator set also includes the section anchors that open the
//!    next block.
//! 3. **Cleanup** — strip edge decoration (bullets, heading marks, colons,
//!    asterisks), a leading section-label echo, and a trailing bare
//!    enumeration marker. An empty result means "absent".
//! 4. **Comparison grid** — parse a pipe-delimited grid if present (first
//!    qualifying row is the header and is discarded; separator-only rows and
//!    short rows are dropped silently); otherwise fall back to a canonical
//!    four-trait table built from the first clause of each per-hand line.
//! 5. **Assembly** — absent fields become fixed placeholder strings, so the
//!    structure is always fully populated and display code never branches on
//!    missing data.
//!
//! The parser never fails. Partial information beats a blocked render: the
//! output exists purely for display.

use crate::output::{HandReading, ParsedReading, TraitRecord};
use crate::prompts::{
    LINE_FATE, LINE_HEAD, LINE_HEART, LINE_LIFE, SECTION_COMPARISON, SECTION_LEFT_HAND,
    SECTION_RIGHT_HAND, SECTION_SUMMARY,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

// ── Placeholders ─────────────────────────────────────────────────────────

pub const HEART_PLACEHOLDER: &str =
    "Heart line analysis not specifically identified in the reading.";
pub const HEAD_PLACEHOLDER: &str =
    "Head line analysis not specifically identified in the reading.";
pub const LIFE_PLACEHOLDER: &str =
    "Life line analysis not specifically identified in the reading.";
pub const FATE_PLACEHOLDER: &str =
    "Fate line analysis not specifically identified in the reading.";
pub const SUMMARY_PLACEHOLDER: &str = "Summary not specifically identified in the reading.";
/// Comparison cell shown when a trait has no extractable short description.
pub const COMPARISON_CELL_PLACEHOLDER: &str = "See detailed analysis above";

// ── Cleanup patterns ─────────────────────────────────────────────────────

/// Leading/trailing markdown decoration and label punctuation.
static RE_EDGE_DECOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\*\-_#:]+|[\s\*\-_#:]+$").unwrap());

/// A section-label echo the model sometimes repeats at the start of a span.
/// Longest alternative first: the regex engine prefers the earliest listed
/// branch and `SUMMARY` alone would leave `& INSIGHTS:` behind.
static RE_LABEL_ECHO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(SUMMARY & INSIGHTS|SUMMARY|INSIGHTS):\s*").unwrap());

/// A dangling enumeration marker ("2.") left at the end of a span when the
/// next numbered item was cut off by segmentation.
static RE_TRAILING_ENUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\s*$").unwrap());

/// A table row consisting only of dashes, pipes, and whitespace.
static RE_SEPARATOR_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s|\-]+$").unwrap());

// ── Entry point ──────────────────────────────────────────────────────────

/// Parse the raw reply into the fixed reading shape. Total: every input,
/// including the empty string, produces a fully populated result.
pub fn parse_reading(raw: &str) -> ParsedReading {
    let left_span = section_span(
        raw,
        SECTION_LEFT_HAND,
        &[SECTION_RIGHT_HAND, SECTION_COMPARISON, SECTION_SUMMARY],
    );
    let right_span = section_span(
        raw,
        SECTION_RIGHT_HAND,
        &[SECTION_COMPARISON, SECTION_SUMMARY],
    );
    let comparison_span = section_span(raw, SECTION_COMPARISON, &[SECTION_SUMMARY]);
    let summary_span = section_span(raw, SECTION_SUMMARY, &[]);

    debug!(
        "Sections found: left={} right={} comparison={} summary={}",
        !left_span.is_empty(),
        !right_span.is_empty(),
        !comparison_span.is_empty(),
        !summary_span.is_empty()
    );

    let left_lines = hand_lines(left_span);
    let right_lines = hand_lines(right_span);

    let mut comparison = parse_comparison_grid(&clean_fragment(comparison_span));
    if comparison.is_empty() {
        comparison = fallback_comparison(&left_lines, &right_lines);
    }

    let summary = non_empty(clean_fragment(summary_span))
        .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string());

    ParsedReading {
        left_hand: materialize_hand(left_lines),
        right_hand: materialize_hand(right_lines),
        comparison,
        summary,
    }
}

// ── Step 1–2: anchor segmentation ────────────────────────────────────────

/// Byte range of the first case-insensitive occurrence of `label` in `text`.
///
/// ASCII-lowercasing maps bytes one-to-one, so offsets into the lowered copy
/// are valid in the original.
fn find_anchor(text: &str, label: &str) -> Option<(usize, usize)> {
    let start = text
        .to_ascii_lowercase()
        .find(&label.to_ascii_lowercase())?;
    Some((start, start + label.len()))
}

/// Span from the end of `anchor` to the earliest following terminator, or
/// end of input. Missing anchor yields the empty span.
fn section_span<'a>(text: &'a str, anchor: &str, terminators: &[&str]) -> &'a str {
    let Some((_, anchor_end)) = find_anchor(text, anchor) else {
        return "";
    };
    let rest = &text[anchor_end..];
    let span_end = terminators
        .iter()
        .filter_map(|t| find_anchor(rest, t).map(|(start, _)| start))
        .min()
        .unwrap_or(rest.len());
    &rest[..span_end]
}

/// Cleaned per-line texts for one hand span, in heart/head/life/fate order.
/// `None` means the line could not be extracted or cleaned to anything.
fn hand_lines(span: &str) -> [Option<String>; 4] {
    let heart = section_span(span, LINE_HEART, &[LINE_HEAD, LINE_LIFE, LINE_FATE]);
    let head = section_span(span, LINE_HEAD, &[LINE_HEART, LINE_LIFE, LINE_FATE]);
    let life = section_span(span, LINE_LIFE, &[LINE_HEART, LINE_HEAD, LINE_FATE]);
    // The fate line is last in the layout; if the model omitted a blank line
    // before the next section heading, these anchors bound it instead.
    let fate = section_span(
        span,
        LINE_FATE,
        &[
            LINE_HEART,
            LINE_HEAD,
            LINE_LIFE,
            SECTION_RIGHT_HAND,
            SECTION_COMPARISON,
        ],
    );

    [heart, head, life, fate].map(|s| non_empty(clean_fragment(s)))
}

fn materialize_hand(lines: [Option<String>; 4]) -> HandReading {
    let [heart, head, life, fate] = lines;
    HandReading {
        heart_line: heart.unwrap_or_else(|| HEART_PLACEHOLDER.to_string()),
        head_line: head.unwrap_or_else(|| HEAD_PLACEHOLDER.to_string()),
        life_line: life.unwrap_or_else(|| LIFE_PLACEHOLDER.to_string()),
        fate_line: fate.unwrap_or_else(|| FATE_PLACEHOLDER.to_string()),
    }
}

// ── Step 3: cleanup ──────────────────────────────────────────────────────

/// Strip decoration from an extracted span, yielding plain descriptive text.
fn clean_fragment(span: &str) -> String {
    let s = span.trim();
    let s = RE_EDGE_DECOR.replace_all(s, "");
    let s = RE_LABEL_ECHO.replace(&s, "");
    let s = RE_TRAILING_ENUM.replace(&s, "");
    s.trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// ── Step 4: comparison table ─────────────────────────────────────────────

/// Parse a pipe-delimited grid into trait records.
///
/// The first row with three populated cells is the header and is discarded —
/// by position, not by content, so a lone `| Heart Line | calm | calm |`
/// with no separator row still counts as the header and yields no records.
/// Separator-only rows are skipped entirely; rows with fewer than three
/// populated cells are dropped silently.
pub fn parse_comparison_grid(content: &str) -> Vec<TraitRecord> {
    if !content.contains('|') {
        return Vec::new();
    }

    let rows: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|row| !row.is_empty() && row.contains('|'))
        .filter(|row| !RE_SEPARATOR_ROW.is_match(row))
        .collect();

    let mut records = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let cells: Vec<&str> = row
            .split('|')
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect();

        if cells.len() >= 3 && index > 0 {
            records.push(TraitRecord {
                name: cells[0].to_string(),
                left: cells[1].to_string(),
                right: cells[2].to_string(),
            });
        }
    }
    records
}

/// Canonical four-trait table built from the per-hand line texts when no
/// usable grid was found. A trait with no data on a side renders the fixed
/// placeholder cell rather than being omitted.
fn fallback_comparison(
    left: &[Option<String>; 4],
    right: &[Option<String>; 4],
) -> Vec<TraitRecord> {
    let names = [LINE_HEART, LINE_HEAD, LINE_LIFE, LINE_FATE];
    names
        .iter()
        .enumerate()
        .map(|(i, name)| TraitRecord {
            name: name.to_string(),
            left: clause_or_placeholder(&left[i]),
            right: clause_or_placeholder(&right[i]),
        })
        .collect()
}

fn clause_or_placeholder(text: &Option<String>) -> String {
    text.as_deref()
        .and_then(first_clause)
        .unwrap_or_else(|| COMPARISON_CELL_PLACEHOLDER.to_string())
}

/// First clause of a line text: the first maximal run of characters that
/// contains no colon, dash, period, or asterisk, trimmed.
fn first_clause(text: &str) -> Option<String> {
    let stops = ['.', ':', '-', '*'];
    let start = text.find(|c: char| !stops.contains(&c))?;
    let rest = &text[start..];
    let end = rest.find(|c: char| stops.contains(&c)).unwrap_or(rest.len());
    non_empty(rest[..end].trim().to_string())
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_READING: &str = "\
LEFT HAND ANALYSIS:
- Heart Line: deep and curved, showing emotional warmth
- Head Line: long and straight, a methodical thinker
- Life Line: strong arc around the thumb
- Fate Line: faint but present

RIGHT HAND ANALYSIS:
- Heart Line: steadier than the left, settled affections
- Head Line: slightly forked, adaptable reasoning
- Life Line: vivid and unbroken
- Fate Line: deepens toward the middle

HAND COMPARISON:

| Trait | Left Hand (Inherent) | Right Hand (Developed) |
| ----- | -------------------- | ---------------------- |
| Heart Line | warm, open | settled, steady |
| Head Line | methodical | adaptable |
| Life Line | strong arc | vivid, unbroken |
| Fate Line | faint | deepening |

SUMMARY:
A grounded nature with growing clarity of purpose.
";

    #[test]
    fn full_reading_populates_every_field() {
        let parsed = parse_reading(FULL_READING);

        assert_eq!(
            parsed.left_hand.heart_line,
            "deep and curved, showing emotional warmth"
        );
        assert_eq!(parsed.left_hand.fate_line, "faint but present");
        assert_eq!(
            parsed.right_hand.head_line,
            "slightly forked, adaptable reasoning"
        );
        assert_eq!(
            parsed.summary,
            "A grounded nature with growing clarity of purpose."
        );

        assert_eq!(parsed.comparison.len(), 4);
        assert_eq!(parsed.comparison[0].name, "Heart Line");
        assert_eq!(parsed.comparison[0].left, "warm, open");
        assert_eq!(parsed.comparison[3].right, "deepening");

        // Nothing degraded to a placeholder.
        for text in [
            &parsed.left_hand.heart_line,
            &parsed.left_hand.head_line,
            &parsed.left_hand.life_line,
            &parsed.left_hand.fate_line,
            &parsed.right_hand.heart_line,
            &parsed.right_hand.head_line,
            &parsed.right_hand.life_line,
            &parsed.right_hand.fate_line,
        ] {
            assert!(!text.contains("not specifically identified"), "got: {text}");
        }
    }

    #[test]
    fn worked_example_from_mixed_case_headings() {
        let raw = "LEFT HAND ANALYSIS\n- Heart Line: steady and deep\nHEAD LINE: sharp\n\
                   RIGHT HAND ANALYSIS\nHeart Line: open\nSUMMARY: all well";
        let parsed = parse_reading(raw);
        assert_eq!(parsed.left_hand.heart_line, "steady and deep");
        assert_eq!(parsed.left_hand.head_line, "sharp");
        assert_eq!(parsed.right_hand.heart_line, "open");
        assert_eq!(parsed.summary, "all well");
    }

    #[test]
    fn missing_anchors_degrade_to_placeholders() {
        let raw = "RIGHT HAND ANALYSIS:\n- Heart Line: warm\nSUMMARY: short one";
        let parsed = parse_reading(raw);

        assert_eq!(parsed.left_hand.heart_line, HEART_PLACEHOLDER);
        assert_eq!(parsed.left_hand.head_line, HEAD_PLACEHOLDER);
        assert_eq!(parsed.left_hand.life_line, LIFE_PLACEHOLDER);
        assert_eq!(parsed.left_hand.fate_line, FATE_PLACEHOLDER);
        assert_eq!(parsed.right_hand.heart_line, "warm");
        assert_eq!(parsed.right_hand.head_line, HEAD_PLACEHOLDER);
        assert_eq!(parsed.summary, "short one");
    }

    #[test]
    fn empty_input_is_fully_placeholder() {
        let parsed = parse_reading("");
        assert_eq!(parsed.left_hand.heart_line, HEART_PLACEHOLDER);
        assert_eq!(parsed.right_hand.fate_line, FATE_PLACEHOLDER);
        assert_eq!(parsed.summary, SUMMARY_PLACEHOLDER);
        // Canonical fallback table, every cell the placeholder.
        assert_eq!(parsed.comparison.len(), 4);
        for record in &parsed.comparison {
            assert_eq!(record.left, COMPARISON_CELL_PLACEHOLDER);
            assert_eq!(record.right, COMPARISON_CELL_PLACEHOLDER);
        }
    }

    #[test]
    fn cleanup_strips_edge_decoration_and_trailing_enum() {
        assert_eq!(clean_fragment(" :* - steady and deep"), "steady and deep");
        assert_eq!(clean_fragment("**bold claim**"), "bold claim");
        assert_eq!(clean_fragment("firm and long 2. "), "firm and long");
        assert_eq!(clean_fragment("### : text :-"), "text");
        assert_eq!(clean_fragment("   "), "");
    }

    #[test]
    fn cleanup_strips_label_echo() {
        assert_eq!(clean_fragment("SUMMARY: the gist"), "the gist");
        assert_eq!(clean_fragment("Summary & Insights: the gist"), "the gist");
    }

    #[test]
    fn grid_header_discarded_by_position() {
        // The only row is the header by the first-data-row convention, even
        // though it looks like data and no separator row is present.
        let records = parse_comparison_grid("| Heart Line | calm | calm |");
        assert!(records.is_empty());
    }

    #[test]
    fn grid_separator_rows_and_short_rows_dropped() {
        let content = "\
| Trait | Left | Right |
| ----- | ---- | ----- |
| Heart Line | warm | steady |
| malformed row |
| Life Line | strong | vivid |";
        let records = parse_comparison_grid(content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Heart Line");
        assert_eq!(records[1].name, "Life Line");
    }

    #[test]
    fn grid_without_pipes_yields_nothing() {
        assert!(parse_comparison_grid("the hands differ in warmth").is_empty());
    }

    #[test]
    fn prose_comparison_falls_back_to_canonical_table() {
        let raw = "\
LEFT HAND ANALYSIS:
- Heart Line: warm and generous. Curves upward near the index finger.
- Head Line: patient thinker
RIGHT HAND ANALYSIS:
- Heart Line: guarded but loyal
HAND COMPARISON:
The left hand shows inherited warmth while the right shows developed caution.
SUMMARY:
Balance of feeling and thought.";
        let parsed = parse_reading(raw);

        assert_eq!(parsed.comparison.len(), 4);
        // First clause only: text up to the first period.
        assert_eq!(parsed.comparison[0].left, "warm and generous");
        assert_eq!(parsed.comparison[0].right, "guarded but loyal");
        assert_eq!(parsed.comparison[1].left, "patient thinker");
        // Traits absent on both sides render the placeholder cell.
        assert_eq!(parsed.comparison[2].left, COMPARISON_CELL_PLACEHOLDER);
        assert_eq!(parsed.comparison[3].right, COMPARISON_CELL_PLACEHOLDER);
    }

    #[test]
    fn anchors_match_case_insensitively() {
        let raw = "left hand analysis\nheart line: quiet\nsummary: ok";
        let parsed = parse_reading(raw);
        assert_eq!(parsed.left_hand.heart_line, "quiet");
        assert_eq!(parsed.summary, "ok");
    }

    #[test]
    fn first_clause_skips_leading_stops() {
        assert_eq!(first_clause(": warm, open. More."), Some("warm, open".into()));
        assert_eq!(first_clause("...."), None);
        assert_eq!(first_clause("plain"), Some("plain".into()));
    }
}
