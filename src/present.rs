//! Presentation binding: feed parsed fragments into a display surface.
//!
//! The reading is displayed as named slots — eight per-hand line panels, the
//! comparison table, and the summary. [`ReadingSurface`] is the seam between
//! the parser's output and however the host renders it: a terminal page, an
//! HTML template, a TUI widget. Implementations receive every slot exactly
//! once per binding; because [`crate::output::ParsedReading`] is always fully
//! populated, a surface never needs a missing-data branch.
//!
//! [`reveal_words`] provides the cosmetic word-batched reveal: the upstream
//! call is not streamed, but pacing the final text out in small batches reads
//! far better than a wall of text appearing at once. It is pacing only —
//! dropping the stream loses nothing.

use crate::output::{ParsedReading, TraitRecord};
use crate::prompts::COMPARISON_HEADER;
use std::collections::HashMap;
use tokio::time::{sleep, Duration};
use tokio_stream::Stream;

/// A display slot of the reading page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    LeftHeartLine,
    LeftHeadLine,
    LeftLifeLine,
    LeftFateLine,
    RightHeartLine,
    RightHeadLine,
    RightLifeLine,
    RightFateLine,
    Comparison,
    Summary,
}

impl Slot {
    /// Every slot, in display order.
    pub const ALL: [Slot; 10] = [
        Slot::LeftHeartLine,
        Slot::LeftHeadLine,
        Slot::LeftLifeLine,
        Slot::LeftFateLine,
        Slot::RightHeartLine,
        Slot::RightHeadLine,
        Slot::RightLifeLine,
        Slot::RightFateLine,
        Slot::Comparison,
        Slot::Summary,
    ];

    /// Human-readable panel title.
    pub fn title(&self) -> &'static str {
        match self {
            Slot::LeftHeartLine | Slot::RightHeartLine => "Heart Line",
            Slot::LeftHeadLine | Slot::RightHeadLine => "Head Line",
            Slot::LeftLifeLine | Slot::RightLifeLine => "Life Line",
            Slot::LeftFateLine | Slot::RightFateLine => "Fate Line",
            Slot::Comparison => "Hand Comparison",
            Slot::Summary => "Summary",
        }
    }
}

/// Receives parsed reading fragments, one per slot.
///
/// Implementations must accept every slot; the binder writes all of them.
pub trait ReadingSurface {
    fn set_slot(&mut self, slot: Slot, text: &str);
}

/// Write every fragment of the reading into its designated slot.
pub fn bind_reading(parsed: &ParsedReading, surface: &mut dyn ReadingSurface) {
    surface.set_slot(Slot::LeftHeartLine, &parsed.left_hand.heart_line);
    surface.set_slot(Slot::LeftHeadLine, &parsed.left_hand.head_line);
    surface.set_slot(Slot::LeftLifeLine, &parsed.left_hand.life_line);
    surface.set_slot(Slot::LeftFateLine, &parsed.left_hand.fate_line);
    surface.set_slot(Slot::RightHeartLine, &parsed.right_hand.heart_line);
    surface.set_slot(Slot::RightHeadLine, &parsed.right_hand.head_line);
    surface.set_slot(Slot::RightLifeLine, &parsed.right_hand.life_line);
    surface.set_slot(Slot::RightFateLine, &parsed.right_hand.fate_line);
    surface.set_slot(
        Slot::Comparison,
        &render_comparison_table(&parsed.comparison),
    );
    surface.set_slot(Slot::Summary, &parsed.summary);
}

/// Render trait records back into a pipe table with the canonical header.
///
/// Round-trips through the grid parser: parsing a rendered table yields the
/// same records.
pub fn render_comparison_table(records: &[TraitRecord]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(COMPARISON_HEADER);
    out.push_str("\n| ----- | -------------------- | ---------------------- |\n");
    for record in records {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            record.name, record.left, record.right
        ));
    }
    out
}

/// A Markdown page surface: collects slots and renders the reading page.
#[derive(Debug, Default)]
pub struct MarkdownSurface {
    slots: HashMap<Slot, String>,
}

impl MarkdownSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the collected slots as the formatted reading page.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(2048);
        out.push_str("# Your Palm Reading\n\n## Left Hand\n\n");
        for slot in [
            Slot::LeftHeartLine,
            Slot::LeftHeadLine,
            Slot::LeftLifeLine,
            Slot::LeftFateLine,
        ] {
            self.push_panel(&mut out, slot);
        }
        out.push_str("## Right Hand\n\n");
        for slot in [
            Slot::RightHeartLine,
            Slot::RightHeadLine,
            Slot::RightLifeLine,
            Slot::RightFateLine,
        ] {
            self.push_panel(&mut out, slot);
        }
        out.push_str("## Hand Comparison\n\n");
        if let Some(table) = self.slots.get(&Slot::Comparison) {
            out.push_str(table);
            out.push('\n');
        }
        out.push_str("## Summary\n\n");
        if let Some(summary) = self.slots.get(&Slot::Summary) {
            out.push_str(summary);
            out.push('\n');
        }
        out
    }

    fn push_panel(&self, out: &mut String, slot: Slot) {
        out.push_str(&format!("### {}\n\n", slot.title()));
        if let Some(text) = self.slots.get(&slot) {
            out.push_str(text);
            out.push_str("\n\n");
        }
    }
}

impl ReadingSurface for MarkdownSurface {
    fn set_slot(&mut self, slot: Slot, text: &str) {
        self.slots.insert(slot, text.to_string());
    }
}

/// Yield `text` in fixed-size word batches with a fixed delay between them.
///
/// Purely cosmetic pacing for terminal display. The first batch is emitted
/// immediately; each subsequent batch waits `delay`.
pub fn reveal_words(
    text: &str,
    batch_words: usize,
    delay: Duration,
) -> impl Stream<Item = String> {
    let words: Vec<String> = text.split_whitespace().map(String::from).collect();
    let batch = batch_words.max(1);

    futures::stream::unfold((words, 0usize), move |(words, idx)| async move {
        if idx >= words.len() {
            return None;
        }
        if idx > 0 {
            sleep(delay).await;
        }
        let end = (idx + batch).min(words.len());
        let chunk = words[idx..end].join(" ");
        Some((chunk, (words, end)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse::{parse_comparison_grid, parse_reading};
    use tokio_stream::StreamExt;

    fn sample_records() -> Vec<TraitRecord> {
        vec![
            TraitRecord {
                name: "Heart Line".into(),
                left: "warm, open".into(),
                right: "settled".into(),
            },
            TraitRecord {
                name: "Head Line".into(),
                left: "methodical".into(),
                right: "adaptable".into(),
            },
        ]
    }

    struct RecordingSurface(HashMap<Slot, String>);

    impl ReadingSurface for RecordingSurface {
        fn set_slot(&mut self, slot: Slot, text: &str) {
            self.0.insert(slot, text.to_string());
        }
    }

    #[test]
    fn binder_populates_every_slot() {
        let parsed = parse_reading(""); // fully placeholder, fully populated
        let mut surface = RecordingSurface(HashMap::new());
        bind_reading(&parsed, &mut surface);

        for slot in Slot::ALL {
            let text = surface.0.get(&slot).expect("slot must be written");
            assert!(!text.is_empty(), "slot {slot:?} is empty");
        }
    }

    #[test]
    fn comparison_render_parse_round_trip() {
        let records = sample_records();
        let rendered = render_comparison_table(&records);
        let reparsed = parse_comparison_grid(&rendered);
        assert_eq!(reparsed, records);

        // And again: parsing the re-rendered grid is stable.
        let rerendered = render_comparison_table(&reparsed);
        assert_eq!(parse_comparison_grid(&rerendered), records);
    }

    #[test]
    fn markdown_surface_renders_all_sections() {
        let parsed = parse_reading(
            "LEFT HAND ANALYSIS\nHeart Line: warm\nSUMMARY: a good omen",
        );
        let mut surface = MarkdownSurface::new();
        bind_reading(&parsed, &mut surface);
        let page = surface.render();

        assert!(page.contains("## Left Hand"));
        assert!(page.contains("## Right Hand"));
        assert!(page.contains("### Heart Line"));
        assert!(page.contains("warm"));
        assert!(page.contains("## Hand Comparison"));
        assert!(page.contains("| Trait |"));
        assert!(page.contains("a good omen"));
    }

    #[tokio::test]
    async fn reveal_batches_reassemble_the_text() {
        let text = "one two three four five six seven";
        let stream = reveal_words(text, 3, Duration::from_millis(1));
        tokio::pin!(stream);

        let mut batches = Vec::new();
        while let Some(batch) = stream.next().await {
            batches.push(batch);
        }

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0], "one two three");
        assert_eq!(batches.join(" "), text);
    }

    #[tokio::test]
    async fn reveal_of_empty_text_is_empty() {
        let stream = reveal_words("", 3, Duration::from_millis(1));
        tokio::pin!(stream);
        assert!(stream.next().await.is_none());
    }
}
