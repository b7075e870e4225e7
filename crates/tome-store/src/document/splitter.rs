use super::types::{Chunk, Document};

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 7500,
            chunk_overlap: 100,
        }
    }
}

/// Sliding-window chunker with boundary-aware cuts.
///
/// Pages are concatenated (a newline marks each page boundary) and split
/// into windows of at most `chunk_size` characters, each overlapping the
/// previous by up to `chunk_overlap`. The cut point prefers a paragraph
/// break, then a line break, then a space within the trailing half of the
/// window; only when none exists does it fall back to a hard character cut.
/// Mid-sentence truncation degrades retrieval quality, so the softer cuts
/// come first.
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Split a document into overlapping chunks.
    ///
    /// An empty document yields an empty `Vec`; whether that is fatal is the
    /// caller's decision. Identical input and config always yield the same
    /// chunk sequence.
    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        // (char, 1-based page number) for the concatenated text
        let mut chars: Vec<(char, usize)> = Vec::new();
        for page in &document.pages {
            if page.text.is_empty() {
                continue;
            }
            if let Some(&(_, prev_page)) = chars.last() {
                chars.push(('\n', prev_page));
            }
            chars.extend(page.text.chars().map(|c| (c, page.number)));
        }

        let total = chars.len();
        if total == 0 {
            return Vec::new();
        }

        let size = self.config.chunk_size.max(1);
        let overlap = self.config.chunk_overlap.min(size.saturating_sub(1));

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut index = 0;
        loop {
            let hard_end = (start + size).min(total);
            let end = if hard_end == total {
                total
            } else {
                let floor = (start + size / 2).max(start + 1);
                boundary_cut(&chars, floor, hard_end)
            };

            chunks.push(Chunk {
                content: chars[start..end].iter().map(|&(c, _)| c).collect(),
                chunk_index: index,
                char_start: start,
                char_end: end,
                page_start: chars[start].1,
                page_end: chars[end - 1].1,
                metadata: document.metadata.clone(),
            });

            if end == total {
                break;
            }
            index += 1;
            // Step back by the overlap, but always make forward progress.
            start = end.saturating_sub(overlap).max(start + 1);
        }

        chunks
    }
}

/// Best cut position in `(floor..=hard_end]`, scanning backwards so the cut
/// lands as late as possible. The separator stays with the earlier chunk.
fn boundary_cut(chars: &[(char, usize)], floor: usize, hard_end: usize) -> usize {
    for p in (floor..=hard_end).rev() {
        if p >= 2 && chars[p - 1].0 == '\n' && chars[p - 2].0 == '\n' {
            return p;
        }
    }
    for p in (floor..=hard_end).rev() {
        if chars[p - 1].0 == '\n' {
            return p;
        }
    }
    for p in (floor..=hard_end).rev() {
        if chars[p - 1].0 == ' ' {
            return p;
        }
    }
    hard_end
}
