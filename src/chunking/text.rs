//! Paragraph-aligned character-window chunking.
//!
//! Paragraphs are packed into chunks up to `chunk_chars` characters. A
//! paragraph longer than that is cut at word boundaries. Each new chunk
//! starts with the tail of the previous one when it fits.

use super::{ChunkingConfig, TextChunk};
use regex::Regex;
use std::sync::OnceLock;

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ \t]*\n").expect("valid paragraph regex"))
}

/// Text chunker.
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    /// Split `text` into ordered chunks. Blank input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let limit = self.config.chunk_chars;
        let normalized = text.replace("\r\n", "\n");

        let pieces: Vec<String> = paragraph_break()
            .split(&normalized)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .flat_map(|p| split_long(p, limit))
            .collect();

        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for piece in pieces {
            if current.is_empty() {
                current = piece;
                continue;
            }

            if char_len(&current) + 2 + char_len(&piece) <= limit {
                current.push_str("\n\n");
                current.push_str(&piece);
                continue;
            }

            let tail = overlap_tail(&current, self.config.chunk_overlap).to_string();
            chunks.push(std::mem::take(&mut current));

            current = if !tail.is_empty() && char_len(&tail) + 2 + char_len(&piece) <= limit {
                format!("{}\n\n{}", tail, piece)
            } else {
                piece
            };
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, content)| TextChunk {
                content,
                order: i as i32,
            })
            .collect()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Cut a paragraph into pieces of at most `limit` chars at word boundaries.
fn split_long(paragraph: &str, limit: usize) -> Vec<String> {
    if char_len(paragraph) <= limit {
        return vec![paragraph.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in paragraph.split_whitespace() {
        let mut word = word.to_string();

        // A single word longer than the limit is hard-cut.
        while char_len(&word) > limit {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            let cut: String = word.chars().take(limit).collect();
            word = word.chars().skip(limit).collect();
            pieces.push(cut);
        }

        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            current = word;
        } else if char_len(&current) + 1 + char_len(&word) <= limit {
            current.push(' ');
            current.push_str(&word);
        } else {
            pieces.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

/// The last `overlap` chars of `chunk`, starting at a word boundary.
fn overlap_tail(chunk: &str, overlap: usize) -> &str {
    if overlap == 0 {
        return "";
    }

    let total = char_len(chunk);
    if total <= overlap {
        return chunk;
    }

    let start = chunk
        .char_indices()
        .nth(total - overlap)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let tail = &chunk[start..];

    match tail.find(char::is_whitespace) {
        Some(ws) => tail[ws..].trim_start(),
        None => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_chars: usize, chunk_overlap: usize) -> TextChunker {
        TextChunker::new(ChunkingConfig {
            chunk_chars,
            chunk_overlap,
        })
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunker(100, 20).chunk("First paragraph.\n\nSecond paragraph.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "First paragraph.\n\nSecond paragraph.");
        assert_eq!(chunks[0].order, 0);
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        assert!(chunker(100, 20).chunk("  \n\n \r\n ").is_empty());
    }

    #[test]
    fn test_paragraphs_are_packed_and_bounded() {
        let paragraphs: Vec<String> = (0..10)
            .map(|i| format!("Paragraph {} talks about policy number {}.", i, i))
            .collect();
        let text = paragraphs.join("\n\n");

        let chunks = chunker(120, 0).chunk(&text);
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunk.content.chars().count() <= 120);
            assert_eq!(chunk.order, i as i32);
        }

        // Every paragraph survives intact in some chunk.
        for p in &paragraphs {
            assert!(chunks.iter().any(|c| c.content.contains(p.as_str())));
        }
    }

    #[test]
    fn test_overlap_repeats_previous_tail() {
        let text = "alpha beta gamma delta epsilon\n\nzeta eta theta iota kappa";
        let chunks = chunker(40, 12).chunk(text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].content.starts_with("epsilon"));
        assert!(chunks[1].content.ends_with("zeta eta theta iota kappa"));
    }

    #[test]
    fn test_overlap_carries_multibyte_tail() {
        let text = "café au lait\n\nthé à la menthe\n\nchocolat chaud";
        let chunks = chunker(30, 10).chunk(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "café au lait\n\nthé à la menthe");
        assert_eq!(chunks[1].content, "la menthe\n\nchocolat chaud");
    }

    #[test]
    fn test_long_paragraph_split_at_words() {
        let text = "word ".repeat(50);
        let chunks = chunker(32, 0).chunk(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 32);
            assert!(!chunk.content.starts_with(' '));
        }
    }

    #[test]
    fn test_overlap_larger_than_chunk_is_clamped() {
        let config = ChunkingConfig {
            chunk_chars: 100,
            chunk_overlap: 500,
        }
        .normalized();
        assert_eq!(config.chunk_overlap, 50);
    }

    #[test]
    fn test_overlap_tail_is_word_aligned() {
        assert_eq!(overlap_tail("one two three", 7), "three");
        assert_eq!(overlap_tail("short", 10), "short");
        assert_eq!(overlap_tail("anything", 0), "");
    }
}
