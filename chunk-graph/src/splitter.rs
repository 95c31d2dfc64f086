//! Text splitting strategies.
//!
//! The chunk builder treats splitting as a black box behind the
//! [`TextSplitter`] trait: text in, ordered non-empty spans out. Two
//! implementations ship with the crate:
//!
//! - [`SentenceSplitter`]: one span per sentence, used for sentence windows
//! - [`RecursiveSplitter`]: paragraphs → lines → sentences → words, merged up
//!   to a token budget with overlap
//!
//! Any `Fn(&str, &SplitConfig) -> Vec<Span>` is also a splitter.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::SplitConfig;
use crate::document::Metadata;

/// One piece of split text with any metadata the splitter attaches.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Non-empty span text.
    pub text: String,
    /// Extra metadata merged over the inherited document metadata.
    pub metadata: Metadata,
}

impl Span {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), metadata: Metadata::new() }
    }
}

/// A strategy for splitting text into ordered spans.
///
/// Implementations must keep input order and must not return empty spans.
pub trait TextSplitter: Send + Sync {
    /// Split `text` into ordered, non-empty spans.
    fn split(&self, text: &str, config: &SplitConfig) -> Vec<Span>;
}

impl<F> TextSplitter for F
where
    F: Fn(&str, &SplitConfig) -> Vec<Span> + Send + Sync,
{
    fn split(&self, text: &str, config: &SplitConfig) -> Vec<Span> {
        self(text, config)
    }
}

/// Number of tokens in `text`: non-whitespace Unicode word-boundary segments.
pub fn count_tokens(text: &str) -> usize {
    text.split_word_bounds().filter(|w| !w.trim().is_empty()).count()
}

/// Splits text into sentences using Unicode sentence boundaries.
///
/// The split configuration is ignored; every sentence is one span, trimmed of
/// surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSplitter;

impl TextSplitter for SentenceSplitter {
    fn split(&self, text: &str, _config: &SplitConfig) -> Vec<Span> {
        text.split_sentence_bounds()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Span::new)
            .collect()
    }
}

const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "! ", "? ", " "];

/// Splits hierarchically by paragraph, line, sentence, then word, and merges
/// the pieces into chunks of at most `chunk_size` tokens.
///
/// Consecutive chunks share up to `chunk_overlap` tokens of whole pieces.
/// Every span is a contiguous, trimmed substring of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveSplitter;

impl TextSplitter for RecursiveSplitter {
    fn split(&self, text: &str, config: &SplitConfig) -> Vec<Span> {
        if text.trim().is_empty() || config.chunk_size == 0 {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        split_pieces(text, 0..text.len(), config.chunk_size, &SEPARATORS, &mut pieces);

        merge_pieces(&pieces, config.chunk_size, config.chunk_overlap)
            .into_iter()
            .map(|range| text[range].trim())
            .filter(|chunk| !chunk.is_empty())
            .map(Span::new)
            .collect()
    }
}

/// A byte range of the input and its token count.
struct Piece {
    range: Range<usize>,
    tokens: usize,
}

/// Break `range` into pieces of at most `chunk_size` tokens, trying each
/// separator in turn and falling back to single word-boundary segments.
fn split_pieces(
    text: &str,
    range: Range<usize>,
    chunk_size: usize,
    separators: &[&str],
    out: &mut Vec<Piece>,
) {
    let tokens = count_tokens(&text[range.clone()]);
    if tokens <= chunk_size {
        out.push(Piece { range, tokens });
        return;
    }

    let Some((separator, remaining)) = separators.split_first() else {
        split_words(text, range, out);
        return;
    };

    for segment in split_keeping_separator(text, range, separator) {
        split_pieces(text, segment, chunk_size, remaining, out);
    }
}

/// Split at `separator`, keeping it attached to the preceding segment.
fn split_keeping_separator(text: &str, range: Range<usize>, separator: &str) -> Vec<Range<usize>> {
    let slice = &text[range.clone()];
    let mut segments = Vec::new();
    let mut start = 0;

    while let Some(pos) = slice[start..].find(separator) {
        let end = start + pos + separator.len();
        segments.push(range.start + start..range.start + end);
        start = end;
    }

    if start < slice.len() {
        segments.push(range.start + start..range.end);
    }

    segments
}

/// One piece per token, with trailing whitespace attached to the token before it.
fn split_words(text: &str, range: Range<usize>, out: &mut Vec<Piece>) {
    let slice = &text[range.clone()];
    for (offset, segment) in slice.split_word_bound_indices() {
        let start = range.start + offset;
        let end = start + segment.len();
        if segment.trim().is_empty() {
            match out.last_mut() {
                Some(last) if last.range.end == start => last.range.end = end,
                _ => out.push(Piece { range: start..end, tokens: 0 }),
            }
        } else {
            out.push(Piece { range: start..end, tokens: 1 });
        }
    }
}

/// Greedily pack pieces into chunks, carrying a tail of at most
/// `chunk_overlap` tokens into the next chunk.
fn merge_pieces(pieces: &[Piece], chunk_size: usize, chunk_overlap: usize) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    // window of pieces[first..next] forms the current chunk
    let mut first = 0;
    let mut current_tokens = 0;

    for (next, piece) in pieces.iter().enumerate() {
        if current_tokens > 0 && current_tokens + piece.tokens > chunk_size {
            chunks.push(pieces[first].range.start..pieces[next - 1].range.end);
            while first < next
                && (current_tokens > chunk_overlap || current_tokens + piece.tokens > chunk_size)
            {
                current_tokens -= pieces[first].tokens;
                first += 1;
            }
        }
        current_tokens += piece.tokens;
    }

    if first < pieces.len() && current_tokens > 0 {
        chunks.push(pieces[first].range.start..pieces[pieces.len() - 1].range.end);
    }

    chunks
}
