/*!
 * Splitting texts into translatable segments and putting them back together.
 *
 * Two shapes of content need care before they reach a model:
 * - multiple-choice options (`a. ...`, `B. ...`, `3. ...`, `(c) ...`): each
 *   option body is translated on its own and the markers are kept verbatim;
 * - long texts: split on `# N)` section headings, or at whitespace near a
 *   fixed size when there are none.
 *
 * Everything else is one segment.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Option line: marker, spacing, body
static CHOICE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*(?:[a-d]\.|[A-D]\.|[1-4]\.|\([a-d]\)|\([A-D]\))\s+)(\S.*)$").unwrap()
});

/// Numbered section heading starting a new chunk
static SECTION_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n#\s+\d+\)").unwrap());

/// Minimum number of option lines for a text to count as multiple choice
const MIN_CHOICES: usize = 2;

/// One piece of a segmented text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Copied to the output unchanged
    Keep(String),
    /// Sent for translation
    Translate(String),
}

/// A text broken into pieces, some of which need translating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedText {
    pieces: Vec<Piece>,
}

impl SegmentedText {
    /// Segment `text`, splitting long plain text into chunks of about `chunk_size` chars
    pub fn split(text: &str, chunk_size: usize) -> Self {
        let pieces = if is_choice_format(text) {
            split_choices(text)
        } else if text.chars().count() > chunk_size && chunk_size > 0 {
            split_long_text(text, chunk_size)
                .iter()
                .map(String::as_str)
                .flat_map(chunk_pieces)
                .collect()
        } else {
            vec![Piece::Translate(text.to_string())]
        };

        Self { pieces }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Texts to send for translation, in order
    pub fn translatable(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Translate(text) => Some(text.as_str()),
            Piece::Keep(_) => None,
        })
    }

    pub fn translatable_count(&self) -> usize {
        self.translatable().count()
    }

    /// Rebuild the text with `translations` in place of the translatable
    /// pieces. Returns `None` when the count does not match.
    pub fn reassemble(&self, translations: &[String]) -> Option<String> {
        if translations.len() != self.translatable_count() {
            return None;
        }

        let mut next = translations.iter();
        let mut output = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Keep(text) => output.push_str(text),
                Piece::Translate(_) => output.push_str(next.next()?),
            }
        }
        Some(output)
    }
}

/// Whether `text` looks like a list of multiple-choice options
pub fn is_choice_format(text: &str) -> bool {
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() < MIN_CHOICES {
        return false;
    }

    lines
        .iter()
        .filter(|line| CHOICE_LINE.is_match(line.trim()))
        .count()
        >= MIN_CHOICES
}

fn split_choices(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut lines = text.split('\n').peekable();

    while let Some(line) = lines.next() {
        if let Some(caps) = CHOICE_LINE.captures(line) {
            pieces.push(Piece::Keep(caps[1].to_string()));
            pieces.push(Piece::Translate(caps[2].to_string()));
        } else if line.trim().is_empty() {
            pieces.push(Piece::Keep(line.to_string()));
        } else {
            pieces.push(Piece::Translate(line.to_string()));
        }

        if lines.peek().is_some() {
            pieces.push(Piece::Keep("\n".to_string()));
        }
    }

    pieces
}

/// Boundary whitespace of a chunk stays outside the translated piece,
/// since providers trim what they return.
fn chunk_pieces(chunk: &str) -> Vec<Piece> {
    let body = chunk.trim();
    if body.is_empty() {
        return vec![Piece::Keep(chunk.to_string())];
    }

    let start = chunk.len() - chunk.trim_start().len();
    let end = start + body.len();
    let mut pieces = Vec::with_capacity(3);
    if start > 0 {
        pieces.push(Piece::Keep(chunk[..start].to_string()));
    }
    pieces.push(Piece::Translate(body.to_string()));
    if end < chunk.len() {
        pieces.push(Piece::Keep(chunk[end..].to_string()));
    }
    pieces
}

/// Split on section headings, merging sections until a chunk reaches
/// `chunk_size` chars. Texts without headings are split at whitespace
/// close to every `chunk_size` chars.
pub fn split_long_text(text: &str, chunk_size: usize) -> Vec<String> {
    let starts: Vec<usize> = SECTION_HEADING.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        return split_by_size(text, chunk_size);
    }

    let mut sections = Vec::with_capacity(starts.len() + 1);
    let mut previous = 0;
    for start in starts {
        if start > previous {
            sections.push(&text[previous..start]);
        }
        previous = start;
    }
    sections.push(&text[previous..]);

    let mut chunks = Vec::new();
    let mut current = String::new();
    for section in sections {
        current.push_str(section);
        if current.chars().count() >= chunk_size {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    } else if let Some(last) = chunks.last_mut() {
        last.push_str(&current);
    }

    chunks
}

fn split_by_size(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > chunk_size {
        let limit = rest
            .char_indices()
            .nth(chunk_size)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());

        // Prefer breaking after the last whitespace in the window
        let cut = rest[..limit]
            .rfind(char::is_whitespace)
            .map(|idx| idx + rest[idx..].chars().next().map_or(1, char::len_utf8))
            .filter(|idx| *idx > 0)
            .unwrap_or(limit);

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}
