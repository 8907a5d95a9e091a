//! Depth-aware string splitting.
//!
//! Splits text on a separator while refusing to split inside configured
//! delimiter pairs, so `@param {Object {nested}} name` style tag bodies
//! survive tokenization intact.

/// Lazy splitter over `text`, yielding one more segment than the number
/// of qualifying split points (adjacent separators yield empty segments).
///
/// `delimiters` is an even-length string listing matched pairs, open
/// first (e.g. `"{}[]"`). Each pair keeps its own depth counter; a
/// character satisfying `split_by` only splits when every counter is
/// zero. Closing delimiters with no matching opener drive the counter
/// negative, which suppresses splitting but never panics.
pub struct DelimitedSplit<'a, F> {
    text: &'a str,
    delimiters: Vec<(char, char)>,
    depths: Vec<i32>,
    split_by: F,
    pos: usize,
    done: bool,
}

/// Split `text` by the predicate `split_by`, honoring `delimiters`.
pub fn split_delimited<'a, F>(delimiters: &str, split_by: F, text: &'a str) -> DelimitedSplit<'a, F>
where
    F: Fn(char) -> bool,
{
    let chars: Vec<char> = delimiters.chars().collect();
    debug_assert!(chars.len() % 2 == 0, "delimiters must come in pairs");
    let pairs: Vec<(char, char)> = chars.chunks(2).map(|p| (p[0], p[1])).collect();
    let depths = vec![0; pairs.len()];
    DelimitedSplit {
        text,
        delimiters: pairs,
        depths,
        split_by,
        pos: 0,
        done: false,
    }
}

/// Split `text` at every `separator` character, honoring `delimiters`.
pub fn split_delimited_char<'a>(
    delimiters: &str,
    separator: char,
    text: &'a str,
) -> DelimitedSplit<'a, impl Fn(char) -> bool> {
    split_delimited(delimiters, move |c| c == separator, text)
}

impl<'a, F> Iterator for DelimitedSplit<'a, F>
where
    F: Fn(char) -> bool,
{
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }
        let start = self.pos;
        for (offset, c) in self.text[start..].char_indices() {
            let i = start + offset;
            // The split check happens before the depth update, so a
            // delimiter character can itself be a split point at depth 0.
            if (self.split_by)(c) && self.depths.iter().all(|d| *d == 0) {
                self.pos = i + c.len_utf8();
                return Some(&self.text[start..i]);
            }
            for (which, &(open, close)) in self.delimiters.iter().enumerate() {
                if c == open {
                    self.depths[which] += 1;
                } else if c == close {
                    self.depths[which] -= 1;
                }
            }
        }
        self.done = true;
        Some(&self.text[start..])
    }
}
