//! Tag-grammar parsing — turns one de-starred comment body plus its
//! following code line into a [`TagMap`].
//!
//! The grammar is the usual JSDoc convention: free text up to the first
//! `@tag`, then tag sections. A tag may also open the body directly,
//! leaving `doc` empty. Name and parameter guessing over the next code
//! line is regex-heuristic and best-effort; parsing never fails.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

// \A lets a tag open the body with no doc text before it.
static RE_TAG_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\A|\n)\s*@").unwrap());

static RE_FIRST_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_PAREN_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([\w\s,]*)\)").unwrap());

/// Recognized signature shapes for function-name guessing, tried in
/// order; the first match wins. Kept as data so alternate heuristics
/// can be swapped in without touching the tag-parsing core.
static FUNCTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // function declaration: function foo(...)
        r"function (\w+)",
        // prototype assignment: Foo.prototype.bar = function
        r"\.prototype\.(\w+)\s*=\s*function",
        // object-literal method: bar: function
        r"(\w+)\s*:\s*function",
        // property assignment: obj.bar = function
        r"\.(\w+)\s*=\s*function",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Tags that accumulate into a list even on their first occurrence.
/// Everything else is a scalar; a repeated scalar overwrites.
const REPEATABLE_TAGS: &[&str] = &[
    "dependency",
    "param",
    "argument",
    "option",
    "author",
    "data",
    "return",
    "returns",
    "example",
    "see",
    "throws",
    "exception",
    "before",
    "after",
    "desc",
    "result",
];

/// A parsed tag value: a single trimmed string, or an ordered list for
/// tags in the repeatable set.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    List(Vec<String>),
}

/// An `@example` block together with any `@desc`/`@before`/`@after`/
/// `@result` tags that immediately follow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleDoc {
    pub code: String,
    pub desc: String,
    pub before: String,
    pub after: String,
    pub result: String,
}

/// Structured form of a single doc comment.
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    /// Untagged leading text of the comment.
    pub doc: String,
    /// Heuristic function name from the next code line, if any.
    pub guessed_function: Option<String>,
    /// Heuristic parameter names from the next code line. `Some(vec![])`
    /// means an empty parenthesis group was present.
    pub guessed_params: Option<Vec<String>>,
    /// Composite `@example` records, in declaration order.
    pub examples: Vec<ExampleDoc>,
    tags: BTreeMap<String, TagValue>,
}

impl TagMap {
    pub fn get(&self, tag: &str) -> Option<&TagValue> {
        self.tags.get(tag)
    }

    /// True if the tag appeared at all, even with an empty body.
    /// Empty-bodied tags act as boolean markers (`@private`,
    /// `@constructor`, `@fileoverview`).
    pub fn has(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Scalar view of a tag: the text value, or the first list element,
    /// or the empty string when absent.
    pub fn get_str(&self, tag: &str) -> &str {
        match self.tags.get(tag) {
            Some(TagValue::Text(s)) => s,
            Some(TagValue::List(items)) => items.first().map(String::as_str).unwrap_or(""),
            None => "",
        }
    }

    /// List view of a tag: absent tags are an empty list, scalar tags a
    /// one-element list. The result is a copy.
    pub fn get_list(&self, tag: &str) -> Vec<String> {
        match self.tags.get(tag) {
            Some(TagValue::Text(s)) => vec![s.clone()],
            Some(TagValue::List(items)) => items.clone(),
            None => Vec::new(),
        }
    }

    /// Iterate all tags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert(&mut self, tag: String, body: String) {
        if REPEATABLE_TAGS.contains(&tag.as_str()) {
            match self.tags.entry(tag).or_insert_with(|| TagValue::List(Vec::new())) {
                TagValue::List(items) => items.push(body),
                // A repeatable name can't have been stored as Text.
                TagValue::Text(_) => unreachable!(),
            }
        } else {
            // Non-repeatable tag seen twice: later occurrence overwrites.
            self.tags.insert(tag, TagValue::Text(body));
        }
    }
}

/// Parse one de-starred comment body plus its next code line.
pub fn parse_comment(doc_comment: &str, next_line: &str) -> TagMap {
    let sections: Vec<&str> = RE_TAG_SPLIT.split(doc_comment).collect();
    let mut map = TagMap {
        doc: sections[0].trim().to_string(),
        guessed_function: guess_function_name(next_line),
        guessed_params: guess_parameters(next_line),
        ..TagMap::default()
    };

    // While an @example record is open, desc/before/after/result tags
    // fold into it instead of becoming top-level tags.
    let mut in_example = false;
    for section in &sections[1..] {
        let (tag, body) = split_tag(section);
        if tag == "example" {
            map.examples.push(ExampleDoc {
                code: body,
                ..ExampleDoc::default()
            });
            in_example = true;
            continue;
        }
        if in_example {
            if let Some(example) = map.examples.last_mut() {
                match tag.as_str() {
                    "desc" => {
                        example.desc = body;
                        continue;
                    }
                    "before" => {
                        example.before = body;
                        continue;
                    }
                    "after" => {
                        example.after = body;
                        continue;
                    }
                    "result" => {
                        example.result = body;
                        continue;
                    }
                    _ => in_example = false,
                }
            }
        }
        map.insert(tag, body);
    }
    map
}

/// Split a raw tag section (text after the `@`) at the first whitespace
/// run into a lowercase-normalized tag name and a trimmed body.
pub fn split_tag(section: &str) -> (String, String) {
    match RE_FIRST_WS.splitn(section, 2).collect::<Vec<_>>().as_slice() {
        [tag, body] => (tag.trim().to_lowercase(), body.trim().to_string()),
        [tag] => (tag.trim().to_lowercase(), String::new()),
        _ => (String::new(), String::new()),
    }
}

/// Guess a function name from the first code line after a comment.
pub fn guess_function_name(next_line: &str) -> Option<String> {
    guess_function_name_with(&FUNCTION_PATTERNS, next_line)
}

/// Guessing core with a caller-supplied ordered pattern list. Each
/// pattern's first capture group is the candidate name.
pub fn guess_function_name_with(patterns: &[Regex], next_line: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(next_line).map(|caps| caps[1].to_string()))
}

/// Guess parameter names from the first parenthesized comma-separated
/// group in the line. No parenthesis group at all yields `None`; an
/// empty group yields `Some(vec![])`.
pub fn guess_parameters(next_line: &str) -> Option<Vec<String>> {
    RE_PAREN_GROUP.captures(next_line).map(|caps| {
        caps[1]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
}
