//! Placeholder substitution over the text runs of a WordprocessingML body.
//!
//! Only the character content of `<w:t>` elements is ever rewritten; every
//! byte outside of them is copied through untouched. Placeholders are
//! resolved in tiers, each one broader than the last:
//!
//! 1. `[NAME]` / `{NAME}` tokens inside a single run (contact fields first)
//! 2. tokens whose pieces were split across adjacent runs of one paragraph
//! 3. the literal word `undefined` following a known field label
//! 4. bare field names longer than five characters
//! 5. any `undefined` left in a run that mentions phone or e-mail
//!
//! Values are inserted as opaque markers while the tiers run and expanded
//! at render time, so a later tier never re-matches text a previous tier
//! inserted.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use super::fields::{labels_for, ReplacementMap, CONTACT_FIELDS, EMAIL, PHONE};

/// Characters of same-run context searched for a label before `undefined`.
pub const DEFAULT_SENTINEL_WINDOW: usize = 30;

/// Field names must be longer than this to be replaced without brackets.
pub const BARE_NAME_MIN_EXCLUSIVE: usize = 5;

pub const SENTINEL: &str = "undefined";

const MARK_OPEN: char = '\u{E000}';
const MARK_CLOSE: char = '\u{E001}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionOptions {
    pub sentinel_window: usize,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self {
            sentinel_window: DEFAULT_SENTINEL_WINDOW,
        }
    }
}

fn static_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern"))
}

fn text_node_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    static_regex(&CELL, r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>")
}

fn paragraph_end_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    static_regex(&CELL, r"</w:p>")
}

fn token_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    static_regex(
        &CELL,
        r"\[([A-Za-z][A-Za-z0-9_]*)\]|\{([A-Za-z][A-Za-z0-9_]*)\}",
    )
}

fn sentinel_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    static_regex(&CELL, r"\bundefined\b")
}

fn phone_hint_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    // `\btel` keeps "hotel" out
    static_regex(&CELL, r"(?i)phone|\btel\b")
}

fn email_hint_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    static_regex(&CELL, r"(?i)e-?mail")
}

fn marker_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    static_regex(&CELL, "\u{E000}([0-9]+)\u{E001}")
}

pub fn escape_xml_text(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

fn token_name<'h>(caps: &Captures<'h>) -> &'h str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Last `window` characters of `text`.
fn tail_chars(text: &str, window: usize) -> &str {
    if window == 0 {
        return "";
    }
    match text.char_indices().rev().nth(window - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// Pending values, referenced from run text by marker index.
#[derive(Default)]
struct Values(Vec<String>);

impl Values {
    fn mark(&mut self, value: &str) -> String {
        let index = self.0.len();
        self.0.push(escape_xml_text(value).into_owned());
        format!("{}{}{}", MARK_OPEN, index, MARK_CLOSE)
    }
}

struct TextRun {
    content: Range<usize>,
    paragraph: usize,
    text: String,
}

struct BodyText<'a> {
    source: &'a str,
    runs: Vec<TextRun>,
    values: Values,
}

impl<'a> BodyText<'a> {
    fn parse(source: &'a str) -> Self {
        let paragraph_ends: Vec<usize> = paragraph_end_regex()
            .find_iter(source)
            .map(|m| m.start())
            .collect();

        let runs = text_node_regex()
            .captures_iter(source)
            .filter_map(|caps| caps.get(1))
            .map(|content| TextRun {
                content: content.range(),
                paragraph: paragraph_ends.partition_point(|&end| end < content.start()),
                text: content.as_str().to_string(),
            })
            .collect();

        Self {
            source,
            runs,
            values: Values::default(),
        }
    }

    /// Tier 1: whole tokens inside one run.
    fn replace_tokens(&mut self, replacements: &ReplacementMap, only: Option<&[&str]>) {
        let values = &mut self.values;
        for run in &mut self.runs {
            let replaced = token_regex().replace_all(&run.text, |caps: &Captures| {
                let name = token_name(caps).to_uppercase();
                let allowed = only.map_or(true, |fields| fields.contains(&name.as_str()));
                match replacements.get(&name) {
                    Some(value) if allowed => values.mark(value),
                    _ => caps[0].to_string(),
                }
            });
            if let Cow::Owned(text) = replaced {
                run.text = text;
            }
        }
    }

    /// Tier 2: tokens whose `[`, name or `]` landed in different runs of the
    /// same paragraph. The resolved value goes into the first run touched and
    /// the consumed text is removed from the rest.
    fn reassemble_split_tokens(&mut self, replacements: &ReplacementMap) {
        let mut start = 0;
        while start < self.runs.len() {
            let paragraph = self.runs[start].paragraph;
            let end = self.runs[start..]
                .iter()
                .position(|run| run.paragraph != paragraph)
                .map_or(self.runs.len(), |offset| start + offset);
            if end - start > 1 {
                self.reassemble_paragraph(start..end, replacements);
            }
            start = end;
        }
    }

    fn reassemble_paragraph(&mut self, span: Range<usize>, replacements: &ReplacementMap) {
        let runs = &mut self.runs[span];
        let mut combined = String::new();
        let mut offsets = Vec::with_capacity(runs.len());
        for run in runs.iter() {
            offsets.push(combined.len());
            combined.push_str(&run.text);
        }
        let locate = |pos: usize| offsets.partition_point(|&offset| offset <= pos) - 1;

        struct Splice {
            first: usize,
            start: usize,
            last: usize,
            end: usize,
            value: String,
        }

        let mut splices = Vec::new();
        for caps in token_regex().captures_iter(&combined) {
            let whole = &caps[0];
            let token_start = caps.get(0).map_or(0, |m| m.start());
            let token_end = token_start + whole.len();
            let first = locate(token_start);
            let last = locate(token_end - 1);
            if first == last {
                continue;
            }
            if let Some(value) = replacements.get(token_name(&caps)) {
                splices.push(Splice {
                    first,
                    start: token_start - offsets[first],
                    last,
                    end: token_end - offsets[last],
                    value: value.to_string(),
                });
            }
        }

        // back to front so earlier offsets stay valid
        for splice in splices.into_iter().rev() {
            let tail = runs[splice.last].text.split_off(splice.end);
            runs[splice.last].text = tail;
            for run in &mut runs[splice.first + 1..splice.last] {
                run.text.clear();
            }
            let marker = self.values.mark(&splice.value);
            let head = &mut runs[splice.first].text;
            head.truncate(splice.start);
            head.push_str(&marker);
        }
    }

    /// Tier 3: `undefined` preceded, within the window, by a field label.
    fn replace_labelled_sentinels(&mut self, replacements: &ReplacementMap, window: usize) {
        let labelled: Vec<(&str, &[&str])> = replacements
            .iter()
            .map(|(field, value)| (value, labels_for(field)))
            .filter(|(_, labels)| !labels.is_empty())
            .collect();
        if labelled.is_empty() {
            return;
        }

        let values = &mut self.values;
        for run in &mut self.runs {
            if !run.text.contains(SENTINEL) {
                continue;
            }
            let haystack = run.text.as_str();
            let replaced = sentinel_regex().replace_all(haystack, |caps: &Captures| {
                let at = caps.get(0).map_or(0, |m| m.start());
                let context = tail_chars(&haystack[..at], window).to_lowercase();

                // the label closest to the sentinel wins, longer label on ties
                let mut best: Option<((usize, usize), &str)> = None;
                for (value, labels) in &labelled {
                    for label in labels.iter() {
                        if let Some(pos) = context.rfind(label) {
                            let rank = (pos + label.len(), label.len());
                            if best.map_or(true, |(current, _)| rank > current) {
                                best = Some((rank, *value));
                            }
                        }
                    }
                }
                match best {
                    Some((_, value)) => values.mark(value),
                    None => SENTINEL.to_string(),
                }
            });
            if let Cow::Owned(text) = replaced {
                run.text = text;
            }
        }
    }

    /// Tier 4: unbracketed field names, longest first. Case-sensitive.
    fn replace_bare_field_names(&mut self, replacements: &ReplacementMap) {
        let mut fields: Vec<(&str, &str)> = replacements
            .iter()
            .filter(|(field, _)| field.chars().count() > BARE_NAME_MIN_EXCLUSIVE)
            .collect();
        fields.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));

        for (field, value) in fields {
            let mut marker: Option<String> = None;
            for run in &mut self.runs {
                if run.text.contains(field) {
                    let marker = marker
                        .get_or_insert_with(|| self.values.mark(value))
                        .as_str();
                    run.text = run.text.replace(field, marker);
                }
            }
        }
    }

    /// Last-resort net: `undefined` in a run that mentions phone/tel or e-mail.
    fn replace_contact_sentinels(&mut self, replacements: &ReplacementMap) {
        let hints: Vec<(&Regex, &str)> = [
            (phone_hint_regex(), PHONE),
            (email_hint_regex(), EMAIL),
        ]
        .into_iter()
        .filter_map(|(hint, field)| replacements.get(field).map(|value| (hint, value)))
        .collect();
        if hints.is_empty() {
            return;
        }

        let values = &mut self.values;
        for run in &mut self.runs {
            if !run.text.contains(SENTINEL) {
                continue;
            }
            let haystack = run.text.as_str();
            let positions: Vec<(usize, &str)> = hints
                .iter()
                .flat_map(|(hint, value)| hint.find_iter(haystack).map(move |m| (m.start(), *value)))
                .collect();
            if positions.is_empty() {
                continue;
            }
            let replaced = sentinel_regex().replace_all(haystack, |caps: &Captures| {
                let at = caps.get(0).map_or(0, |m| m.start());
                positions
                    .iter()
                    .min_by_key(|(pos, _)| pos.abs_diff(at))
                    .map(|(_, value)| values.mark(value))
                    .unwrap_or_else(|| SENTINEL.to_string())
            });
            if let Cow::Owned(text) = replaced {
                run.text = text;
            }
        }
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for run in &self.runs {
            out.push_str(&self.source[cursor..run.content.start]);
            let expanded = marker_regex().replace_all(&run.text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.values.0.get(index))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            });
            out.push_str(&expanded);
            cursor = run.content.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

/// Resolve every recognised placeholder in a `word/document.xml` body.
pub fn substitute(xml: &str, replacements: &ReplacementMap, options: &SubstitutionOptions) -> String {
    let mut body = BodyText::parse(xml);

    body.replace_tokens(replacements, Some(&CONTACT_FIELDS[..]));
    body.replace_tokens(replacements, None);
    body.reassemble_split_tokens(replacements);
    body.replace_labelled_sentinels(replacements, options.sentinel_window);
    body.replace_bare_field_names(replacements);
    body.replace_contact_sentinels(replacements);

    log::debug!(
        "resolved {} placeholder value(s) across {} text run(s)",
        body.values.0.len(),
        body.runs.len()
    );
    body.render()
}
