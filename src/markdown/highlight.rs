//! Search phrase highlighting / 搜索词高亮
//!
//! Matches are wrapped in numbered anchors (`highlight-1`, `highlight-2`, ...)
//! so the client can step through them. Existing tags and anchors produced
//! by earlier terms are never rescanned.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters allowed in a highlight phrase / 允许的字符
static PHRASE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-\s'()\p{L}.?!]+$").unwrap());

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"(.+)"$"#).unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

struct Segment {
    text: String,
    protected: bool,
}

/// Highlight every whole-word occurrence of the phrase's terms / 高亮搜索词
///
/// Returns the input unchanged when the phrase holds characters outside the
/// allowed set.
pub fn highlight(html: &str, phrase: &str) -> String {
    let terms = match split_terms(phrase) {
        Some(terms) => terms,
        None => return html.to_string(),
    };

    let mut segments = split_markup(html);
    let mut counter = 0usize;

    for term in &terms {
        let pattern = format!(r"(?i)\b(_*{}_*)\b", regex::escape(term));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!("Skipping highlight term {:?}: {}", term, e);
                continue;
            }
        };

        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            if segment.protected {
                next.push(segment);
                continue;
            }

            let mut last = 0;
            for m in re.find_iter(&segment.text) {
                counter += 1;
                if m.start() > last {
                    next.push(Segment { text: segment.text[last..m.start()].to_string(), protected: false });
                }
                next.push(Segment {
                    text: format!(
                        r#"<a id="highlight-{}"><span class="hr-highlight hr-highlight-on">{}</span></a>"#,
                        counter,
                        m.as_str()
                    ),
                    protected: true,
                });
                last = m.end();
            }
            if last < segment.text.len() {
                next.push(Segment { text: segment.text[last..].to_string(), protected: false });
            }
        }
        segments = next;
    }

    segments.into_iter().map(|s| s.text).collect()
}

/// Quoted phrase is one term, otherwise split on whitespace.
/// `None` when the phrase fails validation.
fn split_terms(phrase: &str) -> Option<Vec<String>> {
    let phrase = phrase.trim();
    let (body, quoted) = match QUOTED.captures(phrase) {
        Some(caps) => (caps[1].to_string(), true),
        None => (phrase.to_string(), false),
    };

    if !PHRASE_CHARS.is_match(&body) {
        return None;
    }

    let terms = if quoted {
        vec![body]
    } else {
        body.split_whitespace().map(str::to_string).collect()
    };
    Some(terms)
}

/// Split html into plain text runs and tags
fn split_markup(html: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in TAG.find_iter(html) {
        if m.start() > last {
            segments.push(Segment { text: html[last..m.start()].to_string(), protected: false });
        }
        segments.push(Segment { text: m.as_str().to_string(), protected: true });
        last = m.end();
    }
    if last < html.len() {
        segments.push(Segment { text: html[last..].to_string(), protected: false });
    }
    segments
}
