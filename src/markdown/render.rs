//! Markdown to HTML / Markdown 转 HTML

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser};
use regex::{Captures, Regex};

/// Emphasis-delimited span, single or double markers
static FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{1,2}.+?\*{1,2}").unwrap());

/// A word of 2+ letters/apostrophes/hyphens/parens, or an inline tag to keep as is
static FRAGMENT_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([-'()\p{L}]{2,})|(<.+?>)").unwrap());

/// Render markdown to HTML.
///
/// When `all_foreign` is false, words inside emphasis fragments are wrapped
/// in `<span>` first so the client can treat them as foreign-language tokens.
/// 非全外语文本时，先包裹强调片段中的单词
pub fn render(text: &str, all_foreign: bool) -> String {
    let source = if all_foreign {
        text.to_string()
    } else {
        markup_fragments(text)
    };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // Keep line breaks as typed
    let parser = Parser::new_ext(&source, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out.replace("<table>", "<table class='table'>")
}

/// Wrap every word inside `*..*` / `**..**` fragments in a span / 包裹片段内单词
pub fn markup_fragments(text: &str) -> String {
    FRAGMENT
        .replace_all(text, |fragment: &Captures| {
            FRAGMENT_WORD
                .replace_all(&fragment[0], |word: &Captures| match word.get(1) {
                    Some(w) => format!("<span>{}</span>", w.as_str()),
                    None => word[0].to_string(),
                })
                .into_owned()
        })
        .into_owned()
}
