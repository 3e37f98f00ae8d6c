//! Text preparation for announcements.
//!
//! Feed titles and bodies arrive with HTML fragments, markdown links, bare
//! URLs and entities. Announcements are plain sentences, cut at a sentence
//! boundary so the speech capability never reads out a whole article.

/// Maximum character length of an announcement body.
pub const MAX_ANNOUNCEMENT_CHARS: usize = 280;

/// Build the spoken text for a record with a headline and a body.
///
/// The headline is always spoken; the body is appended when it adds
/// something, cut to [`MAX_ANNOUNCEMENT_CHARS`] at the last sentence end.
#[must_use]
pub fn prepare_announcement(headline: &str, body: &str) -> String {
    let headline = to_plain_text(headline);
    let body = to_plain_text(body);

    if body.is_empty() || body.eq_ignore_ascii_case(&headline) {
        return ensure_terminal_punctuation(&headline);
    }
    if headline.is_empty() {
        return ensure_terminal_punctuation(&truncate_at_sentence(&body, MAX_ANNOUNCEMENT_CHARS));
    }

    format!(
        "{} {}",
        ensure_terminal_punctuation(&headline),
        ensure_terminal_punctuation(&truncate_at_sentence(&body, MAX_ANNOUNCEMENT_CHARS))
    )
}

/// Strip markup from feed text.
#[must_use]
pub fn to_plain_text(text: &str) -> String {
    let text = strip_html_tags(text);
    let text = decode_entities(&text);
    let text = strip_links(&text);
    let text = strip_bare_urls(&text);
    let text = text.replace("**", "").replace("__", "").replace('`', "");
    collapse_whitespace(&text)
}

/// Cut `text` to at most `max_chars`, preferring the last sentence end.
///
/// Falls back to the last word boundary with an ellipsis when the first
/// sentence alone is too long.
#[must_use]
pub fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let sentence_end = cut
        .char_indices()
        .filter(|&(i, c)| {
            matches!(c, '.' | '!' | '?')
                && cut[i + c.len_utf8()..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
        })
        .map(|(i, c)| i + c.len_utf8())
        .last();

    if let Some(end) = sentence_end {
        return cut[..end].to_string();
    }

    match cut.rfind(' ') {
        Some(space) => format!("{}…", cut[..space].trim_end()),
        None => format!("{cut}…"),
    }
}

// ── Internal helpers ───────────────────────────────────────────────

fn ensure_terminal_punctuation(text: &str) -> String {
    if text.is_empty() || text.ends_with(['.', '!', '?', '…']) {
        text.to_string()
    } else {
        format!("{text}.")
    }
}

fn strip_html_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            // Tags separate words, so leave a space behind
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// `[text](url)` → `text`
fn strip_links(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '[' {
            let link_text: String = chars.by_ref().take_while(|&c| c != ']').collect();
            if chars.peek() == Some(&'(') {
                chars.next();
                let _url: String = chars.by_ref().take_while(|&c| c != ')').collect();
                result.push_str(&link_text);
                continue;
            }
            result.push('[');
            result.push_str(&link_text);
            result.push(']');
        } else {
            result.push(c);
        }
    }

    result
}

fn strip_bare_urls(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !(word.starts_with("http://") || word.starts_with("https://")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    result.trim().to_string()
}
