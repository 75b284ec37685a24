use std::borrow::Cow;

/// Looks a shortcode up in the gemoji set, without the surrounding colons.
pub fn lookup(code: &str) -> Option<&'static str> {
    emojis::get_by_shortcode(code).map(|emoji| emoji.as_str())
}

/// Replaces `:shortcode:` sequences with their emoji. Unknown codes are kept verbatim.
pub fn substitute(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut replaced = false;

    while let Some(start) = rest.find(':') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let emoji = after
            .find(':')
            .map(|end| &after[..end])
            .filter(|code| is_shortcode(code))
            .and_then(|code| lookup(code).map(|emoji| (code.len(), emoji)));

        match emoji {
            Some((len, emoji)) => {
                out.push_str(emoji);
                rest = &after[len + 1..];
                replaced = true;
            }
            None => {
                out.push(':');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    if replaced {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

fn is_shortcode(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
}
