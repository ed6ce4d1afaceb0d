/// Escapes text for use inside HTML element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Makes JSON safe to place inside a `<script>` element.
/// `<` only ever occurs inside JSON strings, where `\u003c` is an equivalent escape.
pub fn json_for_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}
