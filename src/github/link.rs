use std::collections::HashMap;

/// Decode an RFC 8288 `Link` header into a relation -> URL map.
///
/// GitHub sends `<url>; rel="next", <url>; rel="last"`. Each comma-separated
/// segment must hold exactly one `;`. The angle brackets and the `rel="..."`
/// wrapper are removed when present, so a bare `url; rel="next"` still
/// decodes. A missing header gives an empty map.
pub fn parse_link_header(header: Option<&str>) -> HashMap<String, String> {
    let mut links = HashMap::new();
    let Some(header) = header else {
        return links;
    };

    for segment in header.split(',') {
        let parts: Vec<&str> = segment.split(';').collect();
        if parts.len() != 2 {
            continue;
        }

        let url = unwrap_between(parts[0], "<", '>');
        let rel = unwrap_between(parts[1], "rel=\"", '"');
        if url.is_empty() || rel.is_empty() {
            continue;
        }

        links.insert(rel, url);
    }

    links
}

/// Replace `{open}inner{close}` with `inner`, keeping any text around it.
/// The match is greedy: it runs to the last `close`.
fn unwrap_between(text: &str, open: &str, close: char) -> String {
    let unwrapped = text.find(open).and_then(|start| {
        let inner_start = start + open.len();
        let end = text[inner_start..].rfind(close)? + inner_start;
        Some(format!(
            "{}{}{}",
            &text[..start],
            &text[inner_start..end],
            &text[end + close.len_utf8()..]
        ))
    });
    unwrapped.as_deref().unwrap_or(text).trim().to_string()
}
