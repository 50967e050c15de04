//! Markdown rendering for display. comrak produces the HTML (raw HTML is
//! passed through so ammonia can strip it rather than show it escaped),
//! ammonia enforces the allow list, and the autolink extension turns bare
//! URLs into anchors.

use std::collections::{HashMap, HashSet};

use comrak::{markdown_to_html, Options};

const ALLOWED_TAGS: [&str; 23] = [
    "a", "abbr", "acronym", "b", "blockquote", "code", "em", "i", "li", "ol", "strong", "ul", "p", "pre", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "br", "img",
];

pub fn render_markdown(input: &str) -> String {
    let mut options = Options::default();
    options.extension.autolink = true;
    options.render.unsafe_ = true;

    clean(&markdown_to_html(input, &options))
}

fn clean(html: &str) -> String {
    ammonia::Builder::default()
        .tags(HashSet::from(ALLOWED_TAGS))
        .tag_attributes(HashMap::from([
            ("a", HashSet::from(["href", "title", "rel", "target"])),
            ("img", HashSet::from(["src", "alt", "title"])),
        ]))
        .link_rel(None)
        .clean(html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        let html = render_markdown("hello <script>alert(1)</script> world");
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert(1)"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn strips_event_handler_attributes() {
        let html = render_markdown(r#"<img src="x.png" onerror="alert(1)">"#);
        assert!(!html.contains("onerror"));
        assert!(html.contains(r#"<img src="x.png""#));
    }

    #[test]
    fn linkifies_bare_urls() {
        let html = render_markdown("see https://example.com for details");
        assert!(html.contains(r#"<a href="https://example.com""#));
    }

    #[test]
    fn keeps_nested_lists() {
        let html = render_markdown("- outer\n  - inner\n");
        let first_ul = html.find("<ul>").unwrap();
        assert!(html[first_ul + 4..].contains("<ul>"));
        assert!(html.contains("<li>"));
        assert!(html.contains("inner"));
    }

    #[test]
    fn renders_headings_code_and_rules() {
        let html = render_markdown("# Title\n\n`inline`\n\n---\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<code>inline</code>"));
        assert!(html.contains("<hr"));
    }

    #[test]
    fn keeps_link_attributes() {
        let html = render_markdown(r#"[site](https://example.com "a title")"#);
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.contains(r#"title="a title""#));
    }
}
