use pulldown_cmark::{Event, Options, Parser, html};

/// Turns an anchor description into display markup. Implementations must be
/// pure: the same input always renders the same output.
pub trait RichTextRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark to HTML. Raw HTML in the source is escaped, not passed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl RichTextRenderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
        let events = Parser::new_ext(markdown, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_emphasis_and_lists() {
        let html = MarkdownRenderer.render("**1D Peak Finding**:\n\n- middle\n- neighbors");
        assert!(html.contains("<strong>1D Peak Finding</strong>"));
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>middle</li>"));
        assert!(html.contains("<li>neighbors</li>"));
    }

    #[test]
    fn test_inline_code() {
        let html = MarkdownRenderer.render("Time complexity: `O(log n)`");
        assert!(html.contains("<code>O(log n)</code>"));
    }

    #[test]
    fn test_escapes_raw_html() {
        let html = MarkdownRenderer.render("<script>alert(1)</script>\n\na <b>bold</b> & more");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp; more"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(MarkdownRenderer.render("  \n\n "), "");
    }
}
