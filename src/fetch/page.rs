//! HTML to markdown conversion for captured pages.

use scraper::{ElementRef, Html, Selector};

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote", "pre",
];

/// Convert an HTML document to markdown.
///
/// Only block-level text is kept: headings, paragraphs, list items, quotes and
/// preformatted blocks. The page's `article` or `main` element is preferred
/// over the whole body so navigation chrome stays out of the note.
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = ["article", "main", "body"]
        .iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|selector| document.select(&selector).next());
    let Some(root) = root else {
        return String::new();
    };

    let Ok(blocks) = Selector::parse(&BLOCK_TAGS.join(",")) else {
        return String::new();
    };

    root.select(&blocks)
        .filter(|element| !inside_block(element))
        .filter_map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Nested blocks are rendered as part of their outermost block.
fn inside_block(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| BLOCK_TAGS.contains(&ancestor.value().name()))
}

fn render_block(element: ElementRef) -> Option<String> {
    let name = element.value().name();

    if name == "pre" {
        let code: String = element.text().collect();
        let code = code.trim_end();
        return (!code.is_empty()).then(|| format!("```\n{}\n```", code));
    }

    let text = collapse_whitespace(&element.text().collect::<String>());
    if text.is_empty() {
        return None;
    }

    let rendered = match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            format!("{} {}", "#".repeat(level), text)
        }
        "li" => format!("- {}", text),
        "blockquote" => format!("> {}", text),
        _ => text,
    };
    Some(rendered)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_common_blocks() {
        let html = r#"
            <html><head><title>T</title></head><body>
              <nav><p>Menu</p></nav>
              <article>
                <h1>Title</h1>
                <p>First   paragraph
                   with <a href="/x">a link</a>.</p>
                <ul><li>one</li><li>two</li></ul>
                <blockquote><p>quoted</p></blockquote>
                <pre>fn main() {}
</pre>
              </article>
            </body></html>
        "#;

        assert_eq!(
            html_to_markdown(html),
            "# Title\n\nFirst paragraph with a link.\n\n- one\n\n- two\n\n> quoted\n\n```\nfn main() {}\n```"
        );
    }

    #[test]
    fn falls_back_to_body() {
        let html = "<html><body><h2>Hello</h2><p>World</p></body></html>";
        assert_eq!(html_to_markdown(html), "## Hello\n\nWorld");
    }

    #[test]
    fn skips_empty_blocks() {
        let html = "<html><body><p>  </p><p>kept</p></body></html>";
        assert_eq!(html_to_markdown(html), "kept");
    }
}
