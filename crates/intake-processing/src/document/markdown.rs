//! Plain text, Markdown and HTML to Markdown.

/// A converted document: Markdown body, its title and the words it counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub markdown: String,
    pub title: String,
    pub word_count: usize,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `# <title>`, a blank line, then every line of `content`.
pub fn text_to_markdown(content: &str, title: &str) -> MarkdownDocument {
    let mut markdown = format!("# {}\n\n", title);
    for line in content.lines() {
        markdown.push_str(line);
        markdown.push('\n');
    }

    MarkdownDocument {
        markdown,
        title: title.to_string(),
        word_count: word_count(content),
    }
}

/// Markdown is kept as is; the first level-1 heading names it when there is one.
pub fn markdown_passthrough(content: &str, fallback_title: &str) -> MarkdownDocument {
    let title = content
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|heading| heading.trim().to_string())
        .filter(|heading| !heading.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    MarkdownDocument {
        markdown: content.to_string(),
        title,
        word_count: word_count(content),
    }
}

/// Line-breaking tags become newlines, every other tag is dropped.
pub fn strip_html(html: &str) -> String {
    let with_breaks = ["<br>", "<br/>", "<p>", "</p>"]
        .iter()
        .fold(html.to_string(), |acc, tag| acc.replace(tag, "\n"));

    let mut text = String::with_capacity(with_breaks.len());
    let mut in_tag = false;
    for c in with_breaks.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

pub fn html_to_markdown(html: &str, title: &str) -> MarkdownDocument {
    let text = strip_html(html);
    MarkdownDocument {
        markdown: format!("# {}\n\n{}", title, text),
        title: title.to_string(),
        word_count: word_count(&text),
    }
}
