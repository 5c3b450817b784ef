//! Structured text as stored by the CMS: a JSON array of blocks, each with its own text and
//! character spans. The document is carried around untouched and only turned into markup or
//! plain text at render time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub serde_json::Value);

#[derive(Deserialize)]
struct Block {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    spans: Vec<Span>,
    url: Option<String>,
    alt: Option<String>,
    oembed: Option<Embed>,
}

#[derive(Deserialize)]
struct Span {
    // UTF-16 code unit offsets
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    data: Option<SpanData>,
}

#[derive(Deserialize)]
struct SpanData {
    url: Option<String>,
    label: Option<String>,
    target: Option<String>,
}

#[derive(Deserialize)]
struct Embed {
    embed_url: Option<String>,
    html: Option<String>,
}

#[derive(PartialEq, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered,
}

impl RichText {
    fn blocks(&self) -> Vec<Block> {
        match self.0 {
            serde_json::Value::Array(ref items) => items.iter()
                .filter_map(|item| serde_json::from_value::<Block>(item.clone()).ok())
                .collect(),
            _ => vec![],
        }
    }

    pub fn as_text(&self) -> String {
        let texts: Vec<String> = self.blocks().into_iter().map(|b| b.text).collect();
        texts.join(" ")
    }

    pub fn as_html(&self) -> String {
        let mut html = String::new();
        let mut open_list: Option<ListKind> = None;

        for block in self.blocks() {
            let list_kind = match block.kind.as_str() {
                "list-item" => Some(ListKind::Unordered),
                "o-list-item" => Some(ListKind::Ordered),
                _ => None,
            };

            if open_list != list_kind {
                if let Some(kind) = open_list {
                    html.push_str(close_list_tag(kind));
                }
                if let Some(kind) = list_kind {
                    html.push_str(open_list_tag(kind));
                }
                open_list = list_kind;
            }

            html.push_str(&render_block(&block));
        }

        if let Some(kind) = open_list {
            html.push_str(close_list_tag(kind));
        }

        html
    }
}

fn open_list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Unordered => "<ul>",
        ListKind::Ordered => "<ol>",
    }
}

fn close_list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Unordered => "</ul>",
        ListKind::Ordered => "</ol>",
    }
}

fn render_block(block: &Block) -> String {
    match block.kind.as_str() {
        "paragraph" => format!("<p>{}</p>", render_spans(&block.text, &block.spans)),
        "preformatted" => format!("<pre>{}</pre>", render_spans(&block.text, &block.spans)),
        "list-item" | "o-list-item" => format!("<li>{}</li>", render_spans(&block.text, &block.spans)),
        kind if kind.starts_with("heading") => {
            let level = kind["heading".len()..].parse::<u8>().unwrap_or(1).clamp(1, 6);
            format!("<h{level}>{}</h{level}>", render_spans(&block.text, &block.spans))
        }
        "image" => {
            let url = block.url.as_deref().unwrap_or_default();
            let alt = block.alt.as_deref().unwrap_or_default();
            format!(r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#, escape_html(url), escape_html(alt))
        }
        "embed" => match block.oembed {
            Some(ref embed) => format!(
                r#"<div data-oembed="{}">{}</div>"#,
                escape_html(embed.embed_url.as_deref().unwrap_or_default()),
                embed.html.as_deref().unwrap_or_default()
            ),
            None => String::new(),
        },
        _ => String::new(),
    }
}

fn open_span_tag(span: &Span) -> String {
    let data = span.data.as_ref();
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let url = data.and_then(|d| d.url.as_deref()).unwrap_or_default();
            match data.and_then(|d| d.target.as_deref()) {
                Some(target) => format!(r#"<a href="{}" target="{}" rel="noopener">"#, escape_html(url), escape_html(target)),
                None => format!(r#"<a href="{}">"#, escape_html(url)),
            }
        }
        "label" => {
            let label = data.and_then(|d| d.label.as_deref()).unwrap_or_default();
            format!(r#"<span class="{}">"#, escape_html(label))
        }
        _ => "<span>".to_string(),
    }
}

fn close_span_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
}

fn close_ended(out: &mut String, open: &mut Vec<&Span>, pos: usize) {
    while let Some(last) = open.last() {
        if last.end > pos {
            break;
        }
        out.push_str(close_span_tag(last));
        open.pop();
    }
}

fn render_spans(text: &str, spans: &[Span]) -> String {
    let mut sorted: Vec<&Span> = spans.iter().filter(|s| s.start < s.end).collect();
    // Outer spans first when two start together
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&Span> = vec![];
    let mut next = 0;
    let mut pos = 0;

    for ch in text.chars() {
        close_ended(&mut out, &mut open, pos);
        while next < sorted.len() && sorted[next].start <= pos {
            out.push_str(&open_span_tag(sorted[next]));
            open.push(sorted[next]);
            next += 1;
        }

        match ch {
            '\n' => out.push_str("<br />"),
            _ => push_escaped(&mut out, ch),
        }
        pos += ch.len_utf16();
    }

    while let Some(span) = open.pop() {
        out.push_str(close_span_tag(span));
    }

    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(ch),
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        push_escaped(&mut out, ch);
    }
    out
}
