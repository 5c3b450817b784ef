use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::PostSummary;
use crate::text_utils::format_optional_date;

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    post_list: Vec<PostItem<'a>>,
    has_more: bool,
    load_more_link: &'a str,
    preview: bool,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    link: String,
    title: &'a str,
    subtitle: &'a str,
    author: &'a str,
    date: String,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<ListRenderer<'_>> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing list template: {}", e)));
            }
        };

        Ok(ListRenderer {
            template,
        })
    }

    /// `load_more_link` is `None` once there is nothing left to load.
    pub fn render(&self, posts: &[PostSummary], load_more_link: Option<&str>, preview: bool) -> String {
        let post_list = posts.iter()
            .map(|post| PostItem {
                link: format!("/post/{}/", post.uid),
                title: post.title.as_str(),
                subtitle: post.subtitle.as_str(),
                author: post.author.as_str(),
                date: format_optional_date(post.first_publication_date.as_ref()),
            })
            .collect();

        self.template.render(&ListPage {
            post_list,
            has_more: load_more_link.is_some(),
            load_more_link: load_more_link.unwrap_or_default(),
            preview,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::post::PostSummary;
    use crate::test_data::post;

    use super::*;

    const TEMPLATE: &str = r##"{{#post_list}}[{{link}}|{{title}}|{{subtitle}}|{{author}}|{{date}}]{{/post_list}}
{{#has_more}}MORE={{load_more_link}}{{/has_more}}{{^has_more}}NO MORE{{/has_more}}
{{#preview}}PREVIEW{{/preview}}"##;

    fn summaries() -> Vec<PostSummary> {
        vec![
            PostSummary::from_document(&post("a", "hooks", "2021-03-15T19:25:28+0000")).unwrap(),
            PostSummary::from_document(&post("b", "cra", "2021-03-01T10:00:00+0000")).unwrap(),
        ]
    }

    #[test]
    fn render_list_with_more() {
        let renderer = ListRenderer::new(TEMPLATE).unwrap();
        let res = renderer.render(&summaries(), Some("/?pages=2"), false);
        assert_eq!(res, r##"[/post/hooks/|HOOKS|About hooks|Joseph Oliveira|15 mar 2021][/post/cra/|CRA|About cra|Joseph Oliveira|01 mar 2021]
MORE=/?pages=2
"##);
    }

    #[test]
    fn render_exhausted_preview() {
        let renderer = ListRenderer::new(TEMPLATE).unwrap();
        let res = renderer.render(&[], None, true);
        assert_eq!(res, "\nNO MORE\nPREVIEW");
    }

    #[test]
    fn render_escapes_titles() {
        let renderer = ListRenderer::new("{{#post_list}}{{title}}{{/post_list}}").unwrap();
        let mut posts = summaries();
        posts.truncate(1);
        posts[0].title = "<b>Hooks</b>".to_string();
        assert_eq!(renderer.render(&posts, None, false), "&lt;b&gt;Hooks&lt;/b&gt;");
    }
}
