use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::adjacent::PostPage;
use crate::config::Comments;
use crate::text_utils::{format_edited, format_optional_date};

#[derive(ramhorns::Content)]
struct ViewSection<'a> {
    heading: &'a str,
    body: String,
}

#[derive(ramhorns::Content)]
struct ViewLink<'a> {
    link: String,
    title: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewComments<'a> {
    repo: &'a str,
    issue_term: &'a str,
    theme: &'a str,
    label: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    uid: &'a str,
    post_title: &'a str,
    subtitle: &'a str,
    author: &'a str,
    date: String,
    edited: String,
    banner_url: &'a str,
    has_banner: bool,
    reading_time: u32,
    sections: Vec<ViewSection<'a>>,
    prev: Vec<ViewLink<'a>>,
    next: Vec<ViewLink<'a>>,
    comments: Vec<ViewComments<'a>>,
}

fn view_link(link: Option<&crate::post::NavLink>) -> Vec<ViewLink> {
    link.map(|l| ViewLink {
        link: format!("/post/{}/", l.uid),
        title: l.title.as_str(),
    }).into_iter().collect()
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer<'_>> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, page: &PostPage, reading_time: u32, comments: Option<&Comments>) -> String {
        let post = &page.post;
        let sections = post.content.iter()
            .map(|s| ViewSection {
                heading: s.heading.as_str(),
                body: s.body.as_html(),
            })
            .collect();

        let edited = match post.last_publication_date {
            Some(ref last) if post.was_edited() => format_edited(last),
            _ => String::new(),
        };

        let comments = comments.map(|c| ViewComments {
            repo: c.repo.as_str(),
            issue_term: c.issue_term.as_str(),
            theme: c.theme.as_str(),
            label: c.label.as_deref().unwrap_or_default(),
        }).into_iter().collect();

        self.template.render(&ViewItem {
            uid: post.uid.as_str(),
            post_title: post.title.as_str(),
            subtitle: post.subtitle.as_str(),
            author: post.author.as_str(),
            date: format_optional_date(post.first_publication_date.as_ref()),
            edited,
            banner_url: post.banner_url.as_str(),
            has_banner: !post.banner_url.is_empty(),
            reading_time,
            sections,
            prev: view_link(page.adjacent.prev.as_ref()),
            next: view_link(page.adjacent.next.as_ref()),
            comments,
        })
    }
}

#[derive(ramhorns::Content)]
struct NotFoundPage<'a> {
    slug: &'a str,
}

pub fn render_not_found(not_found_tpl_src: &str, slug: &str) -> io::Result<String> {
    let template = match Template::new(not_found_tpl_src) {
        Ok(x) => x,
        Err(e) => {
            return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing not found template: {}", e)));
        }
    };
    Ok(template.render(&NotFoundPage { slug }))
}

#[cfg(test)]
mod tests {
    use crate::adjacent::{AdjacentPosts, PostPage};
    use crate::config::Comments;
    use crate::post::{NavLink, PostDetail};
    use crate::test_data::{document, POST_DATA};
    use crate::util::prismic_date::parse_prismic_date;
    use crate::view::post_renderer::{render_not_found, PostRenderer};

    fn page() -> PostPage {
        let mut doc = document("YFG2PhIAACMAgZ3n", "como-utilizar-hooks", "2021-03-15T19:25:28+0000", serde_json::from_str(POST_DATA).unwrap());
        doc.last_publication_date = Some(parse_prismic_date("2021-03-19T15:49:13+0000").unwrap());
        PostPage {
            post: PostDetail::from_document(&doc).unwrap(),
            adjacent: AdjacentPosts {
                prev: Some(NavLink { uid: "criando-um-app".to_string(), title: "Criando um app <CRA>".to_string() }),
                next: None,
            },
        }
    }

    #[test]
    fn render_view() {
        let template_src = r##"TITLE=[{{post_title}}]
AUTHOR=[{{author}}]
DATE=[{{date}}]
EDITED=[{{edited}}]
BANNER=[{{#has_banner}}{{banner_url}}{{/has_banner}}]
TIME=[{{reading_time}} min]
SECTIONS=[{{#sections}}<h2>{{heading}}</h2>{{{body}}}{{/sections}}]
PREV=[{{#prev}}{{link}}|{{title}}{{/prev}}]
NEXT=[{{#next}}{{link}}|{{title}}{{/next}}]
COMMENTS=[{{#comments}}{{repo}}{{/comments}}]"##;
        let post_renderer = PostRenderer::new(template_src).unwrap();
        let res = post_renderer.render(&page(), 4, None);
        assert_eq!(res, r##"TITLE=[Como utilizar Hooks]
AUTHOR=[Joseph Oliveira]
DATE=[15 mar 2021]
EDITED=[* editado em 19 mar 2021, às 15:49]
BANNER=[https://images.prismic.io/blog/banner.png]
TIME=[4 min]
SECTIONS=[<h2>Proin et varius</h2><p><strong>Lorem ipsum</strong> dolor sit amet, consectetur adipiscing elit.</p><p>Nullam dolor sapien, vulputate eu diam at.</p><h2>Cras laoreet mi</h2><ul><li>Ut varius</li><li>Aliquam quis</li></ul>]
PREV=[/post/criando-um-app/|Criando um app &lt;CRA&gt;]
NEXT=[]
COMMENTS=[]"##);
    }

    #[test]
    fn render_comments() {
        let post_renderer = PostRenderer::new("{{#comments}}{{repo}} {{issue_term}} {{theme}} {{label}}{{/comments}}").unwrap();
        let comments = Comments {
            repo: "someone/blog-comments".to_string(),
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
            label: Some("comment".to_string()),
        };
        let res = post_renderer.render(&page(), 1, Some(&comments));
        assert_eq!(res, "someone/blog-comments pathname github-dark comment");
    }

    #[test]
    fn render_not_found_page() {
        let res = render_not_found("Post {{slug}} not found", "<nope>").unwrap();
        assert_eq!(res, "Post &lt;nope&gt; not found");
    }
}
