use std::io;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Result;
use spdlog::warn;

use crate::adjacent::load_post_page;
use crate::config::Config;
use crate::listing::{first_page, ListingSettings, LoadMore, PostListing};
use crate::reading_time::reading_time;
use crate::source::ContentSource;
use crate::view::list_renderer::ListRenderer;
use crate::view::post_renderer::{render_not_found, PostRenderer};

pub const INDEX_TEMPLATE: &str = "index.tpl";
pub const POST_TEMPLATE: &str = "post.tpl";
pub const NOT_FOUND_TEMPLATE: &str = "not_found.tpl";

/// Template sources, read once at startup.
pub struct Templates {
    pub index: String,
    pub post: String,
    pub not_found: String,
}

pub fn read_template(tpl_dir: &Path, file_name: &str) -> io::Result<String> {
    let full_path = tpl_dir.join(file_name);
    match std::fs::read_to_string(&full_path) {
        Ok(s) => Ok(s),
        Err(e) => Err(io::Error::new(e.kind(), format!("Error loading template {}: {}", full_path.display(), e))),
    }
}

impl Templates {
    pub fn load(tpl_dir: &Path) -> io::Result<Templates> {
        let templates = Templates {
            index: read_template(tpl_dir, INDEX_TEMPLATE)?,
            post: read_template(tpl_dir, POST_TEMPLATE)?,
            not_found: read_template(tpl_dir, NOT_FOUND_TEMPLATE)?,
        };

        // Fail at startup rather than on the first request
        ListRenderer::new(&templates.index)?;
        PostRenderer::new(&templates.post)?;
        ramhorns::Template::new(templates.not_found.as_str())
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, format!("Error parsing not found template: {}", e)))?;

        Ok(templates)
    }
}

pub fn listing_settings(config: &Config, reference: Option<String>) -> ListingSettings {
    ListingSettings {
        doc_type: config.source.document_type.as_str(),
        page_size: config.defaults.page_size,
        reference,
    }
}

/// Loads the first page and then up to `pages - 1` more.
///
/// A failed load stops there and keeps what was loaded. Returns the listing and how many
/// pages it actually holds.
pub async fn load_listing<S: ContentSource>(source: &S, settings: &ListingSettings<'_>, pages: u32) -> Result<(PostListing, u32)> {
    let mut listing = first_page(source, settings).await?;
    let mut loaded = 1;

    while loaded < pages {
        match listing.load_more(source).await {
            Ok(LoadMore::Loaded(_)) => loaded += 1,
            Ok(LoadMore::Exhausted) => break,
            Err(e) => {
                warn!("Could not load more posts, keeping {} page(s): {}", loaded, e);
                break;
            }
        }
    }

    Ok((listing, loaded))
}

pub struct RenderedList {
    pub html: String,
    /// False when a failed load cut the list short of the requested pages.
    pub complete: bool,
}

/// Renders the post list. `link_for(n)` builds the link to the list holding `n` pages.
pub async fn render_list<S, F>(source: &S, config: &Config, templates: &Templates, pages: u32, reference: Option<String>, link_for: F) -> Result<RenderedList>
    where
        S: ContentSource,
        F: Fn(u32) -> String,
{
    let preview = reference.is_some();
    let settings = listing_settings(config, reference);
    let (listing, loaded) = load_listing(source, &settings, pages).await?;

    let list_renderer = ListRenderer::new(&templates.index)?;
    let load_more_link = listing.has_more().then(|| link_for(loaded + 1));
    Ok(RenderedList {
        html: list_renderer.render(listing.posts(), load_more_link.as_deref(), preview),
        complete: loaded == pages || !listing.has_more(),
    })
}

pub async fn render_post<S: ContentSource>(source: &S, config: &Config, templates: &Templates, uid: &str) -> Result<String> {
    let page = load_post_page(source, &config.source.document_type, uid).await?;
    let minutes = reading_time(&page.post.content, config.defaults.words_per_minute);

    let post_renderer = PostRenderer::new(&templates.post)?;
    Ok(post_renderer.render(&page, minutes, config.comments.as_ref()))
}

pub fn render_missing(templates: &Templates, slug: &str) -> io::Result<String> {
    render_not_found(&templates.not_found, slug)
}
