//! Static generation: writes every list depth and every post as plain HTML files.
//!
//! Layout of the output directory:
//! - `index.html`: first page of posts
//! - `page/{n}/index.html`: the list after `n - 1` "load more" steps
//! - `post/{uid}/index.html`: one per listed post
//! - `public/`: copy of the public directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use spdlog::{info, warn};

use crate::config::Config;
use crate::listing::{first_page, LoadMore};
use crate::post_processor::{listing_settings, render_post, Templates};
use crate::source::ContentSource;
use crate::view::list_renderer::ListRenderer;

#[derive(Debug, Default, PartialEq)]
pub struct BuildSummary {
    pub list_pages: u32,
    pub posts: usize,
}

fn list_link(page: u32) -> String {
    format!("/page/{}/", page)
}

fn list_path(output_dir: &Path, page: u32) -> PathBuf {
    match page {
        1 => output_dir.join("index.html"),
        n => output_dir.join("page").join(n.to_string()).join("index.html"),
    }
}

fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, content)
}

pub fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

pub async fn build_site<S: ContentSource>(source: &S, config: &Config, templates: &Templates) -> Result<BuildSummary> {
    let output_dir = &config.paths.output_dir;
    let settings = listing_settings(config, None);
    let list_renderer = ListRenderer::new(&templates.index)?;

    let mut listing = first_page(source, &settings).await
        .context("Error loading the first page of posts")?;
    let mut page = 1;

    loop {
        let load_more_link = listing.has_more().then(|| list_link(page + 1));
        let html = list_renderer.render(listing.posts(), load_more_link.as_deref(), false);
        let path = list_path(output_dir, page);
        write_file(&path, &html).with_context(|| format!("Error writing {}", path.display()))?;
        info!("Wrote list page {} with {} posts", page, listing.posts().len());

        match listing.load_more(source).await {
            Ok(LoadMore::Loaded(_)) => page += 1,
            Ok(LoadMore::Exhausted) => break,
            Err(e) => {
                warn!("Stopping pagination after page {}: {}", page, e);
                break;
            }
        }
    }

    for post in listing.posts() {
        let html = render_post(source, config, templates, &post.uid).await
            .with_context(|| format!("Error rendering post {}", post.uid))?;
        let path = output_dir.join("post").join(&post.uid).join("index.html");
        write_file(&path, &html).with_context(|| format!("Error writing {}", path.display()))?;
        info!("Wrote post {}", post.uid);
    }

    let public_dir = &config.paths.public_dir;
    if public_dir.is_dir() {
        copy_dir(public_dir, &output_dir.join("public"))
            .with_context(|| format!("Error copying {}", public_dir.display()))?;
    }

    Ok(BuildSummary {
        list_pages: page,
        posts: listing.posts().len(),
    })
}
