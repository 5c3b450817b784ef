//! Incremental listing of posts: a first page plus whatever the reader asked to load since.

use spdlog::debug;

use crate::post::{summary_fields, PostSummary};
use crate::source::{ContentSource, Cursor, Direction, Ordering, Predicate, QueryOptions, SearchPage, SourceError};

pub struct ListingSettings<'a> {
    pub doc_type: &'a str,
    pub page_size: u32,
    /// Preview ref, when rendering unpublished content.
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadMore {
    /// This many posts were appended.
    Loaded(usize),
    /// There was no cursor left. Nothing was fetched.
    Exhausted,
}

/// Posts loaded so far, newest first, and the cursor to the next page.
#[derive(Debug, Clone, PartialEq)]
pub struct PostListing {
    posts: Vec<PostSummary>,
    cursor: Option<Cursor>,
}

fn to_summaries(page: &SearchPage) -> Result<Vec<PostSummary>, SourceError> {
    page.results.iter()
        .map(PostSummary::from_document)
        .collect()
}

pub async fn first_page<S: ContentSource>(source: &S, settings: &ListingSettings<'_>) -> Result<PostListing, SourceError> {
    let options = QueryOptions {
        fetch: summary_fields(settings.doc_type),
        page_size: settings.page_size,
        reference: settings.reference.clone(),
        after: None,
        orderings: vec![Ordering::by_first_publication(Direction::Descending)],
    };

    let page = source.query(&[Predicate::document_type(settings.doc_type)], &options).await?;
    PostListing::from_page(&page)
}

impl PostListing {
    pub fn new(posts: Vec<PostSummary>, cursor: Option<Cursor>) -> Self {
        PostListing { posts, cursor }
    }

    pub fn from_page(page: &SearchPage) -> Result<Self, SourceError> {
        Ok(PostListing::new(to_summaries(page)?, page.next_page.clone()))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Whether a "load more" control should be offered.
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    /// Follows the cursor and appends the next page.
    ///
    /// On error nothing changes: the posts and the cursor stay exactly as they were, so
    /// the caller can keep rendering the current list. Taking `&mut self` means a listing
    /// never has two loads in flight.
    pub async fn load_more<S: ContentSource>(&mut self, source: &S) -> Result<LoadMore, SourceError> {
        let Some(ref cursor) = self.cursor else {
            return Ok(LoadMore::Exhausted);
        };

        debug!("Loading more posts from {}", cursor);
        let page = source.follow(cursor).await?;
        let mut loaded = to_summaries(&page)?;

        let count = loaded.len();
        self.posts.append(&mut loaded);
        self.cursor = page.next_page;

        Ok(LoadMore::Loaded(count))
    }
}
