//! Previous/next navigation for the post page.

use spdlog::debug;

use crate::post::{nav_fields, NavLink, PostDetail};
use crate::source::{ContentSource, Direction, Ordering, Predicate, QueryOptions, SourceError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacentPosts {
    /// Nearest older post.
    pub prev: Option<NavLink>,
    /// Nearest newer post.
    pub next: Option<NavLink>,
}

/// Everything the post page needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    pub post: PostDetail,
    pub adjacent: AdjacentPosts,
}

async fn first_link<S: ContentSource>(source: &S, predicates: &[Predicate], options: &QueryOptions) -> Result<Option<NavLink>, SourceError> {
    let page = source.query(predicates, options).await?;
    page.results.first()
        .map(NavLink::from_document)
        .transpose()
}

async fn earlier_post<S: ContentSource>(source: &S, doc_type: &str, current: &PostDetail) -> Result<Option<NavLink>, SourceError> {
    // A draft that never went out has nothing published before it
    let Some(published) = current.first_publication_date else {
        return Ok(None);
    };

    let predicates = [
        Predicate::document_type(doc_type),
        Predicate::PublishedBefore(published),
    ];
    let options = QueryOptions {
        fetch: nav_fields(doc_type),
        page_size: 1,
        orderings: vec![Ordering::by_first_publication(Direction::Descending)],
        ..Default::default()
    };
    first_link(source, &predicates, &options).await
}

async fn later_post<S: ContentSource>(source: &S, doc_type: &str, current: &PostDetail) -> Result<Option<NavLink>, SourceError> {
    let predicates = [Predicate::document_type(doc_type)];
    let options = QueryOptions {
        fetch: nav_fields(doc_type),
        page_size: 1,
        after: Some(current.id.clone()),
        orderings: vec![Ordering::by_first_publication(Direction::Ascending)],
        ..Default::default()
    };
    first_link(source, &predicates, &options).await
}

/// Finds the posts published right before and right after `current`.
///
/// When both lookups land on the same post only the previous link is kept.
pub async fn resolve_adjacent<S: ContentSource>(source: &S, doc_type: &str, current: &PostDetail) -> Result<AdjacentPosts, SourceError> {
    let (prev, next) = tokio::try_join!(
        earlier_post(source, doc_type, current),
        later_post(source, doc_type, current),
    )?;

    let next = match (&prev, next) {
        (Some(prev), Some(next)) if prev.uid == next.uid => {
            debug!("Previous and next of {} are both {}, dropping next", current.uid, next.uid);
            None
        }
        (_, next) => next,
    };

    Ok(AdjacentPosts { prev, next })
}

/// Loads a post and its neighbours. The document has to be fetched first since both
/// neighbour lookups are positioned from it.
pub async fn load_post_page<S: ContentSource>(source: &S, doc_type: &str, uid: &str) -> Result<PostPage, SourceError> {
    let document = source.get_by_uid(doc_type, uid).await?;
    let post = PostDetail::from_document(&document)?;
    let adjacent = resolve_adjacent(source, doc_type, &post).await?;

    Ok(PostPage { post, adjacent })
}
