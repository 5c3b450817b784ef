use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::json;

use crate::source::{ContentSource, Cursor, Direction, Document, Predicate, QueryOptions, SearchPage, SourceError};
use crate::util::prismic_date::parse_prismic_date;

pub const POST_DATA: &str = r##"{
  "title": "Como utilizar Hooks",
  "subtitle": "Pensando em sincronização em vez de ciclos de vida",
  "author": "Joseph Oliveira",
  "banner": {
    "dimensions": {"width": 1440, "height": 400},
    "alt": null,
    "url": "https://images.prismic.io/blog/banner.png"
  },
  "content": [
    {
      "heading": "Proin et varius",
      "body": [
        {"type": "paragraph", "text": "Lorem ipsum dolor sit amet, consectetur adipiscing elit.", "spans": [{"start": 0, "end": 11, "type": "strong"}]},
        {"type": "paragraph", "text": "Nullam dolor sapien, vulputate eu diam at.", "spans": []}
      ]
    },
    {
      "heading": "Cras laoreet mi",
      "body": [
        {"type": "list-item", "text": "Ut varius", "spans": []},
        {"type": "list-item", "text": "Aliquam quis", "spans": []}
      ]
    }
  ]
}"##;

pub fn document(id: &str, uid: &str, first_publication_date: &str, data: serde_json::Value) -> Document {
    let date = parse_prismic_date(first_publication_date).unwrap();
    Document {
        id: id.to_string(),
        uid: Some(uid.to_string()),
        doc_type: "posts".to_string(),
        first_publication_date: Some(date),
        last_publication_date: Some(date),
        data,
    }
}

/// A post whose title is its uid in upper case.
pub fn post(id: &str, uid: &str, first_publication_date: &str) -> Document {
    document(id, uid, first_publication_date, json!({
        "title": uid.to_uppercase(),
        "subtitle": format!("About {}", uid),
        "author": "Joseph Oliveira",
        "content": []
    }))
}

pub fn page(docs: Vec<Document>, next_page: Option<&str>) -> SearchPage {
    SearchPage {
        results: docs,
        next_page: next_page.map(|c| Cursor(c.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    Query(Vec<Predicate>, QueryOptions),
    GetByUid(String),
    Follow(Cursor),
}

/// Honors the query contract over a fixed set of documents. Cursor pages are registered
/// explicitly, everything else is computed from `docs`.
pub struct InMemorySource {
    docs: Vec<Document>,
    pages: HashMap<Cursor, Result<SearchPage, u16>>,
    failing_status: Option<u16>,
    pub calls: RefCell<Vec<SourceCall>>,
}

impl InMemorySource {
    pub fn new(docs: Vec<Document>) -> Self {
        InMemorySource {
            docs,
            pages: HashMap::new(),
            failing_status: None,
            calls: RefCell::new(vec![]),
        }
    }

    pub fn with_page(mut self, cursor: &str, page: SearchPage) -> Self {
        self.pages.insert(Cursor(cursor.to_string()), Ok(page));
        self
    }

    pub fn with_failing_page(mut self, cursor: &str, status: u16) -> Self {
        self.pages.insert(Cursor(cursor.to_string()), Err(status));
        self
    }

    /// Every query and lookup fails with `status`.
    pub fn failing(mut self, status: u16) -> Self {
        self.failing_status = Some(status);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn follow_count(&self) -> usize {
        self.calls.borrow().iter()
            .filter(|c| matches!(c, SourceCall::Follow(_)))
            .count()
    }

    fn matches(doc: &Document, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::DocumentType(doc_type) => &doc.doc_type == doc_type,
            Predicate::PublishedBefore(date) => doc.first_publication_date.is_some_and(|d| d < *date),
            Predicate::Uid { doc_type, uid } => &doc.doc_type == doc_type && doc.uid.as_deref() == Some(uid.as_str()),
        }
    }
}

impl ContentSource for InMemorySource {
    async fn query(&self, predicates: &[Predicate], options: &QueryOptions) -> Result<SearchPage, SourceError> {
        self.calls.borrow_mut().push(SourceCall::Query(predicates.to_vec(), options.clone()));
        if let Some(status) = self.failing_status {
            return Err(SourceError::HttpStatus(status));
        }

        let mut docs: Vec<Document> = self.docs.iter()
            .filter(|doc| predicates.iter().all(|p| Self::matches(doc, p)))
            .cloned()
            .collect();

        // Only publication date orderings are needed here
        if let Some(ordering) = options.orderings.first() {
            docs.sort_by(|a, b| match ordering.direction {
                Direction::Ascending => a.first_publication_date.cmp(&b.first_publication_date),
                Direction::Descending => b.first_publication_date.cmp(&a.first_publication_date),
            });
        }

        if let Some(ref after) = options.after {
            docs = match docs.iter().position(|d| &d.id == after) {
                Some(index) => docs.split_off(index + 1),
                None => vec![],
            };
        }

        let page_size = if options.page_size == 0 { 20 } else { options.page_size as usize };
        let next_page = if docs.len() > page_size {
            Some(Cursor(format!("mem://after/{}", docs[page_size - 1].id)))
        } else {
            None
        };
        docs.truncate(page_size);

        Ok(SearchPage {
            results: docs,
            next_page,
        })
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, SourceError> {
        self.calls.borrow_mut().push(SourceCall::GetByUid(uid.to_string()));
        if let Some(status) = self.failing_status {
            return Err(SourceError::HttpStatus(status));
        }

        self.docs.iter()
            .find(|d| d.doc_type == doc_type && d.uid.as_deref() == Some(uid))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(uid.to_string()))
    }

    async fn follow(&self, cursor: &Cursor) -> Result<SearchPage, SourceError> {
        self.calls.borrow_mut().push(SourceCall::Follow(cursor.clone()));
        match self.pages.get(cursor) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(status)) => Err(SourceError::HttpStatus(*status)),
            None => Err(SourceError::HttpStatus(404)),
        }
    }
}
