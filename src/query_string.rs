use std::collections::HashMap;
use std::string::ToString;

// Upper bound for `pages`, each extra page is one more request to the CMS
const MAX_PAGES: u32 = 50;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    /// How many listing pages to show, from `pages=N`.
    pub fn get_pages(&self) -> u32 {
        let one = "1".to_string();
        let val = self.items.get("pages").unwrap_or(&one);
        let val: u32 = val.parse().unwrap_or(1);
        val.clamp(1, MAX_PAGES)
    }

    /// Preview ref, from `ref=...`.
    pub fn get_ref(&self) -> Option<String> {
        self.items.get("ref")
            .filter(|r| !r.is_empty())
            .cloned()
    }
}
