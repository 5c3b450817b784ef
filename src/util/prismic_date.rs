use chrono::{DateTime, FixedOffset, ParseResult};
use serde::{Deserialize, Deserializer, Serializer};

// Prismic sends `2021-03-15T19:25:28+0000`, which is not RFC 3339 (no colon in the offset).
pub const PRISMIC_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

pub fn parse_prismic_date(s: &str) -> ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, PRISMIC_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
}

pub fn format_prismic_date(date: &DateTime<FixedOffset>) -> String {
    date.format(PRISMIC_DATE_FORMAT).to_string()
}

/// Serde adapter for `Option<DateTime<FixedOffset>>` fields in Prismic documents.
pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
        where
            D: Deserializer<'de>,
    {
        use serde::de::Error;
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(s) => parse_prismic_date(&s).map(Some).map_err(Error::custom),
        }
    }

    pub fn serialize<S>(date: &Option<DateTime<FixedOffset>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&format_prismic_date(date)),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Doc {
        #[serde(default, with = "option")]
        first_publication_date: Option<DateTime<FixedOffset>>,
    }

    #[test]
    fn test_prismic_date() {
        let date = parse_prismic_date("2021-03-15T19:25:28+0000").unwrap();
        assert_eq!(date.year(), 2021);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 19);
        assert_eq!(format_prismic_date(&date), "2021-03-15T19:25:28+0000");
    }

    #[test]
    fn test_rfc3339_fallback() {
        let date = parse_prismic_date("2021-03-15T19:25:28+00:00").unwrap();
        assert_eq!(format_prismic_date(&date), "2021-03-15T19:25:28+0000");
    }

    #[test]
    fn test_deserialize_null_and_missing() {
        let doc: Doc = serde_json::from_str(r#"{"first_publication_date": null}"#).unwrap();
        assert!(doc.first_publication_date.is_none());

        let doc: Doc = serde_json::from_str(r#"{}"#).unwrap();
        assert!(doc.first_publication_date.is_none());

        let doc: Doc = serde_json::from_str(r#"{"first_publication_date": "2021-04-01T10:00:00+0000"}"#).unwrap();
        assert_eq!(doc.first_publication_date.unwrap().day(), 1);
    }
}
