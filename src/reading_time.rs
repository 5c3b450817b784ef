use crate::post::Section;

pub const WORDS_PER_MINUTE: u32 = 200;

pub fn word_count(sections: &[Section]) -> usize {
    sections.iter()
        .map(|section| section.body.as_text().split_whitespace().count())
        .sum()
}

/// Whole minutes needed to read the bodies of `sections`, rounded up.
pub fn reading_time(sections: &[Section], words_per_minute: u32) -> u32 {
    let minutes = word_count(sections).div_ceil(words_per_minute.max(1) as usize);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::rich_text::RichText;

    use super::*;

    fn section(words: usize) -> Section {
        let text = vec!["palavra"; words].join(" ");
        Section {
            heading: "Heading words are not counted".to_string(),
            body: RichText(json!([{"type": "paragraph", "text": text, "spans": []}])),
        }
    }

    fn minutes(word_counts: &[usize]) -> u32 {
        let sections: Vec<Section> = word_counts.iter().map(|w| section(*w)).collect();
        reading_time(&sections, WORDS_PER_MINUTE)
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(minutes(&[199, 1]), 1);
        assert_eq!(minutes(&[0]), 0);
        assert_eq!(minutes(&[250, 250]), 3);
        assert_eq!(minutes(&[]), 0);
        assert_eq!(minutes(&[201]), 2);
    }

    #[test]
    fn test_word_count_across_blocks() {
        let sections = vec![Section {
            heading: "".to_string(),
            body: RichText(json!([
                {"type": "paragraph", "text": "one  two\tthree", "spans": []},
                {"type": "list-item", "text": "four", "spans": []},
                {"type": "paragraph", "text": "   ", "spans": []}
            ])),
        }];
        assert_eq!(word_count(&sections), 4);
        assert_eq!(reading_time(&sections, 3), 2);
    }
}
