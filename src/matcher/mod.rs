//! Fuzzy name matching and ranking.
//!
//! Each record is tested against these rules; the first one that fires
//! decides its match type and base score:
//!
//! | rule               | compares                          | base |
//! |--------------------|-----------------------------------|------|
//! | `prefix`           | first two characters              | 100  |
//! | `suffix`           | last two characters               |  80  |
//! | `substring`        | query contained in name           |  60  |
//! | `pinyin_prefix`    | first two characters, romanized   |  95  |
//! | `pinyin_suffix`    | last two characters, romanized    |  75  |
//! | `pinyin_substring` | containment, romanized            |  55  |
//!
//! Romanized rules only run for names containing CJK ideographs, and only
//! when a romanizer is available. An exact name match adds 20, an equal
//! character count adds 10.

pub mod romanize;

use serde::Serialize;
use tracing::debug;

pub use romanize::{default_romanizer, NoRomanizer, Romanizer};
#[cfg(feature = "pinyin")]
pub use romanize::PinyinRomanizer;

use crate::store::{Person, Result, StoreError, ValidationError};

/// Shortest accepted query, in characters after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

/// Prefix/suffix rules compare this many leading/trailing characters.
const AFFIX_CHARS: usize = 2;

const EXACT_MATCH_BONUS: u32 = 20;
const SAME_LENGTH_BONUS: u32 = 10;

/// The rule that made a record match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Prefix,
    Suffix,
    Substring,
    PinyinPrefix,
    PinyinSuffix,
    PinyinSubstring,
}

impl MatchType {
    pub fn base_score(self) -> u32 {
        match self {
            MatchType::Prefix => 100,
            MatchType::PinyinPrefix => 95,
            MatchType::Suffix => 80,
            MatchType::PinyinSuffix => 75,
            MatchType::Substring => 60,
            MatchType::PinyinSubstring => 55,
        }
    }
}

/// One matching record with how and how well it matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub person: Person,
    pub match_type: MatchType,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_pinyin: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Prefix,
    Suffix,
    Substring,
}

impl Shape {
    fn literal(self) -> MatchType {
        match self {
            Shape::Prefix => MatchType::Prefix,
            Shape::Suffix => MatchType::Suffix,
            Shape::Substring => MatchType::Substring,
        }
    }

    fn romanized(self) -> MatchType {
        match self {
            Shape::Prefix => MatchType::PinyinPrefix,
            Shape::Suffix => MatchType::PinyinSuffix,
            Shape::Substring => MatchType::PinyinSubstring,
        }
    }
}

/// Search `persons` for names matching `query`, best first.
///
/// Ties keep the order in which records were supplied.
pub fn search<'a, I>(query: &str, persons: I, romanizer: &dyn Romanizer) -> Result<Vec<SearchHit>>
where
    I: IntoIterator<Item = &'a Person>,
{
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(ValidationError::QueryTooShort {
            min: MIN_QUERY_CHARS,
        }
        .into());
    }

    let query_pinyin = romanizer.romanize(query);

    let mut hits: Vec<SearchHit> = persons
        .into_iter()
        .filter_map(|person| match_person(person, query, query_pinyin.as_deref(), romanizer))
        .collect();

    if hits.is_empty() {
        return Err(StoreError::NoMatches(query.to_string()));
    }

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    debug!(query, hits = hits.len(), "[Search] completed");
    Ok(hits)
}

fn match_person(
    person: &Person,
    query: &str,
    query_pinyin: Option<&str>,
    romanizer: &dyn Romanizer,
) -> Option<SearchHit> {
    let name = person.name.as_str();
    let name_pinyin = if contains_cjk(name) {
        romanizer.romanize(name)
    } else {
        None
    };

    let match_type = match_shape(name, query)
        .map(Shape::literal)
        .or_else(|| match (name_pinyin.as_deref(), query_pinyin) {
            (Some(np), Some(qp)) => match_shape(np, qp).map(Shape::romanized),
            _ => None,
        })?;

    let mut score = match_type.base_score();
    if name == query {
        score += EXACT_MATCH_BONUS;
    }
    if name.chars().count() == query.chars().count() {
        score += SAME_LENGTH_BONUS;
    }

    Some(SearchHit {
        person: person.clone(),
        match_type,
        score,
        name_pinyin,
    })
}

fn match_shape(name: &str, query: &str) -> Option<Shape> {
    let name_chars: Vec<char> = name.chars().collect();
    let query_chars: Vec<char> = query.chars().collect();

    if name_chars.len() >= AFFIX_CHARS && query_chars.len() >= AFFIX_CHARS {
        if name_chars[..AFFIX_CHARS] == query_chars[..AFFIX_CHARS] {
            return Some(Shape::Prefix);
        }
        let name_tail = &name_chars[name_chars.len() - AFFIX_CHARS..];
        let query_tail = &query_chars[query_chars.len() - AFFIX_CHARS..];
        if name_tail == query_tail {
            return Some(Shape::Suffix);
        }
    }

    if name.contains(query) {
        Some(Shape::Substring)
    } else {
        None
    }
}

/// CJK Unified Ideographs, U+4E00..=U+9FFF.
fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewPerson;

    /// Fixed readings so these tests do not depend on the pinyin tables.
    struct TableRomanizer;

    impl Romanizer for TableRomanizer {
        fn romanize(&self, text: &str) -> Option<String> {
            let mut out = String::new();
            for c in text.chars() {
                match c {
                    '张' => out.push_str("zhang"),
                    '伟' => out.push_str("wei"),
                    '强' => out.push_str("qiang"),
                    '李' => out.push_str("li"),
                    '娜' => out.push_str("na"),
                    other => out.extend(other.to_lowercase()),
                }
            }
            Some(out)
        }
    }

    fn person(name: &str) -> Person {
        NewPerson {
            name: name.into(),
            birth_year: 1995,
            birth_month: 10,
            birth_day: 1,
            birth_hour: 6,
            birth_minute: 0,
            city: "杭州".into(),
            latitude: 30.27,
            longitude: 120.15,
            gender: None,
            timezone: None,
        }
        .into_person()
        .unwrap()
    }

    fn names(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.person.name.as_str()).collect()
    }

    #[test]
    fn test_exact_name_ranks_first() {
        let persons = vec![person("张强"), person("张伟")];
        let hits = search("张伟", &persons, &TableRomanizer).unwrap();
        assert_eq!(names(&hits), vec!["张伟", "张强"]);
        assert_eq!(hits[0].match_type, MatchType::Prefix);
        assert_eq!(hits[0].score, 130);
        // Two-character names share no literal affix; "zh" matches after romanizing.
        assert_eq!(hits[1].match_type, MatchType::PinyinPrefix);
        assert_eq!(hits[1].score, 95 + 10);
        assert_eq!(hits[0].name_pinyin.as_deref(), Some("zhangwei"));
    }

    #[test]
    fn test_reversed_name_falls_back_to_pinyin_suffix() {
        let persons = vec![person("张伟"), person("张强")];
        let hits = search("伟张", &persons, &TableRomanizer).unwrap();
        // "weizhang" shares its "ng" ending with "zhangqiang" only.
        assert_eq!(names(&hits), vec!["张强"]);
        assert_eq!(hits[0].match_type, MatchType::PinyinSuffix);
        assert_eq!(hits[0].score, 75 + 10);
    }

    #[test]
    fn test_reversed_name_without_romanizer_is_not_found() {
        let persons = vec![person("张伟"), person("张强")];
        let err = search("伟张", &persons, &NoRomanizer).unwrap_err();
        assert!(matches!(err, StoreError::NoMatches(_)));
    }

    #[test]
    fn test_romanized_containment_is_last_resort() {
        let persons = vec![person("张强"), person("李伟娜")];
        // "liweina" contains "wein" but shares neither "li" nor "na" with it.
        let hits = search("wein", &persons, &TableRomanizer).unwrap();
        assert_eq!(names(&hits), vec!["李伟娜"]);
        assert_eq!(hits[0].match_type, MatchType::PinyinSubstring);
        assert_eq!(hits[0].score, 55);
        assert_eq!(hits[0].name_pinyin.as_deref(), Some("liweina"));
    }

    #[test]
    fn test_single_character_query_is_rejected() {
        let persons = vec![person("张伟")];
        for q in ["张", " 张 ", "", "   "] {
            let err = search(q, &persons, &TableRomanizer).unwrap_err();
            assert!(err.is_validation(), "query {:?}", q);
        }
        let empty: Vec<Person> = vec![];
        assert!(search("张", &empty, &TableRomanizer).unwrap_err().is_validation());
    }

    #[test]
    fn test_literal_rule_precedence() {
        let persons = vec![
            person("Maria Annabella"),
            person("Joanna"),
            person("Annabel"),
            person("Hanna"),
        ];
        let hits = search("Anna", &persons, &NoRomanizer).unwrap();
        assert_eq!(names(&hits), vec!["Annabel", "Joanna", "Hanna", "Maria Annabella"]);
        let types: Vec<MatchType> = hits.iter().map(|h| h.match_type).collect();
        assert_eq!(
            types,
            vec![
                MatchType::Prefix,
                MatchType::Suffix,
                MatchType::Suffix,
                MatchType::Substring
            ]
        );
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let persons = vec![person("张三丰"), person("张无忌"), person("张翠山")];
        let hits = search("张家", &persons, &NoRomanizer);
        // "张家" shares only one leading character; nothing matches.
        assert!(hits.is_err());

        let hits = search("张无", &persons, &NoRomanizer).unwrap();
        assert_eq!(names(&hits), vec!["张无忌"]);

        let persons = vec![person("李娜一"), person("李娜二"), person("李娜三")];
        let hits = search("李娜", &persons, &NoRomanizer).unwrap();
        assert_eq!(names(&hits), vec!["李娜一", "李娜二", "李娜三"]);
        assert!(hits.iter().all(|h| h.score == 100));
    }

    #[test]
    fn test_romanized_query_matches_chinese_name() {
        let persons = vec![person("李娜"), person("张伟")];
        let hits = search("zhangwei", &persons, &TableRomanizer).unwrap();
        assert_eq!(names(&hits), vec!["张伟"]);
        assert_eq!(hits[0].match_type, MatchType::PinyinPrefix);
        assert_eq!(hits[0].score, 95);
    }

    #[test]
    fn test_latin_names_skip_romanized_rules() {
        let persons = vec![person("Wei")];
        let hits = search("ei", &persons, &TableRomanizer).unwrap();
        assert_eq!(hits[0].match_type, MatchType::Suffix);
        assert_eq!(hits[0].name_pinyin, None);
        // "li" never matches "Wei" literally and Wei has no CJK to romanize.
        assert!(search("li", &persons, &TableRomanizer).is_err());
    }

    #[test]
    fn test_query_is_trimmed() {
        let persons = vec![person("张伟")];
        let hits = search("  张伟 ", &persons, &TableRomanizer).unwrap();
        assert_eq!(hits[0].score, 130);
    }

    #[test]
    fn test_hit_serializes_flat() {
        let persons = vec![person("张伟")];
        let hits = search("张伟", &persons, &TableRomanizer).unwrap();
        let json = serde_json::to_value(&hits[0]).unwrap();
        assert_eq!(json["name"], "张伟");
        assert_eq!(json["match_type"], "prefix");
        assert_eq!(json["score"], 130);
        assert_eq!(json["name_pinyin"], "zhangwei");
        assert_eq!(json["location"]["city"], "杭州");
    }

    #[test]
    fn test_contains_cjk() {
        assert!(contains_cjk("Li 娜"));
        assert!(!contains_cjk("Lina"));
        assert!(!contains_cjk("ㄅㄆ"));
    }
}
