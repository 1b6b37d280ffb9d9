//! Corpus record types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One word occurrence in a verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub surface_form: String,
    pub surface_form_uthmani: Option<String>,
    pub root: Option<String>,
}

impl Token {
    /// Display form used for word-form ranking: the diacritized Uthmani
    /// spelling when present, otherwise the plain surface form.
    pub fn form(&self) -> &str {
        match self.surface_form_uthmani.as_deref() {
            Some(uthmani) if !uthmani.trim().is_empty() => uthmani,
            _ => &self.surface_form,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub global_id: u32,
    pub chapter_no: u32,
    pub verse_no: u32,
    pub page: u32,
    pub section: u32,
    pub text: String,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    Meccan,
    Medinan,
}

impl Era {
    pub fn as_str(&self) -> &'static str {
        match self {
            Era::Meccan => "meccan",
            Era::Medinan => "medinan",
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Era {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meccan" => Ok(Era::Meccan),
            "medinan" => Ok(Era::Medinan),
            other => Err(format!("unknown era '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterMeta {
    pub chapter_no: u32,
    pub name: String,
    pub era: Era,
    pub revelation_order: u32,
}

/// A root as seen in the corpus: the normalized comparison key plus the raw
/// form kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RootRef {
    pub key: String,
    pub display: String,
}

/// A verse that matched a root query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedVerse {
    #[serde(flatten)]
    pub verse: Verse,
    pub matched_tokens: Vec<Token>,
    #[serde(serialize_with = "serialize_root_displays")]
    pub other_roots: Vec<RootRef>,
}

impl AnnotatedVerse {
    pub fn occurrences(&self) -> u64 {
        self.matched_tokens.len() as u64
    }
}

fn serialize_root_displays<S>(roots: &[RootRef], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(roots.iter().map(|r| r.display.as_str()))
}

/// All verses containing a root, in corpus order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceSet {
    pub root: String,
    pub normalized_root: String,
    pub verses: Vec<AnnotatedVerse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(surface: &str, uthmani: Option<&str>) -> Token {
        Token {
            surface_form: surface.to_string(),
            surface_form_uthmani: uthmani.map(str::to_string),
            root: None,
        }
    }

    #[test]
    fn form_prefers_uthmani_spelling() {
        assert_eq!(token("الرحمن", Some("ٱلرَّحْمَٰنِ")).form(), "ٱلرَّحْمَٰنِ");
        assert_eq!(token("الرحمن", None).form(), "الرحمن");
        assert_eq!(token("الرحمن", Some("  ")).form(), "الرحمن");
    }

    #[test]
    fn era_parses_exact_names_and_serializes_lowercase() {
        assert_eq!("meccan".parse::<Era>().unwrap(), Era::Meccan);
        assert_eq!("medinan".parse::<Era>().unwrap(), Era::Medinan);
        for loose in ["Meccan", " medinan ", "makki", "madani", "mecca", "medina", "other"] {
            assert!(loose.parse::<Era>().is_err(), "{loose:?} should be rejected");
        }
        assert_eq!(serde_json::to_string(&Era::Medinan).unwrap(), "\"medinan\"");
    }

    #[test]
    fn annotated_verse_serializes_other_roots_as_display_strings() {
        let verse = AnnotatedVerse {
            verse: Verse {
                global_id: 1,
                chapter_no: 1,
                verse_no: 1,
                page: 1,
                section: 1,
                text: "بسم".to_string(),
                tokens: vec![],
            },
            matched_tokens: vec![],
            other_roots: vec![RootRef {
                key: "اله".to_string(),
                display: "أله".to_string(),
            }],
        };
        let json = serde_json::to_value(&verse).unwrap();
        assert_eq!(json["otherRoots"], serde_json::json!(["أله"]));
        assert_eq!(json["chapterNo"], 1);
    }
}
