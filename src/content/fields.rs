/*!
 * Logical fields and the entity kinds that carry them.
 */

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::language::Language;

/// A content concept that exists once per supported language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalField {
    Title,
    Description,
    Goal,
    Content,
    Answer,
    Explanation,
    Name,
}

impl LogicalField {
    pub const ALL: [LogicalField; 7] = [
        LogicalField::Title,
        LogicalField::Description,
        LogicalField::Goal,
        LogicalField::Content,
        LogicalField::Answer,
        LogicalField::Explanation,
        LogicalField::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Goal => "goal",
            Self::Content => "content",
            Self::Answer => "answer",
            Self::Explanation => "explanation",
            Self::Name => "name",
        }
    }

    /// Text shown in `lang` when a field has no content in any language
    pub fn placeholder(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::Title, Language::Ko) => "제목 없음",
            (Self::Title, Language::En) => "No Title",
            (Self::Title, Language::Es) => "Sin título",
            (Self::Title, Language::Zh) => "无标题",
            (Self::Title, Language::Ja) => "タイトルなし",

            (Self::Name, Language::Ko) => "이름 없음",
            (Self::Name, Language::En) => "No Name",
            (Self::Name, Language::Es) => "Sin nombre",
            (Self::Name, Language::Zh) => "无名称",
            (Self::Name, Language::Ja) => "名前なし",

            (Self::Content, Language::Ko) => "내용 없음",
            (Self::Content, Language::En) => "No Content",
            (Self::Content, Language::Es) => "Sin contenido",
            (Self::Content, Language::Zh) => "无内容",
            (Self::Content, Language::Ja) => "コンテンツなし",

            (Self::Description, Language::Ko) => "설명 없음",
            (Self::Description, Language::En) => "No Description",
            (Self::Description, Language::Es) => "Sin descripción",
            (Self::Description, Language::Zh) => "无描述",
            (Self::Description, Language::Ja) => "説明なし",

            (_, Language::Ko) => "없음",
            (_, Language::En) | (_, Language::Es) => "N/A",
            (_, Language::Zh) => "无",
            (_, Language::Ja) => "なし",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogicalField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| anyhow!("Unknown field: {}", s))
    }
}

/// Kind of localizable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Study,
    Exam,
    Question,
    StudyTask,
    Tag,
    TagCategory,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Study,
        EntityKind::Exam,
        EntityKind::Question,
        EntityKind::StudyTask,
        EntityKind::Tag,
        EntityKind::TagCategory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Study => "study",
            Self::Exam => "exam",
            Self::Question => "question",
            Self::StudyTask => "study_task",
            Self::Tag => "tag",
            Self::TagCategory => "tag_category",
        }
    }

    /// Fields that exist once per language for this kind
    pub fn translatable_fields(&self) -> &'static [LogicalField] {
        use LogicalField::*;
        match self {
            Self::Study => &[Title, Goal],
            Self::Exam => &[Title, Description],
            Self::Question => &[Title, Content, Answer, Explanation],
            Self::StudyTask | Self::Tag => &[Name],
            Self::TagCategory => &[Name, Description],
        }
    }

    /// Fields that must be non-empty for a language to count as complete
    pub fn required_fields(&self) -> &'static [LogicalField] {
        use LogicalField::*;
        match self {
            Self::Study => &[Title, Goal],
            Self::Exam => &[Title, Description],
            Self::Question => &[Title, Content, Answer],
            Self::StudyTask | Self::Tag | Self::TagCategory => &[Name],
        }
    }

    pub fn has_field(&self, field: LogicalField) -> bool {
        self.translatable_fields().contains(&field)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .find(|kind| kind.as_str() == normalized)
            .copied()
            .ok_or_else(|| anyhow!("Unknown entity kind: {}", s))
    }
}
