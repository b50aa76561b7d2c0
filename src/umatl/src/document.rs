//! Exported dialogue documents
//!
//! The JSON layout is shared with the translation tooling downstream, so the
//! field names are fixed: `jp*` fields hold the original text read from the
//! game, `en*` fields hold translator work and are the only fields carried
//! across re-extractions.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::content::ContentType;
use crate::Error;

/// Version tag written into every export
pub const FORMAT_VERSION: u32 = 3;

/// One exported story, home or race text file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueDocument {
    pub version: u32,
    pub bundle: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(rename = "storyId")]
    pub story_id: String,
    pub title: String,
    #[serde(rename = "text")]
    pub blocks: Vec<TextBlock>,
}

impl DialogueDocument {
    pub fn new(bundle: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            version: FORMAT_VERSION,
            bundle: bundle.into(),
            content_type,
            story_id: String::new(),
            title: String::new(),
            blocks: Vec::new(),
        }
    }

    /// Read a previously written export
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// First block carrying the given block index
    pub fn block(&self, block_idx: i64) -> Option<&TextBlock> {
        self.nth_block(block_idx, 0)
    }

    /// The `nth` block (zero-based) carrying the given block index. A timeline
    /// block with several text clips yields several lines sharing one index.
    pub fn nth_block(&self, block_idx: i64, nth: usize) -> Option<&TextBlock> {
        self.blocks
            .iter()
            .filter(|b| b.block_idx == block_idx)
            .nth(nth)
    }
}

/// A single line of dialogue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jp_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_name: Option<String>,
    pub jp_text: String,
    #[serde(default)]
    pub en_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_block: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colored_text: Option<Vec<ColoredText>>,
    /// Object id inside the source bundle, needed to re-import the line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_id: Option<i64>,
    /// Index of the owning timeline block; the merge key
    pub block_idx: i64,
}

impl TextBlock {
    /// Race text: original text and key only
    pub fn race(jp_text: impl Into<String>, block_idx: i64) -> Self {
        Self {
            jp_text: jp_text.into(),
            block_idx,
            ..Self::default()
        }
    }
}

/// A selectable response attached to a line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub jp_text: String,
    #[serde(default)]
    pub en_text: String,
    pub next_block: i64,
}

/// Highlighted span of a line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColoredText {
    pub jp_text: String,
    #[serde(default)]
    pub en_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_story_block_serializes_all_fields() {
        let block = TextBlock {
            jp_name: Some("トレーナー".into()),
            en_name: Some(String::new()),
            jp_text: "こんにちは".into(),
            next_block: Some(3),
            choices: Some(vec![Choice {
                jp_text: "はい".into(),
                en_text: String::new(),
                next_block: 4,
            }]),
            path_id: Some(-8812),
            block_idx: 2,
            ..TextBlock::default()
        };

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({
                "jpName": "トレーナー",
                "enName": "",
                "jpText": "こんにちは",
                "enText": "",
                "nextBlock": 3,
                "choices": [{"jpText": "はい", "enText": "", "nextBlock": 4}],
                "pathId": -8812,
                "blockIdx": 2
            })
        );
    }

    #[test]
    fn test_race_block_omits_story_fields() {
        let value = serde_json::to_value(TextBlock::race("ゴール！", 5)).unwrap();
        assert_eq!(value, json!({"jpText": "ゴール！", "enText": "", "blockIdx": 5}));
    }

    #[test]
    fn test_document_keys() {
        let mut doc = DialogueDocument::new("ABCDEF", ContentType::Home);
        doc.story_id = "01_0010123".into();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["type"], "home");
        assert_eq!(value["storyId"], "01_0010123");
        assert_eq!(value["text"], json!([]));
    }

    #[test]
    fn test_load_tolerates_missing_translation_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("001.json");
        std::fs::write(
            &path,
            r#"{"version":3,"bundle":"X","type":"race","storyId":"091001001","title":"",
               "text":[{"jpText":"a","blockIdx":1}]}"#,
        )
        .unwrap();

        let doc = DialogueDocument::load(&path).unwrap();
        assert_eq!(doc.blocks[0].en_text, "");
        assert!(doc.block(1).is_some());
        assert!(doc.block(2).is_none());
    }

    #[test]
    fn test_load_invalid_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("001.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(DialogueDocument::load(&path), Err(Error::Json { .. })));
    }

    #[test]
    fn test_nth_block_counts_occurrences() {
        let mut doc = DialogueDocument::new("B", ContentType::Story);
        doc.blocks = vec![
            TextBlock::race("一", 5),
            TextBlock::race("二", 6),
            TextBlock::race("三", 5),
        ];

        assert_eq!(doc.block(5).unwrap().jp_text, "一");
        assert_eq!(doc.nth_block(5, 1).unwrap().jp_text, "三");
        assert!(doc.nth_block(5, 2).is_none());
        assert!(doc.nth_block(7, 0).is_none());
    }
}
