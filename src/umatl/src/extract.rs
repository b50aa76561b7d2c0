//! Dialogue extraction from asset trees
//!
//! Story and home timelines share a schema: the root object lists timeline
//! blocks, each block's text track lists clips, and each clip points at a
//! sibling object holding the actual line. Race text is a flat list on the
//! root object.

use std::collections::HashSet;

use serde_json::Value;

use crate::content::ContentType;
use crate::document::{Choice, ColoredText, DialogueDocument, TextBlock};
use crate::tree::{AssetTree, DecodeError, FieldAccess, Fields};

/// Race story ids are the last 9 characters of the root object's name
const RACE_ID_LEN: usize = 9;

/// Build a document from a loaded bundle.
///
/// Returns `Ok(None)` when the root object has no typetree.
pub fn extract(
    content_type: ContentType,
    tree: &dyn AssetTree,
) -> Result<Option<DialogueDocument>, DecodeError> {
    let root = tree.root();
    if !root.has_schema() {
        tracing::warn!(
            bundle = tree.bundle_name(),
            object_type = root.type_name(),
            "root object has no typetree"
        );
        return Ok(None);
    }
    let fields = root.read_fields()?;

    let mut doc = DialogueDocument::new(tree.bundle_name(), content_type);
    if content_type.uses_timeline() {
        extract_timeline(tree, &fields, &mut doc)?;
    } else {
        extract_race(&fields, &mut doc)?;
    }

    tracing::debug!(
        bundle = tree.bundle_name(),
        story = %doc.story_id,
        blocks = doc.blocks.len(),
        "extracted"
    );
    Ok(Some(doc))
}

fn extract_timeline(
    tree: &dyn AssetTree,
    root: &Fields,
    doc: &mut DialogueDocument,
) -> Result<(), DecodeError> {
    doc.story_id = scalar_string(root, "StoryId")?;
    doc.title = root.get_str("Title")?.to_string();

    let mut seen = HashSet::new();
    for block in root.get_list("BlockList")? {
        let block_idx = block.get_int("BlockIndex")?;

        for clip in block.get_map("TextTrack")?.get_list("ClipList")? {
            let path_id = clip.get_int("m_PathID")?;
            if path_id == 0 {
                // null reference
                continue;
            }

            let object = tree.resolve(path_id)?;
            if !object.has_schema() {
                tracing::warn!(path_id, block_idx, "text clip has no typetree, skipping");
                continue;
            }

            if let Some(mut text) = read_clip(&object.read_fields()?)? {
                text.path_id = Some(path_id);
                text.block_idx = block_idx;
                if !seen.insert(block_idx) {
                    tracing::warn!(
                        story = %doc.story_id,
                        block_idx,
                        path_id,
                        "block index repeated; lines sharing it merge by occurrence"
                    );
                }
                doc.blocks.push(text);
            }
        }
    }

    Ok(())
}

/// Read one text clip. Clips without text yield `None`.
fn read_clip(clip: &Fields) -> Result<Option<TextBlock>, DecodeError> {
    let jp_text = clip.get_str("Text")?;
    if jp_text.is_empty() {
        return Ok(None);
    }

    let choices = clip
        .get_list("ChoiceDataList")?
        .into_iter()
        .map(|c| {
            Ok(Choice {
                jp_text: c.get_str("Text")?.to_string(),
                en_text: String::new(),
                next_block: c.get_int("NextBlock")?,
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    let colored_text = clip
        .get_list("ColorTextInfoList")?
        .into_iter()
        .map(|c| {
            Ok(ColoredText {
                jp_text: c.get_str("Text")?.to_string(),
                en_text: String::new(),
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    Ok(Some(TextBlock {
        jp_name: Some(clip.get_str("Name")?.to_string()),
        en_name: Some(String::new()),
        jp_text: jp_text.to_string(),
        en_text: String::new(),
        next_block: Some(clip.get_int("NextBlock")?),
        choices: (!choices.is_empty()).then_some(choices),
        colored_text: (!colored_text.is_empty()).then_some(colored_text),
        path_id: None,
        block_idx: 0,
    }))
}

fn extract_race(root: &Fields, doc: &mut DialogueDocument) -> Result<(), DecodeError> {
    let name: Vec<char> = root.get_str("m_Name")?.chars().collect();
    let start = name.len().saturating_sub(RACE_ID_LEN);
    doc.story_id = name[start..].iter().collect();

    for entry in root.get_list("textData")? {
        let text = entry.get_str("text")?;
        if text.is_empty() {
            continue;
        }
        doc.blocks.push(TextBlock::race(text, entry.get_int("key")?));
    }

    Ok(())
}

/// A field that some game versions store as a number and others as text
fn scalar_string(fields: &Fields, name: &str) -> Result<String, DecodeError> {
    match fields.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(DecodeError::MissingField(name.to_string())),
    }
}
