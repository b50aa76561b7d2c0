//! Carry translations forward from a previous export
//!
//! Blocks are matched by `blockIdx`. When several lines share an index, the
//! k-th new line takes the k-th old one. Choices and colored text inside a
//! matched block are copied by position, so they must keep their order
//! between game versions; when the counts differ only the shared prefix is
//! copied and a warning is logged.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::content::StoryId;
use crate::document::{DialogueDocument, TextBlock};
use crate::Error;

/// Counts from merging one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Blocks that found a counterpart in the previous export
    pub matched: usize,
    /// Blocks left untranslated
    pub missed: usize,
    /// Matched blocks whose choice or colored text counts differed
    pub misaligned: usize,
}

/// Looks up previous exports under one export root
#[derive(Debug, Clone)]
pub struct TranslationMerger {
    export_root: PathBuf,
}

impl TranslationMerger {
    pub fn new(export_root: impl Into<PathBuf>) -> Self {
        Self {
            export_root: export_root.into(),
        }
    }

    /// Previous export for `story`: the first file (by name) in its export
    /// directory whose name starts with the story index.
    pub fn find_existing(&self, story: &StoryId) -> Option<PathBuf> {
        let dir = story.export_dir(&self.export_root);
        let entries = std::fs::read_dir(&dir).ok()?;

        let mut matches: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter(|e| e.file_name().to_string_lossy().starts_with(&story.index))
            .map(|e| e.path())
            .collect();
        matches.sort();
        matches.into_iter().next()
    }

    /// Load the previous export for `story`, if there is one
    pub fn load_existing(&self, story: &StoryId) -> Result<Option<DialogueDocument>, Error> {
        match self.find_existing(story) {
            Some(path) => {
                tracing::debug!(story = %story, path = %path.display(), "found previous export");
                DialogueDocument::load(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Merge translations into a single block
    pub fn merge(&self, story: &StoryId, block: &mut TextBlock) -> Result<bool, Error> {
        Ok(match self.load_existing(story)? {
            Some(existing) => existing
                .block(block.block_idx)
                .map(|old| apply(story, old, block))
                .is_some(),
            None => false,
        })
    }

    /// Merge translations into every block of a document, reading the
    /// previous export once
    pub fn merge_document(
        &self,
        story: &StoryId,
        doc: &mut DialogueDocument,
    ) -> Result<MergeStats, Error> {
        let mut stats = MergeStats::default();

        let Some(existing) = self.load_existing(story)? else {
            stats.missed = doc.blocks.len();
            return Ok(stats);
        };

        let mut seen: HashMap<i64, usize> = HashMap::new();
        for block in &mut doc.blocks {
            let nth = seen.entry(block.block_idx).or_default();
            let old = existing.nth_block(block.block_idx, *nth);
            *nth += 1;

            match old.map(|old| apply(story, old, block)) {
                Some(aligned) => {
                    stats.matched += 1;
                    if !aligned {
                        stats.misaligned += 1;
                    }
                }
                None => stats.missed += 1,
            }
        }

        tracing::debug!(
            story = %story,
            matched = stats.matched,
            missed = stats.missed,
            "merged previous translations"
        );
        Ok(stats)
    }
}

/// Copy translated fields from `old` into `block`. Returns whether nested
/// lists had the same length on both sides.
fn apply(story: &StoryId, old: &TextBlock, block: &mut TextBlock) -> bool {
    block.en_text.clone_from(&old.en_text);
    if old.en_name.is_some() {
        block.en_name.clone_from(&old.en_name);
    }

    let idx = block.block_idx;
    let mut aligned = true;

    if let (Some(new), Some(prev)) = (block.choices.as_mut(), old.choices.as_ref()) {
        aligned &= check_len(story, idx, "choices", new.len(), prev.len());
        for (n, o) in new.iter_mut().zip(prev) {
            n.en_text.clone_from(&o.en_text);
        }
    }

    if let (Some(new), Some(prev)) = (block.colored_text.as_mut(), old.colored_text.as_ref()) {
        aligned &= check_len(story, idx, "colored text", new.len(), prev.len());
        for (n, o) in new.iter_mut().zip(prev) {
            n.en_text.clone_from(&o.en_text);
        }
    }

    aligned
}

fn check_len(story: &StoryId, block_idx: i64, what: &str, new: usize, old: usize) -> bool {
    if new != old {
        tracing::warn!(
            story = %story,
            block_idx,
            "{what} count changed from {old} to {new}; translations copied by position"
        );
    }
    new == old
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentType;
    use crate::document::{Choice, ColoredText};
    use crate::export::write_document;
    use std::path::Path;

    fn story() -> StoryId {
        StoryId::new("02", "1001", "003")
    }

    fn block(idx: i64, jp: &str) -> TextBlock {
        TextBlock {
            jp_name: Some("名前".into()),
            en_name: Some(String::new()),
            jp_text: jp.into(),
            next_block: Some(idx + 1),
            block_idx: idx,
            ..TextBlock::default()
        }
    }

    fn choices(texts: &[&str]) -> Option<Vec<Choice>> {
        Some(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| Choice {
                    jp_text: format!("選択{i}"),
                    en_text: (*t).to_string(),
                    next_block: i as i64,
                })
                .collect(),
        )
    }

    fn write_existing(root: &Path, name: &str, blocks: Vec<TextBlock>) {
        let mut doc = DialogueDocument::new("OLD", ContentType::Story);
        doc.blocks = blocks;
        let path = story().export_dir(root).join(name);
        write_document(&doc, &path).unwrap();
    }

    #[test]
    fn test_merge_carries_translation_forward() {
        let dir = tempfile::tempdir().unwrap();
        let mut old = block(7, "古い");
        old.en_text = "Hello".into();
        old.en_name = Some("Name".into());
        write_existing(dir.path(), "003 (Prologue).json", vec![old]);

        let merger = TranslationMerger::new(dir.path());
        let mut doc = DialogueDocument::new("NEW", ContentType::Story);
        doc.blocks = vec![block(7, "新しい"), block(9, "追加")];

        let stats = merger.merge_document(&story(), &mut doc).unwrap();
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.missed, 1);

        assert_eq!(doc.blocks[0].en_text, "Hello");
        assert_eq!(doc.blocks[0].en_name.as_deref(), Some("Name"));
        // originals are the freshly extracted ones
        assert_eq!(doc.blocks[0].jp_text, "新しい");
        assert_eq!(doc.blocks[1].en_text, "");
    }

    #[test]
    fn test_merge_does_not_keep_stale_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let mut gone = block(4, "消えた");
        gone.en_text = "Gone".into();
        write_existing(dir.path(), "003.json", vec![gone, block(5, "残る")]);

        let mut doc = DialogueDocument::new("NEW", ContentType::Story);
        doc.blocks = vec![block(5, "残る")];
        TranslationMerger::new(dir.path())
            .merge_document(&story(), &mut doc)
            .unwrap();

        assert_eq!(doc.blocks.len(), 1);
        assert!(doc.block(4).is_none());
    }

    #[test]
    fn test_merge_without_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let merger = TranslationMerger::new(dir.path());
        let mut doc = DialogueDocument::new("NEW", ContentType::Story);
        doc.blocks = vec![block(1, "a")];

        let stats = merger.merge_document(&story(), &mut doc).unwrap();
        assert_eq!(stats, MergeStats { matched: 0, missed: 1, misaligned: 0 });
        assert_eq!(doc.blocks[0].en_text, "");
    }

    #[test]
    fn test_merge_choices_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut old = block(2, "a");
        old.choices = choices(&["Run", "Rest", "Train"]);
        old.colored_text = Some(vec![ColoredText {
            jp_text: "赤".into(),
            en_text: "Red".into(),
        }]);
        write_existing(dir.path(), "003.json", vec![old]);

        let mut new = block(2, "a");
        new.choices = choices(&["", "", ""]);
        new.colored_text = Some(vec![ColoredText {
            jp_text: "赤".into(),
            en_text: String::new(),
        }]);

        let merged = TranslationMerger::new(dir.path())
            .merge(&story(), &mut new)
            .unwrap();
        assert!(merged);

        let en: Vec<&str> = new
            .choices
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.en_text.as_str())
            .collect();
        assert_eq!(en, vec!["Run", "Rest", "Train"]);
        assert_eq!(new.colored_text.as_ref().unwrap()[0].en_text, "Red");
    }

    #[test]
    fn test_merge_choices_count_mismatch_copies_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut old = block(2, "a");
        old.choices = choices(&["Run", "Rest"]);
        write_existing(dir.path(), "003.json", vec![old]);

        let mut doc = DialogueDocument::new("NEW", ContentType::Story);
        let mut new = block(2, "a");
        new.choices = choices(&["", "", ""]);
        doc.blocks = vec![new];

        let stats = TranslationMerger::new(dir.path())
            .merge_document(&story(), &mut doc)
            .unwrap();
        assert_eq!(stats.misaligned, 1);

        let en: Vec<&str> = doc.blocks[0]
            .choices
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.en_text.as_str())
            .collect();
        assert_eq!(en, vec!["Run", "Rest", ""]);
    }

    #[test]
    fn test_find_existing_matches_index_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write_existing(dir.path(), "004 (Other).json", vec![]);
        write_existing(dir.path(), "003 (Prologue).json", vec![]);

        let merger = TranslationMerger::new(dir.path());
        let found = merger.find_existing(&story()).unwrap();
        assert_eq!(found.file_name().unwrap(), "003 (Prologue).json");

        let missing = StoryId::new("02", "1001", "005");
        assert!(merger.find_existing(&missing).is_none());
        assert!(merger
            .find_existing(&StoryId::new("99", "9999", "001"))
            .is_none());
    }

    #[test]
    fn test_merge_never_modifies_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut old = block(1, "a");
        old.en_text = "A".into();
        write_existing(dir.path(), "003.json", vec![old]);
        let path = story().export_dir(dir.path()).join("003.json");
        let before = std::fs::read(&path).unwrap();

        let mut doc = DialogueDocument::new("NEW", ContentType::Story);
        doc.blocks = vec![block(1, "b")];
        TranslationMerger::new(dir.path())
            .merge_document(&story(), &mut doc)
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_merge_repeated_block_index_pairs_by_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = block(5, "first");
        first.en_text = "First".into();
        let mut second = block(5, "second");
        second.en_text = "Second".into();
        write_existing(dir.path(), "003.json", vec![first, second]);

        let mut doc = DialogueDocument::new("NEW", ContentType::Story);
        doc.blocks = vec![block(5, "first"), block(5, "second"), block(5, "third")];
        let stats = TranslationMerger::new(dir.path())
            .merge_document(&story(), &mut doc)
            .unwrap();

        assert_eq!(stats.matched, 2);
        assert_eq!(stats.missed, 1);
        let en: Vec<&str> = doc.blocks.iter().map(|b| b.en_text.as_str()).collect();
        assert_eq!(en, vec!["First", "Second", ""]);
    }

    #[test]
    fn test_merge_race_carries_text_only() {
        let dir = tempfile::tempdir().unwrap();
        let race = StoryId::new("09", "1001", "001");
        let mut old = DialogueDocument::new("OLD", ContentType::Race);
        let mut start = TextBlock::race("スタート！", 1);
        start.en_text = "Start!".into();
        old.blocks = vec![start, TextBlock::race("ゴール！", 3)];
        write_document(&old, &race.export_dir(dir.path()).join("001.json")).unwrap();

        let mut doc = DialogueDocument::new("NEW", ContentType::Race);
        doc.blocks = vec![TextBlock::race("スタート！", 1), TextBlock::race("ゴール！", 3)];
        let stats = TranslationMerger::new(dir.path())
            .merge_document(&race, &mut doc)
            .unwrap();

        assert_eq!(stats, MergeStats { matched: 2, missed: 0, misaligned: 0 });
        assert_eq!(doc.blocks[0].en_text, "Start!");
        assert_eq!(doc.blocks[0].en_name, None);
        assert_eq!(doc.blocks[1].en_text, "");

        let json = serde_json::to_value(&doc.blocks[0]).unwrap();
        assert!(json.get("enName").is_none());
        assert!(json.get("jpName").is_none());
    }
}

