//! Content types and story identifiers
//!
//! Every exported document is addressed by a `(group, id, index)` triple cut
//! from the tail of its logical asset path. Home timelines carry a separator
//! between group and id, so their suffix is one character wider:
//!
//! ```text
//! story/data/02/1001/storytimeline_021001001        -> 02 / 1001 / 001
//! race/storyrace/text/storyrace_091001001           -> 09 / 1001 / 001
//! home/data/00000/01/hometimeline_00000_01_0010123  -> 01 / 0010 / 123
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::Error;

/// Kind of dialogue asset being extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Story,
    Home,
    Race,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Home => "home",
            Self::Race => "race",
        }
    }

    /// Story and home timelines reference their text clips by path id;
    /// race text is stored inline on the root object.
    pub fn uses_timeline(&self) -> bool {
        matches!(self, Self::Story | Self::Home)
    }

    /// Width of the logical path suffix holding the story identifier
    fn id_suffix_len(&self) -> usize {
        match self {
            Self::Home => 10,
            Self::Story | Self::Race => 9,
        }
    }

    /// SQL `LIKE` pattern selecting this content type's assets in the
    /// metadata index.
    pub fn query_pattern(&self, group: &str, id: &str) -> String {
        match self {
            Self::Story => format!("story/data/{group}/{id}/storytimeline%"),
            Self::Home => {
                format!("home/data/00000/{group}/hometimeline_00000_{group}_{id}%")
            }
            Self::Race => format!("race/storyrace/text/storyrace_{group}{id}%"),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "story" => Ok(Self::Story),
            "home" => Ok(Self::Home),
            "race" => Ok(Self::Race),
            _ => Err(Error::UnsupportedContentType(s.to_string())),
        }
    }
}

/// The `(group, id, index)` triple addressing one exported document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoryId {
    pub group: String,
    pub id: String,
    pub index: String,
}

impl StoryId {
    pub fn new(group: impl Into<String>, id: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            id: id.into(),
            index: index.into(),
        }
    }

    /// Cut the identifier out of a logical asset path
    pub fn from_asset_path(content_type: ContentType, path: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidStoryPath(path.to_string());

        let len = content_type.id_suffix_len();
        let chars: Vec<char> = path.chars().collect();
        if chars.len() < len {
            return Err(invalid());
        }
        let suffix = &chars[chars.len() - len..];
        let cut = |range: std::ops::Range<usize>| suffix[range].iter().collect::<String>();

        let id = match content_type {
            ContentType::Home => Self::new(cut(0..2), cut(3..7), cut(7..10)),
            ContentType::Story | ContentType::Race => {
                Self::new(cut(0..2), cut(2..6), cut(6..9))
            }
        };
        Ok(id)
    }

    /// Directory holding this identifier's export under `export_root`
    pub fn export_dir(&self, export_root: &Path) -> PathBuf {
        export_root.join(&self.group).join(&self.id)
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group, self.id, self.index)
    }
}
