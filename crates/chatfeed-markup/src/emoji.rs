use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Slack short names, in the emoji-data JSON layout. Slack spells some codes
/// differently from GitHub (`thinking_face`, `flag-us`, `skin-tone-2`), so
/// these rows come first and win over the gemoji set that follows.
const SLACK_NAMES: &str = include_str!("../data/emoji.json");

static BUNDLED: LazyLock<EmojiTable> = LazyLock::new(|| {
    let mut table =
        EmojiTable::from_json(SLACK_NAMES).expect("bundled emoji table is valid JSON");
    table.entries.extend(gemoji_entries());
    table
});

/// Every gemoji shortcode known to the `emojis` crate, in Unicode order.
fn gemoji_entries() -> impl Iterator<Item = EmojiEntry> {
    emojis::iter().flat_map(|emoji| {
        let unified = encode_unified(emoji.as_str());
        emoji.shortcodes().map(move |code| EmojiEntry {
            short_name: code.to_string(),
            unified: unified.clone(),
        })
    })
}

#[derive(Debug, Error)]
pub enum EmojiTableError {
    #[error("failed to read emoji table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid emoji table: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of the emoji table. Extra emoji-data fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmojiEntry {
    pub short_name: String,
    /// Hyphen-separated hex codepoints, e.g. `1F1FA-1F1F8`.
    pub unified: String,
}

impl EmojiEntry {
    pub fn to_char_string(&self) -> String {
        decode_unified(&self.unified)
    }
}

/// Short code lookup table. Short names may repeat; the first entry wins.
#[derive(Debug, Clone, Default)]
pub struct EmojiTable {
    entries: Vec<EmojiEntry>,
}

impl EmojiTable {
    pub fn new(entries: Vec<EmojiEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, EmojiTableError> {
        let entries: Vec<EmojiEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn load(path: &Path) -> Result<Self, EmojiTableError> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        info!("Loaded {} emoji from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn bundled() -> &'static EmojiTable {
        &BUNDLED
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, short_name: &str) -> Option<&EmojiEntry> {
        self.entries.iter().find(|e| e.short_name == short_name)
    }

    /// The characters for `short_name`, or an empty string if it is unknown.
    pub fn resolve(&self, short_name: &str) -> String {
        self.lookup(short_name)
            .map(EmojiEntry::to_char_string)
            .unwrap_or_default()
    }
}

/// Decode `1F468-200D-1F469` style codepoint sequences.
///
/// The table is trusted data; segments that are not valid scalar values are
/// dropped rather than reported.
pub fn decode_unified(unified: &str) -> String {
    unified
        .split('-')
        .filter_map(|segment| u32::from_str_radix(segment, 16).ok())
        .filter_map(char::from_u32)
        .collect()
}

fn encode_unified(emoji: &str) -> String {
    emoji
        .chars()
        .map(|c| format!("{:X}", u32::from(c)))
        .collect::<Vec<_>>()
        .join("-")
}
