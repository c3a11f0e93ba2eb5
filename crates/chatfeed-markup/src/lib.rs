//! Slack message markup: parsing, emoji short codes and HTML rendering.
//!
//! Message text goes through [`parse`] into a [`Node`] tree, which [`render`]
//! turns into an escaped [`Html`] fragment. Emoji short codes are resolved
//! against an [`EmojiTable`].

pub mod emoji;
pub mod html;
pub mod node;
pub mod parse;
pub mod render;

pub use emoji::{EmojiEntry, EmojiTable, EmojiTableError};
pub use html::Html;
pub use node::Node;
pub use parse::parse;
pub use render::{render, render_message};
