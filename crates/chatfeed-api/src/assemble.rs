use std::collections::{HashMap, HashSet};

use tracing::warn;

use chatfeed_markup::{EmojiTable, render_message};
use chatfeed_types::api::RenderedItem;
use chatfeed_types::slack::{Member, Message, Profile};

/// Default number of messages surfaced per response.
pub const DEFAULT_MAX_MESSAGES: usize = 15;

/// Display order of the surfaced window. Slack delivers newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Oldest first, like a chat transcript.
    Chronological,
    /// As delivered, newest first.
    NewestFirst,
}

/// Which avatar variant to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// `image_72`
    Small,
    /// `image_192`
    Large,
}

impl ImageSize {
    fn pick(self, profile: &Profile) -> &str {
        match self {
            ImageSize::Small => &profile.image_72,
            ImageSize::Large => &profile.image_192,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub order: Order,
    pub image: ImageSize,
}

impl View {
    /// HTML transcript: oldest first with thumbnails.
    pub const HTML: View = View {
        order: Order::Chronological,
        image: ImageSize::Small,
    };

    /// JSON feed: newest first with the larger avatar.
    pub const JSON: View = View {
        order: Order::NewestFirst,
        image: ImageSize::Large,
    };
}

/// Join the newest `max_messages` messages to their authors and render them.
///
/// Messages whose author has no profile (deactivated users, bots) are
/// skipped. The window is cut before the join, so fewer than `max_messages`
/// items can come back.
pub fn assemble(
    messages: &[Message],
    members: &[Member],
    view: View,
    max_messages: usize,
    emoji: &EmojiTable,
) -> Vec<RenderedItem> {
    let authors: HashSet<&str> = messages.iter().filter_map(|m| m.user.as_deref()).collect();

    let profiles: HashMap<&str, &Profile> = members
        .iter()
        .filter(|member| authors.contains(member.id.as_str()))
        .map(|member| (member.id.as_str(), &member.profile))
        .collect();

    let mut window: Vec<&Message> = messages.iter().take(max_messages).collect();
    if view.order == Order::Chronological {
        window.reverse();
    }

    window
        .into_iter()
        .filter_map(|msg| {
            let Some(profile) = msg.user.as_deref().and_then(|id| profiles.get(id)) else {
                warn!(
                    "Skipping message {} from unknown author {}",
                    msg.ts.as_deref().unwrap_or("?"),
                    msg.user.as_deref().unwrap_or("<none>")
                );
                return None;
            };

            Some(RenderedItem {
                profile_image: view.image.pick(profile).to_string(),
                display_name: profile.name().to_string(),
                msg_html: render_message(&msg.text, emoji).into_string(),
            })
        })
        .collect()
}
