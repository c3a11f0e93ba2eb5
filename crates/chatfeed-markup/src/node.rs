/// A parsed piece of message markup.
///
/// Composite kinds own their children in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Root { children: Vec<Node> },
    Text { text: String },
    Bold { children: Vec<Node> },
    Italic { children: Vec<Node> },
    Strike { children: Vec<Node> },
    Quote { children: Vec<Node> },
    /// `<!here>`, `<!subteam^S123|@team>` and friends.
    Command {
        name: String,
        arguments: Vec<String>,
        label: Option<String>,
    },
    Emoji {
        name: String,
        variation: Option<String>,
    },
    UserLink {
        user_id: String,
        label: Option<String>,
    },
    ChannelLink {
        channel_id: String,
        label: Option<String>,
    },
    Url {
        url: String,
        label: Option<String>,
    },
    Code { text: String },
    PreText { text: String },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn emoji(name: impl Into<String>) -> Self {
        Node::Emoji {
            name: name.into(),
            variation: None,
        }
    }

    pub fn command(name: impl Into<String>) -> Self {
        Node::Command {
            name: name.into(),
            arguments: Vec::new(),
            label: None,
        }
    }
}
