use serde::{Deserialize, Serialize};

// -- Feed --

/// One surfaced chat message, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedItem {
    pub profile_image: String,
    pub display_name: String,
    pub msg_html: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
