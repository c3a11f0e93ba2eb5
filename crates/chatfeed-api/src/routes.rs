use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::header,
    response::IntoResponse,
};
use tracing::info;

use chatfeed_gateway::{SlackClient, Snapshot};
use chatfeed_markup::EmojiTable;
use chatfeed_types::api::RenderedItem;

use crate::assemble::{View, assemble};
use crate::error::ApiError;
use crate::page;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub slack: SlackClient,
    pub emoji: Arc<EmojiTable>,
    pub max_messages: usize,
}

impl AppStateInner {
    async fn feed(&self, view: View) -> Result<Vec<RenderedItem>, ApiError> {
        let Snapshot { messages, members } = self.slack.snapshot().await?;
        let items = assemble(&messages, &members, view, self.max_messages, &self.emoji);
        info!(
            "Assembled {} of {} messages ({} members)",
            items.len(),
            messages.len(),
            members.len()
        );
        Ok(items)
    }
}

/// GET / — nothing to see.
pub async fn index() -> &'static str {
    "Nothing here"
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// GET /html and GET /list — chat transcript, oldest message first.
pub async fn html_feed(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.feed(View::HTML).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from_stream(page::stream(items)),
    ))
}

/// GET /json — rendered items, newest message first.
pub async fn json_feed(
    State(state): State<AppState>,
) -> Result<Json<Vec<RenderedItem>>, ApiError> {
    Ok(Json(state.feed(View::JSON).await?))
}
