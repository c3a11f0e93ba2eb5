use askama::Template;
use futures_util::Stream;

use chatfeed_types::api::RenderedItem;

#[derive(Template)]
#[template(source = "<ol>\n", ext = "html")]
struct ListOpen;

#[derive(Template)]
#[template(source = "</ol>\n", ext = "html")]
struct ListClose;

/// One `<li>` of the transcript. `msg_html` is already rendered markup.
#[derive(Template)]
#[template(
    source = r#"<li>
  <div style="display:flex;">
    <div style="margin-right:0.5rem">
      <img style="width: 50px;height:auto;" src="{{ profile_image }}" />
    </div>
    <div>
      <h6>{{ display_name }}</h6>
      {{ msg_html|safe }}
    </div>
  </div>
</li>
"#,
    ext = "html"
)]
struct EntryTemplate<'a> {
    profile_image: &'a str,
    display_name: &'a str,
    msg_html: &'a str,
}

impl<'a> From<&'a RenderedItem> for EntryTemplate<'a> {
    fn from(item: &'a RenderedItem) -> Self {
        Self {
            profile_image: &item.profile_image,
            display_name: &item.display_name,
            msg_html: &item.msg_html,
        }
    }
}

/// The transcript as a body stream, one chunk per entry.
pub fn stream(items: Vec<RenderedItem>) -> impl Stream<Item = Result<String, askama::Error>> {
    async_stream::stream! {
        yield ListOpen.render();
        for item in &items {
            yield EntryTemplate::from(item).render();
        }
        yield ListClose.render();
    }
}
