use crate::emoji::EmojiTable;
use crate::html::Html;
use crate::node::Node;
use crate::parse::parse;

enum Step<'a> {
    Visit(&'a Node),
    Close(&'static str),
}

/// Render a markup tree to HTML.
///
/// Children are emitted depth-first, left to right. Kinds without an HTML
/// form (links, code, quotes) render as nothing. Walks an explicit stack, so
/// deeply nested trees cannot overflow the call stack.
pub fn render(node: &Node, emoji: &EmojiTable) -> Html {
    let mut out = Html::new();
    let mut stack = vec![Step::Visit(node)];

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Visit(node) => node,
            Step::Close(tag) => {
                out.push_raw("</");
                out.push_raw(tag);
                out.push_raw(">");
                continue;
            }
        };

        match node {
            Node::Command { name, .. } => {
                out.push_raw("<strong>#");
                out.push_text(name);
                out.push_raw("</strong>");
            }
            Node::Emoji { name, .. } => out.push_raw(&emoji.resolve(name)),
            Node::Text { text } => out.push_text(text),
            Node::Bold { children } => open(&mut out, &mut stack, "strong", children),
            Node::Italic { children } => open(&mut out, &mut stack, "i", children),
            Node::Strike { children } => open(&mut out, &mut stack, "del", children),
            Node::Root { children } => push_children(&mut stack, children),
            _ => {}
        }
    }

    out
}

/// Parse and render raw message text.
pub fn render_message(text: &str, emoji: &EmojiTable) -> Html {
    render(&parse(text), emoji)
}

fn open<'a>(out: &mut Html, stack: &mut Vec<Step<'a>>, tag: &'static str, children: &'a [Node]) {
    out.push_raw("<");
    out.push_raw(tag);
    out.push_raw(">");
    stack.push(Step::Close(tag));
    push_children(stack, children);
}

fn push_children<'a>(stack: &mut Vec<Step<'a>>, children: &'a [Node]) {
    stack.extend(children.iter().rev().map(Step::Visit));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emoji::EmojiEntry;

    fn table() -> EmojiTable {
        EmojiTable::new(vec![
            EmojiEntry {
                short_name: "smile".into(),
                unified: "1F604".into(),
            },
            EmojiEntry {
                short_name: "grinning".into(),
                unified: "1F600".into(),
            },
        ])
    }

    fn render_str(node: &Node) -> String {
        render(node, &table()).into_string()
    }

    #[test]
    fn nested_bold_italic() {
        let node = Node::Bold {
            children: vec![Node::Italic {
                children: vec![Node::text("hi")],
            }],
        };
        assert_eq!(render_str(&node), "<strong><i>hi</i></strong>");
    }

    #[test]
    fn strike_and_siblings() {
        let node = Node::Root {
            children: vec![
                Node::text("a "),
                Node::Strike {
                    children: vec![Node::text("b")],
                },
                Node::text(" c"),
            ],
        };
        assert_eq!(render_str(&node), "a <del>b</del> c");
    }

    #[test]
    fn empty_root_and_empty_wrappers() {
        assert_eq!(render_str(&Node::Root { children: vec![] }), "");
        assert_eq!(
            render_str(&Node::Bold { children: vec![] }),
            "<strong></strong>"
        );
    }

    #[test]
    fn command_is_prefixed_and_escaped() {
        assert_eq!(render_str(&Node::command("here")), "<strong>#here</strong>");
        assert_eq!(
            render_str(&Node::command("<x>")),
            "<strong>#&lt;x&gt;</strong>"
        );
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(
            render_str(&Node::text("<script>&</script>")),
            "&lt;script&gt;&amp;&lt;/script&gt;"
        );
    }

    #[test]
    fn emoji_resolves_or_vanishes() {
        assert_eq!(render_str(&Node::emoji("grinning")), "\u{1F600}");
        assert_eq!(render_str(&Node::emoji("nope")), "");
    }

    #[test]
    fn unsupported_kinds_render_empty() {
        let nodes = [
            Node::Code { text: "x".into() },
            Node::PreText { text: "x".into() },
            Node::Quote {
                children: vec![Node::text("quoted")],
            },
            Node::UserLink {
                user_id: "U1".into(),
                label: None,
            },
            Node::ChannelLink {
                channel_id: "C1".into(),
                label: Some("general".into()),
            },
            Node::Url {
                url: "https://example.com".into(),
                label: None,
            },
        ];
        for node in &nodes {
            assert_eq!(render_str(node), "", "{node:?}");
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let node = parse("*a* _b_ ~c~ :smile: <!here>");
        assert_eq!(render_str(&node), render_str(&node));
        assert_eq!(
            render_str(&node),
            "<strong>a</strong> <i>b</i> <del>c</del> \u{1F604} <strong>#here</strong>"
        );
    }

    #[test]
    fn deep_nesting() {
        let mut node = Node::text("x");
        for _ in 0..100_000 {
            node = Node::Italic {
                children: vec![node],
            };
        }
        let html = render(&node, &table());
        assert_eq!(html.as_str().len(), 100_000 * "<i></i>".len() + 1);

        // Dropping the tree recurses, so take it apart level by level.
        let mut pending = vec![node];
        while let Some(mut node) = pending.pop() {
            if let Node::Italic { children } = &mut node {
                pending.append(children);
            }
        }
    }

    #[test]
    fn render_message_end_to_end() {
        assert_eq!(
            render_message("hello :smile:", &table()).as_str(),
            "hello \u{1F604}"
        );
    }
}
