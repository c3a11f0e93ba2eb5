use crate::node::Node;

/// Slack escapes `>` in message text, so block quotes arrive as `&gt;`.
const QUOTE_MARKER: &str = "&gt;";

const PRE_FENCE: &str = "```";

/// Parse Slack message text into a markup tree.
///
/// Never fails: markers without a valid partner are kept as literal text.
pub fn parse(text: &str) -> Node {
    let mut children = Vec::new();
    let mut plain = String::new();
    let mut quoted = String::new();

    for line in text.split_inclusive('\n') {
        if let Some(rest) = line.strip_prefix(QUOTE_MARKER) {
            if !plain.is_empty() {
                children.extend(parse_inline(&plain));
                plain.clear();
            }
            quoted.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        } else {
            if !quoted.is_empty() {
                children.push(quote(&quoted));
                quoted.clear();
            }
            plain.push_str(line);
        }
    }

    if !quoted.is_empty() {
        children.push(quote(&quoted));
    }
    if !plain.is_empty() {
        children.extend(parse_inline(&plain));
    }

    Node::Root { children }
}

fn quote(body: &str) -> Node {
    let body = body.strip_suffix('\n').unwrap_or(body);
    Node::Quote {
        children: parse_inline(body),
    }
}

fn parse_inline(text: &str) -> Vec<Node> {
    let bytes = text.as_bytes();
    let mut nodes = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    // Per style marker, the offset before which no opener can find a closer.
    let mut unclosed = [0usize; 3];

    // Markers are ASCII, so `i` is always on a char boundary when one matches.
    while i < bytes.len() {
        let found = match bytes[i] {
            b'`' => code_at(text, i),
            b'<' => link_at(text, i),
            b':' => emoji_at(text, i),
            marker @ (b'*' | b'_' | b'~') => {
                let slot = match marker {
                    b'*' => 0,
                    b'_' => 1,
                    _ => 2,
                };
                if i < unclosed[slot] {
                    None
                } else {
                    match styled_at(text, i) {
                        Styled::Matched(node, end) => Some((node, end)),
                        Styled::Unclosed { line_end } => {
                            unclosed[slot] = line_end;
                            None
                        }
                        Styled::NotOpener => None,
                    }
                }
            }
            _ => None,
        };

        match found {
            Some((node, end)) => {
                push_text(&mut nodes, &text[text_start..i]);
                nodes.push(node);
                i = end;
                text_start = end;
            }
            None => i += 1,
        }
    }

    push_text(&mut nodes, &text[text_start..]);
    nodes
}

fn push_text(nodes: &mut Vec<Node>, raw: &str) {
    if !raw.is_empty() {
        nodes.push(Node::Text {
            text: decode_entities(raw),
        });
    }
}

/// `` `code` `` or a ```` ``` ```` fenced block.
fn code_at(text: &str, start: usize) -> Option<(Node, usize)> {
    let rest = &text[start..];

    if let Some(body) = rest.strip_prefix(PRE_FENCE) {
        let len = body.find(PRE_FENCE)?;
        if len == 0 {
            return None;
        }
        let node = Node::PreText {
            text: decode_entities(&body[..len]),
        };
        return Some((node, start + PRE_FENCE.len() * 2 + len));
    }

    let body = &rest[1..];
    let len = body.find('`')?;
    let content = &body[..len];
    if content.is_empty() || content.contains('\n') {
        return None;
    }
    Some((
        Node::Code {
            text: decode_entities(content),
        },
        start + len + 2,
    ))
}

/// `<@U123>`, `<#C123|general>`, `<!here>`, `<https://example.com|label>`.
fn link_at(text: &str, start: usize) -> Option<(Node, usize)> {
    let body = &text[start + 1..];
    let len = body.find(['>', '<', '\n'])?;
    if len == 0 || !body[len..].starts_with('>') {
        return None;
    }
    let inner = &body[..len];

    let (target, label) = match inner.split_once('|') {
        Some((target, label)) if !label.is_empty() => (target, Some(decode_entities(label))),
        Some((target, _)) => (target, None),
        None => (inner, None),
    };

    let node = if let Some(user_id) = target.strip_prefix('@') {
        Node::UserLink {
            user_id: user_id.to_string(),
            label,
        }
    } else if let Some(channel_id) = target.strip_prefix('#') {
        Node::ChannelLink {
            channel_id: channel_id.to_string(),
            label,
        }
    } else if let Some(command) = target.strip_prefix('!') {
        let mut parts = command.split('^');
        let name = parts.next().unwrap_or_default().to_string();
        Node::Command {
            name,
            arguments: parts.map(str::to_string).collect(),
            label,
        }
    } else {
        Node::Url {
            url: decode_entities(target),
            label,
        }
    };

    Some((node, start + len + 2))
}

/// `:name:` optionally followed by a `:skin-tone-N:` modifier.
fn emoji_at(text: &str, start: usize) -> Option<(Node, usize)> {
    let (name, mut end) = short_code(text, start)?;

    let mut variation = None;
    if let Some((modifier, modifier_end)) = short_code(text, end) {
        if modifier.starts_with("skin-tone-") {
            variation = Some(modifier.to_string());
            end = modifier_end;
        }
    }

    Some((
        Node::Emoji {
            name: name.to_string(),
            variation,
        },
        end,
    ))
}

fn short_code(text: &str, start: usize) -> Option<(&str, usize)> {
    let body = text[start..].strip_prefix(':')?;
    let len = body.find(':')?;
    let name = &body[..len];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_+-'".contains(c));
    valid.then_some((name, start + len + 2))
}

enum Styled {
    Matched(Node, usize),
    /// A valid opener with no closer before `line_end`. Whether a marker can
    /// close does not depend on where it was opened, so later openers of the
    /// same marker on this line cannot match either.
    Unclosed { line_end: usize },
    NotOpener,
}

/// `*bold*`, `_italic_` and `~strike~`, which only open and close at word
/// boundaries and never span lines.
fn styled_at(text: &str, start: usize) -> Styled {
    let Some(marker) = text[start..].chars().next() else {
        return Styled::NotOpener;
    };

    if text[..start]
        .chars()
        .next_back()
        .is_some_and(char::is_alphanumeric)
    {
        return Styled::NotOpener;
    }

    let body_start = start + marker.len_utf8();
    let body = &text[body_start..];
    if body.chars().next().is_none_or(char::is_whitespace) {
        return Styled::NotOpener;
    }

    for (offset, c) in body.char_indices() {
        if c == '\n' {
            return Styled::Unclosed {
                line_end: body_start + offset,
            };
        }
        if c != marker || offset == 0 {
            continue;
        }

        let content = &body[..offset];
        let closes_word = !content.ends_with(char::is_whitespace)
            && !body[offset + c.len_utf8()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        if !closes_word {
            continue;
        }

        let children = parse_inline(content);
        let node = match marker {
            '*' => Node::Bold { children },
            '_' => Node::Italic { children },
            _ => Node::Strike { children },
        };
        return Styled::Matched(node, body_start + offset + c.len_utf8());
    }

    Styled::Unclosed {
        line_end: text.len(),
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
