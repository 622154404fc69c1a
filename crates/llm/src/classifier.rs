//! Delta Classification State Machine
//!
//! Routes streamed completion deltas into thinking and document channels.
//! Models either wrap their reasoning in a tag pair before the real answer
//! (`<think>`, `<thinking>`, or `<reasoning>` dialects, case-insensitive) or
//! emit the answer directly with no tag; both work without the caller
//! knowing which kind of model is loaded.

use jobdeck_core::streaming::ChannelEvent;

/// Accepted opening tags, matched case-insensitively.
const OPENING_TAGS: [&str; 3] = ["<think>", "<thinking>", "<reasoning>"];

/// Accepted closing tags, matched case-insensitively.
const CLOSING_TAGS: [&str; 3] = ["</think>", "</thinking>", "</reasoning>"];

/// Per-stream routing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteState {
    /// Waiting for the first non-empty delta to decide the stream shape
    Detecting,
    /// Inside a thinking block, watching for a closing tag
    InThinking,
    /// Terminal: every remaining delta is document content
    InDocument,
}

/// State machine that splits one completion stream into thinking and
/// document channels.
///
/// The decision between "tagged reasoning first" and "plain answer" is made
/// on whatever text arrives in the first non-empty delta and is final for
/// the rest of the stream. While inside a thinking block, a rolling buffer
/// holds back any suffix that could still turn into a closing tag, since
/// tags may be split across frame boundaries.
pub struct DeltaClassifier {
    state: RouteState,
    /// Undispatched tail of the thinking block
    buffer: String,
}

impl DeltaClassifier {
    pub fn new() -> Self {
        Self {
            state: RouteState::Detecting,
            buffer: String::new(),
        }
    }

    /// Feed one delta; returns the channel events it produced, in order.
    pub fn push(&mut self, delta: &str) -> Vec<ChannelEvent> {
        if delta.is_empty() {
            return vec![];
        }

        let mut events = vec![];
        match self.state {
            RouteState::Detecting => match find_tag(delta, &OPENING_TAGS) {
                Some((pos, len)) => {
                    if pos > 0 {
                        events.push(ChannelEvent::DocumentDelta {
                            content: delta[..pos].to_string(),
                        });
                    }
                    self.state = RouteState::InThinking;
                    self.buffer.push_str(&delta[pos + len..]);
                    self.drain_thinking(&mut events);
                }
                None => {
                    self.state = RouteState::InDocument;
                    events.push(ChannelEvent::DocumentDelta {
                        content: delta.to_string(),
                    });
                }
            },
            RouteState::InThinking => {
                self.buffer.push_str(delta);
                self.drain_thinking(&mut events);
            }
            RouteState::InDocument => {
                events.push(ChannelEvent::DocumentDelta {
                    content: delta.to_string(),
                });
            }
        }
        events
    }

    /// Flush any held text at end of stream.
    ///
    /// A stream that ends (or is truncated) mid-thinking still delivers the
    /// held tail to the thinking channel.
    pub fn finish(&mut self) -> Vec<ChannelEvent> {
        let mut events = vec![];
        if self.state == RouteState::InThinking && !self.buffer.is_empty() {
            let held = std::mem::take(&mut self.buffer);
            let cleaned = strip_tags(&held);
            if !cleaned.is_empty() {
                events.push(ChannelEvent::ThinkingDelta { content: cleaned });
            }
        }
        events
    }

    /// Dispatch buffered thinking text that can no longer be part of a tag.
    ///
    /// If the buffer contains a closing tag, everything before it becomes
    /// the final thinking fragment and everything after it the first
    /// document fragment. Otherwise all but a possible partial-tag suffix
    /// is dispatched and the suffix stays buffered for the next frame.
    fn drain_thinking(&mut self, events: &mut Vec<ChannelEvent>) {
        if let Some((pos, len)) = find_tag(&self.buffer, &CLOSING_TAGS) {
            let thinking = strip_tags(&self.buffer[..pos]);
            if !thinking.is_empty() {
                events.push(ChannelEvent::ThinkingDelta { content: thinking });
            }
            let document = self.buffer[pos + len..].to_string();
            if !document.is_empty() {
                events.push(ChannelEvent::DocumentDelta { content: document });
            }
            self.buffer.clear();
            self.state = RouteState::InDocument;
        } else {
            let hold = partial_tag_len(&self.buffer);
            if hold < self.buffer.len() {
                let cut = self.buffer.len() - hold;
                let ready = self.buffer[..cut].to_string();
                self.buffer = self.buffer[cut..].to_string();
                let cleaned = strip_tags(&ready);
                if !cleaned.is_empty() {
                    events.push(ChannelEvent::ThinkingDelta { content: cleaned });
                }
            }
        }
    }
}

impl Default for DeltaClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the earliest case-insensitive occurrence of any tag in `text`,
/// returning its byte offset and length.
fn find_tag(text: &str, tags: &[&str]) -> Option<(usize, usize)> {
    let lower = text.to_ascii_lowercase();
    let mut found: Option<(usize, usize)> = None;
    for tag in tags {
        if let Some(pos) = lower.find(tag) {
            if found.map_or(true, |(best, _)| pos < best) {
                found = Some((pos, tag.len()));
            }
        }
    }
    found
}

/// Length of the longest suffix of `text` that is a proper case-insensitive
/// prefix of one of the tag tokens.
fn partial_tag_len(text: &str) -> usize {
    let lower = text.to_ascii_lowercase();
    let mut longest = 0;
    for tag in OPENING_TAGS.iter().chain(CLOSING_TAGS.iter()) {
        let max = (tag.len() - 1).min(lower.len());
        for n in 1..=max {
            if n > longest && lower.ends_with(&tag[..n]) {
                longest = n;
            }
        }
    }
    longest
}

/// Remove every complete tag token (case-insensitive) from `text`, leaving
/// all other characters, including whitespace, untouched.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let open = find_tag(rest, &OPENING_TAGS);
        let close = find_tag(rest, &CLOSING_TAGS);
        let earliest = match (open, close) {
            (Some(o), Some(c)) => Some(if o.0 <= c.0 { o } else { c }),
            (Some(o), None) => Some(o),
            (None, Some(c)) => Some(c),
            (None, None) => None,
        };
        match earliest {
            Some((pos, len)) => {
                out.push_str(&rest[..pos]);
                rest = &rest[pos + len..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    out
}
