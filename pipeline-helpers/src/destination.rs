//! Destination grammar: what follows the `send` keyword.
//!
//! `<->` is checked before `->`, which is checked before `<-`; each splits on its first
//! occurrence only.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationPlan {
    /// Nothing given: offer the channel picker.
    Menu,
    /// Send straight to one channel.
    Direct(String),
    /// Post into `from`, forward to `to`.
    Forward { from: String, to: String },
    /// `first -> second`, then `second -> first`.
    TwoWay { first: String, second: String },
}

impl DestinationPlan {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return DestinationPlan::Menu;
        }
        if let Some((first, second)) = text.split_once("<->") {
            return DestinationPlan::TwoWay {
                first: first.trim().to_string(),
                second: second.trim().to_string(),
            };
        }
        if let Some((from, to)) = text.split_once("->") {
            return DestinationPlan::Forward {
                from: from.trim().to_string(),
                to: to.trim().to_string(),
            };
        }
        if let Some((to, from)) = text.split_once("<-") {
            return DestinationPlan::Forward {
                from: from.trim().to_string(),
                to: to.trim().to_string(),
            };
        }
        DestinationPlan::Direct(text.to_string())
    }
}

/// Returns the lower-cased destination text when `text` is a `send` command.
pub fn parse_send_command(text: &str) -> Option<String> {
    let clean = text.trim().to_lowercase();
    let rest = clean.strip_prefix("send")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim().to_string())
    } else {
        None
    }
}
