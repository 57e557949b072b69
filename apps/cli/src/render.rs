//! Plain-text rendering of session views for the terminal.

use std::collections::HashSet;

use huddle_chats::{Channel, Message};
use huddle_session::SessionView;

pub fn message_line(message: &Message) -> String {
    let mut line = format!(
        "[{}] {}: {}",
        message.created_at.format("%H:%M"),
        message.sender_name(),
        message.content
    );
    if !message.read_by.is_empty() {
        line.push_str(&format!("  (read by {})", message.read_by.len()));
    }
    line
}

pub fn channel_line(channel: &Channel) -> String {
    let visibility = if channel.is_private { "private" } else { "public" };
    format!(
        "{:<26} {:<24} {:<8} {} members",
        channel.id,
        channel.name,
        visibility,
        channel.member_count()
    )
}

/// Tracks what has already been written so each published view only prints
/// what changed.
#[derive(Debug, Default)]
pub struct ViewPrinter {
    printed: HashSet<String>,
    channel: Option<String>,
    typing: Option<String>,
    online: usize,
    error: Option<String>,
}

impl ViewPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&mut self, view: &SessionView) -> Vec<String> {
        let mut lines = Vec::new();

        let channel = view.channel_id().map(str::to_string);
        if channel != self.channel {
            self.printed.clear();
            self.online = 0;
            if let Some(current) = &view.channel {
                lines.push(format!("--- #{} ---", current.name));
            }
            self.channel = channel;
        }

        for message in &view.messages {
            if self.printed.insert(message.id.clone()) {
                lines.push(message_line(message));
            }
        }

        if view.online.len() != self.online {
            self.online = view.online.len();
            lines.push(format!("* {} online", self.online));
        }

        let typing = view.typing_summary();
        if typing != self.typing {
            if let Some(summary) = &typing {
                lines.push(format!("* {summary}"));
            }
            self.typing = typing;
        }

        if view.last_error != self.error {
            if let Some(error) = &view.last_error {
                lines.push(format!("! {error}"));
            }
            self.error = view.last_error.clone();
        }

        lines
    }
}
