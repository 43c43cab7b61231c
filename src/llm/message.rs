//! Provider-neutral chat messages.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One piece of message content. Binary parts keep raw bytes; each
/// provider decides how to embed them.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Image { mime: String, data: Vec<u8> },
    Audio { mime: String, data: Vec<u8> },
}

impl ContentPart {
    pub fn text(s: impl Into<String>) -> Self {
        ContentPart::Text(s.into())
    }

    pub fn png(data: Vec<u8>) -> Self {
        ContentPart::Image {
            mime: "image/png".to_string(),
            data,
        }
    }

    pub fn mp3(data: Vec<u8>) -> Self {
        ContentPart::Audio {
            mime: "audio/mp3".to_string(),
            data,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(s) => Some(s),
            _ => None,
        }
    }

    /// `data:<mime>;base64,<payload>` for binary parts.
    pub fn data_uri(&self) -> Option<String> {
        match self {
            ContentPart::Text(_) => None,
            ContentPart::Image { mime, data } | ContentPart::Audio { mime, data } => {
                Some(format!("data:{};base64,{}", mime, STANDARD.encode(data)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            parts: vec![ContentPart::Text(content.into())],
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![ContentPart::Text(content.into())],
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            parts: vec![ContentPart::Text(content.into())],
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Text parts joined with newlines, binary parts skipped.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_text_only(&self) -> bool {
        self.parts.iter().all(|p| p.as_text().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        assert_eq!(ChatMessage::system("You are helpful").role, Role::System);
        assert_eq!(ChatMessage::user("Hello").role, Role::User);
        assert_eq!(ChatMessage::assistant("Hi there").role, Role::Assistant);
    }

    #[test]
    fn test_data_uri() {
        let part = ContentPart::png(vec![0x89, b'P', b'N', b'G']);
        assert_eq!(part.data_uri().unwrap(), "data:image/png;base64,iVBORw==");
        assert!(ContentPart::text("x").data_uri().is_none());
    }

    #[test]
    fn test_text_skips_binary_parts() {
        let msg = ChatMessage::user_parts(vec![
            ContentPart::text("rafal.mp3"),
            ContentPart::mp3(vec![1, 2, 3]),
            ContentPart::text("transcribe"),
        ]);
        assert_eq!(msg.text(), "rafal.mp3\ntranscribe");
        assert!(!msg.is_text_only());
    }
}
