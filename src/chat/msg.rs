use serde::{Deserialize, Deserializer, Serialize};

use crate::{include_res, profiles::Profile, res::escape_html};

/// Text prefix marking a message as a sticker; the rest is the image URL.
pub const STICKER_PREFIX: &str = ":sticker:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub from: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub avatar_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub from: String,
    pub avatar_url: String,
    pub text: String,
}

impl NewMessage {
    pub fn from_profile(profile: &Profile, text: String) -> Self {
        Self {
            from: profile.display_name().to_owned(),
            avatar_url: profile.avatar_url.clone(),
            text,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content<'a> {
    Text(&'a str),
    /// Image URL, unvalidated.
    Sticker(&'a str),
}

impl Content<'_> {
    pub fn parse(text: &str) -> Content<'_> {
        match text.strip_prefix(STICKER_PREFIX) {
            Some(url) => Content::Sticker(url),
            None => Content::Text(text),
        }
    }

    pub fn to_html(self) -> String {
        match self {
            Content::Text(text) => escape_html(text),
            Content::Sticker(url) => format!(r#"<img class="sticker" src="{}">"#, escape_html(url)),
        }
    }
}

impl Message {
    pub fn content(&self) -> Content<'_> {
        Content::parse(&self.text)
    }
}

/// A frame sent by the chat page over its websocket.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outgoing {
    Text { text: String },
    Sticker { url: String },
}

impl Outgoing {
    pub fn into_text(self) -> String {
        match self {
            Outgoing::Text { text } => text,
            Outgoing::Sticker { url } => format!("{STICKER_PREFIX}{url}"),
        }
    }
}

pub fn msg_to_html(message: &Message) -> String {
    include_res!(str, "/pages/chat/message.html")
        .replace("{id}", &message.id.to_string())
        .replace("{avatar_url}", &escape_html(&message.avatar_url))
        .replace("{from}", &escape_html(&message.from))
        .replace("{content}", &message.content().to_html())
}
