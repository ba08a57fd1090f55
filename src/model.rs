use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Storage key of the signed-in user, private to this client
pub const SESSION_KEY: &str = "current_user";
/// Storage key of the whole feed, shared by every client
pub const FEED_KEY: &str = "all_posts";

pub const DEFAULT_AVATAR: &str = "😊";
pub const AVATARS: [&str; 12] = [
    "😊", "😎", "🥳", "🤩", "😇", "🤗", "😺", "🦁", "🐼", "🦊", "🐨", "🐯",
];

//===================================================
// User
//===================================================

#[derive(Deserialize, Serialize, Debug, Clone, Hash, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct Avatar(String);

impl Avatar {
    /// Returns `None` for a blank glyph
    pub fn new(glyph: &str) -> Option<Self> {
        let glyph = glyph.trim();
        (!glyph.is_empty()).then(|| Self(glyph.to_string()))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lenient reading for feed entries, a blank glyph becomes the default
    fn deserialize_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let glyph = String::deserialize(deserializer)?;
        Ok(Self::new(&glyph).unwrap_or_default())
    }
}

impl TryFrom<String> for Avatar {
    type Error = &'static str;

    fn try_from(glyph: String) -> Result<Self, Self::Error> {
        Self::new(&glyph).ok_or("avatar glyph must not be empty")
    }
}

impl From<Avatar> for String {
    fn from(avatar: Avatar) -> Self {
        avatar.0
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self(DEFAULT_AVATAR.to_string())
    }
}

impl fmt::Display for Avatar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Hash, PartialEq, Eq)]
#[serde(try_from = "RawUser")]
pub struct User {
    #[serde(rename = "username")]
    pub name: String,
    #[serde(rename = "emoji")]
    pub avatar: Avatar,
}

impl User {
    /// Builds a user from a raw display name, `None` if it trims to nothing
    pub fn new(name: &str, avatar: Avatar) -> Option<Self> {
        let name = name.trim();
        (!name.is_empty()).then(|| Self {
            name: name.to_string(),
            avatar,
        })
    }
}

/// Stored shape of a user before the name is checked
#[derive(Deserialize)]
struct RawUser {
    username: String,
    emoji: Avatar,
}

impl TryFrom<RawUser> for User {
    type Error = &'static str;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        Self::new(&raw.username, raw.emoji).ok_or("username must not be empty")
    }
}

//===================================================
// Post
//===================================================

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl PostId {
    /// Next id after `last`: the current time in milliseconds, bumped so it
    /// is always strictly greater than anything handed out or loaded before.
    /// `None` once `last` is already `i64::MAX`.
    pub fn next(now: DateTime<Utc>, last: Option<PostId>) -> Option<Self> {
        let millis = now.timestamp_millis();
        match last {
            Some(PostId(last)) if last >= millis => last.checked_add(1).map(PostId),
            _ => Some(PostId(millis)),
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    #[serde(rename = "author")]
    pub author_name: String,
    #[serde(rename = "emoji", deserialize_with = "Avatar::deserialize_or_default")]
    pub author_avatar: Avatar,
    pub text: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    #[serde(rename = "author")]
    pub author_name: String,
    #[serde(rename = "emoji", deserialize_with = "Avatar::deserialize_or_default")]
    pub author_avatar: Avatar,
    #[serde(rename = "content")]
    pub text: String,
    #[serde(rename = "likes", default)]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, name: &str) -> bool {
        self.liked_by.iter().any(|liker| liker == name)
    }
    pub fn like_count(&self) -> usize {
        self.liked_by.len()
    }
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Adds `name` to the likes, or removes it if already there
    pub fn toggle_like(&mut self, name: &str) {
        if self.is_liked_by(name) {
            self.liked_by.retain(|liker| liker != name);
        } else {
            self.liked_by.push(name.to_string());
        }
    }
}

/// Newest first
pub type Feed = Vec<Post>;
