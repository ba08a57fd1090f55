use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::{
    error::{FeedError, Write},
    model::{Comment, Feed, Post, PostId, User, FEED_KEY},
    storage::{Scope, Storage},
};

/// Local copy of the shared feed.
///
/// Every mutation changes the cached posts first and then overwrites the
/// remote value with the whole cache. The remote value is never re-read
/// before a write, so two clients writing in turn keep only the last
/// client's view of the feed.
#[derive(Debug)]
pub struct FeedStore<S> {
    storage: S,
    posts: Feed,
    ready: bool,
    last_id: Option<PostId>,
}

impl<S: Storage> FeedStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            posts: Vec::new(),
            ready: false,
            last_id: None,
        }
    }

    /// Newest first
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Replaces the cache with the stored feed. Nothing stored, an
    /// unreachable service and a malformed value all give an empty feed.
    pub async fn load(&mut self) -> &[Post] {
        self.posts = match self.storage.get(FEED_KEY, Scope::Shared).await {
            Ok(Some(value)) => match serde_json::from_str::<Feed>(&value) {
                Ok(posts) => {
                    debug!("Loaded {} posts", posts.len());
                    posts
                }
                Err(e) => {
                    warn!("Ignoring malformed feed: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No posts yet");
                Vec::new()
            }
            Err(e) => {
                warn!("Could not read feed: {}", e);
                Vec::new()
            }
        };

        let newest = self.posts.iter().map(|post| post.id).max();
        self.last_id = self.last_id.max(newest);
        self.ready = true;
        &self.posts
    }

    pub async fn create_post(
        &mut self,
        author: &User,
        text: &str,
    ) -> Result<(PostId, Write), FeedError> {
        self.check_ready()?;
        let text = non_empty(text)?;

        let now = Utc::now();
        let id = self.next_id(now);

        self.posts.insert(
            0,
            Post {
                id,
                author_name: author.name.clone(),
                author_avatar: author.avatar.clone(),
                text,
                liked_by: Vec::new(),
                comments: Vec::new(),
                created_at: now,
            },
        );
        info!("{} posted {}", author.name, id);

        Ok((id, self.save().await))
    }

    /// Likes or unlikes `id` for `user_name`. Unknown ids are ignored.
    pub async fn toggle_like(&mut self, id: PostId, user_name: &str) -> Result<Write, FeedError> {
        self.check_ready()?;
        let Some(post) = self.posts.iter_mut().find(|post| post.id == id) else {
            debug!("Like skipped, no post {}", id);
            return Ok(Write::Skipped);
        };

        post.toggle_like(user_name);
        info!(
            "{} {} {}",
            user_name,
            if post.is_liked_by(user_name) { "liked" } else { "unliked" },
            id
        );

        Ok(self.save().await)
    }

    /// Appends a comment to `id`. Unknown ids are ignored.
    pub async fn add_comment(
        &mut self,
        id: PostId,
        author: &User,
        text: &str,
    ) -> Result<Write, FeedError> {
        self.check_ready()?;
        let text = non_empty(text)?;
        let Some(post) = self.posts.iter_mut().find(|post| post.id == id) else {
            debug!("Comment skipped, no post {}", id);
            return Ok(Write::Skipped);
        };

        post.comments.push(Comment {
            author_name: author.name.clone(),
            author_avatar: author.avatar.clone(),
            text,
            created_at: Utc::now(),
        });
        info!("{} commented on {}", author.name, id);

        Ok(self.save().await)
    }

    /// Ids keep increasing until the feed holds `i64::MAX`; past that any
    /// id not already in the feed is used.
    fn next_id(&mut self, now: DateTime<Utc>) -> PostId {
        if let Some(id) = PostId::next(now, self.last_id) {
            self.last_id = Some(id);
            return id;
        }

        warn!("Post ids are exhausted, reusing a free one");
        let millis = now.timestamp_millis();
        (millis..=i64::MAX)
            .chain(i64::MIN..millis)
            .map(PostId)
            .find(|id| self.post(*id).is_none())
            .unwrap_or(PostId(millis))
    }

    fn check_ready(&self) -> Result<(), FeedError> {
        if !self.ready {
            return Err(FeedError::NotLoaded);
        }
        Ok(())
    }

    /// Overwrites the stored feed with the whole local cache
    async fn save(&self) -> Write {
        let result = match serde_json::to_string(&self.posts) {
            Ok(value) => self.storage.set(FEED_KEY, &value, Scope::Shared).await,
            Err(e) => Err(e.into()),
        };
        let write = Write::from(result);
        if let Write::Unsaved(e) = &write {
            warn!("Feed was not saved, changes are local only: {}", e);
        }
        write
    }
}

fn non_empty(text: &str) -> Result<String, FeedError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FeedError::EmptyText);
    }
    Ok(text.to_string())
}
