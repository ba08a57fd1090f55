use std::{error::Error, sync::Arc};

use log::{info, warn};

use crate::{
    config::{Command, Config},
    error::Write,
    feed::FeedStore,
    model::{Avatar, Post, PostId, User, AVATARS},
    session::SessionManager,
    storage::{SqliteStorage, Storage},
};

pub async fn run(config: &Config) -> Result<(), Box<dyn Error>> {
    let storage = Arc::new(SqliteStorage::open(config.database(), config.client())?);
    let mut session = SessionManager::new(storage.clone());
    let mut feed = FeedStore::new(storage);

    match &config.command {
        Command::Login { name, avatar } => {
            let avatar = Avatar::new(avatar).ok_or("avatar must not be empty")?;
            report(session.login(name, avatar).await?);
        }
        Command::Logout => report(session.logout().await),
        Command::Whoami => match session.restore().await {
            Some(user) => info!("{} {}", user.avatar, user.name),
            None => info!("Not logged in"),
        },
        Command::Post { text } => {
            let user = signed_in(&mut session).await?;
            feed.load().await;
            let (id, write) = feed.create_post(&user, text).await?;
            info!("Posted {}", id);
            report(write);
        }
        Command::Like { id } => {
            let user = signed_in(&mut session).await?;
            feed.load().await;
            let id = PostId(*id);
            report(feed.toggle_like(id, &user.name).await?);
            if let Some(post) = feed.post(id) {
                info!("{} ♥ {}", id, post.like_count());
            }
        }
        Command::Comment { id, text } => {
            let user = signed_in(&mut session).await?;
            feed.load().await;
            report(feed.add_comment(PostId(*id), &user, text).await?);
        }
        Command::Feed => {
            let user = session.restore().await.cloned();
            display_feed(feed.load().await, user.as_ref());
        }
        Command::Avatars => info!("{}", AVATARS.join(" ")),
    }

    Ok(())
}

async fn signed_in<S: Storage>(session: &mut SessionManager<S>) -> Result<User, Box<dyn Error>> {
    session
        .restore()
        .await
        .cloned()
        .ok_or_else(|| "not logged in, run `login` first".into())
}

fn report(write: Write) {
    match write {
        Write::Saved => {}
        Write::Unsaved(e) => warn!("Saved locally only, it may be gone after a reload ({})", e),
        Write::Skipped => warn!("No such post, nothing changed"),
    }
}

pub fn display_feed(posts: &[Post], viewer: Option<&User>) {
    if !log::log_enabled!(log::Level::Info) {
        return;
    }
    if posts.is_empty() {
        info!("No posts yet, be the first to share something!");
        return;
    }

    for post in posts {
        let liked = viewer.is_some_and(|user| post.is_liked_by(&user.name));
        info!(
            "+- {} {} ({}) #{}",
            post.author_avatar,
            post.author_name,
            post.created_at.to_rfc3339(),
            post.id
        );
        info!("| {}", post.text);
        info!(
            "| {} {}  💬 {}",
            if liked { "♥" } else { "♡" },
            post.like_count(),
            post.comment_count()
        );
        for comment in &post.comments {
            info!(
                "|   {} {} ({}): {}",
                comment.author_avatar,
                comment.author_name,
                comment.created_at.to_rfc3339(),
                comment.text
            );
        }
        info!("+------------ - -");
    }
}
