pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod model;
pub mod session;
pub mod storage;


pub use error::{FeedError, SessionError, StorageError, Write};
pub use feed::FeedStore;
pub use model::{Avatar, Comment, Feed, Post, PostId, User};
pub use session::SessionManager;
pub use storage::{MemoryStorage, Scope, SqliteStorage, Storage};
