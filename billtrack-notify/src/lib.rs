//! # billtrack-notify
//!
//! Outbound notification channels.
//!
//! - [`compose`] — character-limit splitting for social posts
//! - [`bluesky`] — AT Protocol posting with reply threading
//! - [`email`] — MailerSend digests
//! - [`throttle`] — restart-surviving minimum-interval spacing

pub mod bluesky;
pub mod compose;
pub mod email;
pub mod error;
pub mod throttle;

pub use bluesky::BlueskyPoster;
pub use compose::{split_post, POST_LIMIT};
pub use email::Mailer;
pub use error::NotifyError;
pub use throttle::PersistedThrottle;
