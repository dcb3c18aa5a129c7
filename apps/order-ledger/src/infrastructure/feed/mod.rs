//! Venue Feed Adapters

mod replay;

pub use replay::{FeedFrame, ReplayFeed};
