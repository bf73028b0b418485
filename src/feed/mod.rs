//! Feed module for reading the event stream and driving the pricer

mod reader;
mod runner;

pub use reader::{FeedLine, FeedReader, InputStream};
pub use runner::{FeedRunner, RunStats};
