pub mod config;
pub mod dom;
pub mod error;
pub mod formatter;
pub mod lexicon;
pub mod locator;
pub mod page;
pub mod resolution;
pub mod sequencer;
pub mod simulator;

pub use parley_common::protocol;
pub use page::Page;
pub use sequencer::ReplySequencer;
