pub mod memory;

pub use memory::{DomEvent, MemoryPage, PageState};
