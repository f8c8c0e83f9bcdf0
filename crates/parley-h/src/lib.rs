pub mod backend;
pub mod bridge;
pub mod cdp;
