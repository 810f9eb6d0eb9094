pub mod console;
pub mod device;
pub mod filter;
pub mod stats;
pub mod tui;
