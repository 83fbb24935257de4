//! webwrap library exports for testing

pub mod core;
pub mod engine;
pub mod tui;
pub mod webview;

#[cfg(test)]
pub mod test_support;
