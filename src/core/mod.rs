//! # Core Application Logic
//!
//! Domain logic for webwrap. It knows nothing about any specific UI
//! technology or browser engine.
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │          CORE            │
//!                    │  (this module)           │
//!                    │                          │
//!                    │  • address (validation)  │
//!                    │  • nav_error (classify)  │
//!                    │  • State / Action        │
//!                    │                          │
//!                    │  No I/O. No UI. Pure.    │
//!                    └────────────┬─────────────┘
//!                                 │
//!            ┌────────────────────┼────────────────────┐
//!            ▼                    ▼                    ▼
//!     ┌────────────┐       ┌────────────┐       ┌────────────┐
//!     │  WebView   │       │    TUI     │       │   Engine   │
//!     │  adapter   │       │ (ratatui)  │       │  (reqwest) │
//!     └────────────┘       └────────────┘       └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`address`]: user text → `TargetUrl`
//! - [`nav_error`]: navigation failures and their user-facing messages
//! - [`state`]: `App` (home screen) and `NavigationState` (browser screen)
//! - [`action`]: the `Action` enum and the home-screen reducer

pub mod action;
pub mod address;
pub mod config;
pub mod nav_error;
pub mod quick_links;
pub mod state;
