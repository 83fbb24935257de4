//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as struct fields:
//! - `TitleBar`: page title and loading spinner
//! - `ProgressBar`: eased load progress
//! - `QuickLinkList`: quick-link shortcuts
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components whose state persists in `TuiState` and that emit events:
//! - `UrlField`: single-line address input
//! - `HomeState` / `HomeScreen`: address field, Open, quick links
//! - `BrowserState` / `BrowserScreen`: page, chrome and error overlay
//! - `ErrorOverlayState` / `ErrorOverlay`: retry/dismiss panel
//! - `NavControlsState` / `NavControls`: toolbar buttons
//! - `PageViewState` / `PageView`: scrollable page text
//!
//! Stateful screens use the persistent state + transient wrapper pattern:
//! the `*State` struct lives across frames, the wrapper is built each frame
//! with borrowed state and props.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── home.rs          (home screen)
//! ├── url_field/       (address input + cursor)
//! ├── quick_links.rs   (shortcut list)
//! ├── browser.rs       (browser screen)
//! ├── title_bar.rs     (page title line)
//! ├── nav_controls.rs  (toolbar)
//! ├── progress_bar.rs  (eased progress)
//! ├── page_view.rs     (scrollable page)
//! └── error_overlay.rs (navigation error panel)
//! ```

pub mod browser;
pub mod error_overlay;
pub mod home;
pub mod nav_controls;
pub mod page_view;
pub mod progress_bar;
pub mod quick_links;
pub mod title_bar;
pub mod url_field;

pub use browser::{BrowserEvent, BrowserScreen, BrowserState, Chrome};
pub use home::{HomeEvent, HomeScreen, HomeState};
pub use progress_bar::ProgressAnimation;
