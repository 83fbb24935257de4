//! Handing URLs to the platform's default browser.

use std::fmt;

use log::{info, warn};
use url::Url;

#[derive(Debug)]
pub enum OpenError {
    Unsupported(String),
    Io(std::io::Error),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::Unsupported(url) => write!(f, "no handler for {url}"),
            OpenError::Io(e) => write!(f, "failed to launch browser: {e}"),
        }
    }
}

impl std::error::Error for OpenError {}

pub trait ExternalOpener: Send {
    fn can_open(&self, url: &Url) -> bool;
    fn open(&self, url: &Url) -> Result<(), OpenError>;
}

/// Opens URLs in the system browser via the `webbrowser` crate.
pub struct SystemBrowser;

impl ExternalOpener for SystemBrowser {
    fn can_open(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https")
    }

    fn open(&self, url: &Url) -> Result<(), OpenError> {
        if !self.can_open(url) {
            warn!("Refusing to open {} externally", url);
            return Err(OpenError::Unsupported(url.to_string()));
        }
        info!("Opening {} in system browser", url);
        webbrowser::open(url.as_str()).map_err(OpenError::Io)
    }
}
