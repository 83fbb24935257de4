//! # Navigation Errors
//!
//! Low-level navigation failures and the classifier that turns them into
//! something a user can read.
//!
//! Codes follow the well-known URL-loading error numbering that browser
//! engines report (`-1009` not connected, `-999` cancelled, ...). An engine
//! that speaks a different vocabulary maps into these kinds at its edge.
//!
//! The one special case is cancellation in the network domain: the engine
//! aborts a request itself when a newer navigation supersedes it or the user
//! stops loading. That is not a real failure and must never reach the error
//! overlay.

use std::fmt;

/// What went wrong, keyed by the engine's numeric error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavErrorKind {
    NotConnectedToInternet,
    TimedOut,
    CannotFindHost,
    CannotConnectToHost,
    NetworkConnectionLost,
    SecureConnectionFailed,
    CertificateHasBadDate,
    CertificateUntrusted,
    CertificateHasUnknownRoot,
    CertificateNotYetValid,
    Cancelled,
    Other(i64),
}

impl NavErrorKind {
    pub fn code(self) -> i64 {
        match self {
            NavErrorKind::NotConnectedToInternet => -1009,
            NavErrorKind::TimedOut => -1001,
            NavErrorKind::CannotFindHost => -1003,
            NavErrorKind::CannotConnectToHost => -1004,
            NavErrorKind::NetworkConnectionLost => -1005,
            NavErrorKind::SecureConnectionFailed => -1200,
            NavErrorKind::CertificateHasBadDate => -1201,
            NavErrorKind::CertificateUntrusted => -1202,
            NavErrorKind::CertificateHasUnknownRoot => -1203,
            NavErrorKind::CertificateNotYetValid => -1204,
            NavErrorKind::Cancelled => -999,
            NavErrorKind::Other(code) => code,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            -1009 => NavErrorKind::NotConnectedToInternet,
            -1001 => NavErrorKind::TimedOut,
            -1003 => NavErrorKind::CannotFindHost,
            -1004 => NavErrorKind::CannotConnectToHost,
            -1005 => NavErrorKind::NetworkConnectionLost,
            -1200 => NavErrorKind::SecureConnectionFailed,
            -1201 => NavErrorKind::CertificateHasBadDate,
            -1202 => NavErrorKind::CertificateUntrusted,
            -1203 => NavErrorKind::CertificateHasUnknownRoot,
            -1204 => NavErrorKind::CertificateNotYetValid,
            -999 => NavErrorKind::Cancelled,
            other => NavErrorKind::Other(other),
        }
    }
}

/// Which subsystem produced the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDomain {
    /// URL loading / networking.
    Network,
    Other(String),
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Network => write!(f, "network"),
            ErrorDomain::Other(name) => f.write_str(name),
        }
    }
}

/// A failed navigation as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NavError {
    pub kind: NavErrorKind,
    pub domain: ErrorDomain,
    /// The engine's own human-readable description, if it has one.
    pub description: Option<String>,
}

impl NavError {
    pub fn network(kind: NavErrorKind) -> Self {
        Self {
            kind,
            domain: ErrorDomain::Network,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn cancelled() -> Self {
        Self::network(NavErrorKind::Cancelled)
    }

    pub fn code(&self) -> i64 {
        self.kind.code()
    }
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "{desc} (code {}, domain {})", self.code(), self.domain),
            None => write!(f, "navigation error (code {}, domain {})", self.code(), self.domain),
        }
    }
}

impl std::error::Error for NavError {}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub message: String,
    /// Engine-initiated abort; absorb silently.
    pub is_transient_cancellation: bool,
}

pub const CERTIFICATE_MESSAGE: &str = "There's a problem with the website's security certificate.";
pub const FALLBACK_MESSAGE: &str =
    "Failed to load page. Please check your internet connection and try again.";

pub fn classify(error: &NavError) -> Classification {
    let is_transient_cancellation =
        error.domain == ErrorDomain::Network && error.kind == NavErrorKind::Cancelled;

    let message = match error.kind {
        NavErrorKind::NotConnectedToInternet => {
            "No internet connection. Please check your network settings.".to_string()
        }
        NavErrorKind::TimedOut => "The request timed out. Please try again.".to_string(),
        NavErrorKind::CannotFindHost => "Cannot find the server. Please check the URL.".to_string(),
        NavErrorKind::CannotConnectToHost => {
            "Cannot connect to the server. The server may be down.".to_string()
        }
        NavErrorKind::NetworkConnectionLost => {
            "Network connection was lost. Please try again.".to_string()
        }
        NavErrorKind::SecureConnectionFailed => {
            "Secure connection failed. This may be due to an expired or invalid SSL certificate."
                .to_string()
        }
        NavErrorKind::CertificateHasBadDate
        | NavErrorKind::CertificateUntrusted
        | NavErrorKind::CertificateHasUnknownRoot
        | NavErrorKind::CertificateNotYetValid => CERTIFICATE_MESSAGE.to_string(),
        NavErrorKind::Cancelled => "Navigation was cancelled.".to_string(),
        NavErrorKind::Other(_) => error
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(FALLBACK_MESSAGE)
            .to_string(),
    };

    Classification {
        message,
        is_transient_cancellation,
    }
}
