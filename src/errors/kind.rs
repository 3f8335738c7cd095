//! Error kind hierarchy.
//!
//! ```text
//! Any
//! ├── Validation
//! ├── Response
//! ├── Authentication
//! │   ├── Unauthorized
//! │   └── InvalidToken
//! ├── Backend
//! ├── Routing
//! │   ├── UnknownService
//! │   ├── UnknownEndpoint
//! │   ├── MissingParameter
//! │   ├── DuplicateEndpoint
//! │   └── InvalidTemplate
//! └── Timeout
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Any,
    Validation,
    Response,
    Authentication,
    Unauthorized,
    InvalidToken,
    Backend,
    Routing,
    UnknownService,
    UnknownEndpoint,
    MissingParameter,
    DuplicateEndpoint,
    InvalidTemplate,
    Timeout,
}

impl ErrorKind {
    /// The direct ancestor, `None` only for the root.
    pub fn parent(self) -> Option<ErrorKind> {
        use ErrorKind::*;
        match self {
            Any => None,
            Validation | Response | Authentication | Backend | Routing | Timeout => Some(Any),
            Unauthorized | InvalidToken => Some(Authentication),
            UnknownService | UnknownEndpoint | MissingParameter | DuplicateEndpoint
            | InvalidTemplate => Some(Routing),
        }
    }

    /// This kind followed by every ancestor up to `Any`.
    pub fn ancestors(self) -> impl Iterator<Item = ErrorKind> {
        std::iter::successors(Some(self), |kind| kind.parent())
    }

    /// Number of parent hops from `self` to `ancestor`, or `None` when
    /// `ancestor` is not on the chain.
    pub fn distance_to(self, ancestor: ErrorKind) -> Option<usize> {
        self.ancestors().position(|kind| kind == ancestor)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
