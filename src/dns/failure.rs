//! Failure taxonomy for name resolution.
//!
//! Every resolution outcome is expressed as a [`Failure`] tag on a
//! [`Host`](super::Host); resolvers never propagate errors up the stack.
//! The tags are part of the stable API consumed by the request-routing
//! layer, which applies negative-result TTLs based on them.

use thiserror::Error;

/// Outcome classification of a single name resolution.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy, Default)]
pub enum Failure {
    /// Resolution succeeded with at least one validated address.
    #[error("OK")]
    Ok,
    /// The input name is unusable (empty, `[]`, malformed IPv6 literal).
    #[error("invalid host name to resolve")]
    InvalidHost,
    /// No configured source knows the name (NXDOMAIN / not in hosts file).
    #[error("unknown host name")]
    UnknownHost,
    /// The name resolved but every returned address failed validation.
    #[error("no valid IP address for host")]
    NoAddress,
    /// No name server answered within the per-attempt budget.
    #[error("timeout resolving host name")]
    Timeout,
    /// Configured name servers are unreachable, refusing, or absent.
    #[error("invalid name servers")]
    InvalidResolvers,
    /// A URL could not be parsed for its host portion.
    #[error("invalid URL")]
    InvalidUrl,
    /// Catch-all for unclassified backend errors.
    #[error("unknown name resolution error")]
    Other,
    /// Initial state of a default-constructed host record.
    #[default]
    #[error("not yet resolved")]
    NotYetResolved,
}

impl Failure {
    /// True iff the tag denotes a successful resolution.
    pub fn is_ok(&self) -> bool {
        matches!(self, Failure::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_yet_resolved() {
        assert_eq!(Failure::default(), Failure::NotYetResolved);
        assert!(!Failure::default().is_ok());
    }

    #[test]
    fn test_display_strings_are_distinct() {
        let all = [
            Failure::Ok,
            Failure::InvalidHost,
            Failure::UnknownHost,
            Failure::NoAddress,
            Failure::Timeout,
            Failure::InvalidResolvers,
            Failure::InvalidUrl,
            Failure::Other,
            Failure::NotYetResolved,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.to_string(), b.to_string());
            }
        }
    }
}
