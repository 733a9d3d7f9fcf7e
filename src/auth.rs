//! Removal authorization.
//!
//! Deleting a record requires a [`RemovalGrant`], which only an [`AdminGate`]
//! hands out. The service never inspects credentials itself.

use crate::error::LeaderboardError;

/// Proof that the caller passed the admin gate.
#[derive(Debug)]
pub struct RemovalGrant {
    _private: (),
}

impl RemovalGrant {
    pub(crate) fn issue() -> Self {
        Self { _private: () }
    }
}

pub trait AdminGate: Send + Sync {
    fn authorize(&self, credential: Option<&str>) -> Result<RemovalGrant, LeaderboardError>;
}

/// Compares the supplied code against a configured admin code.
/// Without a configured code every request is refused.
#[derive(Clone, Debug, Default)]
pub struct AdminCodeGate {
    code: Option<String>,
}

impl AdminCodeGate {
    pub fn new(code: Option<String>) -> Self {
        let code = code.filter(|value| !value.is_empty());
        Self { code }
    }

    pub fn is_configured(&self) -> bool {
        self.code.is_some()
    }
}

impl AdminGate for AdminCodeGate {
    fn authorize(&self, credential: Option<&str>) -> Result<RemovalGrant, LeaderboardError> {
        match (self.code.as_deref(), credential) {
            (Some(expected), Some(given)) if !given.is_empty() && constant_time_eq(expected, given) => {
                Ok(RemovalGrant::issue())
            }
            _ => Err(LeaderboardError::Unauthorized),
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
