pub mod chain;
pub mod crypto;
pub mod denial;
pub mod expiry;
pub mod trust_anchor;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use chain::DelegationWalker;
pub use crypto::SignatureVerifier;
pub use denial::{covers, nsec3_hash, DenialChecker};
pub use expiry::ExpiryChecker;
pub use trust_anchor::TrustAnchorLoader;
pub use validator::SignatureValidator;
