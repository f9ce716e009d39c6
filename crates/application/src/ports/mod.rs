pub mod chain_walker;
pub mod link_checker;

pub use chain_walker::ChainWalker;
pub use link_checker::LinkChecker;
