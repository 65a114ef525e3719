pub mod filter;
pub mod normalizer;
