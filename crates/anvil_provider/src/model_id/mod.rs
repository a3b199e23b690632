pub mod normalizer;
pub mod resolver;
pub mod variations;
