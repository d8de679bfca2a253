//! Hash helpers usados para identificar steps de forma estable.

pub mod hash;

pub use hash::hash_str;
