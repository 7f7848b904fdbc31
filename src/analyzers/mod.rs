//! Survey scoring and school comparison.
//!
//! Teacher rows are scored into digital literacy dimensions and a fixed
//! level; student rows into a tier-normalized percentage and a tier-relative
//! level. Both populations are rolled up per school, joined on the fuzzy
//! school key and correlated.

pub mod analyzer;
pub mod compare;
pub mod filter;
pub mod grade;
pub mod school_key;
pub mod student;
pub mod summary;
pub mod teacher;
pub mod types;
pub mod utility;
