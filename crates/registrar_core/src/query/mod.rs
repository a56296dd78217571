//! Record filtering shared by both storage backends.
//!
//! # Invariants
//! - User-supplied filter values are only ever bound as SQL parameters.
//! - The in-memory predicate and the SQL predicate select the same rows.

pub mod filter;
