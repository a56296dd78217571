//! Export/import formats for the record set.
//!
//! # Responsibility
//! - Define the JSON document layout shared by export, import and the
//!   document-file backend.
//! - Read and write per-collection JSON files.
//! - Flatten the record set into a single reporting table.
//!
//! # Invariants
//! - Derived course/student lists are written for readers but ignored on import.
//! - A missing collection file is reported distinctly from other I/O failures.

pub mod document;
pub mod files;
pub mod tabular;
