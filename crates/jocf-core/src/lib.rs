//! # jocf-core — Foundational Types for the JOCF Validator
//!
//! Leaf crate of the workspace. It defines the discriminator values that
//! select which schema a JSON document or record must satisfy:
//!
//! - [`FileType`] — the `file_type` tag of a container document.
//! - [`ObjectType`] — the `object_type` tag of an individual record.
//! - [`SchemaId`] — the `$id` URI of any schema document in the corpus.
//!
//! All three are immutable newtypes over a non-empty string. Equality and
//! hashing delegate to the wrapped string, so they can key a `HashMap`
//! and be looked up by `&str`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jocf-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod discriminator;
pub mod error;

pub use discriminator::{FileType, ObjectType, SchemaId};
pub use error::DiscriminatorError;
