//! Demultiplexer identification.
//!
//! - [`identifier`]: three-tier identification of the program that produced an output tree
//! - [`probe`]: version query against an installed binary, behind the [`probe::VersionProbe`] trait

pub mod identifier;
pub mod probe;
