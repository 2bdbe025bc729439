#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the mixfix parsing engine.
//!
//! Nothing in here knows about tokens or trees:
//! - [`Interner`]/[`Symbol`]: cheap integer handles for category names
//! - [`Prec`]: binding strength of productions, with the named levels the
//!   engine relies on (`MAX` for atoms, `ARG` for application arguments,
//!   `LEAD` for binders)

mod interner;
mod prec;


pub use interner::{Interner, Symbol};
pub use prec::Prec;
