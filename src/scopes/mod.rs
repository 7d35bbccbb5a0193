//! # Scope Hierarchy
//!
//! Resources live at one of three levels of the account → organization →
//! project hierarchy. [`Scope`] is the coordinate value; [`ScopeEnumerator`]
//! discovers the scopes of the source account that a phase iterates over.

mod enumerator;
mod scope;

pub use enumerator::{HttpScopeSource, ProjectRef, ScopeEnumerator, ScopeFilter, ScopeSource};
pub use scope::{Scope, ScopeLevel};
