//! Noun data model and jam/cue bitwise serialization for Nock-style runtimes.
//!
//! By default cell branches are held behind [`alloc::rc::Rc`], which is not
//! thread-safe. Enable the `thread-safe` feature to switch the branch pointer
//! to [`alloc::sync::Arc`] and make [`Noun`] `Send + Sync`.

#![no_std]

extern crate alloc;

pub mod bits;
mod jam;
mod noun;

pub use jam::*;
pub use noun::*;

/// Reference-counting pointer used for cell branches.
///
/// Alias for [`alloc::rc::Rc`] unless the `thread-safe` feature is enabled.
#[cfg(not(feature = "thread-safe"))]
pub type Rc<T> = alloc::rc::Rc<T>;

/// Reference-counting pointer used for cell branches.
///
/// Alias for [`alloc::sync::Arc`] when the `thread-safe` feature is enabled.
#[cfg(feature = "thread-safe")]
pub type Rc<T> = alloc::sync::Arc<T>;
