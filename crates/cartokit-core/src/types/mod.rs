//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: `Rc<RefCell<T>>` alias and one-shot callback types.

pub mod aliases;

pub use aliases::*;
