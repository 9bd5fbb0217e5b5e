#![deny(missing_docs)]
//! Base contracts and the inheritance-chain builder for atrium.
//!
//! [`ChainBuilder`] walks a class's declared parents bottom-up, instantiates
//! every level, runs each level's create hook exactly once and layers the
//! protected capabilities they return. The root of a Model, Page or
//! Controller chain is the matching base contract from [`contracts`]; plain
//! classes have no root contract.

mod builder;
pub mod contracts;
mod page;

pub use builder::{Built, ChainBuilder};
pub use contracts::{ControllerBase, FacadeBase, ModelBase, base_contracts, install_base_contracts};
pub use page::PageBase;
