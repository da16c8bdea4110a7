//! Generic per-entity-type repositories with a lifecycle-hook pipeline
//!
//! One repository exists per resolved entity-type name, obtained from the
//! caching [`RepositoryFactory`]. Every mutation runs through the hook
//! pipeline: normalize, validate, veto-able save, side effects.

mod errors;
mod events;
mod factory;
pub mod helpers;
mod hooks;
#[allow(clippy::module_inception)]
mod repository;

pub use errors::{DataError, DataResult};
pub use events::{ChangeEvent, EventBus};
pub use factory::RepositoryFactory;
pub use hooks::{hooks_for, EntityHooks, EntityTypeHooks, HookContext, StandardHooks};
pub use repository::{DeleteResult, EntityRepository, WriteResult};
