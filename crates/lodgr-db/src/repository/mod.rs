//! SurrealDB implementations of the `lodgr-core` repository traits.

mod caretaker;
pub(crate) mod lease;
pub(crate) mod tenant;
pub(crate) mod unit;

pub use caretaker::SurrealCaretakerRepository;
pub use lease::SurrealLeaseRepository;
pub use tenant::SurrealTenantRepository;
pub use unit::SurrealUnitRepository;
