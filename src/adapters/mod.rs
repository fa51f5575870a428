// Adapters layer: concrete backends for the domain ports (stores, contact
// directory sources).

pub mod directory;
pub mod store;
