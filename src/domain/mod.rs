// Domain layer: the company record schema and the ports the import engine
// talks through.

pub mod model;
pub mod ports;
