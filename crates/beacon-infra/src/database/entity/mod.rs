//! SeaORM entities.

pub mod admin;
pub mod site;
pub mod visit;
