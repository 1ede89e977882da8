//! Attribute extraction building blocks shared by all device strategies.

pub mod common;
pub mod flatten;
pub mod tags;
