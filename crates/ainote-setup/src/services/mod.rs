pub mod instructions;
pub mod model;
