pub mod market;
pub mod symbols;
