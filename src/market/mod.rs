pub mod chart;
pub mod clock;
pub mod types;
