pub mod chart;
pub mod export;
pub mod plan;
pub mod scenario;
pub mod simulate;
