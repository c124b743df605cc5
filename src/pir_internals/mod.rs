pub mod branch_opt_util;
pub mod error;
pub mod matrix;
pub mod params;
pub mod rng;
pub mod serialization;
