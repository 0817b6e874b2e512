pub mod organization;
pub mod peers;
pub mod ratings;
pub mod rollup;
pub mod trends;
