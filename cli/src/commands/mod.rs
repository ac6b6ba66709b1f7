pub mod demo;
pub mod run;

pub use demo::run_demo;
pub use run::{Op, run_ops};
