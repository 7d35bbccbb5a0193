#![allow(dead_code)]

pub mod fakes;
pub mod strategies;

pub use fakes::*;
pub use strategies::*;
