#![allow(dead_code)]

pub mod mock_phenome;

pub use mock_phenome::*;
