#![allow(dead_code)]

pub mod upstream;

pub use upstream::*;
