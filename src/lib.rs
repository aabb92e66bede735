#![deny(unsafe_code)]
#![warn(clippy::nursery, clippy::pedantic)]

pub mod ast;
pub mod codegen;
pub mod diagnostics;
pub mod generator;
pub mod optimization;
#[allow(unsafe_code)]
pub mod parser;
pub mod syntax;
