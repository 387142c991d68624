// Core modules: signature grammar, literal lexing, value parsing, and error modeling.
pub mod error;
pub mod lexer;
pub mod names;
pub mod parser;
pub mod signature;
pub mod value;
