pub mod ip138_parser;

pub use ip138_parser::Ip138Parser;
