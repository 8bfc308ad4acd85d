pub mod op;
pub mod word;
