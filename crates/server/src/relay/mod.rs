pub mod reassembly;
pub mod stream;
pub mod unary;
