pub mod arithmetic;
pub mod automorphism;
pub mod decompose;
pub mod sampling;
