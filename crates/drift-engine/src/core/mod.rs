pub mod forces;
pub mod particle;
pub mod rng;
