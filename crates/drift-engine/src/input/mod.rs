pub mod pointer;
pub mod queue;
