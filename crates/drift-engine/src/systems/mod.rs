pub mod shapes;
pub mod connections;
pub mod particle_system;
pub mod backdrop;
pub mod controller;
