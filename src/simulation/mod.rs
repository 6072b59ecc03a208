pub mod states;
pub mod params;
pub mod engine;
pub mod free_list;
pub mod quadtree;
pub mod forces;
pub mod collision;
pub mod partition;
pub mod integrator;
pub mod solver;
pub mod scenario;
