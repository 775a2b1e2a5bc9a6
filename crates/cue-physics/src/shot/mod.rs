pub mod damping;
pub mod params;
pub mod slide_roll;
pub mod solver;
pub mod spin;
