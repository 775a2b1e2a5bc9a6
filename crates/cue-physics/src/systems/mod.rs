pub mod collision;
pub mod pockets;
pub mod tunneling;
