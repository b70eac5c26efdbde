pub mod deployment;
pub mod estimate;
pub mod fee;
pub mod network;

pub use deployment::*;
pub use estimate::*;
pub use fee::*;
pub use network::*;
