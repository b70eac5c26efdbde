pub mod balance;
pub mod deploy;
pub mod estimate;
pub mod networks;
