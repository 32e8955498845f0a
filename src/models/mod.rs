pub mod contract;
pub mod customer;
pub mod protocol;
pub mod reservation;
pub mod vehicle;
