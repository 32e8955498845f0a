pub mod interface;
pub mod mongo;
pub mod records;
pub mod store;
