pub mod caller;
pub mod cart;
pub mod catalog;
pub mod customer;
pub mod errors;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod wallet;
