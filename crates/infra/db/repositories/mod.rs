pub mod customers;
pub mod items;
pub mod payments;
