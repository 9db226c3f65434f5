pub mod customers;
pub mod items;
pub mod payments;
pub mod purchased_items;
