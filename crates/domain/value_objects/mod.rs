pub mod enums;
pub mod items;
pub mod pagination;
pub mod payments;
