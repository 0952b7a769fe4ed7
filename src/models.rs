pub mod machine;
pub mod planning;
pub mod product;
pub mod reports;
pub mod transaction;
