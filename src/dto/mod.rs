pub mod books;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod orders;
