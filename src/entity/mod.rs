pub mod books;
pub mod categories;
pub mod customers;
pub mod order_items;
pub mod orders;

pub use books::Entity as Books;
pub use categories::Entity as Categories;
pub use customers::Entity as Customers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
