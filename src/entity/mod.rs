pub mod categories;
pub mod customers;
pub mod employees;
pub mod orders;
pub mod product_images;
pub mod products;
pub mod reviews;
pub mod shipping_addresses;
pub mod sizes;

pub use categories::Entity as Categories;
pub use customers::Entity as Customers;
pub use employees::Entity as Employees;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use shipping_addresses::Entity as ShippingAddresses;
pub use sizes::Entity as Sizes;
