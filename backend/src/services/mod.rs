//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the image store.

mod images;
pub mod product;
pub mod user;

pub use product::ProductService;
pub use user::UserService;
