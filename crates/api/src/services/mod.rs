//! Business logic layer.
//!
//! Services borrow the record store for the duration of one request and hold
//! no cached state. Handlers build one per call.

pub mod password;
pub mod products;
pub mod users;

pub use products::ProductService;
pub use users::UserService;
