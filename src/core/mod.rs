pub mod error;
pub mod model;
pub mod offers;
pub mod services;
pub mod traits;
