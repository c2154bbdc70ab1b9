pub mod client;
pub mod error;
pub mod model;
pub mod view;

pub use client::ApiClient;
pub use view::{BookService, ClientView};
