pub mod prelude;

pub mod posts;
pub mod projects;
pub mod service_pages;
pub mod users;
