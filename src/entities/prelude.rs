pub use super::posts::Entity as Posts;
pub use super::projects::Entity as Projects;
pub use super::service_pages::Entity as ServicePages;
pub use super::users::Entity as Users;
