pub mod ratings;
pub mod stores;
pub mod users;

pub use ratings::Entity as Ratings;
pub use stores::Entity as Stores;
pub use users::Entity as Users;
