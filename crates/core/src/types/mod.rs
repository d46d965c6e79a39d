//! Core types for FoodieFinds.

pub mod cuisine;
pub mod id;
pub mod photo;
pub mod restaurant;
pub mod role;
pub mod session;
pub mod user;

pub use cuisine::{Cuisine, UnknownCuisine};
pub use id::*;
pub use photo::{ImageRef, Photo};
pub use restaurant::{
    Owner, PLACEHOLDER_IMAGE_URL, Restaurant, RestaurantInput, RestaurantList, SaveKind,
};
pub use role::{Role, UnknownRole};
pub use session::{ConnectionStatus, SessionEvent, SessionPhase, TransitionError};
pub use user::{NewUser, User};
