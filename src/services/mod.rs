pub mod cached_reader;
pub use cached_reader::CachedUserReader;

pub mod credentials;
pub use credentials::{CredentialError, CredentialVerifier};

pub mod image;
pub use image::ProfilePictureStore;

pub mod token;
pub use token::{Claims, TokenError, TokenIssuer, generate_secret};

pub mod validation;
pub use validation::ValidationError;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{AuthError, ProfilePicture, UserError, UserInfo, UserService};
pub use user_service_impl::DefaultUserService;
