//! Steam identity handling and community web access.

mod client;
mod identity;
mod pages;

pub use client::SteamWeb;
pub use identity::IdentityKey;
pub use identity::NormalizationError;
pub use identity::SteamId;
pub use pages::MemberPage;
pub use pages::PageError;
pub use pages::Profile;
