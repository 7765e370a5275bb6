//! Data models for portal entities

mod event;
mod giving;
mod media;
mod sermon;
mod user;

pub use event::*;
pub use giving::*;
pub use media::*;
pub use sermon::*;
pub use user::*;
