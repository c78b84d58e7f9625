pub mod autoplay;
pub mod card;
pub mod constants;
pub mod error;
pub mod host;
pub mod particles;

pub use autoplay::*;
pub use card::*;
pub use error::*;
pub use host::*;
pub use particles::*;
