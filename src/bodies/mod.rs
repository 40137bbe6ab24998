mod body;
pub mod body_flags;

pub use body::Body;
pub use body_flags::BodyFlags;
