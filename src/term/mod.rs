//! Terminal implementations of the animator's scheduler and viewport.

pub mod clock;
pub mod viewport;

pub use clock::FrameClock;
pub use viewport::TermViewport;
