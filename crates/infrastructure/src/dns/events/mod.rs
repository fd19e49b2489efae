pub mod emitter;
pub mod types;

pub use emitter::ResponseEventEmitter;
pub use types::ResponseEvent;
