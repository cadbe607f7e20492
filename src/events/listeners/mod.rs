//! Built-in listener handlers.
//!
//! These handlers provide common functionality out of the box. Register them
//! with [`ListenerBuilder::handler`](crate::events::ListenerBuilder::handler).

mod logging;
#[cfg(feature = "tracing")]
mod tracing;

pub use logging::LoggingListener;
#[cfg(feature = "tracing")]
pub use self::tracing::TracingListener;
