//! In-process event dispatcher.
//!
//! Named [`Event`]s are fired and delivered to the [`Listener`]s subscribed
//! to that name, in registration order. A listener either handles the event
//! synchronously, possibly stopping propagation to the listeners after it,
//! or is deferred to a queue drained one entry per tick by a recurring
//! timer.
//!
//! See the [`events`] module for a walkthrough.

pub mod config;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod validators;

pub use config::DispatcherConfig;
pub use error::{ConfigurationError, DispatchError, HandlerError, SchedulerError};
pub use events::{
    DispatchReport, Dispatcher, Event, HandleResult, Handler, Listener, ListenerConfig,
    Propagation,
};
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TokioScheduler};
