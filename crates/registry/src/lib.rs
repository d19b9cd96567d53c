//! Action catalog and dispatch.
//!
//! Actions are registered once at startup under a unique name. A
//! configuration then instantiates them: each binding carries its own
//! [`ActionInstance`] with private option state produced by the action's
//! setup hook. The [`ActionDispatcher`] runs instance lists and owns the
//! single interactive session that may be live at any time.

mod dispatch;
mod instance;
mod registry;


pub use dispatch::ActionDispatcher;
pub use instance::{ActionInstance, InputVerdict, InteractiveHooks, Progress};
pub use instance::{CancelFn, FreeFn, InputFn, PostFn, PreFn, RunFn};
pub use registry::{ActionRegistry, DefId, InteractiveSetupFn, PlainSetupFn, RegistryError, ShutdownFn};
