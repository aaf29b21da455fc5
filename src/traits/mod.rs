//! Contracts between the runtime and the objects it composes.

mod bolt;
mod filter;
mod object;
mod runnable;

pub use bolt::Bolt;
pub use filter::{CaughtException, ExceptionFilter};
pub use object::{ContextMember, CoreObject, PacketSubscriber};
pub use runnable::Runnable;
