//! The runnable contract.

use crate::outstanding::Outstanding;

/// A member offering start/stop/wait, counted in the outstanding token.
///
/// The core never runs worker loops itself; it only issues these three calls
/// to an opaque runnable supplied by the application. A runnable started
/// with an [`Outstanding`] handle must hold that handle until its work has
/// fully retired. Releasing it is what lets ancestors finish waiting.
///
/// `stop` may be delivered more than once (shutdown is idempotent) and must
/// tolerate that. A runnable that ignores `stop` blocks shutdown; there is
/// no forced cancellation.
pub trait Runnable: Send + Sync {
    /// Begin work, holding `outstanding` until completion.
    fn start(&self, outstanding: Outstanding);

    /// Request termination. `graceful` permits draining queued work first.
    fn stop(&self, graceful: bool);

    /// Block until the runnable has stopped.
    fn wait(&self);
}
