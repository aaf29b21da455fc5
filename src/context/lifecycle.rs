//! The initiate → run → shutdown state machine.

use std::sync::{Arc, PoisonError};
use std::time::{Duration, Instant};

use crate::context::{Context, LifecycleState, ShutdownMode};
use crate::events::receiver::ReceiverRegistration;
use crate::outstanding::{Outstanding, OutstandingToken};

impl Context {
    /// Transition to `Initiated` and start every registered runnable.
    ///
    /// Idempotent, and a no-op after shutdown. The parent chain is
    /// initiated first; event receivers delayed before initiation are then
    /// drained into the junction-box manager and pushed upward.
    pub fn initiate(&self) {
        {
            let mut st = self.lock_state();
            match st.phase {
                LifecycleState::Initiated | LifecycleState::Shutdown => return,
                LifecycleState::Constructed => st.phase = LifecycleState::Initiated,
            }
        }

        if let Some(parent) = self.parent() {
            parent.initiate();
        }

        // Delayed receivers become live: local manager first, then every
        // ancestor. The parent chain is initiated by now, so the ascent
        // lands directly in ancestor managers.
        let delayed = {
            let mut st = self.lock_state();
            std::mem::take(&mut st.delayed_receivers)
        };
        for registration in &delayed {
            for binding in &registration.bindings {
                binding.attach(&self.inner.junction, &registration.owner);
            }
            if let Some(parent) = self.parent() {
                parent.accept_receiver(registration);
            }
        }

        let outstanding = self.increment_outstanding();
        let runnables = {
            let st = self.lock_state();
            self.inner.state_changed.notify_all();
            st.runnables.clone()
        };
        for runnable in &runnables {
            runnable.start(outstanding.clone());
        }
        tracing::debug!(sigil = %self.sigil(), runnables = runnables.len(), "context initiated");
    }

    /// Signal shutdown: clear event receivers here and up the parent
    /// chain, mark the node `Shutdown`, dismantle children in reverse
    /// insertion order, then stop every runnable.
    ///
    /// With `wait`, blocks until every runnable in this node has joined.
    /// Calling this twice has the same observable effect as once.
    pub fn signal_shutdown(&self, wait: bool, mode: ShutdownMode) {
        let receivers = {
            let mut st = self.lock_state();
            st.phase = LifecycleState::Shutdown;
            self.inner.state_changed.notify_all();
            st.delayed_receivers.clear();
            std::mem::take(&mut st.event_receivers)
        };
        for registration in &receivers {
            self.evict_receiver(registration);
        }

        // Teardown interleave assurance: snapshot the children into strong
        // references under the lock, then signal outside it so a child's
        // destructor cannot race the traversal.
        let children = {
            let st = self.lock_state();
            st.live_children()
        };
        for child in children.iter().rev() {
            child.signal_shutdown(wait, mode);
        }

        let runnables = { self.lock_state().runnables.clone() };
        let graceful = mode == ShutdownMode::Graceful;
        for runnable in &runnables {
            runnable.stop(graceful);
        }
        self.inner.state_changed.notify_all();

        if wait {
            for runnable in &runnables {
                runnable.wait();
            }
        }
        tracing::debug!(sigil = %self.sigil(), graceful, "context shut down");
    }

    /// Block until this node is initiated or shut down.
    ///
    /// Returns `true` iff the node reached `Initiated`.
    pub fn delay_until_initiated(&self) -> bool {
        let mut st = self.lock_state();
        loop {
            match st.phase {
                LifecycleState::Initiated => return true,
                LifecycleState::Shutdown => return false,
                LifecycleState::Constructed => {
                    st = self
                        .inner
                        .state_changed
                        .wait(st)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Block until this node has shut down and every runnable in its
    /// subtree has retired.
    pub fn wait(&self) {
        let mut st = self.lock_state();
        loop {
            if st.phase == LifecycleState::Shutdown && st.outstanding.upgrade().is_none() {
                return;
            }
            st = self
                .inner
                .state_changed
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Bounded [`Context::wait`]. Returns `false` on timeout.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut st = self.lock_state();
        loop {
            if st.phase == LifecycleState::Shutdown && st.outstanding.upgrade().is_none() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _timed_out) = self
                .inner
                .state_changed
                .wait_timeout(st, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            st = guard;
        }
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lock_state().phase
    }

    pub fn is_initiated(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Initiated
    }

    pub fn is_shutdown(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Shutdown
    }

    // ----- outstanding count -----

    /// The subtree's outstanding token, created lazily. Creating it also
    /// acquires a token from the parent, so the count is visible at every
    /// ancestor.
    pub(crate) fn increment_outstanding(&self) -> Outstanding {
        let mut st = self.lock_state();
        if let Some(token) = st.outstanding.upgrade() {
            return Outstanding::from_token(token);
        }
        // Acquiring the parent's token under our lock follows the
        // child-to-parent order.
        let parent_token = self.parent().map(|p| p.increment_outstanding());
        let token = Arc::new(OutstandingToken::new(self.clone(), parent_token));
        st.outstanding = Arc::downgrade(&token);
        Outstanding::from_token(token)
    }

    pub(crate) fn on_outstanding_expired(&self) {
        let mut st = self.lock_state();
        st.outstanding = std::sync::Weak::new();
        drop(st);
        self.inner.state_changed.notify_all();
    }

    /// Whether any runnable in this subtree is still holding the token.
    pub fn has_outstanding(&self) -> bool {
        self.lock_state().outstanding.upgrade().is_some()
    }

    // ----- receiver placement -----

    /// Track and place a new receiver registration owned by this node.
    pub(crate) fn register_receivers(&self, registration: Arc<ReceiverRegistration>) {
        let deliver = {
            let mut st = self.lock_state();
            st.event_receivers.push(registration.clone());
            match st.phase {
                LifecycleState::Constructed => {
                    st.delayed_receivers.push(registration.clone());
                    false
                }
                LifecycleState::Initiated => true,
                // Shut-down contexts no longer dispatch.
                LifecycleState::Shutdown => false,
            }
        };
        if deliver {
            for binding in &registration.bindings {
                binding.attach(&self.inner.junction, &registration.owner);
            }
            if let Some(parent) = self.parent() {
                parent.accept_receiver(&registration);
            }
        }
    }

    /// Ascending placement step at a non-owning node: delay when this node
    /// has not initiated, insert and keep climbing otherwise.
    pub(crate) fn accept_receiver(&self, registration: &Arc<ReceiverRegistration>) {
        let deliver = {
            let mut st = self.lock_state();
            match st.phase {
                LifecycleState::Constructed => {
                    st.delayed_receivers.push(registration.clone());
                    false
                }
                LifecycleState::Initiated => true,
                // Receivers of a shut-down node were cleared; nothing to
                // link here or above.
                LifecycleState::Shutdown => return,
            }
        };
        if deliver {
            for binding in &registration.bindings {
                binding.attach(&self.inner.junction, &registration.owner);
            }
            if let Some(parent) = self.parent() {
                parent.accept_receiver(registration);
            }
        }
    }

    /// Remove a registration from this node's manager, delayed sets, and
    /// every ancestor's.
    pub(crate) fn evict_receiver(&self, registration: &Arc<ReceiverRegistration>) {
        let mut node = Some(self.clone());
        while let Some(n) = node {
            {
                let mut st = n.lock_state();
                st.delayed_receivers
                    .retain(|r| !Arc::ptr_eq(r, registration));
            }
            for binding in &registration.bindings {
                binding.detach(&n.inner.junction, &registration.owner);
            }
            node = n.parent();
        }
    }
}
