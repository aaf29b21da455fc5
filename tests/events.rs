use contextwire::{
    CaughtException, Context, CoreObject, Deferred, DispatchQueue, ExceptionFilter, Key,
    MemberTraits, ObjectId,
};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

trait Ping: Send + Sync {
    fn ping(&self, value: u32);
}

struct PingCounter {
    total: AtomicU32,
}

impl PingCounter {
    fn new() -> Self {
        Self {
            total: AtomicU32::new(0),
        }
    }
}

impl Ping for PingCounter {
    fn ping(&self, value: u32) {
        self.total.fetch_add(value, Ordering::SeqCst);
    }
}

impl CoreObject for PingCounter {
    fn member_traits(this: &Arc<Self>) -> MemberTraits {
        MemberTraits::new(this.clone()).receives::<dyn Ping>(this.clone())
    }
}

#[test]
fn test_event_reaches_listener_in_ancestor() {
    let root = Context::new_root();
    let listener = root.add(PingCounter::new()).unwrap();

    let child = root.create_anonymous();
    let grandchild = child.create_anonymous();
    grandchild.initiate();

    // Sender in the grandchild, listener installed in the root.
    grandchild.event_sender::<dyn Ping>().fire(|r| r.ping(1));
    assert_eq!(listener.total.load(Ordering::SeqCst), 1);
}

#[test]
fn test_event_reaches_listener_in_descendant() {
    let root = Context::new_root();
    let child = root.create_anonymous();
    let listener = child.add(PingCounter::new()).unwrap();
    child.initiate();

    root.event_sender::<dyn Ping>().fire(|r| r.ping(2));
    assert_eq!(listener.total.load(Ordering::SeqCst), 2);
}

#[test]
fn test_no_replay_for_late_receivers() {
    let root = Context::new_root();
    root.initiate();

    let sender = root.event_sender::<dyn Ping>();
    sender.fire(|r| r.ping(5));

    let listener = root.add(PingCounter::new()).unwrap();
    // The earlier fire is not replayed.
    assert_eq!(listener.total.load(Ordering::SeqCst), 0);
    sender.fire(|r| r.ping(5));
    assert_eq!(listener.total.load(Ordering::SeqCst), 5);
}

#[test]
fn test_receiver_delayed_until_initiate() {
    let root = Context::new_root();
    let listener = root.add(PingCounter::new()).unwrap();

    let sender = root.event_sender::<dyn Ping>();
    sender.fire(|r| r.ping(1));
    // Not initiated: the receiver is parked in the delayed set.
    assert_eq!(listener.total.load(Ordering::SeqCst), 0);
    assert!(!sender.has_listeners());

    root.initiate();
    sender.fire(|r| r.ping(1));
    assert_eq!(listener.total.load(Ordering::SeqCst), 1);
    assert!(sender.has_listeners());
}

#[test]
fn test_delayed_receiver_ascends_into_initiated_parent() {
    let root = Context::new_root();
    root.initiate();

    // Receiver added to a constructed child after the parent initiated.
    let child = root.create_anonymous();
    let listener = child.add(PingCounter::new()).unwrap();

    let sender = root.event_sender::<dyn Ping>();
    sender.fire(|r| r.ping(1));
    assert_eq!(listener.total.load(Ordering::SeqCst), 0);

    // Initiate drains the delayed receiver into the parent's manager even
    // though the parent initiated long ago.
    child.initiate();
    sender.fire(|r| r.ping(1));
    assert_eq!(listener.total.load(Ordering::SeqCst), 1);
}

#[test]
fn test_peer_junction() {
    struct PeerSigil;

    let root = Context::new_root();
    let original = root.create_anonymous();
    let peer = original.create_peer::<PeerSigil>();

    let listener = original.add(PingCounter::new()).unwrap();
    original.initiate();

    // The peer shares the junction-box manager.
    peer.event_sender::<dyn Ping>().fire(|r| r.ping(9));
    assert_eq!(listener.total.load(Ordering::SeqCst), 9);
}

#[test]
fn test_receiver_removed_on_shutdown() {
    use contextwire::ShutdownMode;

    let root = Context::new_root();
    let child = root.create_anonymous();
    let listener = child.add(PingCounter::new()).unwrap();
    child.initiate();

    let sender = root.event_sender::<dyn Ping>();
    sender.fire(|r| r.ping(1));
    assert_eq!(listener.total.load(Ordering::SeqCst), 1);

    child.signal_shutdown(false, ShutdownMode::Graceful);
    sender.fire(|r| r.ping(1));
    // Shutdown cleared the receiver locally and up the parent chain.
    assert_eq!(listener.total.load(Ordering::SeqCst), 1);
}

#[test]
fn test_deferred_dispatch_runs_on_queue() {
    trait Job: Send + Sync {
        fn enqueue_sum(&self, value: u32) -> Deferred;
    }

    struct Worker {
        queue: Arc<DispatchQueue>,
        total: AtomicU32,
    }
    impl Job for Worker {
        fn enqueue_sum(&self, value: u32) -> Deferred {
            self.total.fetch_add(value, Ordering::SeqCst);
            Deferred
        }
    }
    impl CoreObject for Worker {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone())
                .receives_deferred::<dyn Job>(this.clone(), this.queue.clone())
        }
    }

    let root = Context::new_root();
    let worker = root
        .add(Worker {
            queue: Arc::new(DispatchQueue::new()),
            total: AtomicU32::new(0),
        })
        .unwrap();
    root.initiate();

    root.event_sender::<dyn Job>().defer(|r| r.enqueue_sum(11));

    // Nothing ran on the firing thread.
    assert_eq!(worker.total.load(Ordering::SeqCst), 0);
    assert_eq!(worker.queue.len(), 1);

    // The receiver drives its own queue.
    assert_eq!(worker.queue.dispatch_all(), 1);
    assert_eq!(worker.total.load(Ordering::SeqCst), 11);
}

#[test]
fn test_filter_consumes_listener_panic() {
    struct Thrower;
    impl Ping for Thrower {
        fn ping(&self, _value: u32) {
            panic!("listener failure");
        }
    }
    impl CoreObject for Thrower {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).receives::<dyn Ping>(this.clone())
        }
    }

    struct Swallower {
        seen: AtomicUsize,
    }
    impl ExceptionFilter for Swallower {
        fn filter(&self, _exception: &CaughtException) -> bool {
            false
        }
        fn filter_firing(
            &self,
            exception: &CaughtException,
            _event: &Key,
            _recipient: ObjectId,
        ) -> bool {
            self.seen.fetch_add(1, Ordering::SeqCst);
            exception.message() == Some("listener failure")
        }
    }
    impl CoreObject for Swallower {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).exception_filter(this.clone())
        }
    }

    let root = Context::new_root();
    let filter = root
        .add(Swallower {
            seen: AtomicUsize::new(0),
        })
        .unwrap();

    let child = root.create_anonymous();
    child.add(Thrower).unwrap();
    let healthy = child.add(PingCounter::new()).unwrap();
    child.initiate();

    // The panic is consumed by the ancestor's filter; dispatch continues
    // to the remaining receivers.
    child.event_sender::<dyn Ping>().fire(|r| r.ping(3));
    assert_eq!(filter.seen.load(Ordering::SeqCst), 1);
    assert_eq!(healthy.total.load(Ordering::SeqCst), 3);
}

#[test]
fn test_unhandled_listener_panic_reaches_sender() {
    struct Thrower;
    impl Ping for Thrower {
        fn ping(&self, _value: u32) {
            panic!("unfiltered");
        }
    }
    impl CoreObject for Thrower {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).receives::<dyn Ping>(this.clone())
        }
    }

    let root = Context::new_root();
    root.add(Thrower).unwrap();
    root.initiate();

    let sender = root.event_sender::<dyn Ping>();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        sender.fire(|r| r.ping(1));
    }));
    assert!(outcome.is_err());
}

#[test]
fn test_run_filtered_user_call() {
    struct Swallower;
    impl ExceptionFilter for Swallower {
        fn filter(&self, exception: &CaughtException) -> bool {
            exception.message() == Some("recoverable")
        }
    }
    impl CoreObject for Swallower {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).exception_filter(this.clone())
        }
    }

    let root = Context::new_root();
    root.add(Swallower).unwrap();

    // Consumed: no value, no propagation.
    assert!(root.run_filtered(|| panic!("recoverable")).is_none());
    // Healthy calls pass the value through.
    assert_eq!(root.run_filtered(|| 21 * 2), Some(42));
    // Undeclined panics propagate.
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        root.run_filtered(|| panic!("fatal"))
    }));
    assert!(outcome.is_err());
}

#[test]
fn test_snoop_and_unsnoop() {
    let root = Context::new_root();
    root.initiate();

    // Not a member, only a snooper.
    let snooper = Arc::new(PingCounter::new());
    root.snoop(&snooper);

    let sender = root.event_sender::<dyn Ping>();
    sender.fire(|r| r.ping(1));
    assert_eq!(snooper.total.load(Ordering::SeqCst), 1);
    assert!(root.find_by_type::<PingCounter>().is_none());

    root.unsnoop(&snooper);
    sender.fire(|r| r.ping(1));
    assert_eq!(snooper.total.load(Ordering::SeqCst), 1);
}

#[test]
fn test_invoke_relay_snapshot() {
    let root = Context::new_root();
    let first = root.add(PingCounter::new()).unwrap();
    root.initiate();

    let relay = root.event_sender::<dyn Ping>().invoke();
    assert_eq!(relay.receiver_count(), 1);

    // Receivers added after the snapshot are not reached by it.
    let child = root.create_anonymous();
    let late = child.add(PingCounter::new()).unwrap();
    child.initiate();

    relay.fire(|r| r.ping(4));
    assert_eq!(first.total.load(Ordering::SeqCst), 4);
    assert_eq!(late.total.load(Ordering::SeqCst), 0);
}
