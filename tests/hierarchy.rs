use contextwire::{key_of, Bolt, Context, CoreObject, Key, MemberTraits};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_create_records_parent_and_sigil() {
    struct PipelineSigil;

    let root = Context::new_root();
    let child = root.create::<PipelineSigil>();

    assert_eq!(child.parent().unwrap(), root);
    assert_eq!(child.sigil(), key_of::<PipelineSigil>());
    assert!(root.parent().is_none());
}

#[test]
fn test_anonymous_sigil() {
    let root = Context::new_root();
    let child = root.create_anonymous();
    assert!(child.sigil().is_anonymous());
}

#[test]
fn test_current_context_round_trip() {
    let root = Context::new_root();
    let child = root.create_anonymous();

    let before = Context::current();
    let previous = child.set_current();
    assert_eq!(Context::current(), child);

    // Restoring the previous occupant restores the observable current.
    match previous {
        Some(prev) => {
            prev.set_current();
        }
        None => Context::evict_current(),
    }
    assert_eq!(Context::current(), before);
}

#[test]
fn test_make_current_guard_restores() {
    let root = Context::new_root();
    let outer = root.create_anonymous();
    let inner = root.create_anonymous();

    let _outer_guard = outer.make_current();
    assert_eq!(Context::current(), outer);
    {
        let _inner_guard = inner.make_current();
        assert_eq!(Context::current(), inner);
    }
    assert_eq!(Context::current(), outer);
    Context::evict_current();
}

#[test]
fn test_current_falls_back_to_global() {
    Context::evict_current();
    assert_eq!(Context::current(), Context::global());
}

#[test]
fn test_bolt_hears_matching_sigil_from_descendants() {
    struct WorkerSigil;

    struct Watcher {
        seen: AtomicUsize,
    }
    impl Bolt for Watcher {
        fn context_sigils(&self) -> Vec<Key> {
            vec![key_of::<WorkerSigil>()]
        }
        fn context_created(&self, child: &Context) {
            assert_eq!(child.sigil(), key_of::<WorkerSigil>());
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }
    impl CoreObject for Watcher {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).bolt(this.clone())
        }
    }

    let root = Context::new_root();
    let watcher = root
        .add(Watcher {
            seen: AtomicUsize::new(0),
        })
        .unwrap();

    // Creation in the node itself and in a descendant both notify.
    let _direct = root.create::<WorkerSigil>();
    let mid = root.create_anonymous();
    let _nested = mid.create::<WorkerSigil>();
    let _other = root.create::<u8>();

    assert_eq!(watcher.seen.load(Ordering::SeqCst), 2);
}

#[test]
fn test_void_bolt_hears_everything_once() {
    struct Watcher {
        log: Mutex<Vec<Key>>,
    }
    impl Bolt for Watcher {
        fn context_sigils(&self) -> Vec<Key> {
            Vec::new() // all sigils
        }
        fn context_created(&self, child: &Context) {
            self.log.lock().unwrap().push(child.sigil());
        }
    }
    impl CoreObject for Watcher {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).bolt(this.clone())
        }
    }

    struct NamedSigil;

    let root = Context::new_root();
    let watcher = root
        .add(Watcher {
            log: Mutex::new(Vec::new()),
        })
        .unwrap();

    let _named = root.create::<NamedSigil>();
    let _anon = root.create_anonymous();

    let log = watcher.log.lock().unwrap().clone();
    assert_eq!(log, vec![key_of::<NamedSigil>(), key_of::<()>()]);
}

#[test]
fn test_bolt_declaring_named_and_void_fires_once() {
    struct TargetSigil;

    struct Watcher {
        seen: AtomicUsize,
    }
    impl Bolt for Watcher {
        fn context_sigils(&self) -> Vec<Key> {
            // Both the named sigil and the anonymous catch-all.
            vec![key_of::<TargetSigil>(), key_of::<()>()]
        }
        fn context_created(&self, _child: &Context) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }
    impl CoreObject for Watcher {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).bolt(this.clone())
        }
    }

    let root = Context::new_root();
    let watcher = root
        .add(Watcher {
            seen: AtomicUsize::new(0),
        })
        .unwrap();

    let _child = root.create::<TargetSigil>();
    assert_eq!(watcher.seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_peer_membership_is_independent() {
    struct Foo;
    impl CoreObject for Foo {}

    struct PeerSigil;

    let root = Context::new_root();
    let original = root.create_anonymous();
    let peer = original.create_peer::<PeerSigil>();

    assert_eq!(peer.parent().unwrap(), root);

    original.add(Foo).unwrap();
    // Peers are siblings: the member does not resolve through the peer.
    assert!(peer.find_by_type::<Foo>().is_none());
    // And the peer may own its own Foo without a duplicate error.
    peer.add(Foo).unwrap();
}

#[test]
fn test_child_collected_when_released() {
    let root = Context::new_root();
    let child = root.create_anonymous();
    let weak = child.downgrade();

    drop(child);
    // The parent holds only a weak reference down.
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_context_equality_is_identity() {
    let root = Context::new_root();
    let a = root.clone();
    assert_eq!(root, a);
    assert_ne!(root, Context::new_root());
}
