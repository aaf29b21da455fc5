use contextwire::{Context, CoreObject, MemberTraits, ShutdownMode, WireError};
use std::sync::Arc;

#[test]
fn test_add_and_find_concrete() {
    struct Database {
        url: String,
    }
    impl CoreObject for Database {}

    let ctx = Context::new_root();
    let added = ctx
        .add(Database {
            url: "postgres://localhost".to_string(),
        })
        .unwrap();

    let found = ctx.find_by_type::<Database>().unwrap();
    assert_eq!(found.url, "postgres://localhost");
    assert!(Arc::ptr_eq(&added, &found)); // Same instance
}

#[test]
fn test_inject_default() {
    #[derive(Default)]
    struct Counter {
        start: u32,
    }
    impl CoreObject for Counter {}

    let ctx = Context::new_root();
    let counter = ctx.inject::<Counter>().unwrap();
    assert_eq!(counter.start, 0);
}

#[test]
fn test_inject_with_factory() {
    struct Server {
        port: u16,
    }
    impl CoreObject for Server {}

    let ctx = Context::new_root();
    let server = ctx.inject_with(|| Server { port: 8080 }).unwrap();
    assert_eq!(server.port, 8080);
    assert!(ctx.find_by_type::<Server>().is_some());
}

#[test]
fn test_duplicate_type_rejected() {
    struct Foo(u32);
    impl CoreObject for Foo {}

    let ctx = Context::new_root();
    let first = ctx.add(Foo(1)).unwrap();

    match ctx.add(Foo(2)) {
        Err(WireError::DuplicateType(name)) => assert!(name.contains("Foo")),
        other => panic!("expected DuplicateType, got {:?}", other.map(|_| ())),
    }

    // First member untouched.
    let found = ctx.find_by_type::<Foo>().unwrap();
    assert!(Arc::ptr_eq(&first, &found));
    assert_eq!(found.0, 1);
}

#[test]
fn test_duplicate_object_rejected() {
    struct Foo;
    impl CoreObject for Foo {}

    let ctx = Context::new_root();
    let foo = Arc::new(Foo);
    ctx.add_shared(foo.clone()).unwrap();

    match ctx.add_shared(foo) {
        Err(WireError::DuplicateMember(_)) => {}
        other => panic!("expected DuplicateMember, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_ambiguous_interface_rejected() {
    trait Logger: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct ConsoleLogger;
    impl Logger for ConsoleLogger {
        fn name(&self) -> &'static str {
            "console"
        }
    }
    impl CoreObject for ConsoleLogger {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).expose::<dyn Logger>(this.clone())
        }
    }

    struct FileLogger;
    impl Logger for FileLogger {
        fn name(&self) -> &'static str {
            "file"
        }
    }
    impl CoreObject for FileLogger {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).expose::<dyn Logger>(this.clone())
        }
    }

    let ctx = Context::new_root();
    ctx.add(ConsoleLogger).unwrap();

    match ctx.add(FileLogger) {
        Err(WireError::AmbiguousAutowire(name)) => assert!(name.contains("Logger")),
        other => panic!("expected AmbiguousAutowire, got {:?}", other.map(|_| ())),
    }

    // The established binding survives.
    let logger = ctx.find_by_type::<dyn Logger>().unwrap();
    assert_eq!(logger.name(), "console");
}

#[test]
fn test_find_by_exposed_interface() {
    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct FixedClock(u64);
    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }
    impl CoreObject for FixedClock {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).expose::<dyn Clock>(this.clone())
        }
    }

    let ctx = Context::new_root();
    ctx.add(FixedClock(99)).unwrap();

    let clock = ctx.find_by_type::<dyn Clock>().unwrap();
    assert_eq!(clock.now(), 99);
}

#[test]
fn test_resolution_ascends_nearest_wins() {
    struct Foo(&'static str);
    impl CoreObject for Foo {}

    let root = Context::new_root();
    let child = root.create_anonymous();

    root.add(Foo("root")).unwrap();
    assert_eq!(child.find_by_type::<Foo>().unwrap().0, "root");

    // Shadowing: the child may own its own Foo; the nearest node wins.
    child.add(Foo("child")).unwrap();
    assert_eq!(child.find_by_type::<Foo>().unwrap().0, "child");
    assert_eq!(root.find_by_type::<Foo>().unwrap().0, "root");
}

#[test]
fn test_require_finds_or_constructs() {
    #[derive(Default)]
    struct Cache;
    impl CoreObject for Cache {}

    let root = Context::new_root();
    let child = root.create_anonymous();

    let created = root.require::<Cache>().unwrap();
    // The child finds the ancestor's member instead of constructing.
    let reused = child.require::<Cache>().unwrap();
    assert!(Arc::ptr_eq(&created, &reused));
    assert!(child
        .find_by_type::<Cache>()
        .map(|c| Arc::ptr_eq(&c, &created))
        .unwrap_or(false));
}

#[test]
fn test_add_after_shutdown_fails() {
    struct Foo;
    impl CoreObject for Foo {}

    let ctx = Context::new_root();
    ctx.signal_shutdown(false, ShutdownMode::Graceful);

    match ctx.add(Foo) {
        Err(WireError::ContextShutdown(op)) => assert_eq!(op, "add"),
        other => panic!("expected ContextShutdown, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_teardown_notification_reverse_order() {
    use contextwire::ContextMember;
    use std::sync::Mutex;

    struct First {
        log: Arc<Mutex<Vec<&'static str>>>,
    }
    impl ContextMember for First {
        fn notify_context_teardown(&self) {
            self.log.lock().unwrap().push("first");
        }
    }
    impl CoreObject for First {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).context_member(this.clone())
        }
    }

    struct Second {
        log: Arc<Mutex<Vec<&'static str>>>,
    }
    impl ContextMember for Second {
        fn notify_context_teardown(&self) {
            self.log.lock().unwrap().push("second");
        }
    }
    impl CoreObject for Second {
        fn member_traits(this: &Arc<Self>) -> MemberTraits {
            MemberTraits::new(this.clone()).context_member(this.clone())
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    {
        let ctx = Context::new_root();
        ctx.add(First { log: log.clone() }).unwrap();
        ctx.add(Second { log: log.clone() }).unwrap();
    }
    let order = log.lock().unwrap().clone();
    assert_eq!(order, vec!["second", "first"]);
}

#[test]
fn test_dump_lists_memos() {
    struct Engine;
    impl CoreObject for Engine {}

    let ctx = Context::new_root();
    ctx.add(Engine).unwrap();
    let _pending = ctx.autowire::<u32>();

    let dump = ctx.dump();
    assert!(dump.contains("Engine"));
    assert!(dump.contains("satisfied"));
    assert!(dump.contains("u32"));
    assert!(dump.contains("deferred"));
}
