use contextwire::WireError;

#[test]
fn test_display_messages() {
    let cases = [
        (
            WireError::DuplicateMember("app::Foo"),
            "Object of type app::Foo is already a member of this context",
        ),
        (
            WireError::DuplicateType("app::Foo"),
            "A member of type app::Foo already exists in this context",
        ),
        (
            WireError::AmbiguousAutowire("dyn app::Logger"),
            "Ambiguous autowiring: a second member satisfies dyn app::Logger",
        ),
        (
            WireError::ContextShutdown("add"),
            "Operation add attempted on a shut-down context",
        ),
    ];
    for (error, expected) in cases {
        assert_eq!(error.to_string(), expected);
    }
}

#[test]
fn test_error_trait_object() {
    let error: Box<dyn std::error::Error> = Box::new(WireError::DuplicateType("Foo"));
    assert!(error.to_string().contains("Foo"));
}

#[test]
fn test_errors_are_cloneable_and_debuggable() {
    let error = WireError::AmbiguousAutowire("dyn Logger");
    let cloned = error.clone();
    assert!(format!("{:?}", cloned).contains("AmbiguousAutowire"));
}
