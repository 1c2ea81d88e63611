use super::*;

#[test]
fn test_short_class_name_strips_package_and_generics() {
    assert_eq!(short_class_name("java.util.Map<K, V>"), "Map");
    assert_eq!(short_class_name("Outer.Inner"), "Inner");
    assert_eq!(short_class_name("Runnable"), "Runnable");
    assert_eq!(short_class_name("a.b.List<java.lang.String>"), "List");
}

#[test]
fn test_annotation_short_name_stops_at_argument_list() {
    assert_eq!(annotation_short_name("@Override"), "Override");
    assert_eq!(annotation_short_name("@a.b.Nullable(x = 1)"), "Nullable");
    assert_eq!(annotation_short_name("@SuppressWarnings(\"a.b\")"), "SuppressWarnings");
    assert_eq!(annotation_short_name("@ Foo ()"), "Foo");
}

#[test]
fn test_top_level_qualified_name() {
    assert_eq!(top_level_qualified_name("", "A"), "A");
    assert_eq!(top_level_qualified_name("a.b", "Outer"), "a.b.Outer");
}

#[test]
fn test_deprecation_markers() {
    assert!(is_deprecated_annotation("Deprecated"));
    assert!(is_deprecated_annotation("java.lang.Deprecated"));
    assert!(!is_deprecated_annotation("my.Deprecated"));
    assert!(doc_comment_deprecates("/** old\n * @deprecated use B */"));
    assert!(!doc_comment_deprecates("/** fine */"));
}
