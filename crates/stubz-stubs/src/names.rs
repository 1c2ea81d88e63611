//! Name helpers used when composing and indexing stubs.

/// Simple name of a possibly qualified, possibly generic class reference.
///
/// `java.util.Map<K, V>` gives `Map`; `Outer.Inner` gives `Inner`.
pub fn short_class_name(reference: &str) -> &str {
    let erased = match reference.find('<') {
        Some(lt) => &reference[..lt],
        None => reference,
    };
    let erased = erased.trim();
    match erased.rfind('.') {
        Some(dot) => &erased[dot + 1..],
        None => erased,
    }
}

/// Simple name of an annotation from its raw source text.
///
/// The reference path ends at the first `(`; `@a.b.Nullable(x = 1)` gives
/// `Nullable`.
pub fn annotation_short_name(text: &str) -> &str {
    let text = text.trim_start();
    let text = text.strip_prefix('@').unwrap_or(text);
    let path = match text.find('(') {
        Some(paren) => &text[..paren],
        None => text,
    };
    short_class_name(path)
}

/// Qualified name of a top-level class.
pub fn top_level_qualified_name(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

pub fn is_deprecated_annotation(reference: &str) -> bool {
    reference == "Deprecated" || reference == "java.lang.Deprecated"
}

/// True when a doc comment carries a `@deprecated` tag.
pub fn doc_comment_deprecates(doc: &str) -> bool {
    memchr::memmem::find(doc.as_bytes(), b"@deprecated").is_some()
}

#[cfg(test)]
#[path = "tests/names_tests.rs"]
mod names_tests;
