//! Lexical URL path cleaning.

/// Returns the canonical URL path for `path`, eliminating `.` and `..`
/// elements.
///
/// The following rules are applied:
///  1. Multiple slashes are replaced by a single slash.
///  2. Each `.` path name element (the current directory) is eliminated.
///  3. Each inner `..` path name element (the parent directory) is eliminated,
///     along with the non-`..` element that precedes it.
///  4. `..` elements that begin a rooted path are eliminated, that is,
///     `/..` becomes `/` at the beginning of a path.
///
/// A missing leading slash is added, and a trailing slash is kept (a final
/// `.` element counts as one). An empty path becomes `/`.
///
/// ```rust
/// use trie_router::path::clean;
///
/// assert_eq!(clean("/abc/def/../ghi//jkl/"), "/abc/ghi/jkl/");
/// assert_eq!(clean("abc/./.."), "/");
/// ```
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }

    let mut trailing = path.len() > 1 && path.ends_with('/');
    let mut elements: Vec<&str> = Vec::new();

    let mut iter = path.split('/').peekable();
    while let Some(element) = iter.next() {
        match element {
            "" => {}
            "." => {
                if iter.peek().is_none() {
                    trailing = true;
                }
            }
            ".." => {
                elements.pop();
            }
            element => elements.push(element),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for element in &elements {
        cleaned.push('/');
        cleaned.push_str(element);
    }

    if cleaned.is_empty() || trailing {
        cleaned.push('/');
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::clean;

    // path, result
    const CLEAN_TESTS: &[(&str, &str)] = &[
        // already clean
        ("/", "/"),
        ("/abc", "/abc"),
        ("/a/b/c", "/a/b/c"),
        ("/abc/", "/abc/"),
        ("/a/b/c/", "/a/b/c/"),
        // missing root
        ("", "/"),
        ("a/", "/a/"),
        ("abc", "/abc"),
        ("abc/def", "/abc/def"),
        ("a/b/c", "/a/b/c"),
        // remove doubled slash
        ("//", "/"),
        ("/abc//", "/abc/"),
        ("/abc/def//", "/abc/def/"),
        ("/a/b/c//", "/a/b/c/"),
        ("/abc//def//ghi", "/abc/def/ghi"),
        ("//abc", "/abc"),
        ("///abc", "/abc"),
        ("//abc//", "/abc/"),
        // remove . elements
        (".", "/"),
        ("./", "/"),
        ("/abc/./def", "/abc/def"),
        ("/./abc/def", "/abc/def"),
        ("/abc/.", "/abc/"),
        // remove .. elements
        ("..", "/"),
        ("../", "/"),
        ("../../", "/"),
        ("../..", "/"),
        ("../../abc", "/abc"),
        ("/abc/def/ghi/../jkl", "/abc/def/jkl"),
        ("/abc/def/../ghi/../jkl", "/abc/jkl"),
        ("/abc/def/..", "/abc"),
        ("/abc/def/../..", "/"),
        ("/abc/def/../../..", "/"),
        ("/abc/def/../../../ghi/jkl/../../../mno", "/mno"),
        // combinations
        ("abc/./../def", "/def"),
        ("abc//./../def", "/def"),
        ("abc/../../././../def", "/def"),
    ];

    #[test]
    fn cleans_paths() {
        for (path, expected) in CLEAN_TESTS {
            assert_eq!(clean(path), *expected, "clean({:?})", path);
            // cleaning is idempotent
            assert_eq!(clean(expected), *expected, "clean({:?})", expected);
        }
    }

    #[test]
    fn cleans_long_paths() {
        for i in 1..256 {
            let element = "a".repeat(i);
            let correct = format!("/{}", element);

            assert_eq!(clean(&correct), correct);
            assert_eq!(clean(&element), correct);
            assert_eq!(clean(&format!("//{}", element)), correct);
            assert_eq!(clean(&format!("//{}/b/..", element)), correct);
        }
    }
}
