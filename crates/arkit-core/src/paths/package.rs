//! Package-relative paths.
//!
//! A package-relative path names an asset stored inside a package file,
//! `outer.pack[inner/file.usd]`. Packages nest, so `a.pack[b.pack[c.usd]]`
//! names `c.usd` inside `b.pack` inside `a.pack`. Square brackets that are
//! part of a component are escaped with a backslash.

const OPEN: char = '[';
const CLOSE: char = ']';
const ESCAPE: char = '\\';

/// Components of a well-formed package-relative path, outermost first.
fn components(path: &str) -> Option<Vec<String>> {
    if !path.ends_with(CLOSE) {
        return None;
    }
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(next @ (OPEN | CLOSE)) => current.push(next),
                Some(next) => {
                    current.push(ESCAPE);
                    current.push(next);
                }
                None => current.push(ESCAPE),
            },
            OPEN => parts.push(std::mem::take(&mut current)),
            CLOSE => {
                parts.push(std::mem::take(&mut current));
                let closers = chars.as_str();
                let nested = parts.len() - 1;
                let well_formed = closers.len() + 1 == nested
                    && closers.chars().all(|c| c == CLOSE)
                    && parts.iter().all(|part| !part.is_empty());
                return well_formed.then_some(parts);
            }
            other => current.push(other),
        }
    }
    None
}

/// Components of `path`, which is a single component unless it is a
/// well-formed package-relative path.
fn split_components(path: &str) -> Vec<String> {
    components(path).unwrap_or_else(|| vec![path.to_string()])
}

fn escape(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for c in component.chars() {
        if c == OPEN || c == CLOSE {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn render(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [single] => single.clone(),
        [outer, packaged @ ..] => {
            let mut path = escape(outer);
            for part in packaged {
                path.push(OPEN);
                path.push_str(&escape(part));
            }
            path.push_str(&CLOSE.to_string().repeat(packaged.len()));
            path
        }
    }
}

/// True if `path` names an asset inside a package.
pub fn is_package_relative_path(path: &str) -> bool {
    components(path).is_some()
}

/// Nest each path inside the one before it.
///
/// Empty entries are skipped. Entries that are themselves package-relative
/// contribute all of their components, so
/// `["a.pack[b.pack]", "c.usd"]` joins to `a.pack[b.pack[c.usd]]`.
pub fn join_package_relative_path<S: AsRef<str>>(paths: &[S]) -> String {
    let parts: Vec<String> = paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|path| !path.is_empty())
        .flat_map(split_components)
        .collect();
    render(&parts)
}

/// Split off the outermost package.
///
/// `a.pack[b.pack[c.usd]]` splits into `a.pack` and `b.pack[c.usd]`. A path
/// that is not package-relative comes back whole, with an empty second half.
pub fn split_package_relative_path_outer(path: &str) -> (String, String) {
    match components(path) {
        Some(parts) => (render(&parts[..1]), render(&parts[1..])),
        None => (path.to_string(), String::new()),
    }
}

/// Split off the innermost packaged path.
///
/// `a.pack[b.pack[c.usd]]` splits into `a.pack[b.pack]` and `c.usd`.
pub fn split_package_relative_path_inner(path: &str) -> (String, String) {
    match components(path) {
        Some(parts) => {
            let innermost = parts.len() - 1;
            (render(&parts[..innermost]), render(&parts[innermost..]))
        }
        None => (path.to_string(), String::new()),
    }
}
