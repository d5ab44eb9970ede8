//! Helpers for the `/`-rooted logical paths used as index keys.

/// Collapse every run of `/` into a single separator
pub fn collapse_slashes(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_slash = false;
    for c in name.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    out
}

/// Lexically clean a path into rooted form.
///
/// Resolves `.` and `..`, drops empty components and always returns a path
/// starting with `/`. `..` at the root stays at the root.
pub fn clean(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Join `name` under `base` and clean the result
pub fn join(base: &str, name: &str) -> String {
    clean(&format!("{}/{}", base, name))
}

/// Archive entry name to index key: `"/" + name`, forward slashes,
/// cleaned into the rooted form lookups expect
pub fn from_entry_name(name: &str) -> String {
    clean(&name.replace('\\', "/"))
}

/// Last component of a rooted path; the root is its own base name
pub fn base_name(path: &str) -> &str {
    if path == "/" {
        return "/";
    }
    path.rsplit('/').next().unwrap_or(path)
}

/// Parent directory of a rooted path, `None` for the root
pub fn parent(path: &str) -> Option<&str> {
    if path == "/" || path.is_empty() {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(i) => Some(&path[..i]),
        None => Some("/"),
    }
}

/// Whether `candidate` sits directly inside `dir` (not deeper)
pub fn is_direct_child(dir: &str, candidate: &str) -> bool {
    let rest = if dir == "/" {
        candidate.strip_prefix('/')
    } else {
        candidate
            .strip_prefix(dir)
            .and_then(|rest| rest.strip_prefix('/'))
    };
    matches!(rest, Some(rest) if !rest.is_empty() && !rest.contains('/'))
}
