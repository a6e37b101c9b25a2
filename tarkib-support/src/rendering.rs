//! Rendering helpers for resolution diagnostics.
//!
//! Type names coming from [`std::any::type_name`] are long
//! (`alloc::sync::Arc<dyn my_app::repo::BookRepository>`). These helpers
//! trim them down and lay them out for error messages.

/// Separator placed between the links of a rendered chain.
pub const CHAIN_ARROW: &str = " → ";

/// Strips module paths from every path segment of a type name.
///
/// ```
/// use tarkib_support::rendering::short_type_name;
///
/// assert_eq!(short_type_name("my_app::repo::BookRepository"), "BookRepository");
/// assert_eq!(
///     short_type_name("alloc::vec::Vec<alloc::sync::Arc<dyn my_app::Logger>>"),
///     "Vec<Arc<dyn Logger>>"
/// );
/// ```
pub fn short_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut ident_start = 0;

    for (idx, ch) in full_name.char_indices() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            continue;
        }
        out.push_str(last_segment(&full_name[ident_start..idx]));
        out.push(ch);
        ident_start = idx + ch.len_utf8();
    }
    out.push_str(last_segment(&full_name[ident_start..]));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Joins already-rendered names into a single arrow-separated line.
///
/// ```
/// use tarkib_support::rendering::render_chain;
///
/// assert_eq!(render_chain(&["Service", "Repo", "Service"]), "Service → Repo → Service");
/// ```
pub fn render_chain(links: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, link) in links.iter().enumerate() {
        if i > 0 {
            out.push_str(CHAIN_ARROW);
        }
        out.push_str(link.as_ref());
    }
    out
}

/// Picks the registered names closest to a requested one.
///
/// Names are compared by their shortened, lowercased form. A candidate
/// qualifies when one name contains the other or when their edit distance
/// is small relative to the requested name. Results are ordered from the
/// closest match, ties keep the input order.
pub fn closest_matches(requested: &str, available: &[&str], limit: usize) -> Vec<String> {
    let wanted = short_type_name(requested).to_lowercase();
    let tolerance = (wanted.chars().count() / 3).max(2);

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .filter(|name| **name != requested)
        .filter_map(|&name| {
            let candidate = short_type_name(name).to_lowercase();
            if candidate.contains(&wanted) || wanted.contains(&candidate) {
                return Some((0, name));
            }
            let distance = edit_distance(&wanted, &candidate);
            (distance <= tolerance).then_some((distance, name))
        })
        .collect();

    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Levenshtein distance over chars, single row.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(ca != *cb);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }
    row[b.len()]
}
