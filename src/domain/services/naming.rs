//! Clone naming within an owner's library

/// Names to apply when cloning `original` next to its siblings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneNames {
    /// New name for the original, when it has to be renamed
    pub original: Option<String>,
    pub clone: String,
}

/// Resolve the names for a clone of `original`.
///
/// The clone is normally called "{name} (Copy)". When a sibling already
/// carries that name, the family is numbered instead: the original becomes
/// "{name} (1)" (unless it already has a number) and the clone takes the
/// next free number.
pub fn resolve_clone_names<'a>(original: &str, siblings: impl IntoIterator<Item = &'a str>) -> CloneNames {
    let siblings: Vec<&str> = siblings.into_iter().collect();
    let base = strip_number(original);
    let copy_name = format!("{} (Copy)", base);
    if !siblings.contains(&copy_name.as_str()) {
        return CloneNames {
            original: None,
            clone: copy_name,
        };
    }

    let renamed = if number_of(original, base).is_some() {
        None
    } else {
        Some(format!("{} (1)", base))
    };
    let highest = siblings
        .iter()
        .copied()
        .chain(std::iter::once(original))
        .filter_map(|name| number_of(name, base))
        .max()
        .unwrap_or(0)
        .max(1);

    CloneNames {
        original: renamed,
        clone: format!("{} ({})", base, highest + 1),
    }
}

/// Name without a trailing " (n)"
fn strip_number(name: &str) -> &str {
    match name.rsplit_once(" (") {
        Some((base, rest)) if parse_suffix(rest).is_some() => base,
        _ => name,
    }
}

fn number_of(name: &str, base: &str) -> Option<u32> {
    let rest = name.strip_prefix(base)?.strip_prefix(" (")?;
    parse_suffix(rest)
}

fn parse_suffix(rest: &str) -> Option<u32> {
    rest.strip_suffix(')')?.parse().ok()
}
