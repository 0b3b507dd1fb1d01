/*!
 * Tiered path matching for collaborator responses.
 *
 * The selection collaborator names its choice by index, but the echoed path
 * it returns alongside may not reproduce the candidate byte-for-byte
 * (normalized separators, dropped directories, partial names). Matching is
 * an explicit, ordered strategy: exact path, then basename, then substring,
 * then path-token overlap.
 */

/// Find the best-matching candidate for a path echoed by the collaborator.
///
/// Returns the candidate index, or `None` when no strategy produces a match.
pub fn match_candidate(candidates: &[String], wanted: &str) -> Option<usize> {
    if candidates.is_empty() || wanted.is_empty() {
        return None;
    }

    // Exact path
    if let Some(idx) = candidates.iter().position(|c| c == wanted) {
        return Some(idx);
    }

    // Basename equality
    let wanted_base = basename(wanted);
    if let Some(idx) = candidates
        .iter()
        .position(|c| basename(c).eq_ignore_ascii_case(wanted_base))
    {
        return Some(idx);
    }

    // Substring containment in either direction
    if let Some(idx) = candidates
        .iter()
        .position(|c| c.contains(wanted) || wanted.contains(c.as_str()))
    {
        return Some(idx);
    }

    // Path-token overlap: most shared tokens wins, ties go to the first
    let wanted_tokens = tokens(wanted);
    let mut best: Option<(usize, usize)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let overlap = tokens(candidate)
            .iter()
            .filter(|t| wanted_tokens.contains(*t))
            .count();
        if overlap > 0 && best.map_or(true, |(_, score)| overlap > score) {
            best = Some((idx, overlap));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Final path component, separators normalized
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Lowercased path tokens split on separators and common delimiters
fn tokens(path: &str) -> Vec<String> {
    path.split(['/', '\\', '_', '-', '.', ' ', '【', '】'])
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
