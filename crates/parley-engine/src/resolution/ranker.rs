use super::candidate::Candidate;

/// Pick the working container among candidates.
///
/// Exact matches win over loose ones. Within the chosen group a reply target
/// takes the deepest container and a top-level target the shallowest, so a
/// nested reply is never picked when its parent comment was requested.
/// Equal depths keep document order.
pub fn rank(candidates: Vec<Candidate>, is_nested_target: bool) -> Option<Candidate> {
    let (exact, loose): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|c| c.is_exact_match);

    let mut pool = if exact.is_empty() { loose } else { exact };

    if is_nested_target {
        pool.sort_by(|a, b| b.nesting_depth.cmp(&a.nesting_depth));
    } else {
        pool.sort_by_key(|c| c.nesting_depth);
    }

    pool.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_common::protocol::ElementHandle;

    fn candidate(id: u32, exact: bool, depth: usize) -> Candidate {
        Candidate {
            container: ElementHandle(id),
            is_exact_match: exact,
            nesting_depth: depth,
        }
    }

    #[test]
    fn exact_match_wins_regardless_of_depth() {
        let picked = rank(vec![candidate(1, false, 2), candidate(2, true, 9)], false).unwrap();
        assert_eq!(picked.container, ElementHandle(2));

        let picked = rank(vec![candidate(1, false, 9), candidate(2, true, 2)], true).unwrap();
        assert_eq!(picked.container, ElementHandle(2));
    }

    #[test]
    fn depth_tie_break_depends_on_mode() {
        let both = || vec![candidate(1, true, 2), candidate(2, true, 5)];
        assert_eq!(rank(both(), true).unwrap().container, ElementHandle(2));
        assert_eq!(rank(both(), false).unwrap().container, ElementHandle(1));
    }

    #[test]
    fn falls_back_to_loose_matches() {
        let picked = rank(vec![candidate(1, false, 4), candidate(2, false, 3)], false).unwrap();
        assert_eq!(picked.container, ElementHandle(2));
    }

    #[test]
    fn equal_depth_keeps_document_order() {
        let picked = rank(vec![candidate(3, true, 4), candidate(1, true, 4)], true).unwrap();
        assert_eq!(picked.container, ElementHandle(3));
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(rank(Vec::new(), true).is_none());
    }
}
