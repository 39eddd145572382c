//! Utilities for describing tie-breaking behavior in fork choice.

/// Breaks ties between candidates which rank equally, such as two tips whose
/// chains have the same length.
///
/// Candidates are always considered in the order in which their tips were
/// discovered, so both rules are deterministic.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TieBreaker {
    /// Keep the candidate discovered first.
    #[default]
    EarliestDiscovered,
    /// Keep the candidate discovered last. Matches a right-to-left fold which
    /// keeps the first maximum it encounters.
    LatestDiscovered,
}

impl TieBreaker {
    /// Returns the candidate with the greatest `key`, breaking ties according
    /// to this rule. Returns `None` if `candidates` is empty.
    pub fn choose<T, K, I, F>(&self, candidates: I, key: F) -> Option<T>
    where
        I: IntoIterator<Item = T>,
        K: Ord,
        F: Fn(&T) -> K,
    {
        let mut best: Option<(K, T)> = None;

        for candidate in candidates {
            let k = key(&candidate);
            let replace = match &best {
                None => true,
                Some((best_key, _)) => match self {
                    Self::EarliestDiscovered => k > *best_key,
                    Self::LatestDiscovered => k >= *best_key,
                },
            };

            if replace {
                best = Some((k, candidate));
            }
        }

        best.map(|(_, candidate)| candidate)
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Reverse;

    use super::TieBreaker;

    #[test]
    fn earliest_keeps_first_maximum() {
        let items = [("a", 2), ("b", 3), ("c", 3)];
        let best = TieBreaker::EarliestDiscovered.choose(items, |(_, n)| *n);

        assert_eq!(best, Some(("b", 3)));
    }

    #[test]
    fn latest_keeps_last_maximum() {
        let items = [("a", 2), ("b", 3), ("c", 3)];
        let best = TieBreaker::LatestDiscovered.choose(items, |(_, n)| *n);

        assert_eq!(best, Some(("c", 3)));
    }

    #[test]
    fn reversed_key_selects_minimum() {
        let items = [4, 1, 7, 1];
        let best = TieBreaker::default().choose(items, |n| Reverse(*n));

        assert_eq!(best, Some(1));
    }

    #[test]
    fn empty_input() {
        let items: Vec<u8> = vec![];
        assert_eq!(TieBreaker::default().choose(items, |n| *n), None);
    }
}
