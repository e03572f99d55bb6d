//! Property-based tests for the album and time frames

use proptest::prelude::*;
use rewind_core::{ContainsMode, Moment, MomentAlbum, Time, TimeFrame};

#[derive(Debug, Clone)]
struct Stamp(Time);

impl Moment for Stamp {
    type Target = ();

    fn time(&self) -> Time {
        self.0
    }

    fn apply(&self, _target: &mut ()) {}

    fn undo(&self, _target: &mut ()) {}
}

// Times on a coarse grid so duplicates and exact boundary hits are common
prop_compose! {
    fn arb_time()(step in 0u32..40) -> Time {
        step as Time * 0.25
    }
}

fn album_from(times: &[Time]) -> MomentAlbum<Stamp> {
    let mut album = MomentAlbum::new();
    for time in times {
        album.add_moment(Stamp(*time));
    }
    album
}

fn is_sorted(album: &MomentAlbum<Stamp>) -> bool {
    album.moments().windows(2).all(|w| w[0].0 <= w[1].0)
}

proptest! {
    #[test]
    fn insertion_keeps_album_sorted(times in prop::collection::vec(arb_time(), 0..64)) {
        let album = album_from(&times);
        prop_assert_eq!(album.len(), times.len());
        prop_assert!(is_sorted(&album));

        let mut expected = times.clone();
        expected.sort_by(|a, b| a.total_cmp(b));
        let actual: Vec<Time> = album.moments().iter().map(|m| m.0).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn binary_search_contract(times in prop::collection::vec(arb_time(), 0..64), query in arb_time()) {
        let album = album_from(&times);
        match album.binary_search(query) {
            Ok(index) => prop_assert_eq!(album.moments()[index].0, query),
            Err(index) => {
                prop_assert!(index <= album.len());
                prop_assert!(album.moments()[..index].iter().all(|m| m.0 < query));
                prop_assert!(album.moments()[index..].iter().all(|m| m.0 > query));
            }
        }
    }

    #[test]
    fn remove_after_partitions_album(times in prop::collection::vec(arb_time(), 0..64), cut in arb_time()) {
        let mut album = album_from(&times);
        let before = album.len();
        let removed = album.remove_moments_after(cut);

        prop_assert_eq!(before, removed + album.len());
        prop_assert!(album.iter().all(|m| m.0 <= cut));
        prop_assert_eq!(removed, times.iter().filter(|t| **t > cut).count());
    }

    #[test]
    fn moment_before_or_at_is_greatest_not_after(times in prop::collection::vec(arb_time(), 0..64), query in arb_time()) {
        let album = album_from(&times);
        let expected = times.iter().copied().filter(|t| *t <= query).reduce(Time::max);
        prop_assert_eq!(album.moment_before_or_at(query).map(|m| m.0), expected);
    }

    #[test]
    fn get_matches_filter(times in prop::collection::vec(arb_time(), 0..64), lower in arb_time(), upper in arb_time()) {
        let album = album_from(&times);
        let got: Vec<Time> = album.get(lower, upper).iter().map(|m| m.0).collect();

        let mut expected: Vec<Time> = times
            .iter()
            .copied()
            .filter(|t| *t >= lower && *t < upper)
            .collect();
        expected.sort_by(|a, b| a.total_cmp(b));
        if lower == upper {
            // Unbounded above, cut to the first time at or after `lower`
            let first = times.iter().copied().filter(|t| *t >= lower).reduce(Time::min);
            expected = times.iter().copied().filter(|t| Some(*t) == first).collect();
        }
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn contains_time_truth_tables(start in arb_time(), len in 0u32..8, t in arb_time()) {
        let end = start + len as Time * 0.25;
        let frame = TimeFrame::new(start, end);

        prop_assert_eq!(frame.contains_time(t, ContainsMode::Inclusive), start <= t && t <= end);
        prop_assert_eq!(frame.contains_time(t, ContainsMode::Exclusive), start < t && t < end);
        prop_assert_eq!(frame.contains_time(t, ContainsMode::StartExclusive), start < t && t <= end);
        prop_assert_eq!(frame.contains_time(t, ContainsMode::EndExclusive), start <= t && t < end);
    }

    #[test]
    fn overlap_is_symmetric(a in arb_time(), b in arb_time(), c in arb_time(), d in arb_time()) {
        let x = TimeFrame::new(a.min(b), a.max(b));
        let y = TimeFrame::new(c.min(d), c.max(d));
        prop_assert_eq!(x.has_overlap(&y), y.has_overlap(&x));
    }
}
