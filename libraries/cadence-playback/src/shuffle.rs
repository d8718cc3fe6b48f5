//! Shuffle selection over a live catalog scan
//!
//! One pass, one pick: the k-th eligible candidate replaces the current pick
//! with probability 1/k, which leaves every eligible entry equally likely.

use crate::types::TrackRef;
use rand::Rng;
use std::collections::HashSet;
use std::path::PathBuf;

/// Pick one track uniformly among `candidates`
///
/// Entries named `current` or whose path is in `excluded` are never chosen.
/// Returns `None` when nothing is eligible.
pub fn pick<R, I>(
    rng: &mut R,
    candidates: I,
    current: &str,
    excluded: &HashSet<PathBuf>,
) -> Option<TrackRef>
where
    R: Rng,
    I: IntoIterator<Item = TrackRef>,
{
    let mut chosen = None;
    let mut seen: u32 = 0;

    for track in candidates {
        if track.name == current || excluded.contains(&track.path) {
            continue;
        }
        seen = seen.saturating_add(1);
        if rng.gen_ratio(1, seen) {
            chosen = Some(track);
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_tracks(names: &[&str]) -> Vec<TrackRef> {
        names
            .iter()
            .map(|n| TrackRef::new(*n, format!("music/{}.mp3", n)))
            .collect()
    }

    #[test]
    fn never_picks_current() {
        let mut rng = StdRng::seed_from_u64(7);
        let tracks = create_test_tracks(&["a", "b"]);
        for _ in 0..100 {
            let choice = pick(&mut rng, tracks.clone(), "a", &HashSet::new()).unwrap();
            assert_eq!(choice.name, "b");
        }
    }

    #[test]
    fn nothing_eligible() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(pick(&mut rng, create_test_tracks(&["a"]), "a", &HashSet::new()).is_none());
        assert!(pick(&mut rng, Vec::new(), "", &HashSet::new()).is_none());
    }

    #[test]
    fn excluded_paths_are_skipped() {
        let mut rng = StdRng::seed_from_u64(3);
        let tracks = create_test_tracks(&["a", "b", "c"]);
        let excluded: HashSet<PathBuf> = [PathBuf::from("music/b.mp3")].into_iter().collect();
        for _ in 0..100 {
            let choice = pick(&mut rng, tracks.clone(), "a", &excluded).unwrap();
            assert_eq!(choice.name, "c");
        }
    }

    #[test]
    fn selection_is_uniform() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let tracks = create_test_tracks(&["cur", "a", "b", "c", "d"]);
        let trials = 40_000;
        let mut counts = std::collections::HashMap::new();

        for _ in 0..trials {
            let choice = pick(&mut rng, tracks.clone(), "cur", &HashSet::new()).unwrap();
            *counts.entry(choice.name).or_insert(0u32) += 1;
        }

        assert_eq!(counts.len(), 4);
        let expected = f64::from(trials) / 4.0;
        for (name, count) in counts {
            let deviation = (f64::from(count) - expected).abs() / expected;
            assert!(deviation < 0.05, "{} picked {} times", name, count);
        }
    }
}
