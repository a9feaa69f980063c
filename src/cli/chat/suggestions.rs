use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const STARTERS: &[&str] = &[
    "My circuit isn't powering on. Where should I start?",
    "How do I test whether a capacitor has gone bad?",
    "Why does my voltage regulator get so hot?",
    "My LED strip flickers when the motor starts.",
    "How do I find a short circuit on a PCB?",
    "What does this resistor's color code mean?",
    "My Arduino keeps resetting at random.",
    "How can I tell if a MOSFET is blown?",
];

/// Pick `count` starter questions. The same seed always yields the same picks.
pub fn starter_suggestions(seed: u64, count: usize) -> Vec<&'static str> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut starters = STARTERS.to_vec();
    starters.shuffle(&mut rng);
    starters.truncate(count);
    starters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_suggestions() {
        assert_eq!(starter_suggestions(7, 3), starter_suggestions(7, 3));
    }

    #[test]
    fn suggestions_are_distinct_starters() {
        let picks = starter_suggestions(42, 3);
        assert_eq!(picks.len(), 3);
        assert!(picks.iter().all(|pick| STARTERS.contains(pick)));
        assert_ne!(picks[0], picks[1]);
        assert_ne!(picks[1], picks[2]);
    }

    #[test]
    fn count_is_capped_by_available_starters() {
        assert_eq!(starter_suggestions(1, 100).len(), STARTERS.len());
    }
}
