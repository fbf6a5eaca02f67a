//! Test RNG serialization/deserialization fidelity
//!
//! A saved `SeededRng` must resume exactly where it stopped, and streams
//! must depend only on their seed strings.

use auto_duel::rng::SeededRng;

#[test]
fn test_rng_serialize_deserialize_fidelity() {
    let mut rng1 = SeededRng::new("fidelity");

    // Advance the stream before saving it
    for _ in 0..10 {
        rng1.next_float();
    }

    let json = serde_json::to_string(&rng1).expect("Failed to serialize RNG");
    let mut rng2: SeededRng = serde_json::from_str(&json).expect("Failed to deserialize RNG");

    for i in 0..100 {
        let val1 = rng1.next_float().to_bits();
        let val2 = rng2.next_float().to_bits();
        assert_eq!(val1, val2, "RNG divergence at iteration {}", i);
    }
}

#[test]
fn test_rng_serialize_deserialize_with_choices() {
    let mut rng1 = SeededRng::new("choices");
    let _before: Vec<usize> = (0..5).map(|_| rng1.next_index(10)).collect();

    let json = serde_json::to_string(&rng1).expect("Failed to serialize");
    let mut rng2: SeededRng = serde_json::from_str(&json).expect("Failed to deserialize");

    let after1: Vec<usize> = (0..10).map(|_| rng1.next_index(10)).collect();
    let after2: Vec<usize> = (0..10).map(|_| rng2.next_index(10)).collect();
    assert_eq!(after1, after2);

    let mut deck1: Vec<u32> = (0..20).collect();
    let mut deck2 = deck1.clone();
    rng1.shuffle(&mut deck1);
    rng2.shuffle(&mut deck2);
    assert_eq!(deck1, deck2);
}

#[test]
fn test_phase_streams_depend_only_on_inputs() {
    let mut a = SeededRng::for_phase("game-7", 4, "battle");
    let mut b = SeededRng::for_phase("game-7", 4, "battle");
    let mut other_turn = SeededRng::for_phase("game-7", 5, "battle");

    let seq_a: Vec<usize> = (0..16).map(|_| a.next_index(1_000_000)).collect();
    let seq_b: Vec<usize> = (0..16).map(|_| b.next_index(1_000_000)).collect();
    let seq_other: Vec<usize> = (0..16).map(|_| other_turn.next_index(1_000_000)).collect();

    assert_eq!(seq_a, seq_b);
    assert_ne!(seq_a, seq_other);
}
