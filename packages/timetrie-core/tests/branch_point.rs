use timetrie_core::{
    branch_point, BranchPoint, DigestTrie, DigitWidth, Error, Murmur3, Replica, TrieConfig,
};

/// 2021-08-05T00:00:00Z
const BASE: u64 = 1_628_121_600_000;
const HOUR: u64 = 3_600_000;

fn build(config: &TrieConfig, records: &[(&str, u64)]) -> DigestTrie {
    let mut trie = DigestTrie::new(config.clone()).unwrap();
    for &(id, ts) in records {
        trie.insert(id, ts).unwrap();
    }
    trie
}

fn hourly_scenario(config: &TrieConfig) -> (DigestTrie, DigestTrie) {
    let a = build(
        config,
        &[
            ("0", BASE),
            ("1", BASE + HOUR),
            ("2", BASE + 2 * HOUR),
            ("3", BASE + 3 * HOUR),
        ],
    );
    let b = build(config, &[("0", BASE), ("4", BASE + 4 * HOUR)]);
    (a, b)
}

#[test]
fn hourly_records_diverge_at_first_missing_hour() {
    let (a, b) = hourly_scenario(&TrieConfig::default());

    let outcome = branch_point(&a, &b).unwrap();
    assert_eq!(outcome.timestamp(), Some(BASE + HOUR));
    assert_eq!(
        outcome,
        BranchPoint::OneReplicaAheadAt {
            timestamp: BASE + HOUR,
            replica: Replica::Left,
        }
    );

    assert_eq!(branch_point(&b, &a).unwrap(), outcome.swapped());
}

#[test]
fn hourly_records_with_natural_paths() {
    let config = TrieConfig::default().with_digit_width(DigitWidth::Natural);
    let (a, b) = hourly_scenario(&config);
    assert_eq!(a.branch_point(&b).unwrap().timestamp(), Some(BASE + HOUR));
}

#[test]
fn empty_tries_agree() {
    let a = build(&TrieConfig::default(), &[]);
    let b = build(&TrieConfig::default(), &[]);
    assert_eq!(branch_point(&a, &b).unwrap(), BranchPoint::NoDivergence);
    assert_eq!(branch_point(&a, &b).unwrap().timestamp(), None);
}

#[test]
fn trie_agrees_with_itself() {
    let (a, _) = hourly_scenario(&TrieConfig::default());
    assert_eq!(branch_point(&a, &a).unwrap(), BranchPoint::NoDivergence);
}

#[test]
fn same_records_in_another_order_agree() {
    let records = [
        ("x", BASE + 5 * HOUR),
        ("y", BASE),
        ("z", BASE + 90_000),
        ("w", BASE + 90_000),
    ];
    let mut reversed = records;
    reversed.reverse();

    let config = TrieConfig::default();
    let a = build(&config, &records);
    let b = build(&config, &reversed);
    assert_eq!(branch_point(&a, &b).unwrap(), BranchPoint::NoDivergence);
}

#[test]
fn empty_replica_is_behind_from_the_first_record() {
    let config = TrieConfig::default();
    let full = build(&config, &[("late", BASE + 3 * HOUR), ("early", BASE + 61_000)]);
    let empty = build(&config, &[]);

    assert_eq!(
        branch_point(&empty, &full).unwrap(),
        BranchPoint::OneReplicaAheadAt {
            timestamp: BASE + 60_000,
            replica: Replica::Right,
        }
    );
}

#[test]
fn differing_records_in_a_shared_slot() {
    let config = TrieConfig::default();
    let a = build(&config, &[("a", BASE), ("b", BASE + HOUR + 10)]);
    let b = build(&config, &[("a", BASE), ("c", BASE + HOUR + 20)]);

    assert_eq!(
        branch_point(&a, &b).unwrap(),
        BranchPoint::DivergesAt {
            timestamp: BASE + HOUR,
        }
    );
}

#[test]
fn divergence_reports_slot_start_not_record_time() {
    let config = TrieConfig::default();
    let a = build(&config, &[("a", BASE + 45_123)]);
    let b = build(&config, &[]);
    assert_eq!(branch_point(&a, &b).unwrap().timestamp(), Some(BASE));
}

#[test]
fn earliest_of_several_differences_wins() {
    let config = TrieConfig::default();
    let common = [("c1", BASE), ("c2", BASE + 7 * HOUR)];
    let mut left = common.to_vec();
    left.extend([("l1", BASE + 5 * HOUR), ("l2", BASE + 2 * HOUR)]);
    let mut right = common.to_vec();
    right.push(("r1", BASE + 3 * HOUR));

    let a = build(&config, &left);
    let b = build(&config, &right);
    assert_eq!(
        branch_point(&a, &b).unwrap(),
        BranchPoint::OneReplicaAheadAt {
            timestamp: BASE + 2 * HOUR,
            replica: Replica::Left,
        }
    );
}

#[test]
fn padded_paths_order_across_decimal_boundaries() {
    // Slots 5 and 10: unpadded paths are [5] and [1, 0], so digit order no longer follows time.
    let padded = TrieConfig::default().with_slot_width_millis(1);
    let a = build(&padded, &[("a", 5)]);
    let b = build(&padded, &[("b", 10)]);
    assert_eq!(
        branch_point(&a, &b).unwrap(),
        BranchPoint::OneReplicaAheadAt {
            timestamp: 5,
            replica: Replica::Left,
        }
    );

    let natural = padded.with_digit_width(DigitWidth::Natural);
    let a = build(&natural, &[("a", 5)]);
    let b = build(&natural, &[("b", 10)]);
    assert_eq!(
        branch_point(&a, &b).unwrap(),
        BranchPoint::OneReplicaAheadAt {
            timestamp: 10,
            replica: Replica::Right,
        }
    );
}

#[test]
fn digest_collisions_go_unnoticed() {
    let config = TrieConfig::default();
    let constant = |_: &[u8]| 7u32;
    let mut a = DigestTrie::with_digest(config.clone(), constant).unwrap();
    let mut b = DigestTrie::with_digest(config, constant).unwrap();

    a.insert("one", BASE).unwrap();
    b.insert("two", BASE).unwrap();
    assert_eq!(branch_point(&a, &b).unwrap(), BranchPoint::NoDivergence);
}

#[test]
fn mismatched_configurations_are_rejected() {
    let a = build(&TrieConfig::default(), &[("a", BASE)]);
    let b = build(
        &TrieConfig::default().with_slot_width_millis(1_000),
        &[("a", BASE)],
    );
    assert!(matches!(branch_point(&a, &b), Err(Error::Config(_))));

    let c = build(&TrieConfig::default().with_seed(1), &[("a", BASE)]);
    assert!(matches!(branch_point(&a, &c), Err(Error::Config(_))));
}

#[test]
fn divergence_in_the_first_slot_is_not_agreement() {
    for width in [DigitWidth::Padded, DigitWidth::Natural] {
        let config = TrieConfig::default().with_digit_width(width);
        let a = build(&config, &[("x", 10)]);
        let b = build(&config, &[]);

        assert_eq!(
            branch_point(&a, &b).unwrap(),
            BranchPoint::OneReplicaAheadAt {
                timestamp: 0,
                replica: Replica::Left,
            },
            "{width:?}"
        );

        let c = build(&config, &[("y", 59_999)]);
        assert_eq!(
            branch_point(&a, &c).unwrap(),
            BranchPoint::DivergesAt { timestamp: 0 },
            "{width:?}"
        );
    }
}

#[test]
fn seeded_digest_must_match_configured_seed() {
    let err = DigestTrie::with_digest(TrieConfig::default(), Murmur3::with_seed(5)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let mut seeded =
        DigestTrie::with_digest(TrieConfig::default().with_seed(5), Murmur3::with_seed(5))
            .unwrap();
    let mut unseeded = DigestTrie::new(TrieConfig::default()).unwrap();
    seeded.insert("x", BASE).unwrap();
    unseeded.insert("x", BASE).unwrap();
    assert!(matches!(
        branch_point(&seeded, &unseeded),
        Err(Error::Config(_))
    ));
}
