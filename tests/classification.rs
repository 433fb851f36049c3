use std::collections::BTreeSet;

use linicrypt::{
    classify, classify_all, AlgebraicRepresentation, CipherMode, ConstraintSystem, Matrix,
    Partition, PgvCompressionFunction, PgvParams,
};

/// PGV table indices of the schemes that resist collisions once iterated.
const RESISTANT_OVER_TWO_BLOCKS: [u8; 20] = [
    3, 6, 7, 11, 14, 15, 17, 19, 21, 23, 25, 27, 29, 31, 33, 37, 38, 41, 45, 46,
];

fn params(s: &str) -> PgvParams {
    s.parse().unwrap()
}

#[test]
fn test_classification_is_deterministic() {
    let first = classify_all(1, CipherMode::Permutation).unwrap();
    let second = classify_all(1, CipherMode::Permutation).unwrap();
    assert_eq!(first.len(), 64);
    assert_eq!(first, second);

    let order: Vec<PgvParams> = first.iter().map(|r| r.params).collect();
    assert_eq!(order, PgvParams::all().collect::<Vec<_>>());
}

#[test]
fn test_group_one_schemes_resist_collisions() {
    // Davies-Meyer, Matyas-Meyer-Oseas and Miyaguchi-Preneel.
    for scheme in ["100110", "011001", "111001"] {
        let report = classify(params(scheme), 1, CipherMode::Permutation).unwrap();
        assert!(report.collision_resistant, "{report}");
        assert!(report.linicrypt_is_secure);
    }
}

#[test]
fn test_constant_key_and_plaintext_collide() {
    let report = classify(params("000000"), 1, CipherMode::Permutation).unwrap();
    assert!(!report.collision_resistant);
    assert!(report.matches_syntactic_test());
}

#[test]
fn test_maximal_attacks_are_pairwise_uncomparable() {
    for report in classify_all(1, CipherMode::Permutation).unwrap() {
        for (i, a) in report.maximal_attacks.iter().enumerate() {
            for b in &report.maximal_attacks[i + 1..] {
                assert!(!a.is_finer(b) && !b.is_finer(a), "{a} and {b} for {}", report.params);
            }
        }
    }
}

#[test]
fn test_attack_search_stops_early() {
    let program = PgvCompressionFunction::new(params("000000"))
        .merkle_damgard(2)
        .unwrap();
    let first = program.list_collision_attacks().unwrap().next();
    assert!(matches!(first, Some(Ok(_))));
}

#[test]
fn test_manual_program() {
    // Two chained random oracle calls on inputs v0 and v1, output v3 + v4.
    let v = |values: &[u32]| Matrix::row_vector(values).unwrap();
    let cs = ConstraintSystem::from_repr(&[
        vec![v(&[1, 0, 0, 0, 0]), v(&[0, 0, 1, 0, 0])],
        vec![v(&[0, 0, 1, 0, 0]), v(&[0, 0, 0, 1, 0])],
        vec![v(&[0, 1, 0, 0, 0]), v(&[0, 0, 0, 0, 1])],
    ])
    .unwrap();
    let inputs = v(&[1, 0, 0, 0, 0]).vstack(&v(&[0, 1, 0, 0, 0]));
    let program = AlgebraicRepresentation::new(cs, inputs, v(&[0, 0, 0, 1, 1])).unwrap();
    assert!(program.constraint_system().is_solution_ordering(Some(program.fixing())).unwrap());

    // Feeding each execution's H(x) into the other's y swaps the two terms.
    assert!(!program.is_collision_resistant().unwrap());
    let swapped = Partition::new(vec![vec![0], vec![1, 5], vec![2, 4], vec![3]]);
    let found: Vec<Partition> = program
        .list_collision_attacks()
        .unwrap()
        .map(|attack| attack.unwrap().partition)
        .collect();
    assert!(found.contains(&swapped), "{found:?}");
}

#[test]
fn test_two_block_classification() {
    let reports = classify_all(2, CipherMode::Permutation).unwrap();
    assert_eq!(reports.len(), 64);
    assert!(reports.iter().all(|r| r.blocks == 2));

    let expected: BTreeSet<u8> = RESISTANT_OVER_TWO_BLOCKS.into_iter().collect();
    let resistant: BTreeSet<u8> = reports
        .iter()
        .filter(|r| r.collision_resistant)
        .map(|r| r.pgv_index)
        .collect();
    assert_eq!(resistant, expected);

    // Exactly the schemes Black, Rogaway and Shrimpton put in groups c, d and e.
    let brs: BTreeSet<u8> = reports
        .iter()
        .filter(|r| matches!(r.brs_category, 'c' | 'd' | 'e'))
        .map(|r| r.pgv_index)
        .collect();
    assert_eq!(brs, expected);

    let disagreements = reports.iter().filter(|r| !r.matches_syntactic_test()).count();
    assert_eq!(disagreements, 8);
    assert!(reports
        .iter()
        .filter(|r| r.linicrypt_is_secure)
        .all(|r| r.collision_resistant));
}

#[test]
fn test_fixed_point_classification_covers_family() {
    let reports = classify_all(1, CipherMode::FixedPoints).unwrap();
    assert_eq!(reports.len(), 64);
    let order: Vec<PgvParams> = reports.iter().map(|r| r.params).collect();
    assert_eq!(order, PgvParams::all().collect::<Vec<_>>());
    // Fixed points only add solutions, so constant schemes still collide.
    let constant = reports.iter().find(|r| r.params == params("000000")).unwrap();
    assert!(!constant.collision_resistant);
}
