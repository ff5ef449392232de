// tests/property_tests.rs
use corr_db::reduce::{block_samples, tsrc_count, DuplicateResolver};
use corr_db::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Canonically ordered, duplicate-free samples with pairwise different values.
fn sorted_samples() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::btree_set((0u8..3, 0u32..40, 0u32..4), 1..80).prop_map(|ids| {
        ids.into_iter()
            .enumerate()
            .map(|(idx, (series, traj, tsrc))| Sample {
                id: ConfigurationId::new((b'a' + series) as char, traj, tsrc),
                values: vec![idx as f64 + 1.0, -(idx as f64) * 0.5],
            })
            .collect()
    })
}

/// Every trajectory of every series carries exactly `sources` time sources.
fn complete_samples() -> impl Strategy<Value = (Vec<Sample>, usize)> {
    (prop::collection::btree_set((0u8..2, 0u32..30), 1..30), 1usize..4).prop_map(|(trajs, sources)| {
        let mut samples = Vec::new();
        for (series, traj) in trajs {
            for tsrc in 0..sources as u32 {
                let idx = samples.len();
                samples.push(Sample {
                    id: ConfigurationId::new((b'a' + series) as char, traj, tsrc),
                    values: vec![idx as f64, 1.0 / (idx as f64 + 1.0)],
                });
            }
        }
        (samples, sources)
    })
}

/// Trajectories that nominally carry `sources` time sources, some of which
/// lost a random subset of them.
fn gapped_samples() -> impl Strategy<Value = (Vec<Sample>, usize)> {
    (2usize..5)
        .prop_flat_map(|sources| {
            let full = (1u8 << sources) - 1;
            (
                Just(sources),
                prop::collection::btree_map((0u8..2, 0u32..30), prop_oneof![3 => Just(full), 1 => 1u8..full], 1..30),
            )
        })
        .prop_map(|(sources, trajs)| {
            let mut samples = Vec::new();
            for ((series, traj), mask) in trajs {
                for tsrc in (0..sources as u32).filter(|t| mask & (1 << t) != 0) {
                    let idx = samples.len();
                    samples.push(Sample {
                        id: ConfigurationId::new((b'a' + series) as char, traj, tsrc * 8),
                        values: vec![idx as f64 + 0.5, idx as f64 * idx as f64],
                    });
                }
            }
            (samples, sources)
        })
}

/// Block ids expected when only complete trajectories are kept and grouped
/// `block_size` at a time within each series.
fn expected_block_ids(samples: &[Sample], sources: usize, block_size: usize) -> Vec<String> {
    let mut trajectories: Vec<(char, Vec<String>)> = Vec::new();
    for sample in samples {
        let label = sample.id.trajectory_label();
        match trajectories.last_mut() {
            Some((_, ids)) if ids[0].starts_with(&label) => ids.push(sample.id.to_string()),
            _ => trajectories.push((sample.id.series, vec![sample.id.to_string()])),
        }
    }

    let mut expected = Vec::new();
    let mut series_start = 0;
    while series_start < trajectories.len() {
        let series = trajectories[series_start].0;
        let series_end = trajectories[series_start..]
            .iter()
            .position(|(s, _)| *s != series)
            .map_or(trajectories.len(), |offset| series_start + offset);
        let complete: Vec<&Vec<String>> = trajectories[series_start..series_end]
            .iter()
            .map(|(_, ids)| ids)
            .filter(|ids| ids.len() == sources)
            .collect();
        for chunk in complete.chunks_exact(block_size) {
            expected.push(
                chunk
                    .iter()
                    .flat_map(|ids| ids.iter().cloned())
                    .collect::<Vec<_>>()
                    .join(Block::ID_SEPARATOR),
            );
        }
        series_start = series_end;
    }
    expected
}

proptest! {
    #[test]
    fn prop_unit_blocking_is_identity(samples in sorted_samples()) {
        let tsrc = tsrc_count(&samples);
        let blocks = block_samples(&samples, tsrc, 1).unwrap();
        prop_assert_eq!(blocks.len(), samples.len());
        for (block, sample) in blocks.iter().zip(&samples) {
            prop_assert_eq!(&block.id, &sample.id.to_string());
            prop_assert_eq!(&block.values, &sample.values);
        }
    }

    #[test]
    fn prop_blocks_are_full_and_within_one_series(samples in sorted_samples(), group in 1usize..6) {
        let tsrc = tsrc_count(&samples);
        let blocks = block_samples(&samples, tsrc, group).unwrap();
        for block in &blocks {
            prop_assert_eq!(block.size(), group);
            let series: BTreeSet<char> = block
                .id
                .split(Block::ID_SEPARATOR)
                .map(|id| ConfigurationId::from_string(id).unwrap().series)
                .collect();
            prop_assert_eq!(series.len(), 1);
        }
    }

    #[test]
    fn prop_tsrc_averaging_keeps_trajectories_whole((samples, sources) in complete_samples(), block_size in 1usize..4) {
        let group = BlockingOptions::new(block_size, true).group_size(sources).unwrap();
        let blocks = block_samples(&samples, sources, group).unwrap();
        for block in &blocks {
            let mut per_trajectory: BTreeMap<String, usize> = BTreeMap::new();
            for id in block.id.split(Block::ID_SEPARATOR) {
                let id = ConfigurationId::from_string(id).unwrap();
                *per_trajectory.entry(id.trajectory_label()).or_default() += 1;
            }
            prop_assert_eq!(per_trajectory.len(), block_size);
            prop_assert!(per_trajectory.values().all(|&n| n == sources));
        }
    }

    #[test]
    fn prop_tsrc_count_of_complete_data((samples, sources) in complete_samples()) {
        let resolved = DuplicateResolver::default().resolve(samples).unwrap();
        prop_assert_eq!(resolved.tsrc_count, sources);
    }

    #[test]
    fn prop_exact_repeats_keep_one_copy(samples in sorted_samples(), repeats in 1usize..3) {
        let mut input = Vec::new();
        for sample in &samples {
            for _ in 0..=repeats {
                input.push(sample.clone());
            }
        }
        let resolved = DuplicateResolver::default().resolve(input).unwrap();
        prop_assert_eq!(&resolved.samples, &samples);
        prop_assert_eq!(resolved.diagnostics.len(), samples.len() * repeats * (repeats + 1) / 2);
    }

    #[test]
    fn prop_incomplete_trajectories_never_reach_a_block((samples, sources) in gapped_samples(), block_size in 1usize..4) {
        let group = BlockingOptions::new(block_size, true).group_size(sources).unwrap();
        let blocks = block_samples(&samples, sources, group).unwrap();

        for block in &blocks {
            let mut per_trajectory: BTreeMap<String, usize> = BTreeMap::new();
            for id in block.id.split(Block::ID_SEPARATOR) {
                let id = ConfigurationId::from_string(id).unwrap();
                *per_trajectory.entry(id.trajectory_label()).or_default() += 1;
            }
            prop_assert_eq!(per_trajectory.len(), block_size);
            prop_assert!(per_trajectory.values().all(|&n| n == sources));
        }

        let ids: Vec<String> = blocks.iter().map(|b| b.id.clone()).collect();
        prop_assert_eq!(ids, expected_block_ids(&samples, sources, block_size));
    }

    #[test]
    fn prop_non_transitive_chain_loses_the_configuration(
        samples in sorted_samples(),
        pick in any::<prop::sample::Index>(),
        step in 0.6f64..0.9,
    ) {
        let tolerance = DuplicateResolver::DEFAULT_TOLERANCE;
        let d = step * tolerance;
        let target = pick.index(samples.len());

        let mut input = Vec::new();
        for (idx, sample) in samples.iter().enumerate() {
            input.push(sample.clone());
            if idx == target {
                for k in [1.0, 2.0] {
                    let values = sample.values.iter().map(|v| v * (1.0 + k * d)).collect();
                    input.push(Sample { id: sample.id, values });
                }
            }
        }

        let expected: Vec<Sample> = samples
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != target)
            .map(|(_, s)| s.clone())
            .collect();

        match DuplicateResolver::default().resolve(input) {
            Ok(resolved) => {
                prop_assert_eq!(&resolved.samples, &expected);
                prop_assert_eq!(resolved.diagnostics.len(), 3);
            }
            Err(CorrDbError::NoConfigurationsFound(_)) => prop_assert!(expected.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}
