#[cfg(test)]
mod tests {
    use crate::partition::canonicalize;
    use crate::{
        modularity, partition_distance, Adjacency, CommunityDetection, Consensus, FineTuner,
        GraphKind, Louvain, Modularity, ProbabilisticTuner, Result,
    };
    use ndarray::Array2;

    fn complete(n: usize, w: f64) -> Adjacency {
        let mut m = Array2::from_elem((n, n), w);
        for i in 0..n {
            m[(i, i)] = 0.0;
        }
        Adjacency::new(m).unwrap()
    }

    /// Three 5-node modules with light, deterministic cross-talk.
    fn modular_network() -> Adjacency {
        let n = 15;
        let mut w = Array2::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let weight = if i / 5 == j / 5 {
                    0.6 + 0.1 * ((i + j) % 4) as f64
                } else if (i * 7 + j * 3) % 11 == 0 {
                    0.15
                } else {
                    0.0
                };
                w[(i, j)] = weight;
                w[(j, i)] = weight;
            }
        }
        Adjacency::new(w).unwrap()
    }

    #[test]
    fn empty_graph_gives_singletons() -> Result<()> {
        let adj = Adjacency::new(Array2::zeros((3, 3)))?;
        let result = Louvain::new().with_seed(0).detect(&adj)?;
        assert_eq!(result.partition, vec![0, 1, 2]);
        assert_eq!(result.quality, 0.0);
        Ok(())
    }

    #[test]
    fn complete_graph_is_one_community() -> Result<()> {
        for n in [2, 3, 5, 8] {
            let adj = complete(n, 0.7);
            let result = Louvain::new().with_seed(n as u64).detect(&adj)?;
            assert_eq!(result.partition, vec![0; n]);
            assert!(result.quality.abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn identical_partitions_have_zero_distance() -> Result<()> {
        let d = partition_distance(&[1, 1, 2], &[1, 1, 2])?;
        assert_eq!(d.vi, 0.0);
        assert_eq!(d.nmi, 1.0);
        Ok(())
    }

    #[test]
    fn merged_and_separated_partitions_differ() -> Result<()> {
        let d = partition_distance(&[1, 1, 1], &[1, 2, 3])?;
        assert!(d.vi > 0.0);
        assert!(d.nmi < 1.0);
        Ok(())
    }

    #[test]
    fn probabilistic_without_exploration_is_finetune() -> Result<()> {
        let adj = modular_network();
        let start: Vec<usize> = (0..15).map(|i| i % 4).collect();
        for seed in [3, 31, 314] {
            let fine = FineTuner::new().with_seed(seed).tune(&adj, Some(&start))?;
            let prob = ProbabilisticTuner::new(0.0)
                .with_seed(seed)
                .tune(&adj, Some(&start))?;
            assert_eq!(fine, prob);
        }
        Ok(())
    }

    #[test]
    fn louvain_recovers_modules() -> Result<()> {
        let adj = modular_network();
        let expected: Vec<usize> = (0..15).map(|i| i / 5).collect();
        let result = Louvain::new().with_seed(2024).detect(&adj)?;
        assert_eq!(result.partition, expected);
        assert!((modularity(&adj, &expected)? - result.quality).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn louvain_is_reproducible() -> Result<()> {
        let adj = modular_network();
        for seed in 0..5 {
            let a = Louvain::new().with_seed(seed).with_resolution(1.3).detect(&adj)?;
            let b = Louvain::new().with_seed(seed).with_resolution(1.3).detect(&adj)?;
            assert_eq!(a, b);
        }
        Ok(())
    }

    #[test]
    fn finetune_after_louvain_never_loses_quality() -> Result<()> {
        let adj = modular_network();
        for seed in 0..5 {
            let coarse = Louvain::new().with_seed(seed).with_resolution(2.0).detect(&adj)?;
            let tuned = FineTuner::new()
                .with_seed(seed)
                .with_resolution(2.0)
                .tune(&adj, Some(&coarse.partition))?;
            assert!(tuned.quality >= coarse.quality - 1e-12);
        }
        Ok(())
    }

    #[test]
    fn higher_resolution_never_yields_fewer_modules_here() -> Result<()> {
        let adj = modular_network();
        let coarse = Louvain::new().with_seed(1).with_resolution(0.1).detect(&adj)?;
        let fine = Louvain::new().with_seed(1).with_resolution(5.0).detect(&adj)?;
        assert!(fine.community_count() >= coarse.community_count());
        Ok(())
    }

    #[test]
    fn consensus_output_is_a_fixed_point() -> Result<()> {
        let adj = modular_network();
        let consensus = Consensus::new(0.5, 12).with_seed(77);
        let first = consensus.run(&adj)?;
        let again = consensus.from_ensemble(&[first.partition.clone()])?;
        assert_eq!(again.partition, first.partition);
        assert_eq!(first.partition, canonicalize(&(0..15).map(|i| i / 5).collect::<Vec<_>>()));
        Ok(())
    }

    #[test]
    fn signed_network_end_to_end() -> Result<()> {
        // Positive within halves, negative across.
        let n = 8;
        let mut w = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    w[(i, j)] = if i / 4 == j / 4 { 1.0 } else { -0.5 };
                }
            }
        }
        let adj = Adjacency::new(w)?;
        let result = Louvain::new()
            .with_kind(GraphKind::SIGNED)
            .with_seed(5)
            .detect(&adj)?;
        assert_eq!(result.partition, vec![0, 0, 0, 0, 1, 1, 1, 1]);

        let q = Modularity::new()
            .with_kind(GraphKind::SIGNED)
            .evaluate(&adj, &result.partition)?;
        assert!((q - result.quality).abs() < 1e-12);
        Ok(())
    }
}
