#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand::prelude::SmallRng;
    use test_case::test_case;

    use loadopt::bench;
    use loadopt::config::LoadOptConfig;
    use loadopt::io::items::{read_items_csv, write_items_csv};
    use loadopt::plan::plan;
    use loadopt::pool::{PrefilterConfig, candidate_pool};
    use loadopt::sampler::CartonSampler;
    use loadopt::select::exact::ExactConfig;
    use loadopt::select::{SelectionStatus, SelectionStrategy, SelectorConfig, select};
    use loadopt::sequence::{SequenceStatus, SequencerConfig, reorder};
    use truckload::entities::{Flags, Item, TruckSpec};
    use truckload::util::{PackerConfig, assertions};

    fn cartons(n: usize, seed: u64) -> Vec<Item> {
        let mut rng = SmallRng::seed_from_u64(seed);
        CartonSampler::default().sample_n(n, &mut rng)
    }

    fn quick_sequencer() -> SequencerConfig {
        SequencerConfig {
            population: 16,
            generations: 5,
            refine_top_k: 4,
            ..SequencerConfig::default()
        }
    }

    fn quick_config() -> LoadOptConfig {
        LoadOptConfig {
            selector: SelectorConfig {
                exact: ExactConfig {
                    time_budget_ms: 300,
                    ..ExactConfig::default()
                },
                ..SelectorConfig::default()
            },
            sequencer: Some(quick_sequencer()),
            ..LoadOptConfig::default()
        }
    }

    #[test]
    fn few_items_are_not_reordered() {
        let items = cartons(3, 0);
        let sequence = reorder(
            &items,
            &TruckSpec::default(),
            Flags::default(),
            &PackerConfig::default(),
            &SequencerConfig::default(),
        );
        assert_eq!(sequence.status, SequenceStatus::Unchanged);
        assert_eq!(sequence.items, items);
    }

    #[test_case(20, 7; "20 items")]
    #[test_case(60, 8; "60 items")]
    fn sequencer_is_deterministic_permutation(n_items: usize, seed: u64) {
        let items = cartons(n_items, seed);
        let truck = TruckSpec::default();
        let run = || reorder(&items, &truck, Flags::default(), &PackerConfig::default(), &quick_sequencer());

        let first = run();
        let second = run();
        assert_ne!(first.status, SequenceStatus::Unchanged);
        assert_eq!(first.items, second.items);
        assert_eq!(first.status, second.status);

        let ids = first.items.iter().map(|i| i.id).sorted().collect_vec();
        let expected = items.iter().map(|i| i.id).sorted().collect_vec();
        assert_eq!(ids, expected);
    }

    #[test_case(TruckSpec::default(); "default truck")]
    #[test_case(TruckSpec::try_new(6.32, 2.15, 2.25, 300.0).unwrap(); "light payload")]
    #[test_case(TruckSpec::try_new(2.0, 1.5, 1.2, 8500.0).unwrap(); "small volume")]
    fn exact_selection_respects_capacities(truck: TruckSpec) {
        let items = cartons(40, 11);
        let config = SelectorConfig {
            exact: ExactConfig {
                time_budget_ms: 500,
                ..ExactConfig::default()
            },
            ..SelectorConfig::default()
        };
        let selection = select(&items, &truck, &config);
        assert!(matches!(
            selection.status,
            SelectionStatus::Optimal | SelectionStatus::Feasible
        ));

        let weight: f64 = selection.items.iter().map(|i| i.weight).sum();
        let volume: f64 = selection.items.iter().map(|i| i.volume()).sum();
        assert!(weight <= truck.payload_kg + 1e-6);
        assert!(volume <= truck.volume() + 1e-6);
        assert!(selection.items.iter().all(|s| items.contains(s)));
    }

    #[test]
    fn heuristic_selection_keeps_top_k() {
        let items = cartons(50, 12);
        let mut config = SelectorConfig {
            strategy: SelectionStrategy::Heuristic,
            ..SelectorConfig::default()
        };
        config.heuristic.top_k = 10;
        let selection = select(&items, &TruckSpec::default(), &config);
        assert_eq!(selection.status, SelectionStatus::Heuristic);
        assert_eq!(selection.items.len(), 10);
    }

    fn exhausted_budget_config(heuristic_fallback: bool) -> SelectorConfig {
        let mut config = SelectorConfig {
            exact: ExactConfig {
                time_budget_ms: 0,
                ..ExactConfig::default()
            },
            heuristic_fallback,
            ..SelectorConfig::default()
        };
        config.heuristic.top_k = 12;
        config
    }

    #[test]
    fn exact_selection_without_budget_keeps_candidates() {
        let items = cartons(40, 13);
        let selection = select(&items, &TruckSpec::default(), &exhausted_budget_config(false));
        assert_eq!(selection.status, SelectionStatus::Unchanged);
        assert_eq!(selection.items, items);
    }

    #[test]
    fn exact_selection_without_budget_falls_back_to_heuristic() {
        let items = cartons(40, 13);
        let selection = select(&items, &TruckSpec::default(), &exhausted_budget_config(true));
        assert_eq!(selection.status, SelectionStatus::Heuristic);
        assert_eq!(selection.items.len(), 12);
        assert!(selection.items.iter().all(|s| items.contains(s)));
    }

    #[test_case(150, 1; "150 items")]
    #[test_case(400, 2; "400 items")]
    fn planned_load_is_valid(n_items: usize, seed: u64) {
        let items = cartons(n_items, seed);
        let config = quick_config();
        let load_plan = plan(&items, &config);
        let placements = &load_plan.placements;

        assert!(!placements.is_empty());
        assert!(load_plan.n_selected <= load_plan.n_candidates);
        assert!(placements.len() <= load_plan.n_selected);
        assert!(assertions::placements_do_not_overlap(placements));
        assert!(assertions::placements_within_truck(placements, &config.truck));
        assert!(assertions::placement_ids_valid(placements, &items));
        assert!(assertions::payload_respected(placements, &config.truck, config.flags));

        let volume: f64 = placements.iter().map(|p| p.volume()).sum();
        assert!(approx_eq!(
            f64,
            load_plan.volume_utilization_pct,
            volume / config.truck.volume() * 100.0,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn pass_through_pipeline_keeps_everything_unchanged() {
        let items = cartons(30, 3);
        let config = LoadOptConfig {
            selector: SelectorConfig {
                strategy: SelectionStrategy::PassThrough,
                ..SelectorConfig::default()
            },
            sequencer: None,
            ..LoadOptConfig::default()
        };
        let load_plan = plan(&items, &config);
        assert_eq!(load_plan.selection_status, SelectionStatus::Unchanged);
        assert_eq!(load_plan.sequence_status, SequenceStatus::Unchanged);
        assert_eq!(load_plan.n_selected, load_plan.n_candidates);
    }

    #[test]
    fn pool_respects_its_quotas() {
        let items = cartons(500, 4);
        let config = PrefilterConfig {
            n_small: 50,
            n_large: 10,
            ..PrefilterConfig::default()
        };
        let pool = candidate_pool(&items, &config);
        let (small, large): (Vec<_>, Vec<_>) = pool
            .iter()
            .partition(|i| i.footprint_area() <= config.small_area_threshold);
        assert!(small.len() <= 50);
        assert!(large.len() <= 10);
        assert_eq!(pool.iter().map(|i| i.id).unique().count(), pool.len());
    }

    #[test]
    fn generated_dataset_round_trips() {
        let items = cartons(50, 5);
        let file = tempfile::NamedTempFile::new().unwrap();
        write_items_csv(&items, file.path()).unwrap();
        let read = read_items_csv(file.path()).unwrap();

        assert_eq!(read.len(), items.len());
        for (a, b) in items.iter().zip(&read) {
            assert_eq!(a.id, b.id);
            assert!(approx_eq!(f64, a.length, b.length, epsilon = 1e-9));
            assert!(approx_eq!(f64, a.width, b.width, epsilon = 1e-9));
            assert!(approx_eq!(f64, a.height, b.height, epsilon = 1e-9));
            assert!(approx_eq!(f64, a.weight, b.weight, epsilon = 1e-9));
        }
    }

    #[test]
    fn few_eligible_items_fall_back_to_largest_footprints() {
        let items = cartons(200, 6);
        let truck = TruckSpec::default();
        // no item is this narrow
        let pool = bench::eligible_pool(&items, 0.05, &truck);
        assert_eq!(pool.len(), bench::MIN_ELIGIBLE);
        assert!(
            pool.iter()
                .tuple_windows()
                .all(|(a, b)| a.footprint_area() >= b.footprint_area())
        );
    }

    #[test]
    fn bench_keeps_best_grid_point() {
        let items = cartons(60, 9);
        let base = LoadOptConfig {
            selector: SelectorConfig {
                strategy: SelectionStrategy::PassThrough,
                ..SelectorConfig::default()
            },
            sequencer: Some(quick_sequencer()),
            ..LoadOptConfig::default()
        };
        let best = bench::bench_dataset(&items, &base).unwrap();
        for (grid_point, candidates) in bench::grid(&items, &base.truck) {
            let config = bench::grid_config(&base, &grid_point);
            let load_plan = loadopt::plan::plan_candidates(&candidates, &config);
            assert!(load_plan.volume_utilization_pct <= best.plan.volume_utilization_pct + 1e-9);
        }
    }
}
