#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use itertools::Itertools;
    use rand::prelude::SmallRng;
    use rand::{Rng, SeedableRng};
    use test_case::test_case;

    use truckload::entities::{Flags, Item, Placement, TruckSpec};
    use truckload::geometry::Rect;
    use truckload::packer::support::Support;
    use truckload::packer::{PackStatus, pack, pack_layers, packing_order};
    use truckload::util::{PackerConfig, assertions};

    fn random_items(n: usize, seed: u64) -> Vec<Item> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|id| {
                let mut item = Item::plain(
                    id,
                    rng.random_range(0.25..1.2),
                    rng.random_range(0.2..1.0),
                    rng.random_range(0.15..0.8),
                    rng.random_range(2.0..60.0),
                )
                .unwrap();
                item.fragile = rng.random_bool(0.1);
                item.can_rotate = rng.random_bool(0.8);
                item.stack_limit = rng.random_range(1..4);
                item.drop_order = rng.random_range(1..6);
                item
            })
            .collect()
    }

    fn small_truck() -> TruckSpec {
        TruckSpec::try_new(3.0, 2.0, 1.8, 800.0).unwrap()
    }

    fn light_truck() -> TruckSpec {
        TruckSpec::try_new(6.32, 2.15, 2.25, 250.0).unwrap()
    }

    #[test_case(TruckSpec::default(), 10, 0; "default truck, 10 items")]
    #[test_case(TruckSpec::default(), 60, 1; "default truck, 60 items")]
    #[test_case(TruckSpec::default(), 150, 2; "default truck, 150 items")]
    #[test_case(small_truck(), 60, 3; "small truck, 60 items")]
    #[test_case(small_truck(), 150, 4; "small truck, 150 items")]
    #[test_case(light_truck(), 100, 5; "light truck, 100 items")]
    fn packing_is_valid(truck: TruckSpec, n_items: usize, seed: u64) {
        let items = random_items(n_items, seed);
        let config = PackerConfig::default();
        let flags = Flags::default();

        let result = pack(&truck, flags, &items, &config);

        assert!(!result.placements.is_empty());
        assert!(assertions::placements_do_not_overlap(&result.placements));
        assert!(assertions::placements_within_truck(&result.placements, &truck));
        assert!(assertions::placement_ids_valid(&result.placements, &items));
        assert!(assertions::payload_respected(&result.placements, &truck, flags));
        assert!(assertions::orientations_respected(&result.placements, &items, flags));
        assert!(assertions::placements_supported(&result.placements, flags, &config));

        let summed = result.placements.iter().map(|p| p.weight).sum::<f64>();
        assert!(approx_eq!(f64, summed, result.total_weight, epsilon = 1e-6));
    }

    #[test_case(Flags { allow_rotation: false, ..Flags::default() }; "no rotation")]
    #[test_case(Flags { allow_stacking_on_fragile: false, ..Flags::default() }; "no stacking on fragile")]
    #[test_case(Flags { delivery_sequence: false, ..Flags::default() }; "no delivery sequence")]
    #[test_case(Flags { enforce_payload: false, ..Flags::default() }; "payload not enforced")]
    fn packing_is_valid_under_flags(flags: Flags) {
        let items = random_items(80, 7);
        let truck = small_truck();
        let config = PackerConfig::default();

        let result = pack(&truck, flags, &items, &config);

        assert!(assertions::packing_is_valid(
            &result.placements,
            &items,
            &truck,
            flags,
            &config
        ));
    }

    #[test]
    fn packing_is_deterministic() {
        let items = random_items(120, 11);
        let truck = TruckSpec::default();
        let config = PackerConfig::default();

        let first = pack(&truck, Flags::default(), &items, &config);
        let second = pack(&truck, Flags::default(), &items, &config);

        assert_eq!(first.placements, second.placements);
        assert_eq!(first.status, second.status);
    }

    #[test]
    fn single_item_is_placed_in_the_corner() {
        let items = vec![Item::plain(1, 1.0, 1.0, 1.0, 100.0).unwrap()];
        let truck = TruckSpec::default();

        let result = pack(&truck, Flags::default(), &items, &PackerConfig::default());

        assert_eq!(result.placements.len(), 1);
        let p = &result.placements[0];
        assert_eq!((p.x, p.y, p.z), (0.0, 0.0, 0.0));
        assert_eq!((p.length, p.width), (1.0, 1.0));
        assert_eq!(result.status, PackStatus::Layered { n_layers: 1 });
    }

    #[test]
    fn two_large_squares_do_not_overlap() {
        let items = vec![
            Item::plain(1, 1.1, 1.1, 1.0, 50.0).unwrap(),
            Item::plain(2, 1.1, 1.1, 1.0, 50.0).unwrap(),
        ];
        let truck = TruckSpec::default();

        let result = pack(&truck, Flags::default(), &items, &PackerConfig::default());

        assert!(result.placements.len() <= 2);
        assert!(assertions::placements_do_not_overlap(&result.placements));
    }

    #[test]
    fn item_heavier_than_payload_is_never_placed() {
        let items = vec![
            Item::plain(1, 1.0, 1.0, 1.0, 9000.0).unwrap(),
            Item::plain(2, 1.0, 1.0, 1.0, 100.0).unwrap(),
        ];
        let truck = TruckSpec::default();
        let config = PackerConfig::default();

        let result = pack(&truck, Flags::default(), &items, &config);
        assert_eq!(result.placements.iter().map(|p| p.id).collect_vec(), vec![2]);

        let unenforced = Flags {
            enforce_payload: false,
            ..Flags::default()
        };
        let result = pack(&truck, unenforced, &items, &config);
        assert_eq!(result.placements.len(), 2);
    }

    #[test]
    fn overhanging_item_is_rejected_by_support() {
        let config = PackerConfig::default();
        let heavy = Item::plain(1, 1.0, 1.0, 1.0, 300.0).unwrap();
        let truck = TruckSpec::default();
        let base = pack(&truck, Flags::default(), &[heavy], &config).placements;
        assert_eq!(base.len(), 1);

        let support = Support {
            placed: &base,
            requirement: &config.support,
            rule: config.layer_support,
            allow_stacking_on_fragile: true,
        };
        //a 0.8 x 0.8 footprint with only 0.2 x 0.2 resting on the base, its center hanging in the air
        let footprint = Rect::from_origin(0.8, 0.8, 0.8, 0.8);
        assert!(!support.holds(&footprint, 1.0, 20.0));
        //the same footprint fully on top of the base is fine
        let footprint = Rect::from_origin(0.1, 0.1, 0.8, 0.8);
        assert!(support.holds(&footprint, 1.0, 20.0));
    }

    #[test]
    fn rotation_is_needed_to_fit_long_item() {
        let truck = TruckSpec::try_new(1.0, 2.5, 1.0, 1000.0).unwrap();
        let items = vec![Item::plain(1, 2.0, 0.5, 0.5, 10.0).unwrap()];
        let config = PackerConfig::default();

        let rotated = pack(&truck, Flags::default(), &items, &config);
        assert_eq!(rotated.placements.len(), 1);
        let p: &Placement = &rotated.placements[0];
        assert_eq!((p.length, p.width), (0.5, 2.0));

        let no_rotation = Flags {
            allow_rotation: false,
            ..Flags::default()
        };
        let result = pack(&truck, no_rotation, &items, &config);
        assert!(result.placements.is_empty());
        assert_eq!(result.status, PackStatus::Empty);

        let mut fixed = items[0].clone();
        fixed.can_rotate = false;
        let result = pack(&truck, Flags::default(), &[fixed], &config);
        assert!(result.placements.is_empty());
    }

    #[test]
    fn fragile_items_carry_nothing_when_disallowed() {
        let truck = TruckSpec::try_new(1.0, 1.0, 2.0, 1000.0).unwrap();
        let mut fragile = Item::plain(1, 1.0, 1.0, 0.5, 30.0).unwrap();
        fragile.fragile = true;
        let other = Item::plain(2, 1.0, 1.0, 0.5, 10.0).unwrap();
        let items = vec![fragile, other];
        let config = PackerConfig::default();

        let allowed = pack(&truck, Flags::default(), &items, &config);
        assert_eq!(allowed.placements.len(), 2);

        let disallowed = Flags {
            allow_stacking_on_fragile: false,
            ..Flags::default()
        };
        let result = pack(&truck, disallowed, &items, &config);
        assert_eq!(result.placements.len(), 1);
        assert_eq!(result.placements[0].id, 1);
    }

    #[test]
    fn no_items_gives_empty_result() {
        let result = pack(&TruckSpec::default(), Flags::default(), &[], &PackerConfig::default());
        assert!(result.placements.is_empty());
        assert_eq!(result.status, PackStatus::Empty);
        assert_eq!(result.total_weight, 0.0);
    }

    #[test]
    fn flat_items_on_a_single_level_are_all_placed() {
        //identical flat items which do not fill a single floor: one level only
        let items = (0..4)
            .map(|i| Item::plain(i, 1.0, 1.0, 0.3, 10.0).unwrap())
            .collect_vec();
        let truck = TruckSpec::default();
        let config = PackerConfig::default();

        let result = pack(&truck, Flags::default(), &items, &config);
        assert_eq!(result.placements.len(), 4);
        assert!(assertions::packing_is_valid(
            &result.placements,
            &items,
            &truck,
            Flags::default(),
            &config
        ));
    }

    #[test]
    fn shelves_replace_a_single_tall_layer() {
        //the tall carton wins the first layer and blocks everything above it,
        //two shelves of flat cartons hold more volume
        let truck = TruckSpec::try_new(1.0, 1.0, 1.0, 1000.0).unwrap();
        let mut items = (0..4)
            .map(|i| Item::plain(i, 1.0, 0.4, 0.5, 10.0).unwrap())
            .collect_vec();
        items.push(Item::plain(4, 1.0, 1.0, 0.55, 20.0).unwrap());
        let config = PackerConfig::default();
        let flags = Flags::default();

        let layered = pack_layers(&truck, flags, &packing_order(&items, flags), &config);
        assert_eq!(layered.status, PackStatus::Layered { n_layers: 1 });
        assert_eq!(layered.placements.iter().map(|p| p.id).collect_vec(), vec![4]);

        let result = pack(&truck, flags, &items, &config);
        let PackStatus::ShelfFallback { shelf_height } = result.status else {
            panic!("expected the shelf packing, got {:?}", result.status);
        };
        assert!(approx_eq!(f64, shelf_height, 0.5, epsilon = 1e-9));
        assert_eq!(result.placements.len(), 4);
        assert!(result.volume_utilization(&truck) > layered.volume_utilization(&truck) + 1e-6);
        assert!(approx_eq!(f64, result.volume_utilization(&truck), 0.8, epsilon = 1e-9));
        assert!(assertions::packing_is_valid(
            &result.placements,
            &items,
            &truck,
            flags,
            &config
        ));
    }
}
