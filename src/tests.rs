#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::time::Duration;

    use itertools::Itertools;
    use proptest::prelude::*;
    use proptest::sample::subsequence;
    use unordered_pair::UnorderedPair;

    use crate::cover::{minimum_poset_cover_with, Search};
    use crate::{
        exact_k_poset_cover, generate_convex, grow, is_convex, minimum_poset_cover, parse_orders,
        partial_order_of_convex, AnchorPair, Atg, ConfigError, CoverError, Label, LinearOrder, OrderSet, PartialOrder,
        PosetCover, Solver, SolverConfig,
    };

    const TWOMAXIMAL: &str = "1234 2134 2143 1243 1324 1342 1432 1423 4123 3124 3142 3412";
    const LINE295: &str = "12345 12354 13245 13254";
    const SINGLESIX: &str = "123456";
    const CUBELEG: &str = "12345678 12345687 12354678 12354687 21345678 21345687 21354678 21354687";
    const SQHEXPLUSLINE: &str = "4312 4132 4123 1432 1423 1342 3142 3412 3241 3214";
    const HEX2SUNGAY: &str = "12345 12354 12534 12543 12453 12435 21345 21453";
    const GENMAXIMAL: &str = "153624 135624 315624 153264 135264 315264 153246 135246 315246 125364 123564 132564 \
                              312564 125346 123546 132546 312546 123456 132456 312456";
    const TRIANGLE_PATH: &str = "123 132 312 321";

    fn orders(text: &str) -> OrderSet {
        parse_orders(text).unwrap()
    }

    fn order(text: &str) -> LinearOrder {
        LinearOrder::from_str(text).unwrap()
    }

    fn all_orders(n: Label) -> Vec<LinearOrder> {
        (1..=n).permutations(n as usize)
            .map(|labels| LinearOrder::new(labels).unwrap())
            .collect()
    }

    fn assert_valid_cover(upsilon: &OrderSet, legs: &[OrderSet]) {
        let union: OrderSet = legs.iter().flatten().cloned().collect();
        assert_eq!(&union, upsilon);
        for leg in legs {
            assert!(is_convex(leg).unwrap(), "leg {leg:?} is not a poset's extensions");
        }
    }

    mod linear_orders {
        use super::*;

        #[test]
        fn parse_and_display() {
            assert_eq!(order("2134").labels(), &[2, 1, 3, 4]);
            assert_eq!(order("2,1,3,4"), order("2134"));
            assert_eq!(order("2134").to_string(), "2134");
            assert_eq!(LinearOrder::new(vec![10, 2, 1]).unwrap().to_string(), "10,2,1");
        }

        #[test]
        fn parse_rejects_garbage() {
            assert!(matches!(LinearOrder::from_str("12a4"), Err(CoverError::InvalidInput(_))));
            assert!(matches!(LinearOrder::from_str("1231"), Err(CoverError::InvalidInput(_))));
            assert!(matches!(LinearOrder::from_str(""), Err(CoverError::InvalidInput(_))));
        }

        #[test]
        fn before_and_immediately_before() {
            let o = order("12345");
            assert!(o.is_before(3, 4));
            assert!(o.is_before(1, 5));
            assert!(!o.is_before(4, 3));
            assert!(!o.is_before(1, 9));
            assert!(o.is_immediately_before(3, 4));
            assert!(!o.is_immediately_before(3, 5));
            assert!(!o.is_immediately_before(5, 1));
        }

        #[test]
        fn swap_adjacent_needs_adjacency() {
            assert_eq!(order("12345").swap_adjacent(3, 4).unwrap(), order("12435"));
            assert!(matches!(order("12345").swap_adjacent(4, 3), Err(CoverError::PreconditionViolation(_))));
            assert!(matches!(order("12345").swap_adjacent(2, 4), Err(CoverError::PreconditionViolation(_))));
        }

        #[test]
        fn adjacent_swap_labels() {
            assert_eq!(order("1234").adjacent_swap(&order("1324")).unwrap(), Some(UnorderedPair::from((2, 3))));
            assert_eq!(order("1234").adjacent_swap(&order("3214")).unwrap(), None);
            assert_eq!(order("1234").adjacent_swap(&order("1234")).unwrap(), None);
            assert_eq!(order("1234").adjacent_swap(&order("2143")).unwrap(), None);
            assert!(matches!(order("1234").adjacent_swap(&order("123")), Err(CoverError::InvalidInput(_))));
        }

        #[test]
        fn relation_is_every_forward_pair() {
            let relation = order("312").relation();
            assert_eq!(relation.pairs().collect_vec(), vec![(1, 2), (3, 1), (3, 2)]);
        }

        #[test]
        fn anchor_pairs() {
            let anchor = AnchorPair::from_str("4<2").unwrap();
            assert_eq!(anchor, AnchorPair(4, 2));
            assert_eq!(anchor.reversed(), AnchorPair(2, 4));
            assert!(anchor.holds_in(&order("3142")));
            assert!(!anchor.holds_in(&order("1243")));
            assert!(AnchorPair::from_str("2<2").is_err());
            assert!(AnchorPair::from_str("2,3").is_err());
        }
    }

    mod relations {
        use super::*;

        #[test]
        fn convex_of_nothing_is_invalid() {
            assert!(matches!(partial_order_of_convex(&OrderSet::new()), Err(CoverError::InvalidInput(_))));
            assert!(matches!(generate_convex(&OrderSet::new()), Err(CoverError::InvalidInput(_))));
        }

        #[test]
        fn convex_of_singleton_is_itself() {
            let single = orders("2413");
            assert_eq!(partial_order_of_convex(&single).unwrap(), order("2413").relation());
            assert_eq!(generate_convex(&single).unwrap(), single);
        }

        #[test]
        fn convex_fills_in_the_square() {
            // 1 and 2 are free, 3 and 4 are free
            let corners = orders("1234 2143");
            assert_eq!(generate_convex(&corners).unwrap(), orders("1234 1243 2134 2143"));
            assert!(!is_convex(&corners).unwrap());
            assert!(is_convex(&orders(LINE295)).unwrap());
            assert!(!is_convex(&orders(TWOMAXIMAL)).unwrap());
        }

        #[test]
        fn convex_rejects_mixed_labels() {
            assert!(matches!(generate_convex(&orders("123 1234")), Err(CoverError::InvalidInput(_))));
            assert!(matches!(generate_convex(&orders("123 124")), Err(CoverError::InvalidInput(_))));
        }

        #[test]
        fn linear_extensions_include_unrelated_labels() {
            let relation: PartialOrder = [(1, 2), (2, 3)].into_iter().collect();
            assert_eq!(relation.linear_extensions(&[1, 2, 3, 4]), orders("1234 1243 1423 4123"));
        }

        #[test]
        fn linear_extensions_of_nothing_are_everything() {
            assert_eq!(PartialOrder::new().linear_extensions(&[1, 2, 3]).len(), 6);
        }

        #[test]
        fn linear_extensions_of_a_cycle_are_empty() {
            let cycle: PartialOrder = [(1, 2), (2, 3), (3, 1)].into_iter().collect();
            assert!(cycle.linear_extensions(&[1, 2, 3]).is_empty());
        }

        #[test]
        fn hasse_diagram_drops_implied_pairs() {
            let hasse = order("1234").relation().hasse_diagram(&[1, 2, 3, 4]);
            assert_eq!(hasse.cover_relation().pairs().collect_vec(), vec![(1, 2), (2, 3), (3, 4)]);
            assert!(hasse.covers(2, 3));
            assert!(!hasse.covers(1, 3));
            assert!(!hasse.covers(3, 2));
        }

        #[test]
        fn ancestors() {
            let hasse = [(1, 3), (2, 3)].into_iter().collect::<PartialOrder>().hasse_diagram(&[1, 2, 3, 4]);
            assert_eq!(hasse.ancestors(3).into_iter().collect_vec(), vec![1, 2]);
            assert!(hasse.ancestors(1).is_empty());
            assert!(hasse.ancestors(4).is_empty());

            let chain = order("12345").relation().hasse_diagram(&[1, 2, 3, 4, 5]);
            assert!(chain.ancestors(5).contains(&1));
            assert!(chain.ancestors(4).contains(&2));
            assert!(!chain.ancestors(2).contains(&3));
            assert!(chain.ancestors(1).is_empty());
        }

        #[test]
        fn descendants() {
            let hasse = [(1, 3), (2, 3)].into_iter().collect::<PartialOrder>().hasse_diagram(&[1, 2, 3, 4]);
            assert_eq!(hasse.descendants(1).into_iter().collect_vec(), vec![3]);
            assert_eq!(hasse.descendants(2).into_iter().collect_vec(), vec![3]);
            assert!(hasse.descendants(3).is_empty());
            assert!(hasse.descendants(4).is_empty());

            let chain = order("12345").relation().hasse_diagram(&[1, 2, 3, 4, 5]);
            assert!(chain.descendants(1).contains(&5));
            assert!(chain.descendants(2).contains(&4));
            assert!(!chain.descendants(3).contains(&2));
            assert!(chain.descendants(5).is_empty());
        }

        #[test]
        fn hasse_distance_either_way() {
            let hasse = [(1, 3), (2, 3), (3, 4)].into_iter().collect::<PartialOrder>().hasse_diagram(&[1, 2, 3, 4]);
            assert_eq!(hasse.distance(1, 4), Some(2));
            assert_eq!(hasse.distance(4, 1), Some(2));
            assert_eq!(hasse.distance(3, 4), Some(1));
            assert_eq!(hasse.distance(1, 2), None);
        }
    }

    mod graph {
        use super::*;

        #[test]
        fn components_split_the_line_from_the_square() {
            let atg = Atg::build(&orders(SQHEXPLUSLINE)).unwrap();
            let components = atg.connected_components();
            assert_eq!(components.len(), 2);
            assert_eq!(components[0].len(), 8);
            assert_eq!(components[1], orders("3214 3241"));
        }

        #[test]
        fn edge_labels_are_symmetric() {
            let atg = Atg::build(&orders(TRIANGLE_PATH)).unwrap();
            assert_eq!(atg.edge_count(), 3);
            assert_eq!(atg.edge_label(&order("132"), &order("312")), Some(UnorderedPair::from((1, 3))));
            assert_eq!(atg.edge_label(&order("312"), &order("132")), atg.edge_label(&order("132"), &order("312")));
            assert_eq!(atg.edge_label(&order("123"), &order("321")), None);
        }

        #[test]
        fn anchors_come_both_ways() {
            let atg = Atg::build(&orders(TRIANGLE_PATH)).unwrap();
            assert_eq!(atg.anchor_candidates(), vec![
                AnchorPair(1, 2), AnchorPair(1, 3), AnchorPair(2, 1), AnchorPair(2, 3), AnchorPair(3, 1), AnchorPair(3, 2),
            ]);
        }

        #[test]
        fn mismatched_lengths_are_invalid() {
            assert!(matches!(Atg::build(&orders("123 1234")), Err(CoverError::InvalidInput(_))));
        }
    }

    mod grower {
        use super::*;

        fn grow_from(seed: &str, anchors: &[(Label, Label)]) -> OrderSet {
            let seed = partial_order_of_convex(&orders(seed)).unwrap();
            let anchors = anchors.iter().map(|pair| AnchorPair::from(*pair)).collect_vec();
            grow(&orders(TWOMAXIMAL), &anchors, &seed)
        }

        #[test]
        fn grows_into_the_square_hexagon_below_2134() {
            assert_eq!(grow_from("2134", &[(2, 1), (3, 4)]), orders("2134 2143 1342 1324 1234 1432 1423 1243"));
        }

        #[test]
        fn grows_from_3412_down_to_1234() {
            assert_eq!(grow_from("3142 3412", &[(4, 2), (3, 1)]), orders("3412 3142 3124 1342 1324 1234"));
        }

        #[test]
        fn grows_the_snake_from_4123() {
            assert_eq!(grow_from("4123 1423", &[(4, 2), (2, 3)]), orders("4123 1423 1243 1234"));
        }

        #[test]
        fn grows_into_the_square_hexagon_below_3124() {
            assert_eq!(grow_from("1432", &[(3, 2), (4, 3)]), orders("3142 3124 1342 1324 1234 1432 1423 1243"));
        }

        #[test]
        fn rejection_blacklists_the_pairs_around_it() {
            // dropping 3<4 is rejected, which blocks 2<5 and 1<5 below it
            let seed = order("21345").relation();
            let anchors = [AnchorPair(2, 1), AnchorPair(3, 4)];
            assert_eq!(grow(&orders(HEX2SUNGAY), &anchors, &seed), orders("12345 21345"));
        }

        #[test]
        fn stuck_seed_stays_put() {
            let domain = orders("123 321");
            let seed = order("123").relation();
            assert_eq!(grow(&domain, &[AnchorPair(1, 2)], &seed), orders("123"));
        }
    }

    mod cover {
        use super::*;

        #[test]
        fn twomaximal_needs_three() {
            let upsilon = orders(TWOMAXIMAL);
            let legs = minimum_poset_cover(&upsilon).unwrap();
            assert_eq!(legs.len(), 3);
            assert_valid_cover(&upsilon, &legs);
        }

        #[test]
        fn convex_inputs_need_one() {
            for text in [LINE295, SINGLESIX, CUBELEG] {
                let upsilon = orders(text);
                assert_eq!(minimum_poset_cover(&upsilon).unwrap(), vec![upsilon]);
            }
        }

        #[test]
        fn components_are_covered_separately() {
            let upsilon = orders(SQHEXPLUSLINE);
            let legs = minimum_poset_cover(&upsilon).unwrap();
            assert_eq!(legs.len(), 2);
            assert_valid_cover(&upsilon, &legs);
        }

        #[test]
        fn hexagon_with_two_whiskers_needs_three() {
            let upsilon = orders(HEX2SUNGAY);
            let legs = minimum_poset_cover(&upsilon).unwrap();
            assert_eq!(legs.len(), 3);
            assert_valid_cover(&upsilon, &legs);
        }

        #[test]
        fn six_labels_two_maximal_posets() {
            let upsilon = orders(GENMAXIMAL);
            assert_eq!(upsilon.len(), 20);

            let legs = minimum_poset_cover(&upsilon).unwrap();
            assert_eq!(legs.len(), 2);
            assert_valid_cover(&upsilon, &legs);

            assert_eq!(exact_k_poset_cover(&upsilon, 1).unwrap(), None);
            let legs = exact_k_poset_cover(&upsilon, 2).unwrap().unwrap();
            assert_eq!(legs.len(), 2);
            assert_valid_cover(&upsilon, &legs);
        }

        #[test]
        fn exact_two_on_the_triangle_path() {
            let cover = exact_k_poset_cover(&orders(TRIANGLE_PATH), 2).unwrap().unwrap();
            assert_eq!(cover, vec![orders("123 132 312"), orders("132 312 321")]);
        }

        #[test]
        fn exact_k_below_the_minimum_finds_nothing() {
            let upsilon = orders(TWOMAXIMAL);
            assert_eq!(exact_k_poset_cover(&upsilon, 1).unwrap(), None);
            assert_eq!(exact_k_poset_cover(&upsilon, 2).unwrap(), None);
            let legs = exact_k_poset_cover(&upsilon, 3).unwrap().unwrap();
            assert_eq!(legs.len(), 3);
            assert_valid_cover(&upsilon, &legs);

            let upsilon = orders(HEX2SUNGAY);
            assert_eq!(exact_k_poset_cover(&upsilon, 1).unwrap(), None);
            assert_eq!(exact_k_poset_cover(&upsilon, 2).unwrap(), None);
        }

        #[test]
        fn exact_one_is_the_convexity_test() {
            let upsilon = orders(CUBELEG);
            assert_eq!(exact_k_poset_cover(&upsilon, 1).unwrap(), Some(vec![upsilon]));
        }

        #[test]
        fn bad_inputs() {
            assert!(matches!(minimum_poset_cover(&OrderSet::new()), Err(CoverError::InvalidInput(_))));
            assert!(matches!(minimum_poset_cover(&orders("123 1234")), Err(CoverError::InvalidInput(_))));
            assert!(matches!(exact_k_poset_cover(&orders(TRIANGLE_PATH), 0), Err(CoverError::InvalidInput(_))));
        }

        #[test]
        fn out_of_time() {
            let search = Search::new(Some(Duration::ZERO), false);
            assert_eq!(
                minimum_poset_cover_with(&orders(TWOMAXIMAL), &search),
                Err(CoverError::DeadlineExceeded(Duration::ZERO)),
            );
        }

        #[test]
        fn poset_cover_describes_each_leg() {
            let cover = PosetCover::from_legs(minimum_poset_cover(&orders(LINE295)).unwrap()).unwrap();
            assert_eq!(cover.len(), 1);
            assert!(cover.verify(&orders(LINE295)));
            assert_eq!(cover.cover_relations()[0].to_string(), "1<2 1<3 2<4 2<5 3<4 3<5");
            assert_eq!(cover.posets()[0].len(), 8);
        }

        #[test]
        fn poset_cover_rejects_empty_legs() {
            assert!(matches!(PosetCover::from_legs(vec![orders("12 21"), OrderSet::new()]), Err(CoverError::InvalidInput(_))));
            assert!(matches!(PosetCover::from_legs(vec![orders("12 123")]), Err(CoverError::InvalidInput(_))));
            assert!(PosetCover::from_legs(Vec::new()).unwrap().is_empty());
        }

        #[test]
        fn poset_cover_serializes_orders_as_strings() {
            let cover = PosetCover::from_legs(vec![orders("12 21")]).unwrap();
            let json = serde_json::to_value(&cover).unwrap();
            assert_eq!(json["legs"], serde_json::json!([["12", "21"]]));
            assert_eq!(json["posets"], serde_json::json!([[]]));
        }
    }

    mod solver {
        use super::*;

        #[test]
        fn parallel_and_sequential_agree() {
            let upsilon = orders(TWOMAXIMAL);
            let parallel = Solver::new(SolverConfig::default()).solve(&upsilon).unwrap();
            let sequential = Solver::new(SolverConfig::default().with_parallel(false)).solve(&upsilon).unwrap();
            assert_eq!(parallel.legs(), sequential.legs());
            assert!(parallel.verify(&upsilon));
        }

        #[test]
        fn label_limit() {
            let solver = Solver::new(SolverConfig::default().with_max_labels(4));
            assert_eq!(
                solver.solve(&orders(CUBELEG)).unwrap_err(),
                CoverError::TooManyLabels { labels: 8, limit: 4 },
            );
            assert!(solver.solve(&orders(TWOMAXIMAL)).is_ok());
        }

        #[test]
        fn exact_k_through_the_solver() {
            let solver = Solver::default();
            assert!(solver.exact_k(&orders(TWOMAXIMAL), 2).unwrap().is_none());
            assert_eq!(solver.exact_k(&orders(TRIANGLE_PATH), 2).unwrap().unwrap().len(), 2);
        }

        #[test]
        fn config_defaults_and_overrides() {
            assert_eq!(SolverConfig::from_toml_str("").unwrap(), SolverConfig::default());

            let config = SolverConfig::from_toml_str("max_labels = 5\ntime_limit_seconds = 2").unwrap();
            assert_eq!(config.max_labels, 5);
            assert_eq!(config.time_limit(), Some(Duration::from_secs(2)));
            assert!(config.parallel);
        }

        #[test]
        fn config_rejects_nonsense() {
            assert!(matches!(SolverConfig::from_toml_str("max_labels = 0"), Err(ConfigError::Invalid(_))));
            assert!(matches!(SolverConfig::from_toml_str("time_limit_seconds = 0"), Err(ConfigError::Invalid(_))));
            assert!(matches!(SolverConfig::from_toml_str("max_labels = \"eight\""), Err(ConfigError::Toml(_))));
            assert!(matches!(SolverConfig::load("/nonexistent/solver.toml"), Err(ConfigError::Io(_))));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn convex_closure_is_idempotent(picked in subsequence(all_orders(4), 1..=24)) {
            let once = generate_convex(&picked.into_iter().collect()).unwrap();
            prop_assert_eq!(generate_convex(&once).unwrap(), once);
        }

        #[test]
        fn singletons_are_convex(picked in subsequence(all_orders(5), 1)) {
            let single: OrderSet = picked.into_iter().collect();
            prop_assert_eq!(generate_convex(&single).unwrap(), single);
        }

        #[test]
        fn swaps_are_symmetric(picked in subsequence(all_orders(5), 1), at in 0usize..4) {
            let original = &picked[0];
            let (x, y) = (original.labels()[at], original.labels()[at + 1]);
            let swapped = original.swap_adjacent(x, y).unwrap();

            prop_assert_eq!(original.adjacent_swap(&swapped).unwrap(), Some(UnorderedPair::from((x, y))));
            prop_assert_eq!(original.adjacent_swap(&swapped).unwrap(), swapped.adjacent_swap(original).unwrap());
            prop_assert_eq!(&swapped.swap_adjacent(y, x).unwrap(), original);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn minimum_cover_is_exact_and_valid(picked in subsequence(all_orders(4), 1..=5)) {
            let upsilon: OrderSet = picked.into_iter().collect();
            let legs = minimum_poset_cover(&upsilon).unwrap();

            prop_assert!(legs.len() <= upsilon.len());
            let union: OrderSet = legs.iter().flatten().cloned().collect();
            prop_assert_eq!(&union, &upsilon);
            for leg in &legs {
                prop_assert!(is_convex(leg).unwrap());
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn larger_covers_are_exact_and_valid(picked in subsequence(all_orders(4), 6..=12)) {
            let upsilon: OrderSet = picked.into_iter().collect();
            let cover = Solver::new(SolverConfig::default().with_parallel(false)).solve(&upsilon).unwrap();

            prop_assert!(cover.len() <= upsilon.len());
            prop_assert!(cover.verify(&upsilon));
        }
    }
}
