use mongoba::catalog::Choice;
use mongoba::cli::parse_selection;
use proptest::prelude::*;

fn choices() -> impl Strategy<Value = Vec<Choice>> {
    proptest::collection::vec((any::<bool>(), any::<bool>()), 1..10).prop_map(|flags| {
        flags.into_iter().enumerate().map(|(i, (checked, disabled))| Choice::new(format!("c{i}"), checked, disabled)).collect()
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 128,
        .. proptest::test_runner::Config::default()
    })]
    #[test]
    fn prop_selection_never_contains_disabled(cs in choices(), picks in proptest::collection::vec(1usize..12, 0..6)) {
        let answer = picks.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        if let Ok(idx) = parse_selection(&answer, &cs) {
            prop_assert!(idx.iter().all(|i| !cs[*i].disabled));
            prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
        }
        for special in ["", "all"] {
            let idx = parse_selection(special, &cs).unwrap();
            prop_assert!(idx.iter().all(|i| !cs[*i].disabled));
        }
    }

    #[test]
    fn prop_all_is_superset_of_default(cs in choices()) {
        let all = parse_selection("all", &cs).unwrap();
        let default = parse_selection("", &cs).unwrap();
        prop_assert!(default.iter().all(|i| all.contains(i)));
    }
}
