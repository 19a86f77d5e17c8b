mod common;

use std::collections::HashMap;

use proptest::prelude::*;
use uuid::Uuid;

use stance_engine::arguments::pair_arguments_by_stance;
use stance_engine::compatibility::{pair_by_threshold, Distance};
use stance_types::api::{ArgumentCount, NewEvent, VoteTally};

fn pending_post(engine: &stance_engine::Engine) -> Uuid {
    let topic = common::topic(engine);
    let (post, _) = engine
        .submit_event(
            Uuid::new_v4(),
            topic.id,
            NewEvent {
                title: "event".into(),
                source_link: "http://lrs.lt/p".into(),
                timestamp: common::date(2010, 1, 1),
            },
        )
        .unwrap();
    post.id
}

/// Tally of the last vote each voter cast.
fn expected_tally(ballots: &[(usize, i64)]) -> VoteTally {
    let last: HashMap<usize, i64> = ballots.iter().copied().collect();
    VoteTally::from_values(last.into_values())
}

fn ballots() -> impl Strategy<Value = Vec<(usize, i64)>> {
    prop::collection::vec((0usize..4, -1i64..=1), 1..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn user_tally_reflects_last_vote_per_voter(ballots in ballots()) {
        let engine = common::engine();
        let post = pending_post(&engine);
        let voters: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        for (voter, vote) in &ballots {
            engine.record_user_vote(voters[*voter], post, *vote).unwrap();
        }

        let expected = expected_tally(&ballots);
        prop_assert_eq!(engine.tally_user_votes(post).unwrap(), expected);
        let voters_seen = ballots.iter().map(|(v, _)| *v).collect::<std::collections::HashSet<_>>().len();
        prop_assert_eq!(engine.ledger_rows(post).unwrap().0, voters_seen as i64);
        let cached = engine.post(post).unwrap();
        prop_assert_eq!((cached.upvotes, cached.downvotes), (expected.upvotes, expected.downvotes));
    }

    #[test]
    fn approval_tracks_curator_majority(ballots in ballots()) {
        let engine = common::engine();
        let post = pending_post(&engine);
        let curators: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        for (curator, vote) in &ballots {
            engine.record_curator_vote(curators[*curator], post, *vote).unwrap();
        }

        let expected = expected_tally(&ballots);
        prop_assert_eq!(engine.tally_curator_votes(post).unwrap(), expected);
        prop_assert_eq!(engine.post(post).unwrap().is_approved(), expected.has_majority());
    }

    #[test]
    fn source_position_is_mean_of_effective_positions(
        args in prop::collection::vec(
            (prop_oneof![Just(-1.0f64), Just(-0.5), Just(0.0), Just(0.5), Just(1.0)], any::<bool>()),
            0..8,
        ),
    ) {
        let engine = common::engine();
        let topic = common::topic(&engine);
        let curator = common::curator(&engine, &topic);
        let actor = common::actor(&engine);

        let new_args = args
            .iter()
            .enumerate()
            .map(|(i, (position, counter))| common::argument(*position, *counter, &format!("a{}", i)))
            .collect();
        let (_, quote) = common::submit_quote(&engine, curator, &topic, &actor, "http://lrt.lt/m", "q", new_args);

        let expected = if args.is_empty() {
            0.0
        } else {
            args.iter().map(|(p, c)| if *c { -p } else { *p }).sum::<f64>() / args.len() as f64
        };
        let position = engine.aggregate_source_position(topic.id, quote.source_id).unwrap();
        prop_assert!((position - expected).abs() < 1e-9, "{} != {}", position, expected);
    }

    #[test]
    fn compatibility_columns_respect_threshold(
        raw in prop::collection::vec(0.0f64..1.0, 0..40),
        threshold in 0.0f64..1.0,
        limit in 0usize..30,
    ) {
        let mut sorted = raw;
        sorted.sort_by(f64::total_cmp);
        let distances: Vec<Distance> = sorted.into_iter().map(|d| (Uuid::new_v4(), d)).collect();

        let rows = pair_by_threshold(&distances, threshold, limit);
        prop_assert!(rows.len() <= limit);

        let left: Vec<f64> = rows.iter().filter_map(|(l, _)| l.map(|(_, d)| d)).collect();
        let right: Vec<f64> = rows.iter().filter_map(|(_, r)| r.map(|(_, d)| d)).collect();
        prop_assert!(left.iter().all(|d| *d < threshold));
        prop_assert!(right.iter().all(|d| *d >= threshold));
        prop_assert!(left.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(right.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(rows.iter().all(|row| row.0.is_some() || row.1.is_some()));

        // Padding only ever trails the shorter column.
        let first_empty_left = rows.iter().position(|(l, _)| l.is_none()).unwrap_or(rows.len());
        prop_assert!(rows[first_empty_left..].iter().all(|(l, _)| l.is_none()));

        if rows.len() < limit {
            prop_assert_eq!(left.len() + right.len(), distances.len());
        }
    }

    #[test]
    fn stance_pairs_keep_sign_and_order(
        positions in prop::collection::vec(prop_oneof![Just(-1.0f64), Just(0.0), Just(0.5), Just(1.0)], 0..20),
    ) {
        let ranked: Vec<ArgumentCount> = positions
            .iter()
            .enumerate()
            .map(|(i, p)| ArgumentCount { position: *p, title: format!("t{}", i), count: 1 })
            .collect();
        let nonzero = positions.iter().filter(|p| **p != 0.0).count();

        let rows = pair_arguments_by_stance(ranked);
        let left: Vec<&ArgumentCount> = rows.iter().filter_map(|(l, _)| l.as_ref()).collect();
        let right: Vec<&ArgumentCount> = rows.iter().filter_map(|(_, r)| r.as_ref()).collect();

        prop_assert!(left.iter().all(|a| a.position > 0.0));
        prop_assert!(right.iter().all(|a| a.position < 0.0));
        prop_assert_eq!(left.len() + right.len(), nonzero);
        prop_assert_eq!(rows.len(), left.len().max(right.len()));
    }
}
