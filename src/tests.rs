#[cfg(test)]
mod tests {
    use std::num::NonZero;
    use std::time::Duration;

    use itertools::Itertools;
    use strum::VariantArray;

    use crate::board::Board;
    use crate::builder::{parse, BoardBuilder, ConstructionError};
    use crate::guess::{Hypothesis, HypothesisKind};
    use crate::location::Location;
    use crate::rules::Rule;
    use crate::shape::Direction;
    use crate::solver::{SolveEvent, Solver, Verdict};
    use crate::verify::{Contradiction, Unsolved};
    use crate::{CapacityExceeded, RiverSpan};

    const SQUARE: &str = "2.2
...
2.2
";

    // solved by filling alone
    const FILLABLE: &str = "1......
.......
3..4.12
.......
2.1....
.......
2..3..3
";

    // stalls without guessing
    const NEEDS_GUESS: &str = ".2....1
...2..3
.......
.3....3
.......
.2.1...
.1....2
";

    const NEEDS_CORNERS: &str = "1.2.....2
.........
3...3...4
..2...1..
.........
..1...3..
.........
3...3.3.1
.........
";

    const FOUR_CORNERS: &str = "1.1
...
1.1
";

    fn island(board: &Board, x: usize, y: usize) -> crate::IslandId {
        board.island_at(Location(x, y)).unwrap()
    }

    /// Everything that must hold of any reachable board.
    fn assert_consistent(board: &Board) {
        for id in board.island_ids() {
            let island = board.island(id);
            let bridges: u8 = island.rivers().iter().map(|r| board.river(*r).bridges()).sum();
            assert_eq!(island.bridges(), bridges, "bridges of {}", island);
            let available: u8 = island.live_rivers().iter().map(|r| board.river(*r).to_give()).sum();
            assert_eq!(island.available(), available, "available of {}", island);
            assert!(island.live_rivers().iter().all(|r| board.river(*r).to_give() > 0));
            assert_eq!(
                island.live_rivers().len(),
                island.rivers().iter().filter(|r| board.river(**r).to_give() > 0).count(),
            );
        }

        for id in board.river_ids() {
            let river = board.river(id);
            assert!(river.to_give() <= river.max() - river.bridges());
            if river.bridges() > 0 {
                assert!(river.crossings().iter().all(|c| board.river(*c).bridges() == 0));
                assert!(river.crossings().iter().all(|c| board.river(*c).to_give() == 0));
            }
        }

        let members = board.clusters()
            .flat_map(|(id, cluster)| {
                assert!(cluster.members().iter().all(|island| board.cluster_of(*island) == id));
                cluster.members().to_vec()
            })
            .sorted()
            .collect_vec();
        assert_eq!(members, board.island_ids().collect_vec());
    }

    #[test]
    fn render_unsolved() {
        let board = parse(SQUARE).unwrap();

        assert_eq!(format!("{}", board), "2.2
...
2.2
");
        assert_eq!(board.cluster_count(), 4);
        assert_eq!(board.rivers().count(), 4);
        assert!(board.rivers().all(|river| river.to_give() == 2));
        assert_consistent(&board);
    }

    #[test]
    fn solve_square() {
        let outcome = parse(SQUARE).unwrap().solve();

        assert_eq!(outcome.verdict, Verdict::Solved);
        assert_eq!(format!("{}", outcome.board), "2-2
|.|
2-2
");
        assert!(outcome.board.rivers().all(|river| river.bridges() == 1));
        assert_eq!(outcome.board.cluster_count(), 1);
        assert!(format!("{:#}", outcome.board).contains("Clusters (1)\n"));
        assert_consistent(&outcome.board);
    }

    #[test]
    fn joined_isolation_caps_square() {
        let mut board = parse(SQUARE).unwrap();

        // nothing is forced while every island could still take four
        assert!(!board.required_fill());
        assert!(board.cap_to_avoid_joined_isolation());
        assert!(board.rivers().all(|river| river.to_give() == 1));
        assert!(board.required_fill());
        assert!(board.is_solved());
    }

    #[test]
    fn self_isolation() {
        let mut board = parse("2.2..
.....
1.1..
").unwrap();
        let top = board.river_with(island(&board, 0, 0), island(&board, 2, 0)).unwrap();
        board.add_bridge(top).unwrap();
        assert_eq!(board.cluster_count(), 3);
        assert_eq!(board.river(top).to_give(), 1);

        assert!(board.cap_to_avoid_self_isolation());
        assert_eq!(board.river(top).to_give(), 0);
        assert!(!board.cap_to_avoid_self_isolation());
        assert_consistent(&board);
    }

    #[test]
    fn must_provide_spreads_excess() {
        let mut board = parse("2.3.2").unwrap();
        let center = island(&board, 2, 0);
        let rivers = board.island(center).live_rivers().to_vec();

        assert!(board.must_provide(&rivers, 3));
        assert!(rivers.iter().all(|river| board.river(*river).bridges() == 1));
        assert_eq!(board.island(center).need(), 1);
        assert_consistent(&board);
    }

    #[test]
    fn solve_by_filling() {
        let outcome = parse(FILLABLE).unwrap().solve();

        assert_eq!(outcome.verdict, Verdict::Solved);
        assert_eq!(format!("{}", outcome.board), "1......
|......
3==4-12
...|..\"
2-1|..\"
|..|..\"
2--3--3
");
        assert_eq!(outcome.stats.passes, 3);
        assert_eq!(outcome.stats.firings_of(Rule::RequiredFill), 2);
        assert_eq!(outcome.stats.trials, 0);
        assert_consistent(&outcome.board);
    }

    #[test]
    fn solved_board_is_a_fixpoint() {
        let solved = parse(FILLABLE).unwrap().solve().board;
        let before = solved.to_string();

        let again = solved.solve();
        assert_eq!(again.verdict, Verdict::Solved);
        assert_eq!(again.stats.passes, 1);
        assert!(again.stats.firings.is_empty());
        assert_eq!(again.board.to_string(), before);
    }

    #[test]
    fn stalled_board_is_a_fixpoint() {
        let stalled = Solver::new()
            .allow_guessing(false)
            .solve(parse(NEEDS_GUESS).unwrap());
        let snapshot = |board: &Board| board.rivers().map(|r| (r.bridges(), r.to_give())).collect_vec();
        let before = snapshot(&stalled.board);

        let again = Solver::new()
            .allow_guessing(false)
            .solve(stalled.board);
        assert_eq!(again.verdict, stalled.verdict);
        assert_eq!(again.stats.passes, 1);
        assert!(again.stats.firings.is_empty());
        assert_eq!(snapshot(&again.board), before);
        assert_consistent(&again.board);
    }

    #[test]
    fn stall_without_guessing() {
        let outcome = Solver::new()
            .allow_guessing(false)
            .solve(parse(NEEDS_GUESS).unwrap());

        assert_eq!(outcome.verdict, Verdict::Stalled(Unsolved::UnmetTarget {
            location: Location(1, 0),
            bridges: 1,
            target: 2,
        }));
        assert_eq!(format!("{}", outcome.board), ".2....1
.|.2--3
.|.....
.3....3
......|
.2.1..|
.1....2
");
        assert_eq!(outcome.stats.trials, 0);
        assert_consistent(&outcome.board);
    }

    #[test]
    fn solve_with_guess() {
        let mut events = Vec::new();
        let outcome = Solver::new()
            .observer(|event| events.push(event.clone()))
            .solve(parse(NEEDS_GUESS).unwrap());

        assert_eq!(outcome.verdict, Verdict::Solved);
        assert_eq!(format!("{}", outcome.board), ".2----1
.|.2==3
.|....|
.3----3
.|....|
.2-1..|
.1----2
");
        assert_eq!(outcome.stats.passes, 6);
        assert_eq!(outcome.stats.trials, 1);
        assert_eq!(outcome.stats.guesses, 1);
        assert_eq!(outcome.stats.firings_of(Rule::CapToAvoidSelfIsolation), 1);
        assert_consistent(&outcome.board);

        let board = &outcome.board;
        let top = board.river_with(island(board, 1, 0), island(board, 6, 0)).unwrap();
        let guesses = events.iter()
            .filter_map(|event| match event {
                SolveEvent::GuessCommitted { hypothesis } => Some(*hypothesis),
                _ => None,
            })
            .collect_vec();
        assert_eq!(guesses, vec![Hypothesis { river: top, kind: HypothesisKind::Forbid }]);
        assert_eq!(events.iter().filter(|e| matches!(e, SolveEvent::RuleFired { .. })).count(), 6);
        assert_eq!(events.last(), Some(&SolveEvent::PassCompleted { pass: 6 }));
        assert!(!events.iter().any(|e| matches!(e, SolveEvent::ContradictionFound { .. })));
    }

    #[test]
    fn timed_solve() {
        let outcome = Solver::new()
            .timed(true)
            .solve(parse(NEEDS_GUESS).unwrap());
        let stats = &outcome.stats;

        assert_eq!(outcome.verdict, Verdict::Solved);
        assert!(stats.elapsed > Duration::ZERO);
        assert!(stats.guessing > Duration::ZERO);
        assert!(stats.cloning > Duration::ZERO);
        assert!(stats.cloning <= stats.guessing);
        assert!(stats.guessing <= stats.elapsed);
        assert!(stats.profile().starts_with("solve: "));

        // untimed solves never read the clock
        let untimed = parse(NEEDS_GUESS).unwrap().solve().stats;
        assert_eq!(untimed.trials, stats.trials);
        assert_eq!(untimed.elapsed, Duration::ZERO);
        assert_eq!(untimed.guessing, Duration::ZERO);
        assert_eq!(untimed.cloning, Duration::ZERO);
    }

    #[test]
    fn hypothesis_leaves_board_untouched() {
        let board = Solver::new()
            .allow_guessing(false)
            .solve(parse(NEEDS_GUESS).unwrap())
            .board;
        let top = board.river_with(island(&board, 1, 0), island(&board, 6, 0)).unwrap();
        let before = board.to_string();

        let forbidden = board.with_hypothesis(Hypothesis { river: top, kind: HypothesisKind::Forbid }).unwrap();
        assert_eq!(forbidden.river(top).to_give(), 0);
        let saturated = board.with_hypothesis(Hypothesis { river: top, kind: HypothesisKind::Saturate }).unwrap();
        assert_eq!(saturated.river(top).bridges(), 1);

        assert_eq!(board.river(top).to_give(), 1);
        assert_eq!(board.river(top).bridges(), 0);
        assert_eq!(board.to_string(), before);
        assert_consistent(&board);

        assert!(board.refutes(Hypothesis { river: top, kind: HypothesisKind::Forbid }));
    }

    #[test]
    fn guess_commits_one_change() {
        let mut board = Solver::new()
            .allow_guessing(false)
            .solve(parse(NEEDS_GUESS).unwrap())
            .board;
        let top = board.river_with(island(&board, 1, 0), island(&board, 6, 0)).unwrap();

        let guess = board.make_a_guess();
        assert_eq!(guess.committed, Some(Hypothesis { river: top, kind: HypothesisKind::Forbid }));
        assert_eq!(guess.trials, 1);
        assert_eq!(board.river(top).bridges(), 1);
        assert_consistent(&board);
    }

    #[test]
    fn solve_with_corners() {
        let outcome = Solver::new()
            .allow_guessing(false)
            .solve(parse(NEEDS_CORNERS).unwrap());

        assert_eq!(outcome.verdict, Verdict::Solved);
        assert_eq!(format!("{}", outcome.board), "1.2-----2
|.|.....|
3.|.3===4
\".2.|.1.|
\".|.|.|.|
\".1.|.3.|
\"...|.\".|
3---3-3.1
.........
");
        assert_eq!(outcome.stats.firings_of(Rule::BadCorners), 1);
        assert_consistent(&outcome.board);
    }

    #[test]
    fn rules_are_monotone() {
        let mut board = parse(NEEDS_GUESS).unwrap();
        let snapshot = |board: &Board| board.rivers().map(|r| (r.bridges(), r.to_give())).collect_vec();

        for _ in 0..4 {
            for rule in Rule::VARIANTS {
                let before = snapshot(&board);
                board.apply(*rule);
                let after = snapshot(&board);
                for ((bridges_before, to_give_before), (bridges_after, to_give_after)) in before.into_iter().zip(after) {
                    assert!(bridges_after >= bridges_before, "{} removed a bridge", rule);
                    assert!(to_give_after <= to_give_before, "{} raised a capacity", rule);
                }
                assert_consistent(&board);
            }
        }
        assert!(board.is_solved());
    }

    #[test]
    fn overfull_pair_is_contradiction() {
        let board = parse("44").unwrap();
        assert_eq!(board.check_mistakes(), Err(Contradiction::UnderSupplied {
            location: Location(0, 0),
            needed: 4,
            available: 2,
        }));

        let outcome = board.solve();
        assert!(matches!(outcome.verdict, Verdict::Contradiction(Contradiction::UnderSupplied { .. })));
        assert!(outcome.board.has_mistakes());
        assert_eq!(format!("{}", outcome.board), "44\n");
    }

    #[test]
    fn lone_island() {
        let board = parse("1").unwrap();
        let only = island(&board, 0, 0);

        assert_eq!(board.river_with(only, only), None);
        assert!(board.island(only).rivers().is_empty());
        assert_eq!(board.verify(), Err(Unsolved::UnmetTarget {
            location: Location(0, 0),
            bridges: 0,
            target: 1,
        }));
        assert!(!board.is_solved());
    }

    #[test]
    fn bridge_closes_crossing() {
        let mut board = parse(".2.
2.2
.2.
").unwrap();
        let horizontal = board.river_with(island(&board, 0, 1), island(&board, 2, 1)).unwrap();
        let vertical = board.river_with(island(&board, 1, 0), island(&board, 1, 2)).unwrap();
        assert_eq!(board.river(horizontal).crossings(), &[vertical]);
        assert_eq!(board.river(vertical).to_give(), 2);

        board.add_bridge(horizontal).unwrap();
        assert_eq!(board.river(vertical).to_give(), 0);
        assert_eq!(board.add_bridge(vertical), Err(CapacityExceeded::Saturated(RiverSpan {
            from: Location(1, 0),
            to: Location(1, 2),
        })));
        assert_eq!(format!("{}", board), ".2.
2-2
.2.
");
        assert!(board.has_mistakes());
        assert_consistent(&board);
    }

    #[test]
    fn bridge_mutation() {
        let mut board = parse("1.1
...
..1
").unwrap();
        let (left, right, corner) = (island(&board, 0, 0), island(&board, 2, 0), island(&board, 2, 2));

        assert_eq!(
            board.add_bridge_between(left, corner),
            Err(CapacityExceeded::NotAdjacent(Location(0, 0), Location(2, 2))),
        );

        board.add_bridge_between(left, right).unwrap();
        assert_eq!(board.cluster_of(left), board.cluster_of(right));
        assert_eq!(board.cluster_count(), 2);
        assert!(board.island(left).is_complete());
        // the right island is done, so its river down is closed too
        let down = board.river_with(right, corner).unwrap();
        assert_eq!(board.river(down).to_give(), 0);
        assert!(board.add_bridge_between(left, right).is_err());
        assert!(board.has_mistakes());
        assert_consistent(&board);
    }

    #[test]
    fn stranded_then_disconnected() {
        let mut board = parse(FOUR_CORNERS).unwrap();
        let (top_left, top_right) = (island(&board, 0, 0), island(&board, 2, 0));
        let (bottom_left, bottom_right) = (island(&board, 0, 2), island(&board, 2, 2));

        board.add_bridge_between(top_left, top_right).unwrap();
        assert_eq!(board.check_mistakes(), Err(Contradiction::StrandedCluster {
            size: 2,
            location: Location(0, 0),
        }));

        board.add_bridge_between(bottom_left, bottom_right).unwrap();
        assert!(board.islands().all(|island| island.is_complete()));
        assert_eq!(board.verify(), Err(Unsolved::Disconnected(2)));
        assert_consistent(&board);
    }

    #[test]
    fn broken_partition_is_partial_cluster() {
        let mut board = parse(FOUR_CORNERS).unwrap();
        let (top_left, top_right) = (island(&board, 0, 0), island(&board, 2, 0));
        let (bottom_left, bottom_right) = (island(&board, 0, 2), island(&board, 2, 2));
        board.add_bridge_between(top_left, top_right).unwrap();
        board.add_bridge_between(bottom_left, bottom_right).unwrap();

        let bottom = board.cluster_of(bottom_left);
        board.clusters.remove(&bottom);
        assert_eq!(board.cluster_count(), 1);
        assert_eq!(board.verify(), Err(Unsolved::PartialCluster { size: 2, total: 4 }));
    }

    #[test]
    fn overloaded_river() {
        let mut board = parse("11").unwrap();
        let river = board.river_with(island(&board, 0, 0), island(&board, 1, 0)).unwrap();
        let span = RiverSpan { from: Location(0, 0), to: Location(1, 0) };

        board.graph[river].bridges = 2;
        assert_eq!(board.check_mistakes(), Err(Contradiction::RiverOverTarget {
            span,
            bridges: 2,
            location: Location(0, 0),
            target: 1,
        }));

        board.graph[river].bridges = 3;
        assert_eq!(board.verify(), Err(Unsolved::RiverOverMax { span, bridges: 3, max: 2 }));
    }

    #[test]
    fn neighbors_are_symmetric() {
        let board = parse(FILLABLE).unwrap();

        for id in board.island_ids() {
            for direction in Direction::VARIANTS {
                let Some(other) = board.island_towards(id, *direction) else {
                    continue;
                };
                assert_eq!(board.island_towards(other, direction.invert()), Some(id));
                let river = board.river_with(id, other).unwrap();
                assert_eq!(board.river(river).orientation(), direction.orientation());
            }
        }
        assert_eq!(board.island_towards(island(&board, 0, 0), Direction::Up), None);
        assert_eq!(board.island_towards(island(&board, 0, 0), Direction::Down), Some(island(&board, 0, 2)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse("22\n2\n").err(), Some(ConstructionError::DimensionMismatch { row: 1, expected: 2, found: 1 }));
        assert_eq!(parse("").err(), Some(ConstructionError::Empty));
        assert_eq!(parse("\n\r\n").err(), Some(ConstructionError::Empty));

        let board: Board = "2.2\r\n\r\n2 2\r\n".parse().unwrap();
        assert_eq!(board.islands().count(), 4);
        assert_eq!(board.dims(), (NonZero::new(3).unwrap(), NonZero::new(2).unwrap()));
    }

    #[test]
    fn builder_invalid() {
        let mut builder = BoardBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()));
        builder.add_island(Location(0, 0), 2).add_island(Location(3, 0), 1);
        assert_eq!(builder.is_valid(), Some(&vec![ConstructionError::FeatureOutOfBounds(Location(3, 0))]));
        assert!(builder.build().is_err());

        let mut builder = BoardBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(1).unwrap()));
        builder.add_island(Location(0, 0), 9);
        assert_eq!(builder.build().err(), Some(ConstructionError::TargetOutOfRange { location: Location(0, 0), target: 9 }));
    }

    #[test]
    fn builder_matches_parse() {
        let board = BoardBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_island(Location(0, 0), 2)
            .add_island(Location(2, 0), 2)
            .add_island(Location(0, 2), 2)
            .add_island(Location(2, 2), 2)
            .add_island(Location(1, 1), 3)
            .drop_location(Location(1, 1))
            .build()
            .unwrap();

        assert_eq!(board.to_string(), parse(SQUARE).unwrap().to_string());
        assert_eq!(board.solve().verdict, Verdict::Solved);
    }
}
