//! Integration tests for bracket construction: sizing, BYE handling, wiring,
//! team separation, and division splitting.

use grappling_tournament_web::{
    auto_advance_byes, build_bracket, build_brackets, build_division_brackets, group_label,
    split_roster, Athlete, Belt, BracketError, BracketOptions, CheckInStatus, Division,
    FighterSlot, Gender,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

fn division() -> Division {
    Division::new(
        "Adult Male White -70kg",
        Gender::Male,
        Belt::White,
        18,
        29,
        0.0,
        70.0,
        false,
    )
}

fn athletes(n: usize, division: &Division) -> Vec<Athlete> {
    (0..n)
        .map(|i| {
            Athlete::new(
                format!("A{i}"),
                format!("Club {}", i % 4),
                Gender::Male,
                Belt::White,
                65.0,
                division.id,
            )
        })
        .collect()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn bracket_size_is_next_power_of_two_and_byes_fill_the_gap() {
    let div = division();
    for n in 2..=17 {
        let roster = athletes(n, &div);
        let b = build_bracket(&div, &roster, None, &BracketOptions::default(), &mut rng()).unwrap();
        let expected_size = n.next_power_of_two();
        assert_eq!(b.bracket_size, expected_size, "n={n}");
        assert_eq!(b.bye_count(), expected_size - n, "n={n}");
        assert_eq!(b.participants.len(), expected_size, "n={n}");
        assert_eq!(b.rounds.len(), expected_size.trailing_zeros() as usize);
        // BYEs are spread: no round-1 match has two BYE slots.
        for m in &b.rounds[0] {
            assert!(
                !(m.fighter1.is_bye() && m.fighter2.is_bye()),
                "n={n}: double-BYE match"
            );
        }
    }
}

#[test]
fn empty_roster_is_rejected() {
    let div = division();
    let result = build_bracket(&div, &[], None, &BracketOptions::default(), &mut rng());
    assert!(matches!(result, Err(BracketError::EmptyRoster)));
}

#[test]
fn single_athlete_is_a_walkover_champion() {
    let div = division();
    let roster = athletes(1, &div);
    let b = build_bracket(&div, &roster, None, &BracketOptions::default(), &mut rng()).unwrap();
    assert_eq!(b.bracket_size, 1);
    assert!(b.rounds.is_empty());
    assert_eq!(b.winner_id, Some(roster[0].id));
    assert!(b.third_place_match.is_none());
    assert!(b.is_decided());
}

#[test]
fn rounds_are_wired_pairwise() {
    let div = division();
    let roster = athletes(8, &div);
    let b = build_bracket(&div, &roster, None, &BracketOptions::default(), &mut rng()).unwrap();
    assert_eq!(b.rounds.len(), 3);
    for r in 0..b.rounds.len() - 1 {
        for j in 0..b.rounds[r].len() {
            let next = &b.rounds[r + 1][j / 2];
            assert_eq!(b.rounds[r][j].next_match_id, Some(next.id));
            assert_eq!(next.prev_match_ids[j % 2], b.rounds[r][j].id);
        }
    }
    let final_match = b.final_match().unwrap();
    assert!(final_match.next_match_id.is_none());
    let third = b.third_place_match.as_ref().unwrap();
    assert!(third.next_match_id.is_none());
    let semi_ids: Vec<_> = b.rounds[1].iter().map(|m| m.id).collect();
    assert_eq!(third.prev_match_ids, semi_ids);
}

#[test]
fn three_athletes_get_one_bye_match_auto_resolved() {
    let div = division();
    let roster = athletes(3, &div);
    let b = build_bracket(&div, &roster, None, &BracketOptions::default(), &mut rng()).unwrap();
    assert_eq!(b.bracket_size, 4);
    assert_eq!(b.bye_count(), 1);
    assert_eq!(b.rounds.len(), 2);

    let bye_match = b.rounds[0].iter().find(|m| m.has_bye()).unwrap();
    let real_match = b.rounds[0].iter().find(|m| m.is_contested()).unwrap();
    // The BYE side advanced automatically: winner set, no loser, no result.
    assert!(bye_match.winner_id.is_some());
    assert!(bye_match.loser_id.is_none());
    assert!(bye_match.result.is_none());
    assert!(real_match.winner_id.is_none());

    // The advanced fighter already sits in the final's slot for that semi.
    let final_match = b.final_match().unwrap();
    let idx = final_match
        .prev_match_ids
        .iter()
        .position(|&p| p == bye_match.id)
        .unwrap();
    let slot = if idx == 0 {
        final_match.fighter1
    } else {
        final_match.fighter2
    };
    assert_eq!(slot, FighterSlot::Athlete(bye_match.winner_id.unwrap()));
}

#[test]
fn bye_auto_advance_is_idempotent() {
    let div = division();
    let roster = athletes(5, &div);
    let mut b =
        build_bracket(&div, &roster, None, &BracketOptions::default(), &mut rng()).unwrap();
    let snapshot = b.clone();
    auto_advance_byes(&mut b);
    assert_eq!(b, snapshot);
    auto_advance_byes(&mut b);
    assert_eq!(b, snapshot);
}

#[test]
fn same_seed_gives_same_bracket() {
    let div = division();
    let roster = athletes(9, &div);
    let options = BracketOptions::default();
    let a = build_bracket(&div, &roster, None, &options, &mut rng()).unwrap();
    let b = build_bracket(&div, &roster, None, &options, &mut rng()).unwrap();
    assert_eq!(a.participants, b.participants);
}

#[test]
fn team_separation_splits_two_clubs_of_two() {
    let div = division();
    let mut roster = athletes(4, &div);
    roster[0].club = "Alpha".into();
    roster[1].club = "Alpha".into();
    roster[2].club = "Beta".into();
    roster[3].club = "Beta".into();
    let by_id: HashMap<_, _> = roster.iter().map(|a| (a.id, a.club.clone())).collect();

    let options = BracketOptions {
        team_separation: true,
        ..BracketOptions::default()
    };
    // Any shuffle of 2+2 clubs is separable, whatever the seed.
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let b = build_bracket(&div, &roster, None, &options, &mut rng).unwrap();
        for m in &b.rounds[0] {
            let (Some(f1), Some(f2)) = (m.fighter1.athlete(), m.fighter2.athlete()) else {
                continue;
            };
            assert_ne!(by_id[&f1], by_id[&f2], "seed {seed}: same-club pairing");
        }
    }
}

#[test]
fn team_separation_terminates_when_one_club_dominates() {
    let div = division();
    let mut roster = athletes(8, &div);
    for a in &mut roster {
        a.club = "Monopoly".into();
    }
    let options = BracketOptions {
        team_separation: true,
        ..BracketOptions::default()
    };
    // Best-effort only: must terminate and still build a valid bracket.
    let b = build_bracket(&div, &roster, None, &options, &mut rng()).unwrap();
    assert_eq!(b.bracket_size, 8);
}

#[test]
fn group_labels_are_letters_then_numbers() {
    assert_eq!(group_label(0), "A");
    assert_eq!(group_label(1), "B");
    assert_eq!(group_label(25), "Z");
    assert_eq!(group_label(26), "27");
}

#[test]
fn split_roster_never_leaves_a_group_of_one() {
    let div = division();
    let roster = athletes(9, &div);
    let groups = split_roster(&roster, 4, &mut rng());
    let mut sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
    sizes.sort();
    assert_eq!(sizes, vec![4, 5]);
}

#[test]
fn seventeen_athletes_split_at_eight_into_eight_and_nine() {
    let div = division();
    let roster = athletes(17, &div);
    let options = BracketOptions {
        max_per_group: Some(8),
        ..BracketOptions::default()
    };
    let brackets = build_division_brackets(&div, &roster, &options, &mut rng()).unwrap();
    assert_eq!(brackets.len(), 2);
    let mut sizes: Vec<usize> = brackets
        .iter()
        .map(|b| b.participants.len() - b.bye_count())
        .collect();
    sizes.sort();
    assert_eq!(sizes, vec![8, 9]);
    let ids: Vec<_> = brackets.iter().map(|b| b.id.clone()).collect();
    assert!(ids.contains(&format!("{}-A", div.id)));
    assert!(ids.contains(&format!("{}-B", div.id)));
    assert!(brackets.iter().all(|b| b.group_name.is_some()));
}

#[test]
fn regeneration_purges_stale_split_groups() {
    let div = division();
    let roster = athletes(20, &div);
    let split_options = BracketOptions {
        max_per_group: Some(8),
        ..BracketOptions::default()
    };
    let mut map = HashMap::new();
    for b in build_division_brackets(&div, &roster, &split_options, &mut rng()).unwrap() {
        map.insert(b.id.clone(), b);
    }
    assert_eq!(map.len(), 3); // 8 + 8 + 4

    // Regenerate without splitting: the lettered brackets must disappear.
    let merged_options = BracketOptions::default();
    let ids = grappling_tournament_web::regenerate_division(
        &mut map,
        &div,
        &roster,
        &merged_options,
        &mut rng(),
    )
    .unwrap();
    assert_eq!(ids, vec![div.id.to_string()]);
    assert_eq!(map.len(), 1);
    assert!(map.contains_key(&div.id.to_string()));
}

#[test]
fn build_brackets_skips_unchecked_athletes_and_reports_empty_divisions() {
    let div_a = division();
    let mut div_b = division();
    div_b.name = "Adult Male Blue -70kg".into();
    div_b.belt = Belt::Blue;

    let mut roster = athletes(4, &div_a);
    for a in &mut roster {
        a.check_in = CheckInStatus::CheckedIn;
    }
    // A pending athlete in division B does not count toward generation.
    roster.push(Athlete::new(
        "Pending",
        "Club X",
        Gender::Male,
        Belt::Blue,
        65.0,
        div_b.id,
    ));

    let report = build_brackets(
        &[div_a.clone(), div_b.clone()],
        &roster,
        &BracketOptions::default(),
        &mut rng(),
    );
    assert_eq!(report.brackets.len(), 1);
    assert_eq!(report.brackets[0].division_id, div_a.id);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        report.errors[0],
        (id, BracketError::EmptyRoster) if id == div_b.id
    ));
}

#[test]
fn moved_athlete_lands_in_the_target_division_bracket() {
    let div_a = division();
    let mut div_b = division();
    div_b.name = "Adult Male White -77kg".into();
    div_b.max_weight = 77.0;

    let mut roster = athletes(4, &div_a);
    for a in &mut roster {
        a.check_in = CheckInStatus::CheckedIn;
    }
    roster[3].moved_to_division_id = Some(div_b.id);

    let report = build_brackets(
        &[div_a.clone(), div_b.clone()],
        &roster,
        &BracketOptions::default(),
        &mut rng(),
    );
    // Division A keeps 3 athletes; the moved one becomes B's walkover champion.
    let a_bracket = report
        .brackets
        .iter()
        .find(|b| b.division_id == div_a.id)
        .unwrap();
    let b_bracket = report
        .brackets
        .iter()
        .find(|b| b.division_id == div_b.id)
        .unwrap();
    assert_eq!(a_bracket.participants.len() - a_bracket.bye_count(), 3);
    assert_eq!(b_bracket.winner_id, Some(roster[3].id));
}
