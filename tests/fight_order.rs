//! Integration tests for mat distribution and the per-mat fight order.

use grappling_tournament_web::{
    build_brackets, category_groups, distribute_mats, generate_fight_order, record_result,
    Athlete, Belt, Bracket, BracketId, BracketOptions, CategoryGroup, CategoryKey, CheckInStatus,
    Division, Gender, MatchResult, ResultType,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

fn division(name: &str, belt: Belt) -> Division {
    Division::new(name, Gender::Male, belt, 18, 29, 0.0, 70.0, false)
}

fn checked_in_athletes(n: usize, division: &Division, belt: Belt) -> Vec<Athlete> {
    (0..n)
        .map(|i| {
            let mut a = Athlete::new(
                format!("{} {i}", division.name),
                format!("Club {}", i % 3),
                Gender::Male,
                belt,
                65.0,
                division.id,
            );
            a.check_in = CheckInStatus::CheckedIn;
            a
        })
        .collect()
}

fn group_with(count: usize, min_age: u32) -> CategoryGroup {
    CategoryGroup {
        key: CategoryKey {
            gender: Gender::Male,
            min_age,
            max_age: min_age + 11,
            belt: Some(Belt::White),
        },
        division_ids: Vec::new(),
        athlete_count: count,
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn distribution_balances_athlete_load_greedily() {
    let groups = vec![
        group_with(5, 10),
        group_with(4, 20),
        group_with(3, 30),
        group_with(2, 40),
    ];
    let assignment = distribute_mats(&groups, 2);
    assert_eq!(assignment.mats.len(), 2);
    // Greedy, largest first: 5 -> Mat 1, 4 -> Mat 2, 3 -> Mat 2 (4 < 5),
    // 2 -> Mat 1 (5 < 7). Both mats end at 7.
    assert_eq!(assignment.mats[0].athlete_count, 7);
    assert_eq!(assignment.mats[1].athlete_count, 7);
    assert_eq!(assignment.mats[0].mat, "Mat 1");
    assert_eq!(assignment.mats[1].mat, "Mat 2");
}

#[test]
fn distribution_ties_break_by_mat_index() {
    let groups = vec![group_with(3, 10), group_with(3, 20)];
    let assignment = distribute_mats(&groups, 2);
    // Both mats start empty; the first group goes to the lower-index mat.
    assert_eq!(assignment.mats[0].groups.len(), 1);
    assert_eq!(assignment.mats[1].groups.len(), 1);
}

#[test]
fn zero_mats_yields_an_empty_assignment() {
    let assignment = distribute_mats(&[group_with(3, 10)], 0);
    assert!(assignment.is_empty());
}

#[test]
fn belt_grouping_toggles_category_granularity() {
    let white = division("Adult White -70kg", Belt::White);
    let blue = division("Adult Blue -70kg", Belt::Blue);
    let mut roster = checked_in_athletes(3, &white, Belt::White);
    roster.extend(checked_in_athletes(2, &blue, Belt::Blue));
    let divisions = [white.clone(), blue.clone()];

    let strict = category_groups(&divisions, &roster, true);
    assert_eq!(strict.len(), 2);

    let pooled = category_groups(&divisions, &roster, false);
    assert_eq!(pooled.len(), 1);
    assert_eq!(pooled[0].athlete_count, 5);
    assert_eq!(pooled[0].division_ids.len(), 2);
}

#[test]
fn pending_athletes_do_not_count_toward_category_load() {
    let white = division("Adult White -70kg", Belt::White);
    let mut roster = checked_in_athletes(3, &white, Belt::White);
    roster.push(Athlete::new(
        "Pending",
        "Club X",
        Gender::Male,
        Belt::White,
        65.0,
        white.id,
    ));
    let groups = category_groups(&[white], &roster, true);
    assert_eq!(groups[0].athlete_count, 3);
}

fn two_division_setup() -> (Vec<Division>, Vec<Athlete>, HashMap<BracketId, Bracket>) {
    let white = division("Adult White -70kg", Belt::White);
    let blue = division("Adult Blue -70kg", Belt::Blue);
    let mut roster = checked_in_athletes(4, &white, Belt::White);
    roster.extend(checked_in_athletes(4, &blue, Belt::Blue));
    let divisions = vec![white, blue];

    let report = build_brackets(&divisions, &roster, &BracketOptions::default(), &mut rng());
    assert!(report.errors.is_empty());
    let mut brackets = HashMap::new();
    for b in report.brackets {
        brackets.insert(b.id.clone(), b);
    }
    (divisions, roster, brackets)
}

#[test]
fn fight_order_numbers_contested_matches_per_mat() {
    let (divisions, roster, mut brackets) = two_division_setup();
    let groups = category_groups(&divisions, &roster, true);
    let assignment = distribute_mats(&groups, 1);

    let fights = generate_fight_order(&mut brackets, &assignment);

    // Two 4-athlete brackets: only the two semifinals of each are contested.
    assert_eq!(fights.len(), 4);
    let sequences: Vec<u32> = fights.iter().map(|f| f.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
    assert!(fights.iter().all(|f| f.mat == "Mat 1"));
    // Category grouping: both fights of the first group's division come first.
    assert_eq!(fights[0].bracket_id, fights[1].bracket_id);
    assert_eq!(fights[2].bracket_id, fights[3].bracket_id);
    assert_ne!(fights[0].bracket_id, fights[2].bracket_id);

    // The numbered matches carry their mat and sequence marks.
    for f in &fights {
        let m = brackets[&f.bracket_id].match_ref(f.match_id).unwrap();
        assert_eq!(m.mat.as_deref(), Some("Mat 1"));
        assert_eq!(m.sequence, Some(f.sequence));
    }
    // Finals have no fighters yet, so they carry no marks.
    for b in brackets.values() {
        let final_match = b.final_match().unwrap();
        assert_eq!(final_match.mat, None);
        assert_eq!(final_match.sequence, None);
    }
}

#[test]
fn completed_matches_keep_their_place_and_new_rounds_append() {
    let (divisions, roster, mut brackets) = two_division_setup();
    let groups = category_groups(&divisions, &roster, true);
    let assignment = distribute_mats(&groups, 1);
    let fights = generate_fight_order(&mut brackets, &assignment);

    // Decide the first bracket's two semifinals.
    let first_bracket_id = fights[0].bracket_id.clone();
    for f in fights.iter().filter(|f| f.bracket_id == first_bracket_id) {
        let bracket = brackets.get_mut(&f.bracket_id).unwrap();
        record_result(
            bracket,
            f.match_id,
            f.fighter1,
            MatchResult {
                result_type: ResultType::Submission,
                details: Some("armbar".into()),
            },
        )
        .unwrap();
    }

    let fights = generate_fight_order(&mut brackets, &assignment);
    // Semis stay in the order (decided), the final and third place join in.
    let first: Vec<_> = fights
        .iter()
        .filter(|f| f.bracket_id == first_bracket_id)
        .collect();
    assert_eq!(first.len(), 4); // 2 semis + final + third place
    assert!(first[0].decided && first[1].decided);
    assert!(!first[2].decided && !first[3].decided);
    // Rounds ascending, third place numbered after the final.
    let final_round = brackets[&first_bracket_id].total_rounds();
    assert_eq!(first[2].round, final_round);
    assert_eq!(
        first[3].round,
        grappling_tournament_web::THIRD_PLACE_ROUND
    );
    assert!(first[2].sequence < first[3].sequence);
}

#[test]
fn rescheduling_clears_stale_marks() {
    let (divisions, roster, mut brackets) = two_division_setup();
    let groups = category_groups(&divisions, &roster, true);

    let two_mats = distribute_mats(&groups, 2);
    generate_fight_order(&mut brackets, &two_mats);
    let used_mats: std::collections::HashSet<String> = brackets
        .values()
        .flat_map(|b| b.rounds.iter().flatten())
        .filter_map(|m| m.mat.clone())
        .collect();
    assert_eq!(used_mats.len(), 2);

    let one_mat = distribute_mats(&groups, 1);
    generate_fight_order(&mut brackets, &one_mat);
    for b in brackets.values() {
        for m in b.rounds.iter().flatten() {
            if m.is_contested() {
                assert_eq!(m.mat.as_deref(), Some("Mat 1"));
            } else {
                assert_eq!(m.mat, None);
                assert_eq!(m.sequence, None);
            }
        }
    }
}

#[test]
fn split_groups_schedule_in_letter_order() {
    let white = division("Adult White -70kg", Belt::White);
    let roster = checked_in_athletes(10, &white, Belt::White);
    let divisions = vec![white];
    let options = BracketOptions {
        max_per_group: Some(8),
        ..BracketOptions::default()
    };
    let report = build_brackets(&divisions, &roster, &options, &mut rng());
    let mut brackets: HashMap<BracketId, Bracket> = HashMap::new();
    for b in report.brackets {
        brackets.insert(b.id.clone(), b);
    }
    assert_eq!(brackets.len(), 2);

    let groups = category_groups(&divisions, &[], true);
    let assignment = distribute_mats(&groups, 1);
    let fights = generate_fight_order(&mut brackets, &assignment);

    // All of group A's fights are numbered before any of group B's.
    let a_id = fights
        .iter()
        .find(|f| f.bracket_id.ends_with("-A"))
        .map(|f| f.bracket_id.clone())
        .unwrap();
    let last_a = fights
        .iter()
        .filter(|f| f.bracket_id == a_id)
        .map(|f| f.sequence)
        .max()
        .unwrap();
    let first_b = fights
        .iter()
        .filter(|f| f.bracket_id.ends_with("-B"))
        .map(|f| f.sequence)
        .min()
        .unwrap();
    assert!(last_a < first_b);
}
