//! Description import integration tests.
//!
//! Imported actions go all the way to stored records and back.

use ability_effects::codec::{reconstruct, FlatList};
use ability_effects::effects::{
    DamageType, EffectKind, EffectTree, Escape, OutcomeAmount, OutcomeContext, SaveAbility,
};
use ability_effects::parser::{
    build_effect_tree, extract_dice_formula, parse_action, parse_actions, parse_conditions,
    parse_damage_type, parse_saving_throw, MonsterAction, RangeKind, RangeReach,
};
use ability_effects::NodeId;

fn tree_of(effects: FlatList) -> EffectTree {
    reconstruct(effects).unwrap()
}

fn root(tree: &EffectTree) -> NodeId {
    let roots: Vec<_> = tree.roots().cloned().collect();
    assert_eq!(roots.len(), 1, "expected one root");
    roots[0].clone()
}

fn condition_of(tree: &EffectTree, id: &NodeId) -> String {
    tree.get(id).unwrap().kind.as_condition().unwrap().condition.clone()
}

// =============================================================================
// Field Parsers
// =============================================================================

#[test]
fn test_save_fixtures() {
    let save = parse_saving_throw("DC 15 DEX save or take damage").unwrap();
    assert_eq!((save.dc, save.save_type, save.half_on_save), (15, SaveAbility::Dexterity, false));

    let save = parse_saving_throw("DC 21 DEX save for half damage").unwrap();
    assert!(save.half_on_save);
}

#[test]
fn test_formula_field_fixture() {
    assert_eq!(extract_dice_formula("5d8+13 Radiant").as_deref(), Some("5d8+13"));
    assert_eq!(parse_damage_type(Some("5d8+13 Radiant"), None), DamageType::Radiant);
    assert_eq!(parse_damage_type(Some("3d6 holy"), None), DamageType::Radiant);
    assert_eq!(parse_damage_type(None, Some("A shove.")), DamageType::Bludgeoning);
}

#[test]
fn test_condition_fixture() {
    let found = parse_conditions("On crit: [[Stunned]]");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].condition, "stunned");
    assert_eq!(found[0].context, OutcomeContext::CriticalHit);
}

// =============================================================================
// Tree Shapes
// =============================================================================

#[test]
fn test_formula_field_gives_damage_root() {
    let action = MonsterAction::new("Greataxe", "Melee attack.").with_damage_formula("2d6+4 Slashing");
    let tree = tree_of(build_effect_tree(&action));
    let root = root(&tree);

    let damage = tree.get(&root).unwrap().kind.as_damage().unwrap();
    assert_eq!(damage.damage_type, DamageType::Slashing);
    assert_eq!(damage.formula, "2d6+4");

    let hit = tree.children(&root, OutcomeContext::Hit);
    assert_eq!(hit.len(), 1);
    assert!(matches!(
        &tree.get(&hit[0]).unwrap().kind,
        EffectKind::DamageOutcome(outcome) if outcome.outcome == OutcomeAmount::FullDamage
    ));
}

#[test]
fn test_conditions_split_by_edge() {
    let tree = tree_of(parse_action(
        "Bite. 2d8+3 piercing damage. On crit: [[Prone]]. The target is [[Grappled]] (escape DC 13).",
    ));
    let root = root(&tree);

    let damage = tree.get(&root).unwrap().kind.as_damage().unwrap();
    assert_eq!((damage.formula.as_str(), damage.damage_type), ("2d8+3", DamageType::Piercing));

    let hit = tree.children(&root, OutcomeContext::Hit);
    assert_eq!(hit.len(), 2);
    assert_eq!(condition_of(&tree, &hit[1]), "grappled");
    let grab = tree.get(&hit[1]).unwrap().kind.as_condition().unwrap();
    assert_eq!(grab.escape, Some(Escape { dc: 13, ability: None }));

    let crit = tree.children(&root, OutcomeContext::CriticalHit);
    assert_eq!(crit.len(), 1);
    assert_eq!(condition_of(&tree, &crit[0]), "prone");
}

#[test]
fn test_save_without_damage() {
    let tree = tree_of(parse_action("DC 13 WIL save or the target is frightened."));
    let root = root(&tree);

    let save = tree.get(&root).unwrap().kind.as_saving_throw().unwrap();
    assert_eq!((save.saving_throw_type, save.save_dc), (SaveAbility::Will, Some(13)));
    assert!(tree.children(&root, OutcomeContext::SharedRolls).is_empty());

    let failed = tree.children(&root, OutcomeContext::FailedSave);
    assert_eq!(failed.len(), 1);
    assert_eq!(condition_of(&tree, &failed[0]), "frightened");
}

#[test]
fn test_save_condition_attached_once() {
    let tree = tree_of(parse_action("DC 14 DEX save or [[Prone]]. On crit: [[Prone]]."));
    let root = root(&tree);

    let failed = tree.children(&root, OutcomeContext::FailedSave);
    let names: Vec<_> = failed.iter().map(|id| condition_of(&tree, id)).collect();
    assert_eq!(names, vec!["prone"]);
}

#[test]
fn test_save_keeps_distinct_conditions() {
    let tree = tree_of(parse_action("DC 12 STR save or [[Prone]]. On crit: [[Stunned]]."));
    let root = root(&tree);

    let failed = tree.children(&root, OutcomeContext::FailedSave);
    let names: Vec<_> = failed.iter().map(|id| condition_of(&tree, id)).collect();
    assert_eq!(names, vec!["prone", "stunned"]);
}

#[test]
fn test_import_is_deterministic() {
    let action = MonsterAction::new("Breath", "Cone 30. DC 18 DEX save for half damage.")
        .with_damage_formula("10d6 fire");
    assert_eq!(build_effect_tree(&action), build_effect_tree(&action));

    let json = build_effect_tree(&action).to_json().unwrap();
    assert_eq!(FlatList::from_json(&json).unwrap(), build_effect_tree(&action));
}

// =============================================================================
// Batch Import
// =============================================================================

#[test]
fn test_batch_keeps_every_action() {
    let actions = vec![
        MonsterAction::new("Claw", "Reach 10. 1d10+4 slashing damage."),
        MonsterAction::new("", ""),
        MonsterAction::new("Roar", "The creature bellows."),
        MonsterAction::new("Spit", "Range 30. 2d6 acid damage.")
            .with_range(RangeReach { kind: RangeKind::Range, distance: 60, width: None }),
    ];

    let parsed = parse_actions(&actions);
    assert_eq!(parsed.len(), 4);

    assert_eq!(parsed[0].name, "Claw");
    assert!(!parsed[0].effects.is_empty());
    assert_eq!(parsed[0].range, Some(RangeReach { kind: RangeKind::Reach, distance: 10, width: None }));

    assert!(parsed[1].effects.is_empty());
    assert!(parsed[2].effects.is_empty());

    // The recorded range wins over the text.
    assert_eq!(parsed[3].range.map(|r| r.distance), Some(60));
}

#[test]
fn test_hostile_text_yields_no_panic() {
    let texts = [
        "DC 99999999999999999999999 DEX save or [[Prone]].",
        "999999999999999999999d6 fire damage.",
        "Reach 99999999999999999999. Cone 99999999999999999999 by 99999999999999999999.",
        "[[[[]]]] [[ [[Prone]] ]] [[",
        "On crit: On hit: On miss:",
        "The target is (escape DC 9999999999999999999999).",
        "Ünïcødé 🐉. DC 1\u{301}4 DEX save; 2d6 fïre damage. [[Ängstlich]]",
        "\n;.\n;.",
        "DC 15 DEX save or",
    ];
    let actions: Vec<_> = texts
        .iter()
        .map(|text| MonsterAction::new("Hostile", *text).with_damage_formula(*text))
        .collect();

    let parsed = parse_actions(&actions);
    assert_eq!(parsed.len(), texts.len());
    for action in &parsed {
        // Whatever came out must still load as a tree.
        assert!(reconstruct(action.effects.clone()).is_ok());
    }
}

#[test]
fn test_batch_from_wire_records() {
    let actions: Vec<MonsterAction> = serde_json::from_str(
        r#"[
            {"name":"Slam","description":"Melee.","damageFormula":"2d8+5 Bludgeoning"},
            {"name":"Gaze","description":"DC 14 INT save or [[Charmed]]."}
        ]"#,
    )
    .unwrap();

    let parsed = parse_actions(&actions);
    let slam = tree_of(parsed[0].effects.clone());
    assert_eq!(slam.get(&root(&slam)).unwrap().kind.as_damage().unwrap().formula, "2d8+5");

    let gaze = tree_of(parsed[1].effects.clone());
    let gaze_root = root(&gaze);
    let failed = gaze.children(&gaze_root, OutcomeContext::FailedSave);
    assert_eq!(failed.len(), 1);
    assert_eq!(condition_of(&gaze, &failed[0]), "charmed");
}
