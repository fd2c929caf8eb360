//! Schema store scenarios driven through textual accessors.

use manuscript_core::schema::{PluralNames, SchemaError, SchemaPreset, SchemaStore};
use serde_json::{json, Value};

fn store() -> SchemaStore {
    SchemaStore::from_value(
        &json!({
            "Character": {"Name": {"Role": "String", "Traits": ["List of Strings"]}},
            "Scene": {"Chapter_Title": [{
                "Section_Title": "String",
                "Setting": "String",
                "Characters": ["List of Strings"]
            }]},
            "Place": [{"Place": "String", "Description": "String", "Significance": "String"}]
        }),
        &PluralNames::new(),
    )
    .unwrap()
}

fn call(store: &mut SchemaStore, accessor: &str, args: Vec<Value>) -> Option<Value> {
    store.invoke_positional(accessor, args).unwrap()
}

#[test]
fn test_get_schema_returns_shape_unchanged() {
    let mut store = store();
    assert_eq!(
        call(&mut store, "get_place_schema", vec![]),
        Some(json!([{"Place": "String", "Description": "String", "Significance": "String"}]))
    );
    assert_eq!(store.schema().len(), 3);
}

#[test]
fn test_remove_character_keeps_others() {
    let mut store = store();
    let hero = json!({"Role": "Protagonist", "Traits": ["Brave", "Curious"]});
    call(&mut store, "add_character", vec![json!("Alice"), hero.clone()]);
    call(&mut store, "add_character", vec![json!("Bob"), hero.clone()]);
    call(&mut store, "remove_character", vec![json!("Alice")]);

    assert_eq!(call(&mut store, "get_character", vec![json!("Alice")]), Some(json!({})));
    assert_eq!(call(&mut store, "get_character", vec![json!("Bob")]), Some(hero));
    // Removing again is silent.
    call(&mut store, "remove_character", vec![json!("Alice")]);
}

#[test]
fn test_remove_whole_chapter() {
    let mut store = store();
    call(&mut store, "add_scene", vec![json!("Chapter 1"), json!({"Setting": "Forest"})]);
    call(&mut store, "add_scene", vec![json!("Chapter 2"), json!({"Setting": "Castle"})]);
    call(&mut store, "remove_scene", vec![json!("Chapter 1")]);

    assert_eq!(call(&mut store, "get_scene", vec![json!("Chapter 1")]), None);
    assert_eq!(call(&mut store, "get_scene", vec![json!("Chapter 1"), json!(0)]), None);
    assert_eq!(
        call(&mut store, "get_scenes", vec![]),
        Some(json!({"Chapter 2": [{"Setting": "Castle"}]}))
    );
}

#[test]
fn test_drain_all_scenes() {
    let mut store = store();
    call(&mut store, "add_scene", vec![json!("Chapter 1"), json!({"Setting": "A"})]);
    call(&mut store, "add_scene", vec![json!("Chapter 1"), json!({"Setting": "B"})]);
    call(&mut store, "add_scene", vec![json!("Chapter 2"), json!({"Setting": "C"})]);

    for (chapter, count) in [("Chapter 1", 2), ("Chapter 2", 1)] {
        for _ in 0..count {
            call(&mut store, "remove_scene", vec![json!(chapter), json!(0)]);
        }
    }
    assert_eq!(
        call(&mut store, "get_scenes", vec![]),
        Some(json!({"Chapter 1": [], "Chapter 2": []}))
    );
}

#[test]
fn test_remove_scene_from_missing_chapter_raises() {
    let mut store = store();
    let err = store
        .invoke_positional("remove_scene", vec![json!("Chapter 9"), json!(0)])
        .unwrap_err();
    assert!(matches!(err, SchemaError::Field { .. }));
}

#[test]
fn test_place_list_by_index() {
    let mut store = store();
    let forest = json!({"Place": "Forest", "Description": "Dark and spooky", "Significance": "Initial setting"});
    call(&mut store, "add_place", vec![forest.clone()]);

    assert_eq!(call(&mut store, "get_place", vec![]), Some(json!([forest.clone()])));
    assert_eq!(call(&mut store, "get_place", vec![json!(0)]), Some(forest));

    call(&mut store, "remove_place", vec![json!(0)]);
    assert_eq!(call(&mut store, "get_place", vec![json!(0)]), None);
}

#[test]
fn test_unknown_accessor() {
    let mut store = store();
    let err = store.invoke_positional("add_dragon", vec![json!("Smaug"), json!({})]).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownAccessor(_)));
}

#[test]
fn test_story_timeline_nested_record() {
    let mut store = SchemaPreset::Story.build().unwrap();
    let august = json!({"August": {"30": [{"Event": "Alice falls", "Type": "Normal"}]}});
    call(&mut store, "add_timeline", vec![json!("2023"), august.clone()]);

    assert_eq!(call(&mut store, "get_timeline", vec![json!("2023")]), Some(august.clone()));
    assert_eq!(call(&mut store, "get_timelines", vec![]), Some(json!({"2023": august})));
}

#[test]
fn test_research_genre_plural_alias() {
    let mut store = "experimental".parse::<SchemaPreset>().unwrap().build().unwrap();
    call(
        &mut store,
        "add_analysis",
        vec![json!("ANOVA"), json!({"Statistical_Tests": "F-test"})],
    );
    assert_eq!(
        call(&mut store, "get_analyses", vec![]),
        Some(json!({"ANOVA": {"Statistical_Tests": "F-test"}}))
    );
    assert!(store.invoke_positional("get_analysiss", vec![]).is_err());
}
