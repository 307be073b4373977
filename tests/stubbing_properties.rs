use assert_matches::assert_matches;
use mimic_core::matchers::{any, any_int, eq, starts_with};
use mimic_core::value::DefaultValueTable;
use mimic_core::{args, DefaultAnswer, MockError, ReturnKind, SubstituteConfig};
use mimic_tests::{mock_list, ListError, MockStringList, StringList, VecList};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_unprogrammed_operations_return_table_defaults() {
    let list = mock_list();

    assert_eq!(list.get(3), "");
    assert_eq!(list.size(), 0);
    assert!(!list.add("x".to_string()));
    assert!(!list.contains("x".to_string()));
    list.clear();
    assert_eq!(list.remove(0), Ok(String::new()));
}

#[test]
fn test_default_table_overrides() -> anyhow::Result<()> {
    let defaults = DefaultValueTable::standard()
        .with_override(ReturnKind::Text, json!("<none>"))?
        .with_override(ReturnKind::Bool, json!(true))?;
    let list = MockStringList::with_config(SubstituteConfig::default().with_defaults(defaults));

    assert_eq!(list.get(0), "<none>");
    assert!(list.contains("anything".to_string()));
    assert_eq!(list.size(), 0);
    Ok(())
}

#[test]
fn test_default_override_of_wrong_kind_is_rejected() {
    assert_matches!(
        DefaultValueTable::standard().with_override(ReturnKind::Integer, json!("oops")),
        Err(MockError::DefaultTypeMismatch { kind: ReturnKind::Integer, .. })
    );
}

#[test]
fn test_action_queue_is_consumed_then_repeats_last() -> anyhow::Result<()> {
    let list = mock_list();
    list.when("size", args![])?
        .then_return(1)?
        .then_return(2)?
        .then_return(3)?;

    let sizes: Vec<_> = (0..6).map(|_| list.size()).collect();
    assert_eq!(sizes, vec![1, 2, 3, 3, 3, 3]);
    Ok(())
}

#[test]
fn test_queue_mixing_values_and_errors() -> anyhow::Result<()> {
    let list = mock_list();
    list.when("remove", args![any_int()])?
        .then_return_all(["first", "second"])?
        .then_throw(ListError::IndexOutOfBounds { index: 2, size: 2 })?;

    assert_eq!(list.remove(0), Ok("first".to_string()));
    assert_eq!(list.remove(0), Ok("second".to_string()));
    assert_eq!(
        list.remove(0),
        Err(ListError::IndexOutOfBounds { index: 2, size: 2 })
    );
    assert_eq!(
        list.remove(0),
        Err(ListError::IndexOutOfBounds { index: 2, size: 2 })
    );
    Ok(())
}

#[test]
fn test_most_recent_overlapping_rule_wins() -> anyhow::Result<()> {
    let list = mock_list();
    list.when("contains", args![starts_with("a")])?.then_return(true)?;
    list.when("contains", args!["avocado"])?.then_return(false)?;

    assert!(list.contains("apple".to_string()));
    assert!(!list.contains("avocado".to_string()));

    // a later catch-all shadows both
    list.when("contains", args![any()])?.then_return(true)?;
    assert!(list.contains("avocado".to_string()));
    Ok(())
}

#[test]
fn test_inconsistent_stubbing_on_two_argument_capability() {
    use mimic_core::{Capability, OperationSignature, Substitute};

    let capability = Capability::builder("Table")
        .operation(
            OperationSignature::new("set")
                .param("row", "i64")
                .param("value", "String"),
        )
        .build()
        .unwrap();
    let table = Substitute::new(capability);

    let err = table.when("set", args![any_int(), "x"]).unwrap_err();
    assert_matches!(err, MockError::InconsistentStubbing(ref e) if e.literals == 1 && e.matchers == 1);
    assert!(err.to_string().contains("eq()"));

    assert!(table.when("set", args![any_int(), eq("x")]).is_ok());
    assert!(table.when("set", args![1, "x"]).is_ok());
}

#[test]
fn test_spy_only_reaches_original_when_asked() -> anyhow::Result<()> {
    let spy = MockStringList::spy(VecList::with_items(["alpha", "beta"]));

    // stubbed and unstubbed calls never touch the original
    spy.when("get", args![0])?.then_return("stubbed")?;
    assert_eq!(spy.get(0), "stubbed");
    assert_eq!(spy.size(), 0);

    spy.when("get", args![1])?.then_delegate()?;
    assert_eq!(spy.get(1), "beta");
    Ok(())
}

#[test]
fn test_spy_with_call_original_default() -> anyhow::Result<()> {
    let config = SubstituteConfig::named("spy").with_default_answer(DefaultAnswer::CallOriginal);
    let spy = MockStringList::spy_with_config(VecList::with_items(["alpha"]), config);
    spy.when("size", args![])?.then_return(10)?;

    assert!(spy.add("beta".to_string()));
    assert_eq!(spy.get(1), "beta");
    assert_eq!(spy.remove(-1), Err(ListError::IllegalArgument(-1)));
    assert_eq!(spy.size(), 10);

    spy.verify().once().call("add", args!["beta"])?;
    Ok(())
}

#[test]
fn test_answer_computes_from_arguments() -> anyhow::Result<()> {
    let list = mock_list();
    list.when("get", args![any_int()])?
        .then_answer(|args| json!(format!("item #{}", args[0])))?;

    assert_eq!(list.get(4), "item #4");
    assert_eq!(list.get(9), "item #9");
    Ok(())
}

#[test]
fn test_stub_values_are_type_checked() {
    let list = mock_list();

    assert_matches!(
        list.when("size", args![]).and_then(|s| s.then_return("ten")),
        Err(MockError::ReturnTypeMismatch { expected: ReturnKind::Integer, .. })
    );
    assert_matches!(
        list.when("remove", args![0]).and_then(|s| s.then_throw("not a ListError")),
        Err(MockError::ErrorTypeMismatch { .. })
    );
    assert_matches!(
        list.when("clear", args![]).and_then(|s| s.then_return(1)),
        Err(MockError::ReturnTypeMismatch { expected: ReturnKind::Unit, .. })
    );
}
