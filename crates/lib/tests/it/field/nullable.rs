//! Null handling integration tests

use jsonfield::{
    container::{Container, Value},
    field::{CompositeField, Field, LeafField, NullPolicy},
    request::Request,
};

use crate::helpers::*;

#[test]
fn test_nullable_stores_null_for_null_input() {
    let mut user = user_with_address(Container::new().with("street", "test"));
    let address = street_and_city().nullable(true);
    let request = Request::new()
        .with("address->street", Value::Null)
        .with("address->city", Value::Null);
    let entries = address.fields();

    entries[0].fill(&request, &mut user).unwrap();
    assert_address_key(&user, "street", Value::Null);

    entries[1].fill(&request, &mut user).unwrap();
    assert_address_key(&user, "city", Value::Null);
}

#[test]
fn test_nullable_maps_empty_string_to_null() {
    let mut user = user_with_address(Container::new().with("street", "test"));
    let address = street_and_city().nullable(true);
    let request = Request::new().with("address->street", "");

    address.fields()[0].fill(&request, &mut user).unwrap();

    assert_address_key(&user, "street", Value::Null);
}

#[test]
fn test_custom_null_sentinels() {
    let mut user = user_with_address(Container::new().with("street", "test"));
    let address = street_and_city().nullable_with(true, [Value::Int(0), Value::from("_")]);
    let request = Request::new()
        .with("address->street", 0)
        .with("address->city", "_");
    let entries = address.fields();

    entries[0].fill(&request, &mut user).unwrap();
    assert_address_key(&user, "street", Value::Null);

    entries[1].fill(&request, &mut user).unwrap();
    assert_address_key(&user, "city", Value::Null);
}

#[test]
fn test_numeric_text_matches_numeric_sentinel() {
    let mut user = user();
    let address = street_and_city().nullable_with(true, [0]);
    let request = Request::new().with("address->street", "0");

    address.fields()[0].fill(&request, &mut user).unwrap();

    assert_address_key(&user, "street", Value::Null);
}

#[test]
fn test_loose_sentinel_matches() {
    let mut user = user();
    let address = street_and_city().nullable_with(true, [Value::Int(0), Value::from("0")]);
    let request = Request::new()
        .with("address->street", false)
        .with("address->city", "0.0");
    let entries = address.fields();

    entries[0].fill(&request, &mut user).unwrap();
    assert_address_key(&user, "street", Value::Null);

    entries[1].fill(&request, &mut user).unwrap();
    assert_address_key(&user, "city", Value::Null);
}

#[test]
fn test_true_is_not_a_zero_sentinel() {
    let mut user = user();
    let address = street_and_city().nullable_with(true, [0]);
    let request = Request::new().with("address->street", true);

    address.fields()[0].fill(&request, &mut user).unwrap();

    assert_address_key(&user, "street", true);
}

#[test]
fn test_custom_sentinels_still_null_empty_string() {
    let mut user = user();
    let address = street_and_city().nullable_with(true, ["_"]);
    let request = Request::new().with("address->street", "");

    address.fields()[0].fill(&request, &mut user).unwrap();

    assert_address_key(&user, "street", Value::Null);
}

#[test]
fn test_not_nullable_keeps_empty_string_and_sentinels() {
    let mut user = user();
    let address = street_and_city().nullable_with(false, [Value::Int(0)]);
    let request = Request::new()
        .with("address->street", "")
        .with("address->city", 0);
    let entries = address.fields();

    entries[0].fill(&request, &mut user).unwrap();
    entries[1].fill(&request, &mut user).unwrap();

    assert_address_key(&user, "street", "");
    assert_address_key(&user, "city", 0);
}

#[test]
fn test_non_sentinel_values_pass_through() {
    let mut user = user();
    let address = street_and_city().nullable_with(true, [Value::Int(0)]);
    let request = Request::new().with("address->street", "0.5");

    address.fields()[0].fill(&request, &mut user).unwrap();

    assert_address_key(&user, "street", "0.5");
}

#[test]
fn test_nullable_cascades_to_nested_leaves() {
    let address = address_with_location().nullable(true);

    for entry in address.fields() {
        let jsonfield::field::FieldEntry::Leaf(leaf) = entry else {
            panic!("expected only leaves");
        };
        assert!(leaf.is_nullable(), "{} should be nullable", leaf.path());
    }

    let Field::Composite(location) = &address.children()[1] else {
        panic!("expected a nested group");
    };
    assert!(location.is_nullable());
}

#[test]
fn test_nullable_applies_to_fill_callback_result() {
    let mut user = user_with_address(Container::new().with("street", "test"));
    let address = CompositeField::new(
        "Address",
        vec![LeafField::new("Street").fill_using(|_| Value::from("_")).into()],
    )
    .nullable_with(true, ["_"]);

    address.fill(&Request::new(), &mut user).unwrap();

    assert_address_key(&user, "street", Value::Null);
}

#[test]
fn test_standalone_leaf_null_policy() {
    let mut user = user_without_casts();
    let nickname = LeafField::new("Nickname").nullable(true);

    nickname
        .fill(&Request::new().with("nickname", ""), &mut user)
        .unwrap();

    assert_eq!(nickname.resolve_value(&user), Value::Null);
}

#[test]
fn test_policy_is_null_value() {
    let policy = NullPolicy::new(true, vec![Value::Int(0)]);

    assert!(policy.is_null_value(&Value::Null));
    assert!(policy.is_null_value(&Value::from("")));
    assert!(policy.is_null_value(&Value::Int(0)));
    assert!(policy.is_null_value(&Value::Float(0.0)));
    assert!(!policy.is_null_value(&Value::Int(1)));
    assert!(!policy.is_null_value(&Value::from("x")));

    let off = NullPolicy::default();
    assert!(!off.is_null_value(&Value::Null));
    assert!(!off.is_null_value(&Value::from("")));
}
