//! Leaf field integration tests

use jsonfield::{
    container::{Container, Value},
    field::{FieldEntry, LeafField},
    path::PathBuf,
    record::HostRecord,
    request::Request,
};

use crate::helpers::*;

#[test]
fn test_resolves_value_at_full_path() {
    let user = user_with_address(Container::new().with("street", "test street"));
    let address = street_and_city();

    let street = address.fields()[0];
    let path = PathBuf::parse("address->street").unwrap();

    assert_eq!(street.path(), &*path);
    assert_eq!(street.resolve(&user), Value::from("test street"));
}

#[test]
fn test_resolve_missing_is_null() {
    let address = address_with_location();
    let entries = address.fields();

    // No attribute at all
    let user = user();
    assert!(entries[0].resolve(&user).is_null());

    // Attribute present, intermediate map missing
    let user = user_with_address(Container::new().with("street", "Main"));
    assert!(entries[1].resolve(&user).is_null());

    // Intermediate present but not a map
    let user = user_with_address(Container::new().with("location", "unknown"));
    assert!(entries[2].resolve(&user).is_null());
}

#[test]
fn test_fill_into_writes_leaf() {
    let mut user = user_with_address(Container::new().with("street", ""));
    let address = street_and_city();
    let request = Request::new().with("address->street", "test street");

    let path = PathBuf::parse("address->street").unwrap();
    address.fields()[0]
        .fill_into(&request, &mut user, &path)
        .unwrap();

    assert_address_key(&user, "street", "test street");
}

#[test]
fn test_fill_without_cast_fails_and_leaves_record_untouched() {
    let mut user = user_without_casts().with_attribute("address", "plain");
    let address = street_and_city();
    let request = Request::new().with("address->street", "test street");

    let err = address.fields()[0].fill(&request, &mut user).unwrap_err();

    assert!(err.is_attribute_cast());
    assert_eq!(err.module(), "field");
    assert_eq!(err.to_string(), "No cast found for [address] field.");
    assert_eq!(user.attribute("address"), Some(&Value::from("plain")));
    assert!(user.dirty().is_empty());
}

#[test]
fn test_fill_using_callback_supplies_value() {
    let mut user = user_with_address(Container::new().with("street", ""));
    let address = jsonfield::CompositeField::new(
        "Address",
        vec![
            LeafField::new("Street")
                .fill_using(|ctx| {
                    let raw = ctx.request.value_at(ctx.request_attribute);
                    Value::from(format!("{raw} Foo"))
                })
                .into(),
        ],
    );
    let request = Request::new().with("address->street", "some-val");

    address.fields()[0].fill(&request, &mut user).unwrap();

    assert_address_key(&user, "street", "some-val Foo");
}

#[test]
fn test_fill_callback_sees_own_key_and_record() {
    let mut user = user_with_address(Container::new().with("street", "Old"));
    let address = jsonfield::CompositeField::new(
        "Address",
        vec![
            LeafField::new("Street")
                .fill_using(|ctx| {
                    assert_eq!(ctx.attribute, "street");
                    assert_eq!(ctx.request_attribute.as_str(), "address->street");
                    let previous = ctx
                        .record
                        .attribute("address")
                        .and_then(Value::as_map)
                        .and_then(|map| map.get(&["street"]))
                        .cloned()
                        .unwrap_or_default();
                    Value::from(format!("{previous} -> New"))
                })
                .into(),
        ],
    );

    address.fill(&Request::new(), &mut user).unwrap();

    assert_address_key(&user, "street", "Old -> New");
}

#[test]
fn test_resolve_using_transforms_display_value() {
    let user = user_with_address(Container::new().with("street", "main"));
    let address = jsonfield::CompositeField::new(
        "Address",
        vec![
            LeafField::new("Street")
                .resolve_using(|ctx| {
                    Value::from(ctx.value.as_text().unwrap_or_default().to_uppercase())
                })
                .into(),
        ],
    );

    let resolved = address.resolve(&user);
    assert_eq!(resolved[0].value, Value::from("MAIN"));
    // Stored value is untouched
    assert_address_key(&user, "street", "main");
}

#[test]
fn test_standalone_leaf_writes_plain_attribute() {
    let mut user = user_without_casts();
    let name = LeafField::new("Name");
    let request = Request::new().with("name", "Alice");

    name.fill(&request, &mut user).unwrap();

    assert_eq!(user.attribute("name"), Some(&Value::from("Alice")));
    assert_eq!(name.resolve_value(&user), Value::from("Alice"));
    assert!(name.parent_path().is_none());
}

#[test]
fn test_missing_request_key_writes_null() {
    let mut user = user_with_address(Container::new().with("street", "Main"));
    let address = street_and_city();

    address.fields()[1].fill(&Request::new(), &mut user).unwrap();

    assert_address_key(&user, "street", "Main");
    assert_address_key(&user, "city", Value::Null);
}

#[test]
fn test_entries_are_leaves_in_independent_mode() {
    let address = address_with_location();
    assert!(
        address
            .fields()
            .iter()
            .all(|entry| matches!(entry, FieldEntry::Leaf(_)))
    );
}
