//! Composite field integration tests

use jsonfield::{
    container::{Container, Value},
    field::{CompositeField, Field, FillMode, LeafField},
    record::HostRecord,
    request::Request,
};

use crate::helpers::*;

// ===== CONSTRUCTION =====

#[test]
fn test_empty_group_has_no_entries() {
    let group = CompositeField::new("", Vec::new());

    assert!(group.fields().is_empty());
    assert!(group.children().is_empty());
}

#[test]
fn test_attribute_derived_from_label() {
    assert_eq!(CompositeField::new("Address", Vec::new()).attribute(), "address");
    assert_eq!(
        CompositeField::new("Billing Address", Vec::new()).attribute(),
        "billing_address"
    );
}

#[test]
fn test_attribute_derivation_only_splits_on_spaces() {
    assert_eq!(LeafField::new("Address Line2").attribute(), "address_line2");
    assert_eq!(LeafField::new("streetName").attribute(), "streetname");
    assert_eq!(LeafField::new("E-Mail").attribute(), "e-mail");
    assert_eq!(
        CompositeField::new("Billing E-Mail", Vec::new()).attribute(),
        "billing_e-mail"
    );
}

#[test]
fn test_explicit_attribute_wins() {
    let group = CompositeField::with_attribute("Address", "addr", vec![LeafField::new("Street").into()]);

    assert_eq!(group.attribute(), "addr");
    assert_eq!(group.fields()[0].path().as_str(), "addr->street");
}

#[test]
fn test_leaf_paths_qualified_through_nesting() {
    let address = address_with_location();

    let paths: Vec<&str> = address
        .fields()
        .iter()
        .map(|entry| entry.path().as_str())
        .collect();
    assert_eq!(
        paths,
        vec![
            "address->street",
            "address->location->latitude",
            "address->location->longitude",
        ]
    );

    let Field::Composite(location) = &address.children()[1] else {
        panic!("expected a nested group");
    };
    assert_eq!(location.path().as_str(), "address->location");
    assert_eq!(location.attribute(), "location");
}

#[test]
fn test_deep_nesting_is_qualified() {
    let group = CompositeField::new(
        "Meta",
        vec![
            CompositeField::new(
                "A",
                vec![CompositeField::new("B", vec![LeafField::new("C").into()]).into()],
            )
            .into(),
        ],
    );

    assert_eq!(group.fields()[0].path().as_str(), "meta->a->b->c");
}

#[test]
fn test_labels_and_leaf_keys() {
    let address = address_with_location();
    let labels: Vec<&str> = address.fields().iter().map(|entry| entry.label()).collect();
    assert_eq!(labels, vec!["Street", "Latitude", "Longitude"]);

    let Field::Leaf(street) = &address.children()[0] else {
        panic!("expected a leaf");
    };
    assert_eq!(street.attribute(), "street");
    assert_eq!(street.parent_path().map(|p| p.as_str()), Some("address"));
}

// ===== RESOLVE =====

#[test]
fn test_resolve_lists_every_leaf() {
    let user = user_with_address(
        Container::new()
            .with("street", "Main")
            .with_map("location", Container::new().with("latitude", 52.1)),
    );

    let resolved = address_with_location().resolve(&user);

    assert_eq!(resolved.len(), 3);
    assert_eq!(resolved[0].label, "Street");
    assert_eq!(resolved[0].attribute, "address->street");
    assert_eq!(resolved[0].value, Value::from("Main"));
    assert_eq!(resolved[1].value, Value::Float(52.1));
    assert_eq!(resolved[2].value, Value::Null);
}

#[test]
fn test_resolved_fields_serialize() {
    let user = user_with_address(Container::new().with("street", "Main"));
    let resolved = street_and_city().resolve(&user);

    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "label": "Street", "attribute": "address->street", "value": "Main" },
            { "label": "City", "attribute": "address->city", "value": null },
        ])
    );
}

// ===== FILL =====

#[test]
fn test_nested_siblings_fill_independently() {
    let mut user = user_with_address(Container::new().with("street", ""));
    let address = address_with_location();
    let request = Request::new()
        .with("address->location->latitude", "some-val")
        .with("address->location->longitude", "other-val");

    let entries = address.fields();
    entries[1].fill(&request, &mut user).unwrap();
    entries[2].fill(&request, &mut user).unwrap();

    let expected = Container::new().with("street", "").with_map(
        "location",
        Container::new()
            .with("latitude", "some-val")
            .with("longitude", "other-val"),
    );
    assert_eq!(address_of(&user), expected);
}

#[test]
fn test_nested_siblings_fill_in_any_order() {
    let address = address_with_location();
    let request = Request::new()
        .with("address->location->latitude", 1)
        .with("address->location->longitude", 2);
    let entries = address.fields();

    let mut forward = user();
    entries[1].fill(&request, &mut forward).unwrap();
    entries[2].fill(&request, &mut forward).unwrap();

    let mut backward = user();
    entries[2].fill(&request, &mut backward).unwrap();
    entries[1].fill(&request, &mut backward).unwrap();

    assert_eq!(address_of(&forward), address_of(&backward));
    assert_eq!(
        address_of(&forward).get(&["location"]),
        Some(&Value::Map(
            Container::new().with("latitude", 1).with("longitude", 2)
        ))
    );
}

#[test]
fn test_group_fill_writes_every_leaf() {
    let mut user = user();
    let address = address_with_location();
    let request = Request::new()
        .with("address->street", "Main")
        .with("address->location->latitude", 52.1)
        .with("address->location->longitude", 4.9)
        .with("nonjson", "foo");

    address.fill(&request, &mut user).unwrap();

    let expected = Container::new().with("street", "Main").with_map(
        "location",
        Container::new().with("latitude", 52.1).with("longitude", 4.9),
    );
    assert_eq!(address_of(&user), expected);
    assert!(user.attribute("nonjson").is_none());
}

#[test]
fn test_fill_keeps_unrelated_keys() {
    let mut user = user_with_address(Container::new().with("zip", "12345").with("street", "Old"));
    let request = Request::new().with("address->street", "New");

    street_and_city().fields()[0].fill(&request, &mut user).unwrap();

    assert_address_key(&user, "zip", "12345");
    assert_address_key(&user, "street", "New");
}

#[test]
fn test_fill_replaces_scalar_attribute_with_map() {
    let mut user = user().with_attribute("address", "legacy text");
    let request = Request::new().with("address->street", "Main");

    street_and_city().fields()[0].fill(&request, &mut user).unwrap();

    assert_eq!(address_of(&user), Container::new().with("street", "Main"));
}

#[test]
fn test_group_fill_without_cast_stops_at_first_leaf() {
    let mut user = user_without_casts();
    let request = Request::new().with("address->street", "Main");

    let err = street_and_city().fill(&request, &mut user).unwrap_err();

    assert!(err.is_attribute_cast());
    assert!(user.attribute("address").is_none());
}

#[test]
fn test_default_mode_is_independent() {
    let address = street_and_city();
    assert!(matches!(address.mode(), FillMode::Independent));
    assert!(!address.mode().is_grouped());
}

// ===== EMPTY KEYS =====

/// `Address { "", Street }`
fn address_with_empty_key() -> CompositeField {
    CompositeField::with_attribute(
        "Address",
        "address",
        vec![
            LeafField::with_attribute("Blank", "").into(),
            LeafField::new("Street").into(),
        ],
    )
}

#[test]
fn test_empty_leaf_key_entry_fill_is_rejected() {
    let address = address_with_empty_key();
    let request = Request::new()
        .with("address", "x")
        .with("address->street", "Main");

    // Without a cast the attribute stays a plain scalar
    let mut plain = user_without_casts().with_attribute("address", "x");
    let err = address.fields()[0].fill(&request, &mut plain).unwrap_err();
    assert!(err.is_malformed_path());
    assert_eq!(plain.attribute("address"), Some(&Value::from("x")));

    // With a cast the existing map is not overwritten
    let existing = Container::new().with("zip", "1");
    let mut user = user_with_address(existing.clone());
    let err = address.fields()[0].fill(&request, &mut user).unwrap_err();
    assert!(err.is_malformed_path());
    assert_eq!(address_of(&user), existing);
}

#[test]
fn test_empty_leaf_key_group_fill_writes_nothing() {
    let request = Request::new().with("address->street", "Main");
    let existing = Container::new().with("zip", "1");

    let mut user = user_with_address(existing.clone());
    let err = address_with_empty_key().fill(&request, &mut user).unwrap_err();
    assert!(err.is_malformed_path());
    assert_eq!(address_of(&user), existing);

    let mut user = user_with_address(existing.clone());
    let err = address_with_empty_key()
        .fill_at_once()
        .fill(&request, &mut user)
        .unwrap_err();
    assert!(err.is_malformed_path());
    assert_eq!(address_of(&user), existing);
}

#[test]
fn test_empty_nested_group_key_is_rejected() {
    let address = CompositeField::with_attribute(
        "Address",
        "address",
        vec![
            LeafField::new("Street").into(),
            CompositeField::with_attribute("Location", "", vec![LeafField::new("Latitude").into()])
                .into(),
        ],
    );
    let mut user = user();
    let request = Request::new().with("address->street", "Main");

    assert!(address.check_keys().unwrap_err().is_malformed());
    assert!(address.fill(&request, &mut user).unwrap_err().is_malformed_path());
    assert!(user.attribute("address").is_none());
}
