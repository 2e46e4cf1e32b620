//! Property-based tests for validation and conversion.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p typedframe --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p typedframe --test property_tests
//! ```

use proptest::prelude::*;

use typedframe::{
    convert, matches, validate, Column, DataFrame, DtypeSpec, EffectiveSchema, SchemaDescriptor,
    Value,
};

// =============================================================================
// Test Strategies
// =============================================================================

fn primitive_dtype() -> impl Strategy<Value = DtypeSpec> {
    prop_oneof![
        Just(DtypeSpec::int8()),
        Just(DtypeSpec::int16()),
        Just(DtypeSpec::int32()),
        Just(DtypeSpec::int64()),
        Just(DtypeSpec::uint8()),
        Just(DtypeSpec::uint64()),
        Just(DtypeSpec::float32()),
        Just(DtypeSpec::float64()),
        Just(DtypeSpec::bool()),
    ]
}

fn any_dtype() -> impl Strategy<Value = DtypeSpec> {
    prop_oneof![
        primitive_dtype(),
        Just(DtypeSpec::Object),
        Just(DtypeSpec::datetime()),
        Just(DtypeSpec::datetime_utc()),
        prop::collection::btree_set("[a-z]{1,6}", 1..5).prop_map(|labels| {
            DtypeSpec::categorical(labels).expect("labels are unique")
        }),
    ]
}

/// Text cells that every primitive target can parse: small non-negative
/// integers, which are valid ints, uints, floats and (as 0/1) booleans.
fn castable_cells(rows: usize) -> impl Strategy<Value = Vec<Option<u8>>> {
    prop::collection::vec(prop::option::weighted(0.8, 0u8..=1), rows)
}

fn text_column(name: &str, cells: &[Option<u8>]) -> Column {
    let values: Vec<Value> = cells
        .iter()
        .map(|cell| match cell {
            Some(v) => Value::Str(v.to_string()),
            None => Value::Null,
        })
        .collect();
    Column::new(name, DtypeSpec::Object, values).expect("text fits object")
}

// =============================================================================
// Dtype equivalence
// =============================================================================

proptest! {
    #[test]
    fn matches_is_reflexive(dtype in any_dtype()) {
        prop_assert!(matches(&dtype, &dtype));
    }

    #[test]
    fn matches_is_symmetric(a in any_dtype(), b in any_dtype()) {
        prop_assert_eq!(matches(&a, &b), matches(&b, &a));
    }

    #[test]
    fn text_form_parses_back(dtype in any_dtype()) {
        let parsed: DtypeSpec = dtype.to_string().parse().expect("display form parses");
        prop_assert_eq!(parsed, dtype);
    }
}

// =============================================================================
// Conversion
// =============================================================================

proptest! {
    #[test]
    fn convert_establishes_conformance(
        required in primitive_dtype(),
        optional in any_dtype(),
        cells in (0usize..20).prop_flat_map(castable_cells),
    ) {
        let declaration = SchemaDescriptor::builder()
            .required("value", required)
            .optional("extra", optional)
            .build()
            .unwrap();
        let schema = EffectiveSchema::from_declaration(&declaration).unwrap();
        let table = DataFrame::new(vec![text_column("value", &cells)]).unwrap();

        let converted = convert(&schema, &table).expect("small integers always cast");
        prop_assert!(validate(&schema, &converted).is_conforming());
        prop_assert_eq!(converted.row_count(), cells.len());
    }

    #[test]
    fn convert_is_idempotent(
        required in primitive_dtype(),
        cells in (0usize..20).prop_flat_map(castable_cells),
    ) {
        let declaration = SchemaDescriptor::builder()
            .required("value", required)
            .optional("note", DtypeSpec::Object)
            .build()
            .unwrap();
        let schema = EffectiveSchema::from_declaration(&declaration).unwrap();
        let table = DataFrame::new(vec![text_column("value", &cells)]).unwrap();

        let once = convert(&schema, &table).unwrap();
        let twice = convert(&schema, &once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn validation_never_panics_on_mismatch(declared in any_dtype(), observed in primitive_dtype()) {
        let declaration = SchemaDescriptor::builder()
            .required("c", declared.clone())
            .build()
            .unwrap();
        let schema = EffectiveSchema::from_declaration(&declaration).unwrap();
        let table = DataFrame::new(vec![Column::nulls("c", observed.clone(), 3)]).unwrap();

        let result = validate(&schema, &table);
        prop_assert_eq!(result.is_conforming(), matches(&declared, &observed));
    }
}
