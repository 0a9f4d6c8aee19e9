//! DDS, DataDDS and DAS fixtures.
//!
//! Each scenario module offers `declarations()` (what a metadata request
//! returns) and `data()` (what a data request returns) for the same
//! variables, so tests can build both trees and correlate them.

use dap2_model::{
    ArrayDimension, BaseType, DSequence, DapValue, Das, PrimitiveVector, VectorStorage,
};
use std::sync::Arc;

use crate::generators::{create_axis, create_letters, create_test_grid};

// ============================================================================
// Builders
// ============================================================================

fn dims(spec: &[(&str, usize)]) -> Vec<ArrayDimension> {
    spec.iter()
        .map(|(name, size)| ArrayDimension::named(name, *size))
        .collect()
}

/// Array declaration without values.
pub fn declared_array(name: &str, spec: &[(&str, usize)], element: DapValue) -> BaseType {
    BaseType::array(
        name,
        dims(spec),
        PrimitiveVector::declared(BaseType::new(name, element)),
    )
}

/// Array carrying `storage`; `element` is the declared element value.
pub fn filled_array(
    name: &str,
    spec: &[(&str, usize)],
    element: DapValue,
    storage: VectorStorage,
) -> BaseType {
    BaseType::array(
        name,
        dims(spec),
        PrimitiveVector::with_storage(BaseType::new(name, element), storage),
    )
}

/// Float32 array with values.
pub fn float32_array(name: &str, spec: &[(&str, usize)], values: Vec<f32>) -> BaseType {
    filled_array(
        name,
        spec,
        DapValue::Float32(None),
        VectorStorage::Float32(Arc::from(values)),
    )
}

/// UInt16 array with values.
pub fn uint16_array(name: &str, spec: &[(&str, usize)], values: Vec<u16>) -> BaseType {
    filled_array(
        name,
        spec,
        DapValue::UInt16(None),
        VectorStorage::UInt16(Arc::from(values)),
    )
}

/// UInt32 array with values.
pub fn uint32_array(name: &str, spec: &[(&str, usize)], values: Vec<u32>) -> BaseType {
    filled_array(
        name,
        spec,
        DapValue::UInt32(None),
        VectorStorage::UInt32(Arc::from(values)),
    )
}

/// String array with values.
pub fn string_array(name: &str, spec: &[(&str, usize)], values: &[&str]) -> BaseType {
    let elements = values
        .iter()
        .map(|v| BaseType::new(name, DapValue::Str(Some(v.to_string()))))
        .collect();
    filled_array(
        name,
        spec,
        DapValue::Str(None),
        VectorStorage::BaseTypes(elements),
    )
}

pub fn int32(name: &str, value: i32) -> BaseType {
    BaseType::new(name, DapValue::Int32(Some(value)))
}

pub fn float64(name: &str, value: f64) -> BaseType {
    BaseType::new(name, DapValue::Float64(Some(value)))
}

pub fn string(name: &str, value: &str) -> BaseType {
    BaseType::new(name, DapValue::Str(Some(value.to_string())))
}

/// Sequence with a declared template and value rows.
pub fn sequence(name: &str, template: Vec<BaseType>, rows: Vec<Vec<BaseType>>) -> BaseType {
    BaseType::new(
        name,
        DapValue::Sequence(DSequence::new(template).with_rows(rows)),
    )
}

// ============================================================================
// Scenarios
// ============================================================================

/// Top-level grid `T(lat=4, lon=3)` of Float32 with maps `lat` and `lon`.
pub mod grid {
    use super::*;

    pub const LAT: usize = 4;
    pub const LON: usize = 3;

    /// Wire values of `T`, row-major.
    pub fn values() -> Vec<f32> {
        create_test_grid(LON, LAT)
    }

    pub fn lat_values() -> Vec<f32> {
        create_axis(-45.0, 30.0, LAT)
    }

    pub fn lon_values() -> Vec<f32> {
        create_axis(0.0, 120.0, LON)
    }

    pub fn declarations() -> Vec<BaseType> {
        vec![BaseType::grid(
            "T",
            declared_array("T", &[("lat", LAT), ("lon", LON)], DapValue::Float32(None)),
            vec![
                declared_array("lat", &[("lat", LAT)], DapValue::Float32(None)),
                declared_array("lon", &[("lon", LON)], DapValue::Float32(None)),
            ],
        )]
    }

    pub fn data() -> Vec<BaseType> {
        vec![BaseType::grid(
            "T",
            float32_array("T", &[("lat", LAT), ("lon", LON)], values()),
            vec![
                float32_array("lat", &[("lat", LAT)], lat_values()),
                float32_array("lon", &[("lon", LON)], lon_values()),
            ],
        )]
    }
}

/// `CompoundComplex(6)`: an array of structures with members `a` (Int32),
/// `b(4)` (String array) and `c` (a 6 character String).
pub mod compound {
    use super::*;

    pub const RECORDS: usize = 6;
    pub const B_LEN: usize = 4;
    pub const C_VALUE: &str = "abcdef";

    /// Value of `b[k]` in record `record`.
    pub fn b_value(record: usize, k: usize) -> String {
        create_letters(3, record * B_LEN + k)
    }

    fn template() -> BaseType {
        BaseType::structure(
            "CompoundComplex",
            vec![
                BaseType::new("a", DapValue::Int32(None)),
                declared_array("b", &[("b", B_LEN)], DapValue::Str(None)),
                BaseType::new("c", DapValue::Str(None)),
            ],
        )
    }

    pub fn declarations() -> Vec<BaseType> {
        vec![BaseType::array(
            "CompoundComplex",
            dims(&[("rec", RECORDS)]),
            PrimitiveVector::declared(template()),
        )]
    }

    /// Data response; with `reversed`, each instance lists its fields in
    /// reverse declaration order.
    pub fn data(reversed: bool) -> Vec<BaseType> {
        let records = (0..RECORDS)
            .map(|r| {
                let b: Vec<String> = (0..B_LEN).map(|k| b_value(r, k)).collect();
                let b_refs: Vec<&str> = b.iter().map(String::as_str).collect();
                let mut fields = vec![
                    int32("a", r as i32),
                    string_array("b", &[("b", B_LEN)], &b_refs),
                    string("c", C_VALUE),
                ];
                if reversed {
                    fields.reverse();
                }
                BaseType::structure("CompoundComplex", fields)
            })
            .collect();

        vec![BaseType::array(
            "CompoundComplex",
            dims(&[("rec", RECORDS)]),
            PrimitiveVector::with_storage(template(), VectorStorage::BaseTypes(records)),
        )]
    }
}

/// Sequences inside structures.
pub mod sequences {
    use super::*;

    fn obs_template() -> Vec<BaseType> {
        vec![BaseType::new("v", DapValue::Int32(None))]
    }

    fn profile_template() -> Vec<BaseType> {
        vec![BaseType::new("z", DapValue::Float64(None))]
    }

    /// `station { obs(shallow rows); deep { profile(deep rows) } }`.
    pub fn nested_siblings(shallow: usize, deep: usize) -> Vec<BaseType> {
        let obs_rows = (0..shallow).map(|i| vec![int32("v", i as i32)]).collect();
        let profile_rows = (0..deep).map(|i| vec![float64("z", i as f64 * 0.5)]).collect();
        vec![BaseType::structure(
            "station",
            vec![
                sequence("obs", obs_template(), obs_rows),
                BaseType::structure(
                    "deep",
                    vec![sequence("profile", profile_template(), profile_rows)],
                ),
            ],
        )]
    }

    pub fn nested_siblings_declarations() -> Vec<BaseType> {
        vec![BaseType::structure(
            "station",
            vec![
                BaseType::sequence("obs", obs_template()),
                BaseType::structure("deep", vec![BaseType::sequence("profile", profile_template())]),
            ],
        )]
    }

    /// Inner row counts of [`jagged`].
    pub const LEVELS: [usize; 3] = [2, 0, 3];

    /// Depth of level `k` in cast `id`.
    pub fn depth(id: usize, k: usize) -> f64 {
        (id * 10 + k) as f64
    }

    /// Top-level `cast` sequence whose rows each hold an `id` and a nested
    /// `levels` sequence of [`LEVELS`] rows. The second cast sends its
    /// fields in reverse order.
    pub fn jagged() -> Vec<BaseType> {
        let levels_template = vec![BaseType::new("depth", DapValue::Float64(None))];
        let cast_template = vec![
            BaseType::new("id", DapValue::Int32(None)),
            BaseType::sequence("levels", levels_template.clone()),
        ];

        let rows = LEVELS
            .iter()
            .enumerate()
            .map(|(id, n)| {
                let levels = (0..*n).map(|k| vec![float64("depth", depth(id, k))]).collect();
                let mut row = vec![
                    int32("id", id as i32),
                    sequence("levels", levels_template.clone(), levels),
                ];
                if id == 1 {
                    row.reverse();
                }
                row
            })
            .collect();

        vec![sequence("cast", cast_template, rows)]
    }
}

/// Attribute tables for a dataset holding [`grid`] and
/// [`sequences::nested_siblings`].
pub mod das {
    use super::*;

    pub fn declarations() -> Vec<BaseType> {
        let mut dds = grid::declarations();
        dds.extend(sequences::nested_siblings_declarations());
        dds
    }

    pub fn sample() -> Das {
        serde_json::from_str(SAMPLE_DAS).expect("valid DAS fixture")
    }

    const SAMPLE_DAS: &str = r#"{
        "tables": [
            { "name": "NC_GLOBAL", "attributes": [
                { "name": "title", "value": { "kind": "values", "dap_type": "String", "values": ["\"demo dataset\""] } }
            ]},
            { "name": "DODS_EXTRA", "attributes": [
                { "name": "Unlimited_Dimension", "value": { "kind": "values", "dap_type": "String", "values": ["time"] } },
                { "name": "Server_Note", "value": { "kind": "values", "dap_type": "String", "values": ["ignored"] } }
            ]},
            { "name": "EXTRA_DIMENSION", "attributes": [
                { "name": "nv", "value": { "kind": "values", "dap_type": "Int32", "values": ["2"] } }
            ]},
            { "name": "T", "attributes": [
                { "name": "units", "value": { "kind": "values", "dap_type": "String", "values": ["\"K\""] } },
                { "name": "coordinates", "value": { "kind": "values", "dap_type": "String", "values": ["lat lon"] } },
                { "name": "_CoordinateAxes", "value": { "kind": "values", "dap_type": "String", "values": ["time lat"] } },
                { "name": "valid_range", "value": { "kind": "values", "dap_type": "Float32", "values": ["0", "400"] } },
                { "name": "scale_factor", "value": { "kind": "values", "dap_type": "Float32", "values": ["abc"] } },
                { "name": "lat", "value": { "kind": "container", "name": "lat", "attributes": [
                    { "name": "units", "value": { "kind": "values", "dap_type": "String", "values": ["degrees_north"] } }
                ]}}
            ]},
            { "name": "station.deep", "attributes": [
                { "name": "long_name", "value": { "kind": "values", "dap_type": "String", "values": ["deep block"] } },
                { "name": "profile", "value": { "kind": "container", "name": "profile", "attributes": [
                    { "name": "positive", "value": { "kind": "values", "dap_type": "String", "values": ["down"] } }
                ]}},
                { "name": "unknown", "value": { "kind": "container", "name": "unknown", "attributes": [
                    { "name": "note", "value": { "kind": "values", "dap_type": "String", "values": ["kept"] } }
                ]}}
            ]},
            { "name": "missing", "attributes": [
                { "name": "foo", "value": { "kind": "values", "dap_type": "String", "values": ["bar"] } }
            ]}
        ]
    }"#;
}
