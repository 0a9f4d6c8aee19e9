//! Materialization of value trees into CDM arrays.

use cdm_array::{ArrayData, DataType, Element, Index, Variable};
use dap2_model::{DapValue, VectorStorage};
use dap_convert::{build_values, ConvertConfig, ConvertError, Converter};
use std::sync::Arc;
use test_utils::{
    assert_approx_eq, compound, create_all_u16, create_ramp, create_u32_edges, filled_array, grid,
    init_test_logging, sequences, string, string_array, uint16_array, uint32_array,
};

#[test]
fn test_float_grid_shares_wire_buffer() {
    init_test_logging();
    let data = grid::data();
    let wire = match data[0].value() {
        DapValue::Grid(g) => match g.array.value() {
            DapValue::Array(a) => match &a.vector.storage {
                Some(VectorStorage::Float32(v)) => Arc::clone(v),
                other => panic!("unexpected storage {other:?}"),
            },
            other => panic!("unexpected array {:?}", other.dap_type()),
        },
        other => panic!("unexpected value {:?}", other.dap_type()),
    };

    let tree = build_values(&data).unwrap();
    let array = Converter::default()
        .convert(&tree, tree.find_top("T").unwrap())
        .unwrap();

    assert_eq!(array.shape(), &[grid::LAT, grid::LON]);
    match array.data() {
        ArrayData::Float(v) => assert!(Arc::ptr_eq(v, &wire)),
        other => panic!("unexpected data {:?}", other.data_type()),
    }
    // col * 1000 + row
    assert_approx_eq!(array.get_f64(4).unwrap(), 1001.0, 1e-6);
}

#[test]
fn test_grid_map_converts() {
    let data = grid::data();
    let tree = build_values(&data).unwrap();
    let lat = Converter::default()
        .convert(&tree, tree.find_path("T.lat").unwrap())
        .unwrap();
    assert_eq!(lat.shape(), &[grid::LAT]);
    assert_approx_eq!(lat.get_f64(3).unwrap(), 45.0, 1e-6);
}

#[test]
fn test_uint16_full_range_widens_to_int() {
    let data = vec![uint16_array("u", &[("n", 65536)], create_all_u16())];
    let tree = build_values(&data).unwrap();
    let array = Converter::default().convert(&tree, tree.roots()[0]).unwrap();

    assert_eq!(array.data_type(), DataType::Int);
    assert!(!array.is_unsigned());
    for i in [0usize, 1, 32767, 32768, 65535] {
        assert_eq!(array.get_i64(i), Some(i as i64));
    }
}

#[test]
fn test_uint32_widens_to_long() {
    let edges = create_u32_edges();
    let data = vec![uint32_array("u", &[("n", edges.len())], edges.clone())];
    let tree = build_values(&data).unwrap();
    let array = Converter::default().convert(&tree, tree.roots()[0]).unwrap();

    assert_eq!(array.data_type(), DataType::Long);
    for (i, v) in edges.iter().enumerate() {
        assert_eq!(array.get_i64(i), Some(i64::from(*v)));
    }
}

#[test]
fn test_byte_keeps_width_and_unsigned_flag() {
    let data = vec![filled_array(
        "b",
        &[("n", 3)],
        DapValue::Byte(None),
        VectorStorage::Byte(Arc::from(vec![0u8, 128, 255])),
    )];
    let tree = build_values(&data).unwrap();
    let array = Converter::default().convert(&tree, tree.roots()[0]).unwrap();

    assert_eq!(array.data_type(), DataType::Byte);
    assert!(array.is_unsigned());
    assert_eq!(array.get_i64(1), Some(128));
    assert_eq!(array.get_i64(2), Some(255));
}

#[test]
fn test_byte_array_shares_wire_buffer() {
    let wire: Arc<[u8]> = Arc::from(vec![7u8, 200, 255, 0]);
    let data = vec![filled_array(
        "flags",
        &[("n", 4)],
        DapValue::Byte(None),
        VectorStorage::Byte(Arc::clone(&wire)),
    )];
    let tree = build_values(&data).unwrap();
    let array = Converter::default().convert(&tree, tree.roots()[0]).unwrap();

    match array.data() {
        ArrayData::Byte(v) => assert_eq!(v.as_ptr() as *const u8, wire.as_ptr()),
        other => panic!("unexpected data {:?}", other.data_type()),
    }
    assert!(array.is_unsigned());
    assert_eq!(array.get_i64(1), Some(200));
}

#[test]
fn test_int_ramp_reshapes_over_shared_storage() {
    let data = vec![filled_array(
        "ramp",
        &[("n", 6)],
        DapValue::Int32(None),
        VectorStorage::Int32(Arc::from(create_ramp(6))),
    )];
    let tree = build_values(&data).unwrap();
    let array = Converter::default().convert(&tree, tree.roots()[0]).unwrap();
    assert_eq!(array.shape(), &[6]);

    let grid = array.reshape(vec![2, 3]).unwrap();
    assert_eq!(grid.shape(), &[2, 3]);
    match (array.data(), grid.data()) {
        (ArrayData::Int(a), ArrayData::Int(b)) => assert!(Arc::ptr_eq(a, b)),
        other => panic!("unexpected data {other:?}"),
    }
    let mut index = Index::new(&[2, 3]);
    index.set(&[1, 2]).unwrap();
    assert_eq!(grid.get(&index).unwrap(), Element::Int(5));

    assert!(array.reshape(vec![4]).is_err());
}

#[test]
fn test_storage_type_mismatch() {
    let data = vec![filled_array(
        "x",
        &[("n", 2)],
        DapValue::Int16(None),
        VectorStorage::UInt16(Arc::from(vec![1u16, 2])),
    )];
    let tree = build_values(&data).unwrap();
    let err = Converter::default().convert(&tree, tree.roots()[0]).unwrap_err();
    assert!(matches!(err, ConvertError::TypeMismatch { .. }));
}

#[test]
fn test_string_array_packs_into_chars() {
    let data = vec![string_array("names", &[("n", 3)], &["AB", "cdefgh", "x"])];
    let tree = build_values(&data).unwrap();
    let mut variable = Variable::new("names", DataType::Char, vec![3, 5]);

    let array = Converter::default()
        .convert_top_variable(&mut variable, None, &tree, tree.roots()[0])
        .unwrap();

    assert_eq!(array.shape(), &[3, 5]);
    match array.data() {
        ArrayData::Char(bytes) => assert_eq!(&bytes[..], b"AB\0\0\0cdefgx\0\0\0\0"),
        other => panic!("unexpected data {:?}", other.data_type()),
    }
    assert_eq!(array.char_strings().unwrap(), vec!["AB", "cdefg", "x"]);
}

#[test]
fn test_single_char_strings_pack_one_per_element() {
    let data = vec![string_array("flags", &[("n", 3)], &["a", "b", "c"])];
    let tree = build_values(&data).unwrap();
    let mut variable = Variable::new("flags", DataType::Char, vec![3]);

    let array = Converter::default()
        .convert_top_variable(&mut variable, None, &tree, tree.roots()[0])
        .unwrap();

    match array.data() {
        ArrayData::Char(bytes) => assert_eq!(&bytes[..], b"abc"),
        other => panic!("unexpected data {:?}", other.data_type()),
    }
}

#[test]
fn test_too_many_strings_overflow() {
    let data = vec![string_array("names", &[("n", 3)], &["ab", "cd", "ef"])];
    let tree = build_values(&data).unwrap();
    let mut variable = Variable::new("names", DataType::Char, vec![2, 4]);

    let err = Converter::default()
        .convert_top_variable(&mut variable, None, &tree, tree.roots()[0])
        .unwrap_err();
    match err {
        ConvertError::CursorOverflow { member, capacity } => {
            assert_eq!(member, "names");
            assert_eq!(capacity, 8);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_string_array_as_strings() {
    let data = vec![string_array("names", &[("n", 2)], &["one", "two"])];
    let tree = build_values(&data).unwrap();
    let mut variable = Variable::new("names", DataType::String, vec![2]);

    let array = Converter::default()
        .convert_top_variable(&mut variable, None, &tree, tree.roots()[0])
        .unwrap();
    assert_eq!(array.get_str(1), Some("two"));
}

#[test]
fn test_degenerate_string_becomes_chars() {
    let data = vec![string("label", "hello")];
    let tree = build_values(&data).unwrap();
    let mut variable = Variable::new("label", DataType::String, vec![8]);

    let array = Converter::default()
        .convert_top_variable(&mut variable, None, &tree, tree.roots()[0])
        .unwrap();

    assert_eq!(variable.data_type(), DataType::Char);
    assert_eq!(array.shape(), &[8]);
    assert_eq!(array.char_string().unwrap(), "hello");
}

#[test]
fn test_degenerate_string_truncates_to_variable_size() {
    let data = vec![string("label", "hello world")];
    let tree = build_values(&data).unwrap();
    let mut variable = Variable::new("label", DataType::Char, vec![5]);

    let array = Converter::default()
        .convert_top_variable(&mut variable, None, &tree, tree.roots()[0])
        .unwrap();
    assert_eq!(array.char_string().unwrap(), "hello");
}

#[test]
fn test_degenerate_string_disabled() {
    let data = vec![string("label", "hello")];
    let tree = build_values(&data).unwrap();
    let converter = Converter::new(ConvertConfig {
        legacy_char_strings: false,
        ..ConvertConfig::default()
    });

    let mut as_string = Variable::new("label", DataType::String, vec![8]);
    let array = converter
        .convert_top_variable(&mut as_string, None, &tree, tree.roots()[0])
        .unwrap();
    assert_eq!(as_string.data_type(), DataType::String);
    assert_eq!(array.get_str(0), Some("hello"));

    let mut as_char = Variable::new("label", DataType::Char, vec![8]);
    let err = converter
        .convert_top_variable(&mut as_char, None, &tree, tree.roots()[0])
        .unwrap_err();
    assert!(matches!(err, ConvertError::InvalidVariable(_)));
}

#[test]
fn test_compound_records_follow_declared_order() {
    let data = compound::data(true);
    let tree = build_values(&data).unwrap();
    let array = Converter::default().convert(&tree, tree.roots()[0]).unwrap();

    assert_eq!(array.shape(), &[compound::RECORDS]);
    let structure = array.as_structure().unwrap();
    assert_eq!(structure.members().names(), vec!["a", "b", "c"]);
    assert_eq!(structure.records(), compound::RECORDS);

    for record in structure.iter() {
        let r = record.record_index();
        assert_eq!(record.scalar_i64("a").unwrap(), r as i64);
        assert_eq!(record.string("c").unwrap(), compound::C_VALUE);
        let b = record.strings("b").unwrap();
        assert_eq!(b.len(), compound::B_LEN);
        assert_eq!(b[3], compound::b_value(r, 3));
    }
}

#[test]
fn test_short_array_of_structures_reports_incomplete_fill() {
    let mut data = compound::data(false);
    if let DapValue::Array(a) = data[0].value_mut() {
        if let Some(VectorStorage::BaseTypes(records)) = a.vector.storage.as_mut() {
            records.pop();
        }
    }
    let tree = build_values(&data).unwrap();
    match Converter::default().convert(&tree, tree.roots()[0]).unwrap_err() {
        ConvertError::IncompleteFill {
            written, capacity, ..
        } => {
            assert_eq!(written, compound::RECORDS - 1);
            assert_eq!(capacity, compound::RECORDS);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_jagged_sequence_rows() {
    let data = sequences::jagged();
    let tree = build_values(&data).unwrap();
    let array = Converter::default()
        .convert(&tree, tree.find_top("cast").unwrap())
        .unwrap();

    assert_eq!(array.shape(), &[sequences::LEVELS.len()]);
    let casts = array.as_structure().unwrap();
    let ids = casts.find_member("id").unwrap().data();
    assert_eq!(ids.get_i64(1), Some(1));

    let levels = casts.find_member("levels").unwrap().data().as_sequence().unwrap();
    assert_eq!(levels.row_lengths(), &sequences::LEVELS[..]);
    assert_eq!(levels.total_rows(), 5);
    assert_eq!(levels.row_count(1), Some(0));

    let depth = levels.members().find_member("depth").unwrap().data();
    let expected = [
        sequences::depth(0, 0),
        sequences::depth(0, 1),
        sequences::depth(2, 0),
        sequences::depth(2, 1),
        sequences::depth(2, 2),
    ];
    for (i, d) in expected.iter().enumerate() {
        assert_approx_eq!(depth.get_f64(i).unwrap(), *d, 1e-9);
    }

    let third = levels.sequence(2).unwrap();
    assert_eq!(third.records(), 3);
}
