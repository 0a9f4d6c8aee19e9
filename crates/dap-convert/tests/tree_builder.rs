//! Tree building: numbering, grid collapse and sequence row counts.

use dap2_model::{ArrayDimension, BaseType, DapValue, PrimitiveVector};
use dap_convert::{
    build_declarations, build_values, shape_all, ConvertError, Converter, ElementKind, NodeKind,
    PrimitiveType,
};
use test_utils::{compound, grid, init_test_logging, sequences};

#[test]
fn test_sequence_numbers_cover_every_node() {
    init_test_logging();
    let mut dds = grid::declarations();
    dds.extend(compound::declarations());
    dds.extend(sequences::nested_siblings_declarations());
    let tree = build_declarations(&dds).unwrap();

    let mut seqs: Vec<usize> = tree.ids().map(|id| tree.node(id).seq).collect();
    seqs.sort_unstable();
    assert_eq!(seqs, (0..tree.len()).collect::<Vec<_>>());

    // Children are numbered before their parent.
    for id in tree.ids() {
        let node = tree.node(id);
        for child in &node.children {
            assert!(tree.node(*child).seq < node.seq);
        }
    }
}

#[test]
fn test_find_seq_round_trip() {
    let dds = compound::declarations();
    let tree = build_declarations(&dds).unwrap();
    for id in tree.ids() {
        assert_eq!(tree.find_seq(tree.node(id).seq), Some(id));
    }
    assert_eq!(tree.find_seq(tree.len()), None);
}

#[test]
fn test_top_level_grid_collapses() {
    let dds = grid::declarations();
    let tree = build_declarations(&dds).unwrap();
    let t = tree.find_top("T").unwrap();
    let node = tree.node(t);

    assert_eq!(node.kind, NodeKind::Grid);
    assert!(node.is_collapsed_grid());
    assert_eq!(
        node.element_type,
        Some(ElementKind::Primitive(PrimitiveType::Float32))
    );
    assert_eq!(shape_all(&tree, t), vec![grid::LAT, grid::LON]);

    // The array member and maps keep their own extents only.
    let array = tree.find_path("T.T").unwrap();
    let lat = tree.find_path("T.lat").unwrap();
    let lon = tree.find_path("T.lon").unwrap();
    assert_eq!(shape_all(&tree, array), vec![grid::LAT, grid::LON]);
    assert_eq!(shape_all(&tree, lat), vec![grid::LAT]);
    assert_eq!(shape_all(&tree, lon), vec![grid::LON]);
}

#[test]
fn test_nested_grid_is_structure_like() {
    let dds = vec![BaseType::structure("wrap", grid::declarations())];
    let tree = build_declarations(&dds).unwrap();
    let g = tree.find_path("wrap.T").unwrap();
    let node = tree.node(g);

    assert_eq!(node.kind, NodeKind::Grid);
    assert!(!node.is_collapsed_grid());
    assert!(shape_all(&tree, g).is_empty());
    assert_eq!(
        shape_all(&tree, tree.find_path("wrap.T.T").unwrap()),
        vec![grid::LAT, grid::LON]
    );
}

#[test]
fn test_array_of_structure_members_inherit_shape() {
    let dds = compound::declarations();
    let tree = build_declarations(&dds).unwrap();
    let a = tree.find_path("CompoundComplex.a").unwrap();
    let b = tree.find_path("CompoundComplex.b").unwrap();
    assert_eq!(shape_all(&tree, a), vec![compound::RECORDS]);
    assert_eq!(shape_all(&tree, b), vec![compound::RECORDS, compound::B_LEN]);
    assert_eq!(tree.full_name(b), "CompoundComplex.b");
}

#[test]
fn test_sibling_sequences_have_independent_shapes() {
    let data = sequences::nested_siblings(5, 12);
    let mut tree = build_values(&data).unwrap();
    let obs = tree.find_path("station.obs").unwrap();
    let profile = tree.find_path("station.deep.profile").unwrap();

    assert_eq!(shape_all(&tree, obs), vec![5]);
    assert_eq!(shape_all(&tree, profile), vec![12]);

    tree.node_mut(obs).row_count = Some(7);
    assert_eq!(shape_all(&tree, obs), vec![7]);
    assert_eq!(shape_all(&tree, profile), vec![12]);
}

#[test]
fn test_declared_sequences_have_unknown_length() {
    let dds = sequences::nested_siblings_declarations();
    let tree = build_declarations(&dds).unwrap();
    let obs = tree.find_path("station.obs").unwrap();
    assert_eq!(tree.node(obs).row_count, None);
    assert!(shape_all(&tree, obs).is_empty());
}

#[test]
fn test_jagged_inner_sequence_has_no_row_count() {
    let data = sequences::jagged();
    let tree = build_values(&data).unwrap();
    let cast = tree.find_top("cast").unwrap();
    let levels = tree.find_path("cast.levels").unwrap();

    assert_eq!(tree.node(cast).row_count, Some(sequences::LEVELS.len()));
    assert_eq!(tree.node(levels).row_count, None);

    let err = Converter::default().convert(&tree, levels).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidVariable(_)));
}

#[test]
fn test_array_of_grid_is_unsupported() {
    let dds = vec![BaseType::array(
        "grids",
        vec![ArrayDimension::anonymous(2)],
        PrimitiveVector::declared(grid::declarations().remove(0)),
    )];
    match build_declarations(&dds).unwrap_err() {
        ConvertError::Unsupported { kind, name } => {
            assert_eq!(kind, "Array of Grid");
            assert_eq!(name, "grids");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_grid_of_strings_is_unsupported() {
    let dds = vec![BaseType::grid(
        "g",
        test_utils::declared_array("g", &[("n", 2)], DapValue::Str(None)),
        Vec::new(),
    )];
    assert!(matches!(
        build_declarations(&dds),
        Err(ConvertError::Unsupported { .. })
    ));
}
