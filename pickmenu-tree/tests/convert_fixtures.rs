use pickmenu_tree::{
    BranchStrategy, BuildError, ConvertError, ConvertOptions, Converter, HierarchyBuilder,
    SerializableNode, TableError, TableLoader,
};
use rstest::rstest;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn labels(node: &SerializableNode) -> Vec<&str> {
    node.children.iter().map(|c| c.label.as_str()).collect()
}

fn child<'a>(node: &'a SerializableNode, label: &str) -> &'a SerializableNode {
    node.children
        .iter()
        .find(|c| c.label == label)
        .unwrap_or_else(|| panic!("{} has no child {}", node.label, label))
}

#[test]
fn preprocess_fixture_succeeds() {
    let pre = TableLoader::from_path(fixture_path("data.csv"))
        .unwrap()
        .preprocess()
        .unwrap();

    assert_eq!(pre.root.label(), "Store");
    assert_eq!(pre.root.id(), 100);
    assert_eq!(pre.root.link(), "https://shop.example/store");
    assert_eq!(pre.columns, 16);
    assert_eq!(pre.rows.len(), 10);
}

#[rstest]
#[case(BranchStrategy::ActiveBranch)]
#[case(BranchStrategy::ExactPath)]
fn fixture_builds_expected_tree(#[case] strategy: BranchStrategy) {
    let pre = TableLoader::from_path(fixture_path("data.csv"))
        .unwrap()
        .preprocess()
        .unwrap();
    let tree = HierarchyBuilder::new(strategy)
        .build_serializable(pre.root, &pre.rows)
        .unwrap();

    assert_eq!(labels(&tree), vec!["Fresh Food", "Household"]);
    let fresh = child(&tree, "Fresh Food");
    assert_eq!(fresh.id, 200);
    assert_eq!(labels(fresh), vec!["Bakery", "Dairy"]);

    let bakery = child(fresh, "Bakery");
    assert_eq!(labels(bakery), vec!["Bread", "Cakes"]);
    let bread = child(bakery, "Bread");
    assert_eq!(labels(bread), vec!["Sourdough", "Wholemeal"]);
    assert_eq!(
        child(bread, "Wholemeal").link,
        "https://shop.example/fresh/bakery/bread/wholemeal"
    );

    assert_eq!(labels(child(fresh, "Dairy")), vec!["Milk"]);
    assert_eq!(labels(child(&tree, "Household")), vec!["Cleaning"]);
}

#[test]
fn fixture_converts_to_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output").join("output.json");

    let summary = Converter::new(ConvertOptions::default())
        .run(&fixture_path("data.csv"), &output)
        .unwrap();
    assert_eq!(summary.rows, 10);
    assert_eq!(summary.nodes, 11);
    assert_eq!(summary.depth, 5);

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("{\n    \"id\": 100,\n    \"link\": "));
    let tree: SerializableNode = serde_json::from_str(&text).unwrap();
    assert_eq!(tree.label, "Store");
}

#[test]
fn invalid_fixture_preprocesses_but_fails_to_build() {
    let pre = TableLoader::from_path(fixture_path("invalid_df.csv"))
        .unwrap()
        .preprocess()
        .unwrap();
    let err = HierarchyBuilder::default()
        .build(pre.root, &pre.rows)
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::HierarchyMismatch {
            line: 4,
            expected: "Store".into(),
            found: "Shop".into(),
        }
    );
}

#[test]
fn blank_fixture_is_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.json");
    let err = Converter::new(ConvertOptions::default())
        .run(&fixture_path("empty.csv"), &output)
        .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Table(TableError::EmptyInput { rows: 0, columns: 4 })
    ));
    assert!(!output.exists());
}

#[test]
fn wrong_path_is_file_not_found() {
    let err = TableLoader::from_path(fixture_path("data_missing.csv"))
        .err()
        .expect("missing file to fail");
    assert!(matches!(err, TableError::FileNotFound { .. }));
}
