use harness2graph_rs::error::Error;
use rust_decimal_macros::dec;

#[test]
fn test_identical_parts_group_into_one_row() {
    let yaml = "
connectors:
  X1:
    pincount: 2
    type: Molex KK 254
    pn: CON-2
cables:
  W1:
    wirecount: 2
    colors: [RD, BK]
    length: 0.3
connections:
  - - X1
    - W1: 1-2
    - X1.X2
";
    let mut harness = harness2graph_rs::parse(yaml).expect("failed to resolve harness");
    let bom = harness.bom().expect("failed to generate BOM");

    let connector_row = bom
        .iter()
        .find(|entry| entry.item.starts_with("Connector"))
        .expect("connector row missing");
    assert_eq!(connector_row.item, "Connector, Molex KK 254, 2 pins");
    assert_eq!(connector_row.qty, dec!(2));
    assert_eq!(
        connector_row.designators.iter().cloned().collect::<Vec<_>>(),
        vec!["X1", "X2"]
    );
    assert_eq!(connector_row.pn.as_deref(), Some("CON-2"));

    let cable_row = bom
        .iter()
        .find(|entry| entry.item.starts_with("Cable"))
        .expect("cable row missing");
    assert_eq!(cable_row.item, "Cable, 2 wires");
    assert_eq!(cable_row.qty, dec!(0.3));
    assert_eq!(cable_row.unit.as_deref(), Some("m"));
}

#[test]
fn test_quantities_round_to_three_decimals() {
    let yaml = "
additional_bom_items:
  - description: Heat shrink
    qty: 1.2
    unit: m
  - description: Heat shrink
    qty: 2.3005
    unit: m
  - description: Label sleeve
    qty: 1.2
  - description: Label sleeve
    qty: 2.3004
";
    let mut harness = harness2graph_rs::parse(yaml).expect("failed to resolve harness");
    let bom = harness.bom().expect("failed to generate BOM");

    // the midpoint rounds away from zero, everything else to nearest
    let shrink = bom.iter().find(|e| e.item == "Heat shrink").unwrap();
    assert_eq!(shrink.qty, dec!(3.501), "3.5005 must round up to 3.501");
    let sleeve = bom.iter().find(|e| e.item == "Label sleeve").unwrap();
    assert_eq!(sleeve.qty, dec!(3.5), "3.5004 must round down to 3.500");
}

#[test]
fn test_bom_is_independent_of_declaration_order() {
    let forward = "
connectors:
  X1:
    pincount: 2
    pn: CON-A
  J5:
    pincount: 2
    pn: CON-B
cables:
  W1:
    wirecount: 2
    colors: [RD, BK]
    length: 0.3
connections:
  - - X1: 1-2
    - W1: 1-2
    - J5: 1-2
";
    let reversed = "
cables:
  W1:
    wirecount: 2
    colors: [RD, BK]
    length: 0.3
connectors:
  J5:
    pincount: 2
    pn: CON-B
  X1:
    pincount: 2
    pn: CON-A
connections:
  - - J5: 1-2
    - W1: 1-2
    - X1: 1-2
";
    let mut first = harness2graph_rs::parse(forward).expect("failed to resolve harness");
    let mut second = harness2graph_rs::parse(reversed).expect("failed to resolve harness");
    assert_eq!(
        first.bom_table().unwrap(),
        second.bom_table().unwrap(),
        "permuting declarations must not change the grouped BOM"
    );
}

#[test]
fn test_optional_columns_appear_only_when_used() {
    let bare = "
additional_bom_items:
  - description: Cable tie
    qty: 10
";
    let mut harness = harness2graph_rs::parse(bare).unwrap();
    let table = harness.bom_table().unwrap();
    assert_eq!(table[0], vec!["Id", "Item", "Qty", "Unit", "Designators"]);

    let with_pn = "
additional_bom_items:
  - description: Cable tie
    qty: 10
    pn: CT-100
";
    let mut harness = harness2graph_rs::parse(with_pn).unwrap();
    let table = harness.bom_table().unwrap();
    assert_eq!(
        table[0],
        vec!["Id", "Item", "Qty", "Unit", "Designators", "P/N"]
    );
    assert_eq!(table[1][5], "CT-100");
}

#[test]
fn test_ids_follow_the_sorted_item_order() {
    let yaml = "
additional_bom_items:
  - description: Zip tie
  - description: Adhesive label
  - description: Marker
";
    let mut harness = harness2graph_rs::parse(yaml).unwrap();
    let bom = harness.bom().unwrap();
    let items: Vec<(usize, &str)> = bom
        .iter()
        .map(|entry| (entry.id, entry.item.as_str()))
        .collect();
    assert_eq!(
        items,
        vec![(1, "Adhesive label"), (2, "Marker"), (3, "Zip tie")]
    );
}

#[test]
fn test_bundles_track_each_wire_separately() {
    let yaml = "
connectors:
  X1:
    pincount: 2
cables:
  W1:
    category: bundle
    wirecount: 2
    colors: [RD, BK]
    length: 1
    pn: [WIRE-R, WIRE-B]
connections:
  - - X1: 1-2
    - W1: 1-2
";
    let mut harness = harness2graph_rs::parse(yaml).expect("failed to resolve harness");
    let bom = harness.bom().unwrap();

    let red = bom.iter().find(|e| e.item == "Wire, RD").expect("red wire row");
    assert_eq!(red.pn.as_deref(), Some("WIRE-R"));
    let black = bom.iter().find(|e| e.item == "Wire, BK").expect("black wire row");
    assert_eq!(black.pn.as_deref(), Some("WIRE-B"));
}

#[test]
fn test_component_quantities_scale_with_their_multiplier() {
    let yaml = "
connectors:
  X1:
    pincount: 4
    additional_components:
      - type: Crimp
        qty: 1
        qty_multiplier: pincount
cables:
  W1:
    wirecount: 1
    colors: [RD]
connections:
  - - X1: 1
    - W1: 1
";
    let mut harness = harness2graph_rs::parse(yaml).expect("failed to resolve harness");
    let bom = harness.bom().unwrap();
    let crimps = bom.iter().find(|e| e.item == "Crimp").expect("crimp row");
    assert_eq!(crimps.qty, dec!(4));
}

#[test]
fn test_cable_multipliers_do_not_apply_to_connectors() {
    let yaml = "
connectors:
  X1:
    pincount: 1
    additional_components:
      - type: Crimp
        qty_multiplier: wirecount
cables:
  W1:
    wirecount: 1
    colors: [RD]
connections:
  - - X1: 1
    - W1: 1
";
    let mut harness = harness2graph_rs::parse(yaml).expect("failed to resolve harness");
    let result = harness.bom();
    assert!(
        matches!(result, Err(Error::Unsupported(_))),
        "expected Unsupported, got {result:?}"
    );
}

#[test]
fn test_whitespace_in_text_fields_is_collapsed() {
    let yaml = "
additional_bom_items:
  - description: \"Heat   shrink\\ntube\"
    qty: 1
  - description: \"Heat shrink tube\"
    qty: 2
";
    let mut harness = harness2graph_rs::parse(yaml).unwrap();
    let bom = harness.bom().unwrap();
    assert_eq!(bom.len(), 1, "normalized descriptions must group together");
    assert_eq!(bom[0].item, "Heat shrink tube");
    assert_eq!(bom[0].qty, dec!(3));
}
