use logicgrid::core::components::DISPLAY_CAPACITY;
use logicgrid::{
    ComponentId, ComponentKind, GateOp, GraphStatus, Level, PlacementError, Rotation, SchematicRecord, Session,
    SessionConfig, SessionError, State,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two switches into an XOR gate lighting an LED
fn xor_schematic(session: &mut Session) -> (ComponentId, ComponentId, ComponentId) {
    let a = session.place(ComponentKind::Switch, 2, 2, Rotation::Deg0).unwrap();
    let b = session.place(ComponentKind::Switch, 4, 2, Rotation::Deg0).unwrap();
    session.place(ComponentKind::gate(GateOp::Xor, 2), 2, 4, Rotation::Deg0).unwrap();
    let led = session.place(ComponentKind::Led, 3, 7, Rotation::Deg0).unwrap();
    (a, b, led)
}

#[test]
fn test_place_build_and_drive() {
    init_logging();
    let mut session = Session::default();
    let (a, b, led) = xor_schematic(&mut session);
    assert_eq!(session.components().count(), 4);
    assert!(!session.is_simulating());

    session.build_graph().unwrap();
    session.settle().unwrap();

    let mut observed = Vec::new();
    for (x, y) in [(false, false), (true, false), (true, true), (false, true)] {
        session.set_driver(a, x).unwrap();
        session.set_driver(b, y).unwrap();
        observed.push(session.state(led).unwrap().level());
    }
    assert_eq!(observed, vec![Level::Low, Level::High, Level::Low, Level::High]);
}

#[test]
fn test_placement_rejections() {
    let mut session = Session::new(SessionConfig::new().with_grid(8, 8));
    session.place(ComponentKind::Led, 2, 2, Rotation::Deg0).unwrap();

    let overlap = session.place(ComponentKind::Switch, 2, 2, Rotation::Deg0);
    assert!(matches!(overlap, Err(SessionError::Placement(PlacementError::Occupied { .. }))));

    let outside = session.place(ComponentKind::Dff, 6, 6, Rotation::Deg0);
    assert!(matches!(outside, Err(SessionError::Placement(PlacementError::OutOfBounds { .. }))));

    let shape = session.place(ComponentKind::gate(GateOp::Not, 2), 4, 4, Rotation::Deg0);
    assert!(matches!(shape, Err(SessionError::Placement(PlacementError::InvalidShape(_)))));

    assert_eq!(session.components().count(), 1);
}

#[test]
fn test_load_rejects_far_off_grid_records() {
    let json = r#"[{"id": 1, "kind": "Switch", "row": 0, "col": 9223372036854775807}]"#;
    let records: Vec<SchematicRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(records[0].col, i64::MAX);
    let loaded = Session::load(SessionConfig::default(), &records);
    assert!(matches!(loaded, Err(SessionError::Placement(PlacementError::OutOfBounds { .. }))));

    let mut session = Session::default();
    let led = session.place(ComponentKind::Led, 2, 2, Rotation::Deg0).unwrap();
    let moved = session.move_to(led, i64::MIN, 0);
    assert!(matches!(moved, Err(SessionError::Placement(PlacementError::OutOfBounds { .. }))));
    assert_eq!(session.component(led).unwrap().anchor().row, 2);
}

#[test]
fn test_records_survive_json_and_reload() {
    init_logging();
    let mut session = Session::default();
    let (a, _, led) = xor_schematic(&mut session);
    session
        .place_programmed(
            ComponentKind::Prom { address_bits: 2, data_bits: 4 },
            10,
            10,
            Rotation::Deg90,
            vec![1, 2, 4, 8],
        )
        .unwrap();
    session.build_graph().unwrap();
    session.set_driver(a, true).unwrap();

    let records = session.records();
    assert_eq!(records.len(), 5);
    assert_eq!(records[4].programmed_data, Some(vec![1, 2, 4, 8]));

    let json = serde_json::to_string(&records).unwrap();
    let parsed: Vec<SchematicRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, records);

    let (mut loaded, ids) = Session::load(SessionConfig::default(), &parsed).unwrap();
    assert_eq!(*loaded.graph_status(), GraphStatus::Ready);
    assert_eq!(ids.len(), 5);

    // switch levels are not part of a schematic; everything reloads low
    let new_led = ids[&led.raw()];
    assert_eq!(loaded.state(new_led).unwrap().level(), Level::Low);
    loaded.toggle(ids[&a.raw()]).unwrap();
    assert_eq!(loaded.state(new_led).unwrap().level(), Level::High);
    assert_eq!(loaded.records(), parsed);
}

#[test]
fn test_load_with_bad_topology_keeps_schematic() {
    let records = vec![
        SchematicRecord::new(7, ComponentKind::Switch, 0, 0, Rotation::Deg0),
        SchematicRecord::new(8, ComponentKind::Wire { length: 3 }, 0, 1, Rotation::Deg0),
        SchematicRecord::new(9, ComponentKind::Clock, 0, 4, Rotation::Deg180),
    ];
    let (mut session, ids) = Session::load(SessionConfig::new().with_grid(4, 8), &records).unwrap();

    assert!(matches!(session.graph_status(), GraphStatus::Failed(errors) if errors.len() == 1));
    assert_eq!(session.tick(ids[&9]), Err(SessionError::SimulationUnavailable));

    session.delete(ids[&7]).unwrap();
    session.build_graph().unwrap();
    assert_eq!(session.tick(ids[&9]), Ok(Level::High));
}

#[test]
fn test_display_buffer_is_bounded() {
    let mut session = Session::new(SessionConfig::new().with_grid(16, 16));
    let bits: Vec<ComponentId> = (0..8)
        .map(|i| session.place(ComponentKind::Switch, 1 + i, 0, Rotation::Deg0).unwrap())
        .collect();
    let display = session.place(ComponentKind::AsciiDisplay, 1, 2, Rotation::Deg0).unwrap();
    let clock = session.place(ComponentKind::Clock, 9, 4, Rotation::Deg0).unwrap();
    session.build_graph().unwrap();
    session.settle().unwrap();

    for n in 0..DISPLAY_CAPACITY + 10 {
        let code = b'a' + (n % 26) as u8;
        for (i, bit) in bits.iter().enumerate() {
            session.set_driver(*bit, code >> (7 - i) & 1 == 1).unwrap();
        }
        session.tick(clock).unwrap();
        session.tick(clock).unwrap();
    }

    let text = session.display_text(display).unwrap();
    assert_eq!(text.len(), DISPLAY_CAPACITY);
    // the first ten characters were dropped
    assert!(text.starts_with("klmn"));
}

#[test]
fn test_prom_state_is_exposed_as_bits() {
    let mut session = Session::default();
    let prom = session
        .place_programmed(
            ComponentKind::Prom { address_bits: 1, data_bits: 3 },
            4,
            4,
            Rotation::Deg0,
            vec![0b101, 0b010],
        )
        .unwrap();
    let component = session.component(prom).unwrap();
    assert_eq!(component.programmed_data(), Some(&[0b101, 0b010][..]));
    assert_eq!(session.state(prom).unwrap(), &State::Bits(vec![false; 3]));
}
