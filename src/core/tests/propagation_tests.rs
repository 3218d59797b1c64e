// Propagation engine scenarios driven through a session
use super::{init_logging, session};
use crate::core::components::kind::{ComponentKind, GateOp};
use crate::core::errors::{PropagationError, SessionError};
use crate::core::execution::config::SessionConfig;
use crate::core::session::Session;
use crate::core::types::{ComponentId, Level, Rotation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Switch, `len` inverters and an LED placed stub to stub along row 0
fn inverter_chain(session: &mut Session, len: usize) -> (ComponentId, ComponentId) {
    let switch = session.place(ComponentKind::Switch, 0, 0, Rotation::Deg0).unwrap();
    for i in 0..len {
        session
            .place(ComponentKind::gate(GateOp::Not, 1), 0, 2 + 2 * i as i64, Rotation::Deg0)
            .unwrap();
    }
    let led = session.place(ComponentKind::Led, 0, 2 + 2 * len as i64, Rotation::Deg0).unwrap();
    (switch, led)
}

#[test]
fn test_random_inverter_chains_quiesce_in_chain_length() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x10_61c);
    for _ in 0..20 {
        let len = rng.gen_range(1..=12);
        let high: bool = rng.gen();
        let mut session = Session::new(SessionConfig::new().with_grid(2, 32));
        let (switch, led) = inverter_chain(&mut session, len);
        session.build_graph().unwrap();

        let report = session.pass_state(switch, high as u64).unwrap();
        // every inverter plus the LED
        assert!(report.steps <= len + 1, "{} steps for a chain of {}", report.steps, len);
        let expected = Level::from_bool(high ^ (len % 2 == 1));
        assert_eq!(session.state(led).unwrap().level(), expected);
    }
}

#[test]
fn test_unchanged_sink_is_not_revisited() {
    let mut session = session(2, 16);
    let (switch, _) = inverter_chain(&mut session, 0);
    session.build_graph().unwrap();

    assert_eq!(session.pass_state(switch, 1).unwrap().steps, 1);
    // same level again: the LED is still enqueued once by the driver
    assert_eq!(session.pass_state(switch, 1).unwrap().steps, 1);
}

/// NAND whose second input is fed back from its own output through four
/// wire segments
fn feedback_nand(session: &mut Session) -> ComponentId {
    let switch = session.place(ComponentKind::Switch, 2, 2, Rotation::Deg0).unwrap();
    session.place(ComponentKind::gate(GateOp::Nand, 2), 2, 4, Rotation::Deg0).unwrap();
    session.place(ComponentKind::Wire { length: 2 }, 3, 6, Rotation::Deg0).unwrap();
    session.place(ComponentKind::Wire { length: 3 }, 3, 7, Rotation::Deg90).unwrap();
    session.place(ComponentKind::Wire { length: 5 }, 5, 3, Rotation::Deg0).unwrap();
    session.place(ComponentKind::Wire { length: 2 }, 4, 3, Rotation::Deg90).unwrap();
    switch
}

#[test]
fn test_combinational_loop_aborts_at_ceiling() {
    init_logging();
    let config = SessionConfig::new().with_grid(8, 10).with_max_propagation_steps(200);
    let mut session = Session::new(config);
    let switch = feedback_nand(&mut session);
    session.build_graph().unwrap();

    // a low input pins the NAND high, so the loop is stable
    session.settle().unwrap();

    let result = session.set_driver(switch, true);
    assert_eq!(
        result,
        Err(SessionError::Propagation(PropagationError::UnstableLoop {
            driver: switch,
            limit: 200,
        }))
    );
    // the failure is local to the call
    assert!(session.is_simulating());
    assert_eq!(session.set_driver(switch, false), Ok(Level::Low));
}
