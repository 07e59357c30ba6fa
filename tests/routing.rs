mod common;

use std::rc::Rc;
use std::sync::Arc;

use common::*;
use flowkit::deps::LogSurfaceProvider;
use flowkit::error::{CompositionError, RoutingError};
use flowkit::flow::FlowState;
use flowkit::router::{Route, RouteId, RoutePolicy, RouterPlan, Switchboard, Transition, Trigger};
use flowkit::unit::{find, Postbox, UnitEnv};

fn main_plan(log: &Log) -> RouterPlan {
    RouterPlan::new("main")
        .route(Route::new(
            "login",
            step_flow("login", &["credentials", "welcome"], log).then("home"),
            RoutePolicy::PerTrigger,
        ))
        .route(Route::new(
            "home",
            step_flow("home", &["gallery"], log),
            RoutePolicy::Singleton,
        ))
}

// -- Resolution ----------------------------------------------------------------

#[test]
fn unknown_route_is_unresolved() {
    let log = new_log();
    let (_postbox, board) = switchboard(vec![main_plan(&log)]);

    let err = board.dispatch(&Trigger::from("logout")).unwrap_err();
    match err {
        RoutingError::UnresolvedTrigger { trigger } => assert_eq!(trigger, "logout"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(board.active_flow().is_none());
    assert!(log.borrow().is_empty());
}

#[test]
fn singleton_reuses_the_live_flow() {
    let log = new_log();
    let (_postbox, board) = switchboard(vec![main_plan(&log)]);

    let first = board.dispatch(&Trigger::from("home")).unwrap();
    let second = board.dispatch(&Trigger::from("home")).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.mounted(), 1);
    assert_eq!(*log.borrow(), vec!["mount gallery"]);
}

#[test]
fn per_trigger_replaces_the_live_flow() {
    let log = new_log();
    let (_postbox, board) = switchboard(vec![main_plan(&log)]);

    let first = board.dispatch(&Trigger::from("login")).unwrap();
    let second = board.dispatch(&Trigger::from("login")).unwrap();
    assert!(!Rc::ptr_eq(&first, &second));
    assert_eq!(first.state(), FlowState::Cancelled);
    assert_eq!(second.state(), FlowState::Active { index: 0 });
    assert_eq!(
        *log.borrow(),
        vec![
            "mount credentials",
            "release credentials",
            "mount credentials"
        ]
    );
}

#[test]
fn dispatch_cancels_the_previous_flow() {
    let log = new_log();
    let (_postbox, board) = switchboard(vec![main_plan(&log)]);

    let login = board.dispatch(&Trigger::from("login")).unwrap();
    let home = board.dispatch(&Trigger::from("home")).unwrap();

    assert_eq!(login.state(), FlowState::Cancelled);
    assert!(login.current().is_none());
    assert!(Rc::ptr_eq(&board.active_flow().unwrap(), &home));
    assert_eq!(log.borrow().last().map(String::as_str), Some("mount gallery"));
}

#[test]
fn deep_link_and_transition_resolve_by_first_segment() {
    let log = new_log();
    let (_postbox, board) = switchboard(vec![main_plan(&log)]);

    let flow = board
        .dispatch(&Trigger::link("flowkit://home/cat.png?size=2"))
        .unwrap();
    assert_eq!(flow.route().as_str(), "home");

    let transition = Transition::new("login")
        .from_source("test")
        .with_payload(serde_json::json!({"user": "demo"}));
    let flow = board.dispatch(&Trigger::from(transition)).unwrap();
    assert_eq!(flow.route().as_str(), "login");
    assert_eq!(flow.trigger().unwrap().payload()["user"], "demo");
}

#[test]
fn resolve_leaves_the_presenting_flow_alone() {
    let log = new_log();
    let (_postbox, board) = switchboard(vec![main_plan(&log)]);
    let login = board.dispatch(&Trigger::from("login")).unwrap();

    let resolved = board.resolve(&Trigger::from("login")).unwrap();
    assert!(!Rc::ptr_eq(&resolved, &login));
    assert_eq!(resolved.state(), FlowState::Idle);
    assert_eq!(login.state(), FlowState::Active { index: 0 });
    assert!(Rc::ptr_eq(&board.active_flow().unwrap(), &login));

    let home = board.resolve(&Trigger::from("home")).unwrap();
    assert_eq!(home.state(), FlowState::Idle);
    assert!(board.router("main").unwrap().flow(&RouteId::from("home")).is_none());
    assert_eq!(*log.borrow(), vec!["mount credentials"]);
}

#[test]
fn rejected_flow_keeps_the_current_one() {
    let log = new_log();
    let plan = main_plan(&log).route(Route::new(
        "broken",
        step_flow("broken", &[], &log),
        RoutePolicy::PerTrigger,
    ));
    let (_postbox, board) = switchboard(vec![plan]);
    let home = board.dispatch(&Trigger::from("home")).unwrap();

    let err = board.dispatch(&Trigger::from("broken")).unwrap_err();
    assert!(matches!(err, RoutingError::FlowRejected { .. }), "{err}");
    assert_eq!(home.state(), FlowState::Active { index: 0 });
    assert!(Rc::ptr_eq(&board.active_flow().unwrap(), &home));

    let router = board.router("main").unwrap();
    assert!(router.flow(&RouteId::from("broken")).is_none());
    assert_eq!(*log.borrow(), vec!["mount gallery"]);
}

// -- Multiple routers ----------------------------------------------------------

#[test]
fn switching_routers_cancels_old_foreground() {
    let log = new_log();
    let side = RouterPlan::new("side").route(Route::new(
        "help",
        step_flow("help", &["help"], &log),
        RoutePolicy::Singleton,
    ));
    let (_postbox, board) = switchboard(vec![main_plan(&log), side]);

    let home = board.dispatch(&Trigger::from("home")).unwrap();
    assert_eq!(board.foreground().unwrap().name(), "main");

    let help = board.dispatch(&Trigger::from("help")).unwrap();
    assert_eq!(board.foreground().unwrap().name(), "side");
    assert_eq!(home.state(), FlowState::Cancelled);
    assert!(board.router("main").unwrap().active_flow().is_none());
    assert!(Rc::ptr_eq(&board.active_flow().unwrap(), &help));
}

#[test]
fn duplicate_claims_are_rejected() {
    let log = new_log();
    let side = RouterPlan::new("side").route(Route::new(
        "home",
        step_flow("home", &["other"], &log),
        RoutePolicy::Singleton,
    ));
    let postbox = Postbox::new();
    let env = UnitEnv::new(&postbox, Arc::new(LogSurfaceProvider));

    let err = Switchboard::new(vec![main_plan(&log), side], env)
        .err()
        .unwrap();
    match err {
        CompositionError::DuplicateRoute {
            route,
            first,
            second,
        } => {
            assert_eq!(route.as_str(), "home");
            assert_eq!((first.as_str(), second.as_str()), ("main", "side"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// -- Hand-off ------------------------------------------------------------------

#[test]
fn finished_flow_hands_off_through_the_switchboard() {
    let log = new_log();
    let (_postbox, board) = switchboard(vec![main_plan(&log)]);

    let login = board.dispatch(&Trigger::from("login")).unwrap();
    let step = find::<StepScreen>(&login.current().unwrap()).unwrap();
    assert!(step.binding().emit(StepIntent::Next));
    let step = find::<StepScreen>(&login.current().unwrap()).unwrap();
    assert_eq!(step.view_state().label, "welcome");
    assert!(step.binding().emit(StepIntent::Done));
    drop(step);

    assert_eq!(login.state(), FlowState::Finished);
    assert_eq!(board.active_flow().unwrap().route().as_str(), "home");
    assert!(board.router("main").unwrap().flow(&RouteId::from("login")).is_none());
    assert_eq!(
        *log.borrow(),
        vec![
            "mount credentials",
            "release credentials",
            "mount welcome",
            "release welcome",
            "mount gallery"
        ]
    );
}

#[test]
fn teardown_releases_everything() {
    let log = new_log();
    let (_postbox, board) = switchboard(vec![main_plan(&log)]);
    let home = board.dispatch(&Trigger::from("home")).unwrap();

    board.teardown();
    assert_eq!(home.state(), FlowState::Cancelled);
    assert!(board.active_flow().is_none());
    assert!(board.foreground().is_none());
    assert_eq!(log.borrow().last().map(String::as_str), Some("release gallery"));
}
