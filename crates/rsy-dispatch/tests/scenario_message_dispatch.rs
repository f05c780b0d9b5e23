//! Scenario: routing actor messages by type and by value
//!
//! Handlers registered per message type mutate the receiving context;
//! unknown messages fall through to the default handler, and a second
//! registration for the same type is refused.

use rsy_dispatch::{TypeDispatcher, ValueDispatcher};

#[derive(Default)]
struct Scoreboard {
    blue: u32,
    red: u32,
    ignored: u32,
}

struct GoalScored {
    team_red: bool,
    points: u32,
}

struct Died;

fn dispatcher() -> TypeDispatcher<Scoreboard, &'static str> {
    let mut d = TypeDispatcher::new(|sb: &mut Scoreboard, _msg: &dyn std::any::Any| {
        sb.ignored += 1;
        "unhandled"
    });
    d.register(|sb: &mut Scoreboard, goal: &GoalScored| {
        if goal.team_red {
            sb.red += goal.points;
        } else {
            sb.blue += goal.points;
        }
        "goal"
    })
    .unwrap();
    d
}

#[test]
fn typed_messages_reach_their_handler() {
    let d = dispatcher();
    let mut sb = Scoreboard::default();

    let out = d.dispatch(
        &mut sb,
        &GoalScored {
            team_red: true,
            points: 7,
        },
    );
    assert_eq!(out, "goal");
    assert_eq!(sb.red, 7);
    assert_eq!(sb.blue, 0);

    assert_eq!(d.dispatch(&mut sb, &Died), "unhandled");
    assert_eq!(sb.ignored, 1);
    assert!(d.handles::<GoalScored>());
    assert!(!d.handles::<Died>());
}

#[test]
fn second_handler_for_same_type_is_rejected() {
    let mut d = dispatcher();
    let err = d
        .register(|_: &mut Scoreboard, _: &GoalScored| "again")
        .unwrap_err();
    assert!(err.key.ends_with("GoalScored"), "got {}", err.key);
    assert!(err.to_string().contains("duplicate handler"));
}

#[test]
fn value_dispatch_falls_back_for_unknown_keys() {
    let mut d = ValueDispatcher::new(|name: &&str| format!("no preset for {name}"));
    d.register("easy", || "spawn 2 bots".to_string()).unwrap();
    d.register("hard", || "spawn 6 bots".to_string()).unwrap();

    assert_eq!(d.call(&"hard"), "spawn 6 bots");
    assert_eq!(d.call(&"insane"), "no preset for insane");
}
