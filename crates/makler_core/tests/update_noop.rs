use makler_core::{update, AdminState, Msg};

#[test]
fn update_is_noop() {
    let state = AdminState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
