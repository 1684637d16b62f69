use crate::{Effect, Msg, PresenterState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update<V>(mut state: PresenterState<V>, msg: Msg<V>) -> (PresenterState<V>, Vec<Effect>) {
    let effects = match msg {
        Msg::Attached => {
            if state.attach() {
                vec![Effect::Refresh]
            } else {
                Vec::new()
            }
        }
        Msg::Snapshot(snapshot) => {
            state.apply_snapshot(snapshot);
            Vec::new()
        }
        Msg::ItemRendered { index } => {
            if state.should_append_at(index) {
                vec![Effect::Append]
            } else {
                Vec::new()
            }
        }
        Msg::RefreshRequested => vec![Effect::Refresh],
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
