// ============================================================================
// AUTO-GENERATED FILE. DO NOT MODIFY!
// ============================================================================

/// States of the machine, in sorted table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Working,
}
impl State {
    pub fn name(self) -> &'static str {
        STATE_NAMES[self as usize]
    }
}
pub const STATE_COUNT: usize = 2;
const STATE_NAMES: [&str; STATE_COUNT] = ["Idle", "Working"];
/// Name of the state at `index` in table order, or `"INVALID"` when
/// the index is out of range.
pub fn state_name(index: usize) -> &'static str {
    STATE_NAMES.get(index).copied().unwrap_or("INVALID")
}
/// Events the machine reacts to, in sorted table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    JobDone,
    JobReceived,
}
impl Event {
    pub fn name(self) -> &'static str {
        EVENT_NAMES[self as usize]
    }
}
pub const EVENT_COUNT: usize = 2;
const EVENT_NAMES: [&str; EVENT_COUNT] = ["JobDone", "JobReceived"];
/// Name of the event at `index` in table order, or `"INVALID"` when
/// the index is out of range.
pub fn event_name(index: usize) -> &'static str {
    EVENT_NAMES.get(index).copied().unwrap_or("INVALID")
}
/// Business logic injected into the machine: one method per distinct
/// action and guard fragment in the diagram.
pub trait SimpleFsmActions {
    /// Action: `print("Entered Idle")`
    fn print_entered_idle(&mut self);
    /// Action: `print("Left Idle")`
    fn print_left_idle(&mut self);
    /// Action: `print("Entered Working")`
    fn print_entered_working(&mut self);
    /// Action: `print("Left Working")`
    fn print_left_working(&mut self);
    /// Action: `print("Job done")`
    fn print_job_done(&mut self);
    /// Action: `print("Job received")`
    fn print_job_received(&mut self);
}
pub const TRANSITION_COUNT: usize = 2;
const MAX_DEPTH: usize = 1;
const INITIAL_STATE: State = State::Idle;
const PARENTS: [Option<State>; STATE_COUNT] = [None, None];
/// One row per transition, ordered by event and then source state.
/// `to` is the entry-target leaf resolved at compile time; `None`
/// marks an internal transition.
struct TransitionRow {
    event: Event,
    from: State,
    to: Option<State>,
}
const TRANSITIONS: [TransitionRow; TRANSITION_COUNT] = [
    TransitionRow {
        event: Event::JobDone,
        from: State::Working,
        to: Some(State::Idle),
    },
    TransitionRow {
        event: Event::JobReceived,
        from: State::Idle,
        to: Some(State::Working),
    },
];
fn parent_of(state: State) -> Option<State> {
    PARENTS[state as usize]
}
/// Nearest common ancestor; both chains include the state itself,
/// `None` is the virtual root above all top-level states.
fn common_ancestor(a: State, b: State) -> Option<State> {
    let mut chain = [a; MAX_DEPTH];
    let mut len = 0;
    let mut cursor = Some(a);
    while let Some(state) = cursor {
        chain[len] = state;
        len += 1;
        cursor = parent_of(state);
    }
    let mut cursor = Some(b);
    while let Some(state) = cursor {
        if chain[..len].contains(&state) {
            return Some(state);
        }
        cursor = parent_of(state);
    }
    None
}
/// Hierarchical state machine compiled from a state diagram; inject the
/// business logic through an [`SimpleFsmActions`] implementation, call
/// `init` once, then post events with `dispatch`.
pub struct SimpleFsm<A: SimpleFsmActions> {
    state: State,
    actions: A,
}
impl<A: SimpleFsmActions> SimpleFsm<A> {
    pub fn new(actions: A) -> Self {
        Self {
            state: INITIAL_STATE,
            actions,
        }
    }
    /// Runs the entry actions from the virtual root down to the
    /// initial leaf state. Call exactly once, before any event is
    /// posted.
    pub fn init(&mut self) {
        self.enter_path(None, INITIAL_STATE);
        self.state = INITIAL_STATE;
    }
    /// Posts one event. The transition search starts at the current
    /// leaf and bubbles up the ancestor chain; the first row whose
    /// event matches and whose guard passes wins. An event no state
    /// handles is silently dropped.
    pub fn dispatch(&mut self, event: Event) {
        let Some(index) = self.find_transition(event) else {
            return;
        };
        let row = &TRANSITIONS[index];
        let Some(target) = row.to else {
            // Internal transition: actions only, no state change.
            self.run_transition_actions(index);
            return;
        };
        if self.state == target {
            // Self-transition: a full exit/entry cycle, not a no-op.
            self.run_exit_actions(self.state);
            self.run_transition_actions(index);
            self.run_entry_actions(self.state);
        } else {
            let pivot = common_ancestor(self.state, target);
            self.exit_path(self.state, pivot);
            self.run_transition_actions(index);
            self.enter_path(pivot, target);
            self.state = target;
        }
    }
    pub fn current_state(&self) -> State {
        self.state
    }
    pub fn actions(&self) -> &A {
        &self.actions
    }
    pub fn actions_mut(&mut self) -> &mut A {
        &mut self.actions
    }
    fn find_transition(&self, event: Event) -> Option<usize> {
        let mut scope = Some(self.state);
        while let Some(state) = scope {
            let mut index = 0;
            while index < TRANSITIONS.len() {
                let row = &TRANSITIONS[index];
                if row.event == event && row.from == state && self.guard_allows(index) {
                    return Some(index);
                }
                index += 1;
            }
            scope = parent_of(state);
        }
        None
    }
    fn guard_allows(&self, index: usize) -> bool {
        match index {
            _ => true,
        }
    }
    fn run_transition_actions(&mut self, index: usize) {
        match index {
            0 => {
                self.actions.print_job_done();
            }
            1 => {
                self.actions.print_job_received();
            }
            _ => {}
        }
    }
    fn run_entry_actions(&mut self, state: State) {
        match state {
            State::Idle => {
                self.actions.print_entered_idle();
            }
            State::Working => {
                self.actions.print_entered_working();
            }
        }
    }
    fn run_exit_actions(&mut self, state: State) {
        match state {
            State::Idle => {
                self.actions.print_left_idle();
            }
            State::Working => {
                self.actions.print_left_working();
            }
        }
    }
    /// Exit actions from `from` up to (excluding) `boundary`,
    /// innermost state first.
    fn exit_path(&mut self, from: State, boundary: Option<State>) {
        let mut cursor = Some(from);
        while cursor != boundary {
            let Some(state) = cursor else {
                break;
            };
            self.run_exit_actions(state);
            cursor = parent_of(state);
        }
    }
    /// Entry actions from (excluding) `boundary` down to `target`,
    /// outermost state first.
    fn enter_path(&mut self, boundary: Option<State>, target: State) {
        let mut chain = [target; MAX_DEPTH];
        let mut depth = 0;
        let mut cursor = Some(target);
        while cursor != boundary {
            let Some(state) = cursor else {
                break;
            };
            chain[depth] = state;
            depth += 1;
            cursor = parent_of(state);
        }
        while depth > 0 {
            depth -= 1;
            self.run_entry_actions(chain[depth]);
        }
    }
}
// ============================================================================
// AUTO-GENERATED FILE. DO NOT MODIFY!
// ============================================================================
