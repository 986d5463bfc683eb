//! The validated in-memory representation of a state diagram.
//!
//! States live in an arena and refer to each other through [`StateId`]
//! handles, so the parent/child hierarchy needs no shared ownership. After
//! parsing and validation the diagram is frozen; the code generator only
//! runs read-only queries against it.

use std::collections::HashMap;

/// Stable handle of a state in the diagram arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An event posted to the machine. No payload; identity is the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
}

/// Opaque boolean-expression text guarding a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub code: String,
}

/// Opaque statement text run when a transition fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub code: String,
}

/// A transition between two states.
///
/// Internal transitions and entry/exit hooks are stored with `to == from`;
/// they live only in the owning state's lists and never change the current
/// state.
#[derive(Debug, Clone)]
pub struct Transition {
    pub event: Event,
    pub guard: Option<Guard>,
    pub from: StateId,
    pub to: StateId,
    pub actions: Vec<Action>,
}

/// A state node: hierarchy links plus the transitions attached to it.
#[derive(Debug)]
pub struct State {
    pub name: String,
    pub parent: Option<StateId>,
    pub children: Vec<StateId>,
    pub is_initial: bool,
    pub external: Vec<Transition>,
    pub internal: Vec<Transition>,
    pub entry: Vec<Transition>,
    pub exit: Vec<Transition>,
}

/// Whether a flat-view transition changes state when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    External,
    Internal,
}

/// The complete diagram: state arena, name index and captured header.
#[derive(Debug, Default)]
pub struct Diagram {
    states: Vec<State>,
    by_name: HashMap<String, StateId>,
    pub copyright_header: String,
}

impl Diagram {
    pub fn new(copyright_header: String) -> Self {
        Self {
            states: Vec::new(),
            by_name: HashMap::new(),
            copyright_header,
        }
    }

    /// Returns the existing state named `name`, or creates it with the given
    /// parent and initial marker. A reused state keeps the parent and marker
    /// from its first occurrence.
    pub(crate) fn intern(
        &mut self,
        name: &str,
        parent: Option<StateId>,
        is_initial: bool,
    ) -> StateId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }

        let id = StateId(self.states.len());
        self.states.push(State {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            is_initial,
            external: Vec::new(),
            internal: Vec::new(),
            entry: Vec::new(),
            exit: Vec::new(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.0]
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub fn id(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State handles in definition order.
    pub fn ids(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len()).map(StateId)
    }

    /// The child carrying the initial marker, if `id` is a composite state.
    pub fn initial_child(&self, id: StateId) -> Option<StateId> {
        self.state(id)
            .children
            .iter()
            .copied()
            .find(|&c| self.state(c).is_initial)
    }

    /// Follows the chain of initial children down to the leaf actually
    /// entered when a transition targets `id`. A leaf returns itself.
    pub fn entry_target(&self, id: StateId) -> StateId {
        let mut current = id;
        while let Some(child) = self.initial_child(current) {
            current = child;
        }
        current
    }

    /// The ancestor chain of `id`, inclusive, from the state itself up to
    /// its top-level ancestor.
    pub fn ancestor_chain(&self, id: StateId) -> Vec<StateId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(st) = cursor {
            chain.push(st);
            cursor = self.state(st).parent;
        }
        chain
    }

    /// Nearest common ancestor of `a` and `b`. Both chains include the state
    /// itself, so `common_ancestor(a, a) == Some(a)`. `None` is the virtual
    /// root above all top-level states.
    pub fn common_ancestor(&self, a: StateId, b: StateId) -> Option<StateId> {
        let chain_a = self.ancestor_chain(a);
        let mut cursor = Some(b);
        while let Some(st) = cursor {
            if chain_a.contains(&st) {
                return Some(st);
            }
            cursor = self.state(st).parent;
        }
        None
    }

    /// All state names, sorted alphabetically.
    pub fn state_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.states.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// All event names appearing on internal or external transitions,
    /// sorted alphabetically. Entry/exit hooks do not contribute events.
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .transitions()
            .iter()
            .map(|(_, t)| t.event.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// All internal and external transitions, ordered by event name and then
    /// by source-state name. Ties keep definition order, internal before
    /// external per state, so repeated compilations emit identical tables.
    pub fn transitions(&self) -> Vec<(TransitionKind, &Transition)> {
        let mut all: Vec<(TransitionKind, &Transition)> = Vec::new();
        for state in &self.states {
            all.extend(state.internal.iter().map(|t| (TransitionKind::Internal, t)));
            all.extend(state.external.iter().map(|t| (TransitionKind::External, t)));
        }
        all.sort_by(|(_, a), (_, b)| {
            (a.event.name.as_str(), self.state(a.from).name.as_str())
                .cmp(&(b.event.name.as_str(), self.state(b.from).name.as_str()))
        });
        all
    }

    /// The top-level state carrying the initial marker.
    pub fn top_level_initial(&self) -> Option<StateId> {
        self.ids()
            .find(|&id| self.state(id).parent.is_none() && self.state(id).is_initial)
    }

    /// The leaf state the machine occupies after initialization: the entry
    /// target of the top-level initial state. `None` only before validation.
    pub fn initial_leaf(&self) -> Option<StateId> {
        self.top_level_initial().map(|id| self.entry_target(id))
    }
}
