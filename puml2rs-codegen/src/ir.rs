//! Intermediate representation of the generated machine.
//!
//! Lowers the frozen diagram into exactly the static tables the artifact
//! embeds: sorted state/event tables, the parent table, transition rows
//! with their targets resolved to entry-target leaves at compile time, and
//! the behavior surface (one method per distinct action/guard fragment).
//! All ordering decisions live here so the renderer stays mechanical and
//! repeated compilations produce identical output.

use std::collections::HashMap;

use puml2rs_core::{Diagram, StateId, TransitionKind};

use crate::idents;
use crate::{CodegenError, GenOptions};

pub struct FsmIr {
    pub machine_name: String,
    pub module: Option<String>,
    pub copyright_header: Option<String>,
    /// Sorted by name; the index is the `State` enum discriminant.
    pub states: Vec<StateIr>,
    /// Sorted event names; the index is the `Event` enum discriminant.
    pub events: Vec<String>,
    /// Ordered by event name, then source-state name.
    pub transitions: Vec<TransitionIr>,
    /// The behavior surface, in first-use order.
    pub methods: Vec<MethodIr>,
    /// Table index of the leaf entered by `init()`.
    pub initial_leaf: usize,
    /// Deepest nesting level; sizes the artifact's path buffers.
    pub max_depth: usize,
}

pub struct StateIr {
    pub name: String,
    pub parent: Option<usize>,
    pub entry_actions: Vec<usize>,
    pub exit_actions: Vec<usize>,
}

pub struct TransitionIr {
    pub event: usize,
    pub from: usize,
    /// Entry-target leaf of the written destination; `None` marks an
    /// internal transition.
    pub to: Option<usize>,
    pub guard: Option<usize>,
    pub actions: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Action,
    Guard,
}

pub struct MethodIr {
    pub name: String,
    pub code: String,
    pub kind: MethodKind,
}

/// Interns distinct action/guard fragments, assigning each a unique,
/// deterministic method name.
#[derive(Default)]
struct MethodRegistry {
    methods: Vec<MethodIr>,
    by_fragment: HashMap<(MethodKind, String), usize>,
}

impl MethodRegistry {
    fn intern(&mut self, kind: MethodKind, code: &str) -> usize {
        let key = (kind, code.to_string());
        if let Some(&index) = self.by_fragment.get(&key) {
            return index;
        }

        let fallback = match kind {
            MethodKind::Action => "action",
            MethodKind::Guard => "guard",
        };
        let base = idents::method_base_name(code, fallback);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.methods.iter().any(|m| m.name == name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }

        let index = self.methods.len();
        self.methods.push(MethodIr {
            name,
            code: code.to_string(),
            kind,
        });
        self.by_fragment.insert(key, index);
        index
    }
}

impl FsmIr {
    pub fn new(diagram: &Diagram, options: &GenOptions) -> Result<Self, CodegenError> {
        let sorted_names = diagram.state_names();
        let index_of: HashMap<StateId, usize> = sorted_names
            .iter()
            .enumerate()
            .filter_map(|(index, name)| diagram.id(name).map(|id| (id, index)))
            .collect();

        let mut registry = MethodRegistry::default();

        let states: Vec<StateIr> = sorted_names
            .iter()
            .filter_map(|name| diagram.id(name))
            .map(|id| {
                let state = diagram.state(id);
                StateIr {
                    name: state.name.clone(),
                    parent: state.parent.map(|p| index_of[&p]),
                    entry_actions: hook_actions(&mut registry, &state.entry),
                    exit_actions: hook_actions(&mut registry, &state.exit),
                }
            })
            .collect();

        let events: Vec<String> = diagram
            .event_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let event_index: HashMap<&str, usize> = events
            .iter()
            .enumerate()
            .map(|(index, name)| (name.as_str(), index))
            .collect();

        let transitions: Vec<TransitionIr> = diagram
            .transitions()
            .iter()
            .map(|(kind, t)| TransitionIr {
                event: event_index[t.event.name.as_str()],
                from: index_of[&t.from],
                to: match kind {
                    TransitionKind::Internal => None,
                    TransitionKind::External => Some(index_of[&diagram.entry_target(t.to)]),
                },
                guard: t
                    .guard
                    .as_ref()
                    .map(|g| registry.intern(MethodKind::Guard, &g.code)),
                actions: t
                    .actions
                    .iter()
                    .map(|a| registry.intern(MethodKind::Action, &a.code))
                    .collect(),
            })
            .collect();

        let initial_leaf = diagram
            .initial_leaf()
            .map(|id| index_of[&id])
            .ok_or(CodegenError::MissingInitialState)?;

        let max_depth = (0..states.len())
            .map(|index| depth_of(&states, index))
            .max()
            .unwrap_or(0);

        Ok(Self {
            machine_name: options.machine_name.clone(),
            module: options.module.clone(),
            copyright_header: (!diagram.copyright_header.is_empty())
                .then(|| diagram.copyright_header.clone()),
            states,
            events,
            transitions,
            methods: registry.methods,
            initial_leaf,
            max_depth,
        })
    }
}

fn hook_actions(
    registry: &mut MethodRegistry,
    hooks: &[puml2rs_core::Transition],
) -> Vec<usize> {
    hooks
        .iter()
        .flat_map(|t| t.actions.iter())
        .map(|a| registry.intern(MethodKind::Action, &a.code))
        .collect()
}

fn depth_of(states: &[StateIr], index: usize) -> usize {
    let mut depth = 1;
    let mut cursor = states[index].parent;
    while let Some(parent) = cursor {
        depth += 1;
        cursor = states[parent].parent;
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use puml2rs_core::{Source, parse};

    fn lower(text: &str) -> FsmIr {
        let diagram = parse(&Source::from_text("test.puml", text)).unwrap();
        FsmIr::new(
            &diagram,
            &GenOptions {
                machine_name: "TestFsm".to_string(),
                module: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn tables_are_sorted_and_indexed() {
        let ir = lower(
            "[*] --> Working
state Working
state Idle
Working --> Idle : JobDone
Idle --> Working : JobReceived
",
        );

        let names: Vec<&str> = ir.states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Idle", "Working"]);
        assert_eq!(ir.events, ["JobDone", "JobReceived"]);

        // Rows sorted by event, states referenced by sorted index.
        assert_eq!(ir.transitions[0].event, 0);
        assert_eq!(ir.transitions[0].from, 1);
        assert_eq!(ir.transitions[0].to, Some(0));
        assert_eq!(ir.transitions[1].from, 0);
    }

    #[test]
    fn transition_targets_resolve_to_entry_leaves() {
        let ir = lower(
            "[*] --> Off
state Off
state On {
    [*] --> Dim
    state Dim
    state Bright
}
Off --> On : PowerOn
",
        );

        // Sorted: Bright, Dim, Off, On. Targeting the composite `On`
        // lands on its initial child `Dim`.
        let row = &ir.transitions[0];
        assert_eq!(ir.states[row.from].name, "Off");
        assert_eq!(ir.states[row.to.unwrap()].name, "Dim");
    }

    #[test]
    fn internal_transitions_have_no_target() {
        let ir = lower("[*] --> A\nstate A\nA : Tick / poll()\n");
        assert_eq!(ir.transitions[0].to, None);
    }

    #[test]
    fn parent_table_uses_sorted_indices() {
        let ir = lower(
            "[*] --> Outer
state Outer {
    [*] --> Inner
    state Inner
}
",
        );
        // Sorted: Inner (0), Outer (1).
        assert_eq!(ir.states[0].parent, Some(1));
        assert_eq!(ir.states[1].parent, None);
        assert_eq!(ir.initial_leaf, 0);
        assert_eq!(ir.max_depth, 2);
    }

    #[test]
    fn distinct_fragments_get_distinct_methods() {
        let ir = lower(
            "[*] --> A
state A
state B
A : entry / blink()
B : entry / blink()
A --> B : Go [armed] / blink() / beep()
",
        );

        let names: Vec<&str> = ir.methods.iter().map(|m| m.name.as_str()).collect();
        // `blink()` is shared between both hooks and the transition.
        assert_eq!(names, ["blink", "armed", "beep"]);
        assert_eq!(ir.methods[1].kind, MethodKind::Guard);
    }

    #[test]
    fn colliding_method_names_get_suffixes() {
        let ir = lower(
            "[*] --> A
state A
state B
A --> B : Go [beep] / beep()
",
        );
        let names: Vec<&str> = ir.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["beep", "beep_2"]);
    }

    #[test]
    fn unvalidated_diagram_is_rejected() {
        let diagram = Diagram::new(String::new());
        let err = FsmIr::new(
            &diagram,
            &GenOptions {
                machine_name: "X".to_string(),
                module: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CodegenError::MissingInitialState));
    }
}
