//! Semantic validation of the parsed state tree.
//!
//! Runs after the state pass and before external arrows are resolved, so a
//! structurally broken hierarchy is reported before any dangling endpoint.

use crate::error::DiagramError;
use crate::model::Diagram;
use crate::parser::InitialNames;

/// Every `[*] --> Name` arrow must point at a defined state.
pub(crate) fn check_initial_targets(
    diagram: &Diagram,
    initial_names: &InitialNames,
) -> Result<(), DiagramError> {
    for (name, location) in initial_names {
        if diagram.id(name).is_none() {
            return Err(DiagramError::UndefinedInitialTarget {
                location: location.clone(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}

/// Exactly one top-level initial state, and exactly one initial child per
/// composite state.
pub fn check_states(diagram: &Diagram) -> Result<(), DiagramError> {
    let top_level: Vec<&str> = diagram
        .ids()
        .filter(|&id| {
            let state = diagram.state(id);
            state.parent.is_none() && state.is_initial
        })
        .map(|id| diagram.state(id).name.as_str())
        .collect();

    if top_level.is_empty() {
        return Err(DiagramError::MissingTopLevelInitial);
    }
    if top_level.len() > 1 {
        return Err(DiagramError::MultipleTopLevelInitial {
            names: top_level.join(", "),
        });
    }

    for id in diagram.ids() {
        let state = diagram.state(id);
        if state.children.is_empty() {
            continue;
        }

        let initial_children = state
            .children
            .iter()
            .filter(|&&child| diagram.state(child).is_initial)
            .count();
        match initial_children {
            1 => {}
            0 => {
                return Err(DiagramError::MissingCompositeInitial {
                    name: state.name.clone(),
                });
            }
            _ => {
                return Err(DiagramError::MultipleCompositeInitial {
                    name: state.name.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::DiagramError;
    use crate::parser::parse;
    use crate::reader::Source;

    fn parse_text(text: &str) -> Result<crate::model::Diagram, DiagramError> {
        parse(&Source::from_text("test.puml", text))
    }

    #[test]
    fn missing_top_level_initial_is_fatal() {
        let err = parse_text("state A\nstate B\nA --> B : Go\n").unwrap_err();
        assert!(matches!(err, DiagramError::MissingTopLevelInitial));
    }

    #[test]
    fn multiple_top_level_initials_are_fatal() {
        let err = parse_text("[*] --> A\n[*] --> B\nstate A\nstate B\n").unwrap_err();
        match err {
            DiagramError::MultipleTopLevelInitial { names } => assert_eq!(names, "A, B"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn composite_without_initial_child_is_fatal() {
        let err = parse_text(
            "[*] --> Outer
state Outer {
    state A
    state B
}
",
        )
        .unwrap_err();
        assert!(
            matches!(err, DiagramError::MissingCompositeInitial { ref name } if name == "Outer")
        );
    }

    #[test]
    fn composite_with_two_initial_children_is_fatal() {
        let err = parse_text(
            "[*] --> Outer
state Outer {
    [*] --> A
    [*] --> B
    state A
    state B
}
",
        )
        .unwrap_err();
        assert!(
            matches!(err, DiagramError::MultipleCompositeInitial { ref name } if name == "Outer")
        );
    }

    #[test]
    fn well_formed_hierarchy_passes() {
        assert!(
            parse_text(
                "[*] --> Outer
state Outer {
    [*] --> Inner
    state Inner
}
",
            )
            .is_ok()
        );
    }
}
