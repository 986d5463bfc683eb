//! Three-pass diagram parser.
//!
//! Pass 1 collects `[*] --> Name` initial-pseudostate arrows. Pass 2 walks
//! the brace-delimited state blocks with an explicit stack of enclosing
//! composites and files per-state transition lines (entry/exit hooks and
//! internal transitions). Pass 3, once every state is known, resolves the
//! `From --> To : text` arrows. Lines no pass consumed are a fatal error.
//!
//! Semantic validation runs between pass 2 and pass 3, so structural
//! problems are reported before dangling arrow endpoints.

use crate::error::{DiagramError, Location};
use crate::model::{Action, Diagram, Event, Guard, StateId, Transition};
use crate::reader::{Line, Source, is_word_char};
use crate::validate;

/// Initial-arrow targets in source order, with the arrow's location for
/// diagnostics.
pub(crate) type InitialNames = Vec<(String, Location)>;

/// Parses a preprocessed source into a validated diagram.
pub fn parse(source: &Source) -> Result<Diagram, DiagramError> {
    let lines: Vec<&Line> = source.lines.iter().collect();

    let (initial_names, lines) = parse_initial_transitions(lines)?;

    let mut diagram = Diagram::new(source.copyright_header.clone());
    let lines = parse_states(&mut diagram, lines, &initial_names)?;

    validate::check_initial_targets(&diagram, &initial_names)?;
    validate::check_states(&diagram)?;

    let lines = parse_external_transitions(&mut diagram, lines)?;

    if let Some(line) = lines.first() {
        return Err(DiagramError::UnrecognizedConstruct {
            location: line.location.clone(),
            text: line.original.clone(),
        });
    }

    Ok(diagram)
}

fn parse_initial_transitions(
    lines: Vec<&Line>,
) -> Result<(InitialNames, Vec<&Line>), DiagramError> {
    let mut remaining = Vec::new();
    let mut initial_names: InitialNames = Vec::new();

    for line in lines {
        let Some((name, trailing)) = match_initial_line(&line.text) else {
            remaining.push(line);
            continue;
        };

        if initial_names.iter().any(|(n, _)| n == name) {
            return Err(DiagramError::DuplicateInitial {
                location: line.location.clone(),
                name: name.to_string(),
            });
        }
        if !trailing.is_empty() {
            return Err(DiagramError::TrailingAfterInitial {
                location: line.location.clone(),
                text: line.original.clone(),
            });
        }

        initial_names.push((name.to_string(), line.location.clone()));
    }

    Ok((initial_names, remaining))
}

fn parse_states<'a>(
    diagram: &mut Diagram,
    lines: Vec<&'a Line>,
    initial_names: &InitialNames,
) -> Result<Vec<&'a Line>, DiagramError> {
    let mut remaining = Vec::new();
    let mut stack: Vec<StateId> = Vec::new();
    let mut open_locations: Vec<Location> = Vec::new();

    for line in lines {
        if line.text == "}" {
            if stack.pop().is_none() {
                return Err(DiagramError::UnmatchedClosingBrace {
                    location: line.location.clone(),
                });
            }
            open_locations.pop();
            continue;
        }

        let Some(parsed) = match_state_line(&line.text) else {
            remaining.push(line);
            continue;
        };

        let parent = stack.last().copied();
        let is_initial = initial_names.iter().any(|(n, _)| n == parsed.name);
        let id = diagram.intern(parsed.name, parent, is_initial);

        // First occurrence fixes the parent; later mentions inside another
        // block never re-parent, and a state is never its own child.
        if let Some(p) = parent
            && p != id
            && !diagram.state(p).children.contains(&id)
        {
            diagram.state_mut(p).children.push(id);
        }

        if let Some(text) = parsed.transition {
            let transition = parse_transition_text(line, text, id, id)?;
            let state = diagram.state_mut(id);
            match transition.event.name.as_str() {
                "entry" => state.entry.push(transition),
                "exit" => state.exit.push(transition),
                _ => state.internal.push(transition),
            }
        }

        if parsed.opens_block {
            stack.push(id);
            open_locations.push(line.location.clone());
        }
    }

    if let Some(location) = open_locations.pop() {
        return Err(DiagramError::UnclosedBlock { location });
    }

    Ok(remaining)
}

fn parse_external_transitions<'a>(
    diagram: &mut Diagram,
    lines: Vec<&'a Line>,
) -> Result<Vec<&'a Line>, DiagramError> {
    let mut remaining = Vec::new();

    for line in lines {
        let Some((from, to, transition_text)) = match_external_line(&line.text) else {
            remaining.push(line);
            continue;
        };

        let Some(text) = transition_text else {
            return Err(DiagramError::MissingEvent {
                location: line.location.clone(),
                text: line.original.clone(),
            });
        };

        let from_id = diagram.id(from).ok_or_else(|| DiagramError::UndefinedState {
            location: line.location.clone(),
            name: from.to_string(),
        })?;
        let to_id = diagram.id(to).ok_or_else(|| DiagramError::UndefinedState {
            location: line.location.clone(),
            name: to.to_string(),
        })?;

        let transition = parse_transition_text(line, text, from_id, to_id)?;
        diagram.state_mut(from_id).external.push(transition);
    }

    Ok(remaining)
}

/// Parses the shared `event [guard] (/ action)*` grammar used by per-state
/// lines and external arrows.
fn parse_transition_text(
    line: &Line,
    text: &str,
    from: StateId,
    to: StateId,
) -> Result<Transition, DiagramError> {
    // `\\` is a literal backslash, `\n` collapses to a space.
    let unescaped = text
        .split("\\\\")
        .map(|part| part.replace("\\n", " "))
        .collect::<Vec<_>>()
        .join("\\");

    let malformed = || DiagramError::MalformedTransition {
        location: line.location.clone(),
        text: line.original.clone(),
    };

    let (event_name, rest) = take_word(&unescaped).ok_or_else(malformed)?;
    let rest = rest.trim_start();

    let (guard_code, rest) = if let Some(inner) = rest.strip_prefix('[') {
        split_guard(inner).ok_or_else(malformed)?
    } else {
        (None, rest)
    };

    let actions = if rest.is_empty() {
        Vec::new()
    } else {
        let actions_text = rest.strip_prefix('/').ok_or_else(malformed)?;
        actions_text
            .split('/')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(|fragment| Action {
                code: fragment.to_string(),
            })
            .collect()
    };

    Ok(Transition {
        event: Event {
            name: event_name.to_string(),
        },
        guard: guard_code.map(|code| Guard { code }),
        from,
        to,
        actions,
    })
}

/// Splits `guardText] rest` at the first `]` whose remainder is empty or an
/// action list. An empty guard expression counts as no guard.
fn split_guard(inner: &str) -> Option<(Option<String>, &str)> {
    for (idx, c) in inner.char_indices() {
        if c != ']' {
            continue;
        }
        let after = inner[idx + 1..].trim_start();
        if after.is_empty() || after.starts_with('/') {
            let code = inner[..idx].trim();
            return Some(((!code.is_empty()).then(|| code.to_string()), after));
        }
    }
    None
}

struct StateLine<'a> {
    name: &'a str,
    transition: Option<&'a str>,
    opens_block: bool,
}

/// Matches `[state] Name [: transitionText] [{]`.
fn match_state_line(text: &str) -> Option<StateLine<'_>> {
    let (body, opens_block) = match text.strip_suffix('{') {
        Some(body) => (body.trim_end(), true),
        None => (text, false),
    };

    // The `state` keyword is optional; without trailing whitespace it is
    // just part of the name (`stateFoo`).
    let after_keyword = body.strip_prefix("state").and_then(skip_ws).unwrap_or(body);

    let (name, rest) = take_word(after_keyword)?;
    let rest = rest.trim_start();

    if rest.is_empty() {
        return Some(StateLine {
            name,
            transition: None,
            opens_block,
        });
    }

    let transition = rest.strip_prefix(':')?.trim();
    Some(StateLine {
        name,
        transition: (!transition.is_empty()).then_some(transition),
        opens_block,
    })
}

/// Matches `[*] --> Name`, returning the name and any trailing text.
fn match_initial_line(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("[*]")?;
    let rest = skip_ws(rest)?;
    let rest = strip_arrow(rest)?;
    let rest = skip_ws(rest)?;
    let (name, rest) = take_word(rest)?;
    Some((name, rest.trim_start()))
}

/// Matches `From --> To [: transitionText]`. An empty transition text is
/// reported as absent so the caller can flag the missing event.
fn match_external_line(text: &str) -> Option<(&str, &str, Option<&str>)> {
    let (from, rest) = take_word(text)?;
    let rest = skip_ws(rest)?;
    let rest = strip_arrow(rest)?;
    let rest = skip_ws(rest)?;
    let (to, rest) = take_word(rest)?;
    let rest = rest.trim_start();

    if rest.is_empty() {
        return Some((from, to, None));
    }

    let transition = rest.strip_prefix(':')?.trim();
    Some((from, to, (!transition.is_empty()).then_some(transition)))
}

/// Takes the leading run of word characters, or `None` if there is none.
fn take_word(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !is_word_char(c)).unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some((&s[..end], &s[end..]))
    }
}

/// Requires at least one whitespace character and skips the whole run.
fn skip_ws(s: &str) -> Option<&str> {
    let rest = s.trim_start();
    (rest.len() < s.len()).then_some(rest)
}

/// Consumes `-+>`: one or more dashes followed by `>`.
fn strip_arrow(s: &str) -> Option<&str> {
    let rest = s.trim_start_matches('-');
    if rest.len() == s.len() {
        return None;
    }
    rest.strip_prefix('>')
}
