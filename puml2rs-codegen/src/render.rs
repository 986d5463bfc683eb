//! Emission of the standalone machine artifact.
//!
//! Builds the artifact as a token stream, pretty-prints it through
//! `prettyplease` and frames the result with the copyright header and the
//! AUTO-GENERATED banners. The emitted file depends on nothing: plain
//! enums, const tables, fixed-size path buffers sized by the diagram's
//! nesting depth, and a trait the caller implements with the business
//! logic.

use proc_macro2::{Ident, TokenStream};
use quote::quote;

use puml2rs_core::Diagram;

use crate::ir::{FsmIr, MethodKind};
use crate::{CodegenError, GenOptions, idents};

/// Compiles a validated diagram into the text of the generated `.rs` file.
pub fn generate(diagram: &Diagram, options: &GenOptions) -> Result<String, CodegenError> {
    let ir = FsmIr::new(diagram, options)?;
    render(&ir)
}

/// Renders an already-lowered IR. Split from [`generate`] so tests can
/// drive the renderer with hand-built tables.
pub fn render(ir: &FsmIr) -> Result<String, CodegenError> {
    let tokens = render_tokens(ir)?;
    let file: syn::File = syn::parse2(tokens)?;
    Ok(frame(ir, &prettyplease::unparse(&file)))
}

fn render_tokens(ir: &FsmIr) -> Result<TokenStream, CodegenError> {
    let machine = parse_ident(&ir.machine_name)?;
    let trait_ident = parse_ident(&format!("{}Actions", ir.machine_name))?;

    let state_enum = render_state_enum(ir);
    let event_enum = render_event_enum(ir);
    let actions_trait = render_actions_trait(ir, &trait_ident);
    let tables = render_tables(ir);
    let machine_impl = render_machine(ir, &machine, &trait_ident);

    let body = quote! {
        #state_enum
        #event_enum
        #actions_trait
        #tables
        #machine_impl
    };

    match &ir.module {
        Some(module) => {
            let module = parse_ident(module)?;
            Ok(quote! {
                pub mod #module {
                    #body
                }
            })
        }
        None => Ok(body),
    }
}

fn render_state_enum(ir: &FsmIr) -> TokenStream {
    let variants: Vec<Ident> = ir
        .states
        .iter()
        .map(|s| idents::variant_ident(&s.name))
        .collect();
    let names: Vec<&str> = ir.states.iter().map(|s| s.name.as_str()).collect();
    let count = ir.states.len();

    quote! {
        /// States of the machine, in sorted table order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum State {
            #(#variants,)*
        }

        impl State {
            pub fn name(self) -> &'static str {
                STATE_NAMES[self as usize]
            }
        }

        pub const STATE_COUNT: usize = #count;

        const STATE_NAMES: [&str; STATE_COUNT] = [#(#names,)*];

        /// Name of the state at `index` in table order, or `"INVALID"` when
        /// the index is out of range.
        pub fn state_name(index: usize) -> &'static str {
            STATE_NAMES.get(index).copied().unwrap_or("INVALID")
        }
    }
}

fn render_event_enum(ir: &FsmIr) -> TokenStream {
    let variants: Vec<Ident> = ir.events.iter().map(|e| idents::variant_ident(e)).collect();
    let names: Vec<&str> = ir.events.iter().map(String::as_str).collect();
    let count = ir.events.len();

    // A diagram without transitions has no events; an empty enum cannot be
    // cast to an integer, so its name lookup is an empty match instead.
    let name_body = if ir.events.is_empty() {
        quote! { match self {} }
    } else {
        quote! { EVENT_NAMES[self as usize] }
    };

    quote! {
        /// Events the machine reacts to, in sorted table order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Event {
            #(#variants,)*
        }

        impl Event {
            pub fn name(self) -> &'static str {
                #name_body
            }
        }

        pub const EVENT_COUNT: usize = #count;

        const EVENT_NAMES: [&str; EVENT_COUNT] = [#(#names,)*];

        /// Name of the event at `index` in table order, or `"INVALID"` when
        /// the index is out of range.
        pub fn event_name(index: usize) -> &'static str {
            EVENT_NAMES.get(index).copied().unwrap_or("INVALID")
        }
    }
}

fn render_actions_trait(ir: &FsmIr, trait_ident: &Ident) -> TokenStream {
    let methods = ir.methods.iter().map(|m| {
        let name = idents::method_ident(&m.name);
        match m.kind {
            MethodKind::Action => {
                let doc = format!(" Action: `{}`", m.code);
                quote! {
                    #[doc = #doc]
                    fn #name(&mut self);
                }
            }
            MethodKind::Guard => {
                let doc = format!(" Guard: `{}`", m.code);
                quote! {
                    #[doc = #doc]
                    fn #name(&self) -> bool;
                }
            }
        }
    });

    quote! {
        /// Business logic injected into the machine: one method per distinct
        /// action and guard fragment in the diagram.
        pub trait #trait_ident {
            #(#methods)*
        }
    }
}

fn render_tables(ir: &FsmIr) -> TokenStream {
    let parents = ir.states.iter().map(|s| match s.parent {
        Some(p) => {
            let parent = idents::variant_ident(&ir.states[p].name);
            quote!(Some(State::#parent))
        }
        None => quote!(None),
    });

    let rows = ir.transitions.iter().map(|t| {
        let event = idents::variant_ident(&ir.events[t.event]);
        let from = idents::variant_ident(&ir.states[t.from].name);
        let to = match t.to {
            Some(index) => {
                let target = idents::variant_ident(&ir.states[index].name);
                quote!(Some(State::#target))
            }
            None => quote!(None),
        };
        quote! {
            TransitionRow { event: Event::#event, from: State::#from, to: #to },
        }
    });

    let transition_count = ir.transitions.len();
    let max_depth = ir.max_depth;
    let initial = idents::variant_ident(&ir.states[ir.initial_leaf].name);

    quote! {
        pub const TRANSITION_COUNT: usize = #transition_count;

        const MAX_DEPTH: usize = #max_depth;
        const INITIAL_STATE: State = State::#initial;
        const PARENTS: [Option<State>; STATE_COUNT] = [#(#parents,)*];

        /// One row per transition, ordered by event and then source state.
        /// `to` is the entry-target leaf resolved at compile time; `None`
        /// marks an internal transition.
        struct TransitionRow {
            event: Event,
            from: State,
            to: Option<State>,
        }

        const TRANSITIONS: [TransitionRow; TRANSITION_COUNT] = [#(#rows)*];

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
    }
}

fn render_machine(ir: &FsmIr, machine: &Ident, trait_ident: &Ident) -> TokenStream {
    let machine_doc = format!(
        " Hierarchical state machine compiled from a state diagram; inject the \
         business logic through an [`{trait_ident}`] implementation, call `init` \
         once, then post events with `dispatch`."
    );

    let entry_arms: Vec<TokenStream> = hook_arms(ir, |s| &s.entry_actions);
    let exit_arms: Vec<TokenStream> = hook_arms(ir, |s| &s.exit_actions);
    let entry_wildcard = wildcard(ir, |s| &s.entry_actions);
    let exit_wildcard = wildcard(ir, |s| &s.exit_actions);

    let guard_arms = ir.transitions.iter().enumerate().filter_map(|(index, t)| {
        t.guard.map(|g| {
            let method = idents::method_ident(&ir.methods[g].name);
            quote! { #index => self.actions.#method(), }
        })
    });

    let action_arms = ir
        .transitions
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.actions.is_empty())
        .map(|(index, t)| {
            let methods = t
                .actions
                .iter()
                .map(|&a| idents::method_ident(&ir.methods[a].name));
            quote! { #index => { #(self.actions.#methods();)* } }
        });

    quote! {
        #[doc = #machine_doc]
        pub struct #machine<A: #trait_ident> {
            state: State,
            actions: A,
        }

        impl<A: #trait_ident> #machine<A> {
            pub fn new(actions: A) -> Self {
                Self { state: INITIAL_STATE, actions }
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
                    #(#guard_arms)*
                    _ => true,
                }
            }

            fn run_transition_actions(&mut self, index: usize) {
                match index {
                    #(#action_arms)*
                    _ => {}
                }
            }

            fn run_entry_actions(&mut self, state: State) {
                match state {
                    #(#entry_arms)*
                    #entry_wildcard
                }
            }

            fn run_exit_actions(&mut self, state: State) {
                match state {
                    #(#exit_arms)*
                    #exit_wildcard
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
    }
}

fn hook_arms<'a>(
    ir: &'a FsmIr,
    select: impl Fn(&'a crate::ir::StateIr) -> &'a [usize],
) -> Vec<TokenStream> {
    ir.states
        .iter()
        .filter(|s| !select(s).is_empty())
        .map(|s| {
            let variant = idents::variant_ident(&s.name);
            let methods = select(s)
                .iter()
                .map(|&a| idents::method_ident(&ir.methods[a].name));
            quote! { State::#variant => { #(self.actions.#methods();)* } }
        })
        .collect()
}

/// A wildcard arm, unless every state already has one (an exhaustive match
/// with a trailing `_` would trip the unreachable-pattern lint in the
/// artifact).
fn wildcard(ir: &FsmIr, select: impl Fn(&crate::ir::StateIr) -> &[usize]) -> TokenStream {
    if ir.states.iter().all(|s| !select(s).is_empty()) {
        TokenStream::new()
    } else {
        quote! { _ => {} }
    }
}

fn parse_ident(name: &str) -> Result<Ident, CodegenError> {
    syn::parse_str::<Ident>(name).map_err(|_| CodegenError::InvalidIdentifier(name.to_string()))
}

fn frame(ir: &FsmIr, code: &str) -> String {
    const BANNER: &str = "\
// ============================================================================
// AUTO-GENERATED FILE. DO NOT MODIFY!
// ============================================================================
";

    let mut out = String::new();
    if let Some(header) = &ir.copyright_header {
        for line in header.lines() {
            if line.is_empty() {
                out.push_str("//\n");
            } else {
                out.push_str("// ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out.push_str(BANNER);
    out.push('\n');
    out.push_str(code);
    out.push('\n');
    out.push_str(BANNER);
    out
}
