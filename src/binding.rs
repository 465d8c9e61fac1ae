//! Parameter binding: one [`Binding`] per execution, collected in a [`Bindings`] set.
//!
//! ```text
//! Empty --bind--> Bound --add--> AwaitingGroup --bind--> Bound ...
//! ```
//! `add` outside `Bound` and execution in `AwaitingGroup` are `InvalidState` failures.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::engine::Value;
use crate::error::BridgeError;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[$?](\d+)$").expect("placeholder pattern is valid"));

/// Resolve a `$N` / `?N` identifier (1-based) to a zero-based parameter index.
///
/// # Errors
/// `InvalidArgument` for anything that is not a sigil followed by a positive integer.
pub fn parse_index(identifier: &str) -> Result<usize, BridgeError> {
    let invalid = || {
        BridgeError::InvalidArgument(format!(
            "Identifier '{identifier}' is not a valid identifier. Should be of the pattern '{}'.",
            PLACEHOLDER.as_str()
        ))
    };
    let caps = PLACEHOLDER.captures(identifier.trim()).ok_or_else(invalid)?;
    let position: usize = caps[1].parse().map_err(|_| invalid())?;
    position.checked_sub(1).ok_or_else(invalid)
}

/// One complete assignment of parameter indices to encoded values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    parameters: BTreeMap<usize, Value>,
}

impl Binding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parameter `index`, replacing any earlier value.
    pub fn add(&mut self, index: usize, value: Value) {
        self.parameters.insert(index, value);
    }

    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<usize, Value> {
        &self.parameters
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Values in index order, ready for the engine.
    ///
    /// # Errors
    /// `InvalidState` if an index below the highest bound one was never set.
    pub fn to_params(&self) -> Result<Vec<Value>, BridgeError> {
        let mut params = Vec::with_capacity(self.parameters.len());
        for (expected, (index, value)) in self.parameters.iter().enumerate() {
            if *index != expected {
                return Err(BridgeError::InvalidState(format!(
                    "Parameter #{} is not set",
                    expected + 1
                )));
            }
            params.push(value.clone());
        }
        Ok(params)
    }
}

/// Where a [`Bindings`] set is in the bind/add protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Nothing bound yet.
    Empty,
    /// A group is in progress; binds go into it.
    Bound,
    /// `add` finished the last group; the next bind opens a new one.
    AwaitingGroup,
}

/// Ordered binding groups of a statement.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    groups: Vec<Binding>,
    in_progress: bool,
    open: bool,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> BindingState {
        if self.open {
            BindingState::AwaitingGroup
        } else if self.in_progress {
            BindingState::Bound
        } else {
            BindingState::Empty
        }
    }

    /// Bind into the current group, creating it first if needed.
    pub fn bind(&mut self, index: usize, value: Value) {
        if !self.in_progress {
            self.groups.push(Binding::new());
            self.in_progress = true;
        }
        self.open = false;
        if let Some(current) = self.groups.last_mut() {
            current.add(index, value);
        }
    }

    /// Finish the current group.
    ///
    /// # Errors
    /// `InvalidState` if no parameter was bound since the last `add` (or ever).
    pub fn add(&mut self) -> Result<(), BridgeError> {
        if !self.in_progress {
            return Err(BridgeError::InvalidState(
                "You got an unbound binder! Bind a parameter before calling add()".into(),
            ));
        }
        self.in_progress = false;
        self.open = true;
        Ok(())
    }

    #[must_use]
    pub fn groups(&self) -> &[Binding] {
        &self.groups
    }

    /// Groups to execute, in order: a single empty group when nothing was bound.
    ///
    /// # Errors
    /// `InvalidState` while a group requested by `add` is still unbound.
    pub fn for_execution(&self) -> Result<Vec<Binding>, BridgeError> {
        if self.open {
            return Err(BridgeError::InvalidState("No unfinished bindings!".into()));
        }
        if self.groups.is_empty() {
            return Ok(vec![Binding::new()]);
        }
        Ok(self.groups.clone())
    }
}
