//! Declared template variables and override merging.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

/// Advisory type of a variable. Values are always stored as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableType {
    #[default]
    String,
    Boolean,
}

impl FromStr for VariableType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("string") {
            Ok(VariableType::String)
        } else if s.eq_ignore_ascii_case("boolean") {
            Ok(VariableType::Boolean)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableType::String => f.write_str("String"),
            VariableType::Boolean => f.write_str("Boolean"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub description: Option<String>,
    pub value: String,
    /// Tag mapping the variable onto a reserved IDE placeholder.
    pub semantic: Option<String>,
    pub value_type: VariableType,
    pub hidden: bool,
}

impl Variable {
    pub fn has_semantic(&self) -> bool {
        self.semantic.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Permissive boolean parsing shared by attributes and variable values:
/// empty or absent is false, `false` and `0` (any case) are false, anything
/// else is true.
pub fn is_true(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) if v.is_empty() => false,
        Some(v) => !(v.eq_ignore_ascii_case("false") || v == "0"),
    }
}

/// Ordered mapping of variable names to declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    variables: IndexMap<String, Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a declaration. Replacing keeps the original order.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        value: impl Into<String>,
        semantic: Option<String>,
        value_type: VariableType,
        hidden: bool,
    ) {
        let name = name.into();
        self.variables.insert(
            name.clone(),
            Variable {
                name,
                description,
                value: value.into(),
                semantic,
                value_type,
                hidden,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|v| v.value.as_str())
    }

    /// Updates the value of a declared variable. Undeclared names are ignored
    /// so overrides can never introduce new variables.
    ///
    /// Returns whether the variable was declared.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.variables.get_mut(name) {
            Some(variable) => {
                variable.value = value.into();
                true
            }
            None => false,
        }
    }

    /// False when undeclared or when the value is `false` or `0` (any case).
    /// An empty value counts as true.
    pub fn is_truthy(&self, name: &str) -> bool {
        match self.variables.get(name) {
            None => false,
            Some(v) => !(v.value.eq_ignore_ascii_case("false") || v.value == "0"),
        }
    }

    /// Returns a copy of this store with each declared override applied.
    pub fn with<'a, I>(&self, overrides: I) -> VariableStore
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut merged = self.clone();
        for (name, value) in overrides {
            if !merged.set(name, value.as_str()) {
                log::debug!("Ignoring override for undeclared variable '{}'", name);
            }
        }
        merged
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
