//! Scoped symbol tables with lexical lookup.
//!
//! All environments live in one central [`Environments`] store and are
//! addressed by [`ScopeId`] indices; the global scope is always index 0.
//! Holding scopes centrally (rather than as reference-counted parent
//! pointers) keeps lookups borrow-checker friendly: the evaluator tracks
//! its current scope as an index and walks parent indices for resolution.
//!
//! A scope holds three disjoint namespaces: variables, arrays, and
//! functions. Function scopes are always created with the global scope as
//! parent, never the caller's scope, so functions see global bindings plus
//! their own locals and nothing else.

use std::hash::Hasher;

use indexmap::IndexMap;

use crate::{
    ast::CodeRange,
    error::{InterpreterError, RunResult, name_not_found},
    symbol::{ArraySymbol, FunctionSymbol},
    value::Value,
};

/// Index of an environment in the central [`Environments`] store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ScopeId(u32);

impl ScopeId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("scope id overflow"))
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of the global scope. The global environment has `level` 1 and no
/// parent.
pub(crate) const GLOBAL_SCOPE: ScopeId = ScopeId(0);

/// A named scope with its three namespaces.
#[derive(Debug)]
pub(crate) struct Environment<'ast> {
    name: String,
    level: u32,
    parent: Option<ScopeId>,
    variables: IndexMap<String, Value>,
    arrays: IndexMap<String, ArraySymbol>,
    functions: IndexMap<String, FunctionSymbol<'ast>>,
}

impl<'ast> Environment<'ast> {
    fn global() -> Self {
        Self {
            name: "global".to_owned(),
            level: 1,
            parent: None,
            variables: IndexMap::new(),
            arrays: IndexMap::new(),
            functions: IndexMap::new(),
        }
    }

    /// A local scope for one function activation, parented to global.
    pub fn local(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
            parent: Some(GLOBAL_SCOPE),
            variables: IndexMap::new(),
            arrays: IndexMap::new(),
            functions: IndexMap::new(),
        }
    }
}

/// Storage for all environments during one program run.
#[derive(Debug)]
pub(crate) struct Environments<'ast> {
    stack: Vec<Environment<'ast>>,
}

impl<'ast> Environments<'ast> {
    /// Creates the store with the global environment initialized.
    pub fn new() -> Self {
        Self {
            stack: vec![Environment::global()],
        }
    }

    /// Nesting level of the given scope.
    pub fn level(&self, scope: ScopeId) -> u32 {
        self.stack[scope.index()].level
    }

    /// Pushes a new activation scope and returns its id.
    ///
    /// Activations are strictly LIFO: the matching [`Self::pop`] discards
    /// the scope when its call returns.
    pub fn push(&mut self, environment: Environment<'ast>) -> ScopeId {
        let id = ScopeId::new(self.stack.len());
        self.stack.push(environment);
        id
    }

    /// Discards the most recently pushed activation scope.
    ///
    /// # Panics
    /// Panics if only the global scope remains.
    pub fn pop(&mut self) {
        assert!(self.stack.len() > 1, "cannot pop the global scope");
        self.stack.pop();
    }

    /// Upserts a variable binding into the given scope.
    ///
    /// Re-assignment is permitted for variables, so this never fails.
    pub fn insert_variable(&mut self, scope: ScopeId, name: impl Into<String>, value: Value) {
        self.stack[scope.index()].variables.insert(name.into(), value);
    }

    /// Resolves a variable, walking the parent chain unless `within_scope`
    /// restricts the search to the given scope.
    pub fn lookup_variable(
        &self,
        scope: ScopeId,
        name: &str,
        within_scope: bool,
        range: CodeRange,
    ) -> RunResult<&Value> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let env = &self.stack[id.index()];
            if let Some(value) = env.variables.get(name) {
                return Ok(value);
            }
            if within_scope {
                break;
            }
            current = env.parent;
        }
        Err(name_not_found("variable", name, range))
    }

    /// Resolves a variable for in-place mutation (postfix operators),
    /// walking the parent chain.
    pub fn lookup_variable_mut(
        &mut self,
        scope: ScopeId,
        name: &str,
        range: CodeRange,
    ) -> RunResult<&mut Value> {
        let owner = self
            .find_scope(scope, |env| env.variables.contains_key(name))
            .ok_or_else(|| name_not_found("variable", name, range))?;
        Ok(self.stack[owner.index()]
            .variables
            .get_mut(name)
            .expect("owner scope contains variable"))
    }

    /// Defines an array in the given scope.
    ///
    /// Array names must be unique within their namespace in one scope.
    pub fn insert_array(&mut self, scope: ScopeId, symbol: ArraySymbol, range: CodeRange) -> RunResult<()> {
        let env = &mut self.stack[scope.index()];
        if env.arrays.contains_key(&symbol.name) {
            return Err(InterpreterError::runtime(
                format!("array '{}' is already defined in scope '{}'", symbol.name, env.name),
                range,
            ));
        }
        env.arrays.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Resolves an array, walking the parent chain.
    pub fn lookup_array(&self, scope: ScopeId, name: &str, range: CodeRange) -> RunResult<&ArraySymbol> {
        let owner = self
            .find_scope(scope, |env| env.arrays.contains_key(name))
            .ok_or_else(|| name_not_found("array", name, range))?;
        Ok(&self.stack[owner.index()].arrays[name])
    }

    /// Resolves an array for element replacement, walking the parent chain.
    ///
    /// Arrays resolve through to the global scope, so a function body can
    /// update a global array in place.
    pub fn lookup_array_mut(&mut self, scope: ScopeId, name: &str, range: CodeRange) -> RunResult<&mut ArraySymbol> {
        let owner = self
            .find_scope(scope, |env| env.arrays.contains_key(name))
            .ok_or_else(|| name_not_found("array", name, range))?;
        Ok(self.stack[owner.index()]
            .arrays
            .get_mut(name)
            .expect("owner scope contains array"))
    }

    /// Defines a function in the given scope.
    ///
    /// Function names must be unique within their namespace in one scope.
    pub fn insert_function(&mut self, scope: ScopeId, symbol: FunctionSymbol<'ast>, range: CodeRange) -> RunResult<()> {
        let env = &mut self.stack[scope.index()];
        if env.functions.contains_key(&symbol.name) {
            return Err(InterpreterError::runtime(
                format!(
                    "function '{}' is already defined in scope '{}'",
                    symbol.name, env.name
                ),
                range,
            ));
        }
        env.functions.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Resolves a function, walking the parent chain.
    pub fn lookup_function(&self, scope: ScopeId, name: &str, range: CodeRange) -> RunResult<&FunctionSymbol<'ast>> {
        let owner = self
            .find_scope(scope, |env| env.functions.contains_key(name))
            .ok_or_else(|| name_not_found("function", name, range))?;
        Ok(&self.stack[owner.index()].functions[name])
    }

    /// Fingerprint of a scope for call memoization.
    ///
    /// Derived from the scope name, its level, and the parameter bindings
    /// in definition order. Two activations of the same function with equal
    /// argument values produce equal fingerprints.
    pub fn fingerprint(&self, scope: ScopeId) -> u64 {
        let env = &self.stack[scope.index()];
        let mut hasher = ahash::AHasher::default();
        hasher.write(env.name.as_bytes());
        hasher.write_u32(env.level);
        for (name, value) in &env.variables {
            hasher.write(name.as_bytes());
            value.hash_into(&mut hasher);
        }
        hasher.finish()
    }

    /// Walks the parent chain from `scope` and returns the first scope
    /// matching the predicate.
    fn find_scope(&self, scope: ScopeId, matches: impl Fn(&Environment<'ast>) -> bool) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let env = &self.stack[id.index()];
            if matches(env) {
                return Some(id);
            }
            current = env.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CodeRange;

    #[test]
    fn lookup_walks_parent_chain() {
        let range = CodeRange::default();
        let mut envs = Environments::new();
        envs.insert_variable(GLOBAL_SCOPE, "x", Value::Int(1));

        let local = envs.push(Environment::local("f", 2));
        envs.insert_variable(local, "y", Value::Int(2));

        assert_eq!(envs.lookup_variable(local, "x", false, range).unwrap(), &Value::Int(1));
        assert_eq!(envs.lookup_variable(local, "y", false, range).unwrap(), &Value::Int(2));
        assert!(envs.lookup_variable(local, "x", true, range).is_err());
        assert!(envs.lookup_variable(GLOBAL_SCOPE, "y", false, range).is_err());
    }

    #[test]
    fn fingerprint_tracks_parameter_bindings() {
        let mut envs = Environments::new();
        let a = envs.push(Environment::local("f", 2));
        envs.insert_variable(a, "n", Value::Int(5));
        let fp_a = envs.fingerprint(a);
        envs.pop();

        let b = envs.push(Environment::local("f", 2));
        envs.insert_variable(b, "n", Value::Int(5));
        assert_eq!(fp_a, envs.fingerprint(b));

        envs.insert_variable(b, "n", Value::Int(6));
        assert_ne!(fp_a, envs.fingerprint(b));
    }
}
