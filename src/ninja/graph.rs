//! The in-memory build graph handed from the emitter to the serializer.
//!
//! Paths are stored raw, relative to the build directory with `/`
//! separators; escaping happens once, when the graph is written.

use std::collections::HashMap;
use std::fmt;

use crate::ninja::errors::GenerateError;
use crate::toolchain::RuleTemplate;

/// Part of a variable value: literal text or a reference to another
/// variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Var(String),
}

/// A variable value made of literal text and variable references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    fragments: Vec<Fragment>,
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value {
            fragments: vec![Fragment::Text(text.into())],
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Value {
            fragments: vec![Fragment::Var(name.into())],
        }
    }

    /// Append a space separated word. Empty text is ignored.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.separate();
        self.fragments.push(Fragment::Text(text.to_string()));
    }

    /// Append a space separated variable reference.
    pub fn push_var(&mut self, name: &str) {
        self.separate();
        self.fragments.push(Fragment::Var(name.to_string()));
    }

    fn separate(&mut self) {
        if !self.fragments.is_empty() {
            self.fragments.push(Fragment::Text(" ".to_string()));
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A named rule. Its name is unique in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub template: RuleTemplate,
}

/// A `build` statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edge {
    pub outputs: Vec<String>,
    pub implicit_outputs: Vec<String>,
    pub rule: String,
    pub inputs: Vec<String>,
    pub implicit: Vec<String>,
    pub order_only: Vec<String>,
    /// Edge-scoped bindings, in write order
    pub vars: Vec<(String, Value)>,
}

impl Edge {
    pub fn new(rule: impl Into<String>) -> Self {
        Edge {
            rule: rule.into(),
            ..Edge::default()
        }
    }

    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn all_outputs(&self) -> impl Iterator<Item = &String> {
        self.outputs.iter().chain(self.implicit_outputs.iter())
    }
}

/// A `build <name>: phony <inputs>` alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phony {
    pub name: String,
    pub inputs: Vec<String>,
}

/// A statement in the body of the script, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Top-level bindings shared by the edges that follow
    Vars(Vec<(String, Value)>),
    Edge(Edge),
}

/// Who claimed an output path.
#[derive(Debug, Clone)]
struct Owner {
    producer: String,
    configuration: String,
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.producer, self.configuration)
    }
}

/// The complete set of rules, edges and aliases of one script.
#[derive(Debug, Clone, Default)]
pub struct BuildGraph {
    rules: Vec<Rule>,
    rule_names: HashMap<RuleTemplate, String>,
    items: Vec<Item>,
    owners: HashMap<String, Owner>,
    phonies: Vec<Phony>,
    defaults: Vec<String>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule, returning its name. Identical templates share one
    /// rule; different templates of the same kind get `flavor` and then a
    /// counter appended.
    pub fn add_rule(&mut self, template: &RuleTemplate, flavor: &str) -> String {
        if let Some(name) = self.rule_names.get(template) {
            return name.clone();
        }

        let base = template.kind.base_name();
        let taken = |name: &str| self.rules.iter().any(|r| r.name == name);
        let mut name = base.to_string();
        if taken(&name) {
            name = format!("{}_{}", base, flavor);
        }
        let stem = name.clone();
        let mut counter = 2;
        while taken(&name) {
            name = format!("{}_{}", stem, counter);
            counter += 1;
        }

        tracing::debug!("rule `{}`: {}", name, template.command);
        self.rules.push(Rule {
            name: name.clone(),
            template: template.clone(),
        });
        self.rule_names.insert(template.clone(), name.clone());
        name
    }

    /// Add a block of top-level bindings.
    pub fn add_vars(&mut self, vars: Vec<(String, Value)>) {
        if !vars.is_empty() {
            self.items.push(Item::Vars(vars));
        }
    }

    /// Add an edge, claiming its outputs for `producer`.
    pub fn add_edge(
        &mut self,
        edge: Edge,
        producer: &str,
        configuration: &str,
    ) -> Result<(), GenerateError> {
        for output in edge.all_outputs() {
            self.claim(output, producer, configuration)?;
        }
        self.items.push(Item::Edge(edge));
        Ok(())
    }

    /// Add a phony alias. Its name shares the namespace of real outputs,
    /// so `producer` should say what the alias stands for.
    pub fn add_phony(
        &mut self,
        name: impl Into<String>,
        inputs: Vec<String>,
        producer: &str,
        configuration: &str,
    ) -> Result<(), GenerateError> {
        let name = name.into();
        self.claim(&name, producer, configuration)?;
        self.phonies.push(Phony { name, inputs });
        Ok(())
    }

    /// Add a phony alias unless its name is already taken. Returns whether
    /// the alias was added.
    pub fn add_phony_if_free(
        &mut self,
        name: impl Into<String>,
        inputs: Vec<String>,
        producer: &str,
        configuration: &str,
    ) -> bool {
        let name = name.into();
        if self.produces(&name) {
            return false;
        }
        self.add_phony(name, inputs, producer, configuration).is_ok()
    }

    pub fn set_default(&mut self, targets: Vec<String>) {
        self.defaults = targets;
    }

    fn claim(&mut self, path: &str, producer: &str, configuration: &str) -> Result<(), GenerateError> {
        let owner = Owner {
            producer: producer.to_string(),
            configuration: configuration.to_string(),
        };
        if let Some(first) = self.owners.get(path) {
            return Err(GenerateError::Collision {
                path: path.to_string(),
                configuration: first.configuration.clone(),
                first: first.to_string(),
                second: owner.to_string(),
            });
        }
        self.owners.insert(path.to_string(), owner);
        Ok(())
    }

    /// Whether some edge or alias produces `path`.
    pub fn produces(&self, path: &str) -> bool {
        self.owners.contains_key(path)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.items.iter().filter_map(|item| match item {
            Item::Edge(edge) => Some(edge),
            Item::Vars(_) => None,
        })
    }

    /// Top-level bindings, last one wins as in the executor.
    pub fn globals(&self) -> HashMap<&str, &Value> {
        let mut globals = HashMap::new();
        for item in &self.items {
            if let Item::Vars(vars) = item {
                for (name, value) in vars {
                    globals.insert(name.as_str(), value);
                }
            }
        }
        globals
    }

    pub fn phonies(&self) -> &[Phony] {
        &self.phonies
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }
}
