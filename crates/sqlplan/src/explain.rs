//! Tree rendering for plans.

use std::collections::BTreeMap;
use std::fmt;

/// One line of a rendered plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainEntry {
    pub name: String,
    /// Using a btree to get a stable ordering in output.
    pub items: BTreeMap<String, ExplainValue>,
}

impl ExplainEntry {
    pub fn new(name: impl Into<String>) -> Self {
        ExplainEntry {
            name: name.into(),
            items: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.items
            .insert(key.into(), ExplainValue::Value(value.to_string()));
        self
    }

    /// Put a value only if it's present.
    pub fn with_opt_value<T: fmt::Display>(self, key: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with_value(key, v),
            None => self,
        }
    }

    /// Put a flag only when set.
    pub fn with_flag(self, key: impl Into<String>, flag: bool) -> Self {
        if flag { self.with_value(key, true) } else { self }
    }

    pub fn with_values<S: fmt::Display>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let vals = ExplainValue::Values(values.into_iter().map(|s| s.to_string()).collect());
        self.items.insert(key.into(), vals);
        self
    }

    pub fn with_named_map<S1: fmt::Display, S2: fmt::Display>(
        mut self,
        key: impl Into<String>,
        map_name: impl Into<String>,
        map: impl IntoIterator<Item = (S1, S2)>,
    ) -> Self {
        let vals = ExplainValue::NamedMap(
            map_name.into(),
            map.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self.items.insert(key.into(), vals);
        self
    }
}

impl fmt::Display for ExplainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.items.is_empty() {
            write!(f, " (")?;
            for (idx, (k, v)) in self.items.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k} = {v}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainValue {
    Value(String),
    Values(Vec<String>),
    NamedMap(String, Vec<(String, String)>),
}

impl fmt::Display for ExplainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Values(v) => write!(f, "[{}]", v.join(", ")),
            Self::NamedMap(name, map) => {
                let s = map
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{} {{{}}}", name, s)
            }
        }
    }
}

/// Trait for explaining a single node in a plan tree.
pub trait Explainable {
    fn explain_entry(&self) -> ExplainEntry;
}

/// An explain entry along with its children, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainNode {
    pub entry: ExplainEntry,
    pub children: Vec<ExplainNode>,
}

impl ExplainNode {
    pub fn new(entry: ExplainEntry) -> Self {
        ExplainNode {
            entry,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ExplainNode>) -> Self {
        self.children.extend(children);
        self
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        writeln!(f, "{}", self.entry)?;
        let n = self.children.len();
        for (idx, child) in self.children.iter().enumerate() {
            let last = idx + 1 == n;
            let (branch, cont) = if last {
                ("└─ ", "   ")
            } else {
                ("├─ ", "│  ")
            };
            write!(f, "{prefix}{branch}")?;
            child.write_tree(f, &format!("{prefix}{cont}"))?;
        }
        Ok(())
    }
}

impl fmt::Display for ExplainNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_entry_display_no_values() {
        let ent = ExplainEntry::new("DummyNode");
        assert_eq!("DummyNode", ent.to_string());
    }

    #[test]
    fn explain_entry_display_with_values() {
        let ent = ExplainEntry::new("DummyNode")
            .with_value("k1", "v1")
            .with_values("k2", ["vs1", "vs2", "vs3"])
            .with_opt_value::<&str>("k3", None)
            .with_flag("k4", false);

        assert_eq!("DummyNode (k1 = v1, k2 = [vs1, vs2, vs3])", ent.to_string());
    }

    #[test]
    fn explain_entry_display_with_map_value() {
        let ent = ExplainEntry::new("DummyNode")
            .with_value("k1", "v1")
            .with_named_map("k2", "my_map", [("m1", "v1"), ("m2", "v2")]);

        assert_eq!(
            "DummyNode (k1 = v1, k2 = my_map {m1: v1, m2: v2})",
            ent.to_string()
        );
    }

    #[test]
    fn tree_prefixes() {
        let tree = ExplainNode::new(ExplainEntry::new("Root")).with_children([
            ExplainNode::new(ExplainEntry::new("A"))
                .with_children([ExplainNode::new(ExplainEntry::new("A1"))]),
            ExplainNode::new(ExplainEntry::new("B")),
        ]);
        let expected = "Root\n├─ A\n│  └─ A1\n└─ B\n";
        assert_eq!(expected, tree.to_string());
    }
}
