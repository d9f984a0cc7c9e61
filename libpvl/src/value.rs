//! Label value representation.
//!
//! A parsed label is a tree of [`Group`]s. Every GROUP or OBJECT block
//! becomes a child `Group`; keywords become scalar, list, or quantity
//! leaves.

use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::fmt;

/// A label value.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Arbitrary-precision integer.
    Integer(BigInt),
    /// 64-bit floating-point number.
    Real(f64),
    /// Text: quoted strings, symbols, and bare words that are not numbers.
    String(String),
    /// Parenthesized or braced sequence. Nested brackets stay nested.
    List(Vec<Value>),
    /// Value with a `<UNIT>` annotation.
    Quantity(Quantity),
    /// GROUP or OBJECT block.
    Group(Group),
}

/// A value paired with its unit, e.g. `4.0 <KM/PIXEL>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    pub value: Box<Value>,
    pub unit: String,
}

impl Quantity {
    pub fn new(value: Value, unit: impl Into<String>) -> Self {
        Self {
            value: Box::new(value),
            unit: unit.into(),
        }
    }
}

/// Which keyword opened a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Group,
    Object,
}

impl ContainerKind {
    /// Lowercase tag used in JSON output (`"group"` / `"object"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Group => "group",
            ContainerKind::Object => "object",
        }
    }
}

impl Value {
    /// Returns a reference to the integer if this is an `Integer`.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Integer value if it fits in `i64`. Looks through quantities.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => n.to_i64(),
            Value::Quantity(q) => q.value.as_i64(),
            _ => None,
        }
    }

    /// Numeric value of an `Integer` or `Real`. Looks through quantities.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => n.to_f64(),
            Value::Real(f) => Some(*f),
            Value::Quantity(q) => q.value.as_f64(),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the quantity if this is a `Quantity`.
    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Value::Quantity(q) => Some(q),
            _ => None,
        }
    }

    /// Returns the group if this is a `Group`.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Value::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Child of a group value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_group().and_then(|g| g.get(key))
    }

    /// Leaves of a (possibly nested) list in reading order.
    ///
    /// Non-list values yield themselves.
    pub fn flattened(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        flatten_into(self, &mut out);
        out
    }
}

fn flatten_into<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::List(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        other => out.push(other),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Quantity(q) => write!(f, "{:?} <{}>", q.value, q.unit),
            Value::Group(g) => fmt::Debug::fmt(g, f),
        }
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Quantity> for Value {
    fn from(q: Quantity) -> Self {
        Value::Quantity(q)
    }
}

impl From<Group> for Value {
    fn from(g: Group) -> Self {
        Value::Group(g)
    }
}

/// One GROUP/OBJECT scope, or the label root.
///
/// Child keys are unique within a group. Repeated names are disambiguated
/// on insertion:
///
/// - the bare name is used first;
/// - later repeats get `_2`, `_3`, ... (first unused suffix);
/// - `Table` and `Field` blocks carrying a string `Name` keyword are keyed
///   `Table_<Name>` / `Field_<Name>` before the numeric rule applies.
#[derive(Clone, PartialEq)]
pub struct Group {
    kind: Option<ContainerKind>,
    container_name: Option<String>,
    children: IndexMap<String, Value>,
}

impl Group {
    /// The unnamed root scope.
    pub fn root() -> Self {
        Self {
            kind: None,
            container_name: None,
            children: IndexMap::new(),
        }
    }

    /// A block opened by `GROUP = name` or `OBJECT = name`.
    pub fn new(kind: ContainerKind, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            container_name: Some(name.into()),
            children: IndexMap::new(),
        }
    }

    /// `None` for the root.
    pub fn kind(&self) -> Option<ContainerKind> {
        self.kind
    }

    /// The declared block name, which may differ from the key the block
    /// is stored under in its parent.
    pub fn container_name(&self) -> Option<&str> {
        self.container_name.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.children.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.children.contains_key(key)
    }

    /// Walk child keys separated by `.`, e.g. `"IsisCube.Core.Format"`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        self.lookup_keys(path.split('.'))
    }

    /// Walk successive child keys.
    pub fn lookup_keys<'k>(&self, keys: impl IntoIterator<Item = &'k str>) -> Option<&Value> {
        let mut keys = keys.into_iter();
        let mut current = self.get(keys.next()?)?;
        for key in keys {
            current = current.get(key)?;
        }
        Some(current)
    }

    /// Child keys in label order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Children in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert under `name`, or under the first free `name_N` when taken.
    /// Returns the key used.
    pub fn insert_unique(&mut self, name: &str, value: Value) -> String {
        let key = self.unique_key(name);
        self.children.insert(key.clone(), value);
        key
    }

    /// Insert a finished child block under its disambiguated key.
    /// Returns the key used.
    pub fn insert_container(&mut self, child: Group) -> String {
        let key = self.container_key(&child);
        self.children.insert(key.clone(), Value::Group(child));
        key
    }

    /// Key a finished child block would be stored under.
    pub fn container_key(&self, child: &Group) -> String {
        let name = child.container_name().unwrap_or_default();
        if name == "Table" || name == "Field" {
            if let Some(Value::String(declared)) = child.get("Name") {
                return self.unique_key(&format!("{}_{}", name, declared));
            }
        }
        self.unique_key(name)
    }

    fn unique_key(&self, base: &str) -> String {
        if !self.children.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|key| !self.children.contains_key(key))
            .unwrap_or_else(|| base.to_string())
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(kind), Some(name)) = (self.kind, &self.container_name) {
            write!(f, "{}({}) ", kind.as_str(), name)?;
        }
        f.debug_map().entries(self.children.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let mut g = Group::root();
        assert_eq!(g.insert_unique("X", Value::from(1)), "X");
        assert_eq!(g.insert_unique("X", Value::from(2)), "X_2");
        assert_eq!(g.insert_unique("X", Value::from(3)), "X_3");
        assert_eq!(g.get("X_2"), Some(&Value::from(2)));
    }

    #[test]
    fn test_table_keyed_by_name() {
        let mut parent = Group::root();
        let mut a = Group::new(ContainerKind::Object, "Table");
        a.insert_unique("Name", Value::from("A"));
        let mut b = Group::new(ContainerKind::Object, "Table");
        b.insert_unique("Name", Value::from("B"));
        assert_eq!(parent.insert_container(a), "Table_A");
        assert_eq!(parent.insert_container(b), "Table_B");
        let table = parent.get("Table_B").and_then(Value::as_group).unwrap();
        assert_eq!(table.container_name(), Some("Table"));
    }

    #[test]
    fn test_table_with_numeric_name_uses_plain_rule() {
        let mut parent = Group::root();
        let mut a = Group::new(ContainerKind::Object, "Table");
        a.insert_unique("Name", Value::from(7));
        assert_eq!(parent.insert_container(a.clone()), "Table");
        assert_eq!(parent.insert_container(a), "Table_2");
    }

    #[test]
    fn test_lookup_walks_groups() {
        let mut core = Group::new(ContainerKind::Object, "Core");
        core.insert_unique("Format", Value::from("Tile"));
        let mut cube = Group::new(ContainerKind::Object, "IsisCube");
        cube.insert_container(core);
        let mut root = Group::root();
        root.insert_container(cube);

        assert_eq!(
            root.lookup("IsisCube.Core.Format").and_then(Value::as_str),
            Some("Tile")
        );
        assert!(root.lookup("IsisCube.Missing").is_none());
        assert!(root.lookup_keys(["IsisCube", "Core"]).is_some());
    }

    #[test]
    fn test_flattened_list() {
        let v = Value::List(vec![
            Value::List(vec![Value::from(1), Value::from(2)]),
            Value::List(vec![Value::from(3)]),
        ]);
        let flat: Vec<i64> = v.flattened().iter().filter_map(|v| v.as_i64()).collect();
        assert_eq!(flat, vec![1, 2, 3]);
    }

    #[test]
    fn test_quantity_numeric_access() {
        let q = Value::from(Quantity::new(Value::Real(4.0), "KM/PIXEL"));
        assert_eq!(q.as_f64(), Some(4.0));
        assert_eq!(q.as_quantity().map(|q| q.unit.as_str()), Some("KM/PIXEL"));
    }
}
