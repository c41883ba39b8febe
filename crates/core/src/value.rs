//! Attribute values and the capture policy
//!
//! Values fall into three groups:
//! - value-like (`Null`, `Bool`, `Int`, `Float`, `Text`): copied by value
//! - containers (`List`, `Map`): shared handles, captured as a shallow copy
//! - `Opaque`: shared handles with no copy operation, captured by reference

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::ser::{self, Serialize, SerializeMap, SerializeSeq, Serializer};
use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Kind of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    List,
    Map,
    Opaque,
}

impl ValueKind {
    /// Short lowercase name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A versionable attribute value
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value (distinct from a missing attribute)
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Shared, mutable list
    List(ListHandle),
    /// Shared, mutable string-keyed map
    Map(MapHandle),
    /// Shared reference to a foreign value that cannot be copied
    Opaque(OpaqueHandle),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// True for variants copied by value on every clone.
    pub fn is_value_like(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_) | Value::Opaque(_))
    }

    /// True for shared variants that have a shallow-copy operation.
    pub fn supports_copy(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Capture this value for storage in (or projection out of) history.
    ///
    /// Containers get a fresh handle over a shallow copy of their elements, so
    /// later in-place mutation through the original handle is not visible in
    /// the capture. Nested containers are still shared, one level down.
    /// `Opaque` values are returned as the same shared reference.
    pub fn capture(&self) -> Value {
        match self {
            Value::List(list) => Value::List(list.duplicate()),
            Value::Map(map) => Value::Map(map.duplicate()),
            other => other.clone(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float view; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListHandle> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapHandle> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&OpaqueHandle> {
        match self {
            Value::Opaque(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bitwise, so a NaN equals itself
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(self, f, &mut Vec::new())
    }
}

/// Write `value`, rendering a container already listed in `open` as `[...]` / `{...}`
fn write_value(value: &Value, f: &mut fmt::Formatter<'_>, open: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(v) => write!(f, "{}", v),
        Value::Int(v) => write!(f, "{}", v),
        Value::Float(v) => write!(f, "{:?}", v),
        Value::Text(v) => write!(f, "{:?}", v),
        Value::List(list) => {
            if open.contains(&list.addr()) {
                return f.write_str("[...]");
            }
            open.push(list.addr());
            f.write_str("[")?;
            for (i, item) in list.read().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(item, f, open)?;
            }
            open.pop();
            f.write_str("]")
        }
        Value::Map(map) => {
            if open.contains(&map.addr()) {
                return f.write_str("{...}");
            }
            open.push(map.addr());
            f.write_str("{")?;
            for (i, (key, item)) in map.read().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{:?}: ", key)?;
                write_value(item, f, open)?;
            }
            open.pop();
            f.write_str("}")
        }
        Value::Opaque(handle) => write!(f, "<opaque {}>", handle.type_name()),
    }
}

/// Fails on a container that contains itself
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let open = RefCell::new(Vec::new());
        Tracked { value: self, open: &open }.serialize(serializer)
    }
}

/// A value plus the containers currently being serialized around it
struct Tracked<'a> {
    value: &'a Value,
    open: &'a RefCell<Vec<usize>>,
}

impl Tracked<'_> {
    fn enter<E: ser::Error>(&self, addr: usize) -> Result<(), E> {
        if self.open.borrow().contains(&addr) {
            return Err(E::custom("cannot serialize a container that contains itself"));
        }
        self.open.borrow_mut().push(addr);
        Ok(())
    }

    fn leave(&self) {
        self.open.borrow_mut().pop();
    }

    fn child<'b>(&'b self, value: &'b Value) -> Tracked<'b> {
        Tracked {
            value,
            open: self.open,
        }
    }
}

impl Serialize for Tracked<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::List(list) => {
                self.enter::<S::Error>(list.addr())?;
                let items = list.read();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&self.child(item))?;
                }
                self.leave();
                seq.end()
            }
            Value::Map(map) => {
                self.enter::<S::Error>(map.addr())?;
                let entries = map.read();
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries.iter() {
                    out.serialize_entry(key, &self.child(item))?;
                }
                self.leave();
                out.end()
            }
            Value::Opaque(handle) => {
                serializer.serialize_str(&format!("<opaque {}>", handle.type_name()))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(ListHandle::from_vec(v))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(MapHandle::from_map(v))
    }
}

impl From<ListHandle> for Value {
    fn from(v: ListHandle) -> Self {
        Value::List(v)
    }
}

impl From<MapHandle> for Value {
    fn from(v: MapHandle) -> Self {
        Value::Map(v)
    }
}

impl From<OpaqueHandle> for Value {
    fn from(v: OpaqueHandle) -> Self {
        Value::Opaque(v)
    }
}

/// Shared handle to a mutable list of values
///
/// Cloning the handle aliases the same list; use [`ListHandle::duplicate`]
/// for an independent shallow copy.
#[derive(Clone, Default)]
pub struct ListHandle(Arc<RwLock<Vec<Value>>>);

impl ListHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<Value>> {
        self.0.write()
    }

    /// Append a value in place (visible through every alias of this handle).
    pub fn push(&self, value: impl Into<Value>) {
        self.0.write().push(value.into());
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// New handle over a shallow copy of the elements.
    pub fn duplicate(&self) -> Self {
        Self::from_vec(self.0.read().clone())
    }

    /// True if both handles point at the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for ListHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

impl fmt::Debug for ListHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListHandle({})", Value::List(self.clone()))
    }
}

/// Shared handle to a mutable, key-sorted map of values
#[derive(Clone, Default)]
pub struct MapHandle(Arc<RwLock<BTreeMap<String, Value>>>);

impl MapHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: BTreeMap<String, Value>) -> Self {
        Self(Arc::new(RwLock::new(entries)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Value>> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Value>> {
        self.0.write()
    }

    /// Insert in place, returning the previous value for `key`.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.write().insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// New handle over a shallow copy of the entries.
    pub fn duplicate(&self) -> Self {
        Self::from_map(self.0.read().clone())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for MapHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

impl fmt::Debug for MapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapHandle({})", Value::Map(self.clone()))
    }
}

/// Shared reference to a value of an arbitrary type
///
/// Opaque values have no copy operation. History keeps the same reference
/// that was committed, so the caller must not mutate the referent (through
/// interior mutability) after commit if snapshots are expected to stay stable.
#[derive(Clone)]
pub struct OpaqueHandle {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl OpaqueHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Rust type name of the referent
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True if both handles point at the same referent.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const (),
            Arc::as_ptr(&other.inner) as *const (),
        )
    }
}

impl fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueHandle")
            .field("type_name", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_like_capture_is_equal() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Int(7),
            Value::Float(1.5),
            Value::from("hi"),
        ] {
            assert!(value.is_value_like());
            assert!(!value.supports_copy());
            assert_eq!(value.capture(), value);
        }
    }

    #[test]
    fn test_list_capture_is_detached() {
        let list = ListHandle::from_vec(vec![Value::Int(1), Value::Int(2)]);
        let original = Value::List(list.clone());
        let captured = original.capture();

        list.push(3);

        assert_eq!(list.len(), 3);
        assert_eq!(captured.as_list().unwrap().len(), 2);
        assert!(!captured.as_list().unwrap().ptr_eq(&list));
    }

    #[test]
    fn test_list_capture_is_shallow() {
        let inner = ListHandle::from_vec(vec![Value::Int(1)]);
        let outer = Value::from(vec![Value::List(inner.clone())]);
        let captured = outer.capture();

        inner.push(2);

        // Nested containers stay shared one level down
        let nested = captured.as_list().unwrap().get(0).unwrap();
        assert_eq!(nested.as_list().unwrap().len(), 2);
    }

    #[test]
    fn test_map_capture_is_detached() {
        let map = MapHandle::new();
        map.insert("x", 1);
        let captured = Value::Map(map.clone()).capture();

        map.insert("y", 2);

        assert_eq!(map.len(), 2);
        assert_eq!(captured.as_map().unwrap().len(), 1);
        assert_eq!(captured.as_map().unwrap().get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_opaque_capture_shares_reference() {
        let handle = OpaqueHandle::new(String::from("socket"));
        let value = Value::Opaque(handle.clone());
        let captured = value.capture();

        assert!(!value.supports_copy());
        assert!(captured.as_opaque().unwrap().ptr_eq(&handle));
        assert_eq!(
            captured.as_opaque().unwrap().downcast_ref::<String>().map(String::as_str),
            Some("socket")
        );
    }

    #[test]
    fn test_opaque_equality_is_identity() {
        let a = OpaqueHandle::new(5u32);
        let b = OpaqueHandle::new(5u32);
        assert_eq!(Value::Opaque(a.clone()), Value::Opaque(a.clone()));
        assert_ne!(Value::Opaque(a), Value::Opaque(b));
    }

    #[test]
    fn test_container_equality_by_content() {
        let a = Value::from(vec![Value::Int(1), Value::from("x")]);
        let b = Value::from(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::from(vec![Value::Int(1)]));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_display() {
        let map = MapHandle::new();
        map.insert("k", vec![Value::Int(1), Value::Float(2.0)]);
        assert_eq!(Value::Map(map).to_string(), r#"{"k": [1, 2.0]}"#);
        assert_eq!(Value::from("a\"b").to_string(), r#""a\"b""#);
        assert_eq!(Value::Null.to_string(), "null");
        assert!(Value::Opaque(OpaqueHandle::new(1u8)).to_string().starts_with("<opaque u8"));
    }

    #[test]
    fn test_serialize_json() {
        let map = MapHandle::new();
        map.insert("flag", true);
        let value = Value::from(vec![Value::Int(1), Value::Null, Value::Map(map)]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[1,null,{"flag":true}]"#);
    }

    #[test]
    fn test_nan_equals_itself() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Float(f64::NAN).capture(), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(1.0));
    }

    #[test]
    fn test_self_containing_containers_render() {
        let list = ListHandle::from_vec(vec![Value::Int(1)]);
        list.push(Value::List(list.clone()));
        assert_eq!(Value::List(list.clone()).to_string(), "[1, [...]]");
        assert!(format!("{:?}", list).contains("[...]"));

        let map = MapHandle::new();
        map.insert("me", Value::Map(map.clone()));
        assert_eq!(Value::Map(map).to_string(), r#"{"me": {...}}"#);

        // The same handle twice side by side is not a cycle
        let inner = ListHandle::from_vec(vec![Value::Int(2)]);
        let pair = Value::from(vec![Value::List(inner.clone()), Value::List(inner)]);
        assert_eq!(pair.to_string(), "[[2], [2]]");
    }

    #[test]
    fn test_serialize_self_containing_list_fails() {
        let list = ListHandle::new();
        list.push(Value::List(list.clone()));
        assert!(serde_json::to_string(&Value::List(list)).is_err());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Int(3).as_text(), None);
        assert_eq!(Value::from("t").as_text(), Some("t"));
        assert_eq!(Value::Bool(false).kind(), ValueKind::Bool);
        assert_eq!(ValueKind::Map.to_string(), "map");
    }
}
