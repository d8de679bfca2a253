//! Grafo de valores mutable compartido por los steps.
//!
//! La colección de artifacts y la metadata del pipeline son grafos arbitrarios:
//! un mismo nodo puede colgar de varios padres (alias) o de sí mismo (ciclo).
//! Los compuestos (`Map`, `List`) se guardan en un `Node<T>`, un handle
//! compartido cuya identidad es la dirección del `Arc`. Clonar un `Value`
//! compuesto clona el handle, no el contenido.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::constants::CONTENTS_KEY;

/// Campos de un mapa, en orden de inserción.
pub type Fields = IndexMap<String, Value>;

/// Colección de artifacts: ruta con `/` -> registro del artifact.
pub type Files = Node<Fields>;

/// Metadata global del pipeline.
pub type Metadata = Node<Fields>;

/// Handle compartido a un nodo compuesto del grafo.
pub struct Node<T>(Arc<RwLock<T>>);

impl<T> Node<T> {
    pub fn new(inner: T) -> Self {
        Self(Arc::new(RwLock::new(inner)))
    }

    /// Identidad del nodo (dirección del `Arc`). Dos handles del mismo nodo
    /// devuelven el mismo valor; dos nodos estructuralmente iguales no.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Node<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// No se recorre el contenido: el grafo puede tener ciclos.
impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(#{:x})", self.id())
    }
}

impl Node<Fields> {
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.write().insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.write().shift_remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copia superficial de las entradas, para iterar sin mantener el lock.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl Node<Vec<Value>> {
    pub fn push(&self, value: impl Into<Value>) {
        self.write().push(value.into());
    }

    pub fn items(&self) -> Vec<Value> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

/// Valor del grafo.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Contenido binario crudo (p.ej. el cuerpo de un fichero).
    Bytes(Vec<u8>),
    Map(Node<Fields>),
    List(Node<Vec<Value>>),
}

impl Value {
    /// Mapa vacío nuevo (nodo propio).
    pub fn map() -> Self {
        Value::Map(Node::default())
    }

    /// Lista vacía nueva (nodo propio).
    pub fn list() -> Self {
        Value::List(Node::default())
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Map(_) | Value::List(_))
    }

    /// Identidad del nodo si el valor es compuesto.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Map(n) => Some(n.id()),
            Value::List(n) => Some(n.id()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Node<Fields>> {
        match self {
            Value::Map(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Node<Vec<Value>>> {
        match self {
            Value::List(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Str(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Construye un grafo (sin alias) a partir de JSON.
    pub fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(*b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::Str(s.clone()),
            J::Array(items) => {
                let list: Node<Vec<Value>> = Node::new(items.iter().map(Value::from_json).collect());
                Value::List(list)
            }
            J::Object(map) => {
                let fields: Fields = map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect();
                Value::Map(Node::new(fields))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Int(v) }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self { Value::Int(v.into()) }
}
impl From<usize> for Value {
    fn from(v: usize) -> Self { i64::try_from(v).map(Value::Int).unwrap_or(Value::Float(v as f64)) }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Float(v) }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Str(v.to_string()) }
}
impl From<String> for Value {
    fn from(v: String) -> Self { Value::Str(v) }
}
impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self { Value::Bytes(v) }
}
impl From<Node<Fields>> for Value {
    fn from(v: Node<Fields>) -> Self { Value::Map(v) }
}
impl From<Node<Vec<Value>>> for Value {
    fn from(v: Node<Vec<Value>>) -> Self { Value::List(v) }
}

/// Registro de artifact con su payload binario bajo `contents`.
pub fn artifact(contents: impl Into<Vec<u8>>) -> Node<Fields> {
    let node: Node<Fields> = Node::default();
    node.insert(CONTENTS_KEY, Value::Bytes(contents.into()));
    node
}

/// Payload binario de un registro de artifact, si lo tiene.
pub fn contents_of(record: &Value) -> Option<Vec<u8>> {
    record.as_map()
          .and_then(|m| m.get(CONTENTS_KEY))
          .and_then(|c| c.as_bytes().map(<[u8]>::to_vec))
}
