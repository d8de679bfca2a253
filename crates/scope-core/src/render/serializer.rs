//! Serializador de snapshots: grafo arbitrario -> árbol JSON finito.
//!
//! Recorrido BFS con una worklist de `(valor, ruta)` sembrada con la raíz.
//! Cada compuesto se visita una sola vez; la segunda aparición de un mismo
//! nodo (ciclo o alias) se sustituye por `[Copy: root > a > b]`, con la ruta
//! donde se descubrió por primera vez. El tamaño de la salida queda acotado
//! por el número de nodos distintos alcanzables.
//!
//! Reglas por clave, en orden:
//! 1. `contents` -> `"..."` (payloads binarios nunca se renderizan).
//! 2. `Bytes` -> texto (UTF-8 con reemplazo).
//! 3. compuesto ya visto -> marcador de alias.
//! 4. compuesto nuevo -> contenedor vacío ahora, contenido en una vuelta
//!    posterior.
//! 5. primitivo -> copia literal.
use indexmap::IndexSet;
use serde_json::{Map, Number, Value as JsonValue};

use crate::constants::{BREADCRUMB_SEPARATOR, CONTENTS_KEY, CONTENTS_PLACEHOLDER, ROOT_LABEL};
use crate::model::{Fields, Node, Value};

/// Segmento de ruta desde la raíz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

impl PathSeg {
    fn label(&self) -> String {
        match self {
            PathSeg::Key(k) => k.clone(),
            PathSeg::Index(i) => i.to_string(),
        }
    }
}

/// Breadcrumb legible de una ruta (`root > a > 0`).
pub fn breadcrumb(path: &[PathSeg]) -> String {
    std::iter::once(ROOT_LABEL.to_string()).chain(path.iter().map(PathSeg::label))
                                           .collect::<Vec<_>>()
                                           .join(BREADCRUMB_SEPARATOR)
}

/// Marcador de alias para un nodo descubierto en `path`.
pub fn copy_marker(path: &[PathSeg]) -> String {
    format!("[Copy: {}]", breadcrumb(path))
}

/// Convierte un grafo (posiblemente cíclico) en un árbol JSON. No muta la entrada.
pub fn serialize(root: &Value) -> JsonValue {
    let Some(root_id) = root.identity() else {
        return render_leaf(root);
    };

    let mut out = empty_container(root);
    let mut seen: IndexSet<usize> = IndexSet::new();
    let mut worklist: Vec<(Value, Vec<PathSeg>)> = Vec::new();
    seen.insert(root_id);
    worklist.push((root.clone(), Vec::new()));

    let mut idx = 0;
    while idx < worklist.len() {
        let (item, path) = worklist[idx].clone();
        idx += 1;

        for (seg, child) in children(&item) {
            let mut child_path = path.clone();
            child_path.push(seg);

            let rendered = if matches!(child_path.last(), Some(PathSeg::Key(k)) if k == CONTENTS_KEY) {
                JsonValue::String(CONTENTS_PLACEHOLDER.to_string())
            } else if let Value::Bytes(bytes) = &child {
                JsonValue::String(String::from_utf8_lossy(bytes).into_owned())
            } else if let Some(id) = child.identity() {
                match seen.get_index_of(&id) {
                    Some(first) => JsonValue::String(copy_marker(&worklist[first].1)),
                    None => {
                        seen.insert(id);
                        let placeholder = empty_container(&child);
                        worklist.push((child, child_path.clone()));
                        placeholder
                    }
                }
            } else {
                render_leaf(&child)
            };

            assign(&mut out, &child_path, rendered);
        }
    }
    out
}

/// Atajo para el caso habitual (artifacts o metadata).
pub fn serialize_map(root: &Node<Fields>) -> JsonValue {
    serialize(&Value::Map(root.clone()))
}

// El lock del nodo sólo se mantiene mientras se copian los handles.
fn children(item: &Value) -> Vec<(PathSeg, Value)> {
    match item {
        Value::Map(node) => node.entries().into_iter().map(|(k, v)| (PathSeg::Key(k), v)).collect(),
        Value::List(node) => node.items().into_iter().enumerate().map(|(i, v)| (PathSeg::Index(i), v)).collect(),
        _ => Vec::new(),
    }
}

fn empty_container(value: &Value) -> JsonValue {
    match value {
        Value::List(node) => JsonValue::Array(vec![JsonValue::Null; node.len()]),
        _ => JsonValue::Object(Map::new()),
    }
}

fn render_leaf(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::Number((*i).into()),
        // NaN / infinitos no son JSON válido.
        Value::Float(f) => Number::from_f64(*f).map(JsonValue::Number).unwrap_or(JsonValue::Null),
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::Bytes(b) => JsonValue::String(String::from_utf8_lossy(b).into_owned()),
        Value::Map(_) | Value::List(_) => empty_container(value),
    }
}

/// Asigna `value` en `path`, creando nodos intermedios si faltan.
fn assign(out: &mut JsonValue, path: &[PathSeg], value: JsonValue) {
    let Some((last, parents)) = path.split_last() else {
        *out = value;
        return;
    };
    let mut cursor = out;
    for seg in parents {
        cursor = slot(cursor, seg);
    }
    *slot(cursor, last) = value;
}

fn slot<'a>(node: &'a mut JsonValue, seg: &PathSeg) -> &'a mut JsonValue {
    match seg {
        PathSeg::Key(k) => {
            if !node.is_object() {
                *node = JsonValue::Object(Map::new());
            }
            &mut node[k.as_str()]
        }
        PathSeg::Index(i) => {
            if !node.is_array() {
                *node = JsonValue::Array(Vec::new());
            }
            if let JsonValue::Array(items) = node {
                if items.len() <= *i {
                    items.resize(*i + 1, JsonValue::Null);
                }
            }
            &mut node[*i]
        }
    }
}
