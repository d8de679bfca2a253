//! Convierte un mapa plano `ruta/con/barras -> valor` en un árbol de directorios.
//!
//! Política de colisión: las rutas más profundas ganan. Si `"a"` y `"a/b"`
//! coexisten, `a` queda como directorio con `b` dentro y el valor hoja de
//! `"a"` se descarta, sin importar el orden de las claves.
use std::collections::HashSet;

use log::debug;
use serde_json::{Map, Value as JsonValue};

use crate::constants::PATH_SEPARATOR;

/// Divide una clave en segmentos no vacíos. Una clave sin segmentos útiles
/// (`""`, `"/"`) se conserva literal como único segmento.
pub fn split_path(key: &str) -> Vec<&str> {
    let segments: Vec<&str> = key.split(PATH_SEPARATOR).filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        vec![key]
    } else {
        segments
    }
}

/// Construye el árbol anidado. Prefijos de directorio compartidos se fusionan
/// en el mismo nodo.
pub fn build_tree<I, K>(flat: I) -> JsonValue
    where I: IntoIterator<Item = (K, JsonValue)>,
          K: AsRef<str>
{
    let mut root = Map::new();
    let mut dirs: HashSet<String> = HashSet::new();
    for (key, value) in flat {
        let segments = split_path(key.as_ref());
        insert_path(&mut root, &mut dirs, &segments, value);
    }
    JsonValue::Object(root)
}

/// Variante para la salida del serializador: si no es un objeto se devuelve tal cual.
pub fn tree_of(rendered: JsonValue) -> JsonValue {
    match rendered {
        JsonValue::Object(map) => build_tree(map),
        other => other,
    }
}

fn insert_path(root: &mut Map<String, JsonValue>, dirs: &mut HashSet<String>, segments: &[&str], value: JsonValue) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };

    let mut prefix = String::new();
    let mut cursor = root;
    for seg in parents {
        if !prefix.is_empty() {
            prefix.push(PATH_SEPARATOR);
        }
        prefix.push_str(seg);

        let is_dir = dirs.contains(&prefix);
        let slot = cursor.entry((*seg).to_string()).or_insert(JsonValue::Null);
        if !is_dir {
            if !slot.is_null() {
                debug!("tree: directory '{prefix}' replaces a leaf value");
            }
            *slot = JsonValue::Object(Map::new());
            dirs.insert(prefix.clone());
        }
        cursor = match slot {
            JsonValue::Object(map) => map,
            _ => return,
        };
    }

    let leaf_path = if prefix.is_empty() {
        (*leaf).to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{leaf}")
    };
    if dirs.contains(&leaf_path) {
        debug!("tree: leaf '{leaf_path}' dropped, a deeper path owns it");
        return;
    }
    cursor.insert((*leaf).to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(v: JsonValue) -> Map<String, JsonValue> {
        match v {
            JsonValue::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn flat_keys_become_directories() {
        let out = build_tree(flat(json!({"a/b": 1, "a/c": 2, "d": 3})));
        assert_eq!(out, json!({"a": {"b": 1, "c": 2}, "d": 3}));
    }

    #[test]
    fn deep_prefixes_merge() {
        let out = build_tree(flat(json!({"x/y/z.md": {"contents": "..."}, "x/y/w.md": 1, "x/v": 2})));
        assert_eq!(out, json!({"x": {"y": {"z.md": {"contents": "..."}, "w.md": 1}, "v": 2}}));
    }

    #[test]
    fn deeper_paths_win_in_either_order() {
        let leaf_first = build_tree(vec![("a", json!(1)), ("a/b", json!(2))]);
        let dir_first = build_tree(vec![("a/b", json!(2)), ("a", json!(1))]);
        assert_eq!(leaf_first, json!({"a": {"b": 2}}));
        assert_eq!(dir_first, json!({"a": {"b": 2}}));
    }

    #[test]
    fn record_values_are_not_mistaken_for_directories() {
        let out = build_tree(vec![("a", json!({"title": "x"})), ("b/c", json!({"title": "y"}))]);
        assert_eq!(out, json!({"a": {"title": "x"}, "b": {"c": {"title": "y"}}}));
    }

    #[test]
    fn empty_segments_are_ignored() {
        assert_eq!(split_path("/a//b/"), vec!["a", "b"]);
        assert_eq!(split_path(""), vec![""]);
        assert_eq!(build_tree(vec![("a//b", json!(1))]), json!({"a": {"b": 1}}));
    }

    #[test]
    fn non_objects_pass_through_tree_of() {
        assert_eq!(tree_of(json!("x")), json!("x"));
        assert_eq!(tree_of(json!({"p/q": 1})), json!({"p": {"q": 1}}));
    }
}
