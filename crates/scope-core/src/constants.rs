//! Constantes del núcleo.
//!
//! Estos valores forman parte del contrato observable con el visor: rutas
//! dentro del conjunto de salida y marcadores textuales del árbol renderizado.
//! Cambiarlos rompe la compatibilidad con `debug-ui/data.json` ya publicados.

/// Campo de un artifact que contiene el payload binario. Nunca se renderiza.
pub const CONTENTS_KEY: &str = "contents";

/// Texto que sustituye a cualquier valor bajo `CONTENTS_KEY`.
pub const CONTENTS_PLACEHOLDER: &str = "...";

/// Etiqueta del nodo raíz en los breadcrumbs de alias (`[Copy: root > a]`).
pub const ROOT_LABEL: &str = "root";

/// Separador de segmentos en los breadcrumbs de alias.
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// Separador de rutas en la colección de artifacts.
pub const PATH_SEPARATOR: char = '/';

/// Directorio de salida del visor.
pub const CLIENT_DIR: &str = "debug-ui";

/// Ruta del documento de historial dentro del conjunto de salida.
pub const DATA_PATH: &str = "debug-ui/data.json";

/// Nombre usado cuando un step no declara nombre.
pub const ANONYMOUS_STEP: &str = "anonymous";

/// Prefijo que añaden los mecanismos de binding al nombre de una función.
pub const BOUND_PREFIX: &str = "bound ";

/// Convención de nombres de los crates que aportan steps.
pub const COMPONENT_PREFIX: &str = "scope_";
