//! Markdown (callback): convierte cada `.md` en `.html`.
//!
//! El front-matter (`---` / `clave: valor` / `---`) pasa a campos del
//! registro; el cuerpo se renderiza con un subconjunto mínimo (encabezados
//! `#`/`##`/`###` y párrafos por línea).

use log::info;
use scope_core::constants::CONTENTS_KEY;
use scope_core::{contents_of, Done, Files, Step, StepCtx, StepError, Value};

pub fn markdown() -> Step {
    Step::callback(|ctx: &StepCtx, done: Done| match convert_all(&ctx.files) {
        Ok(n) => {
            info!("converted {n} files");
            done.ok();
        }
        Err(err) => done.err(err),
    }).named("markdown")
}

fn convert_all(files: &Files) -> Result<usize, StepError> {
    let mut converted = 0;
    for (path, record) in files.entries() {
        let Some(stem) = path.strip_suffix(".md") else {
            continue;
        };
        let (Some(rec), Some(bytes)) = (record.as_map(), contents_of(&record)) else {
            continue;
        };
        let text = String::from_utf8(bytes).map_err(|_| StepError::failed(format!("{path}: not valid UTF-8")))?;
        let (fields, body) = split_front_matter(&text);
        for (key, value) in fields {
            rec.insert(key, value);
        }
        rec.insert(CONTENTS_KEY, Value::Bytes(render(body).into_bytes()));
        files.remove(&path);
        files.insert(format!("{stem}.html"), rec.clone());
        converted += 1;
    }
    Ok(converted)
}

pub(crate) fn split_front_matter(text: &str) -> (Vec<(String, String)>, &str) {
    let Some(rest) = text.strip_prefix("---\n") else {
        return (Vec::new(), text);
    };
    let Some(end) = rest.find("\n---") else {
        return (Vec::new(), text);
    };
    let fields = rest[..end].lines()
                            .filter_map(|line| line.split_once(':'))
                            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                            .filter(|(k, _)| !k.is_empty())
                            .collect();
    let body = rest[end + 4..].trim_start_matches(|c| c == '\n' || c == '\r');
    (fields, body)
}

pub(crate) fn render(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if let Some(h) = line.strip_prefix("### ") {
                format!("<h3>{h}</h3>")
            } else if let Some(h) = line.strip_prefix("## ") {
                format!("<h2>{h}</h2>")
            } else if let Some(h) = line.strip_prefix("# ") {
                format!("<h1>{h}</h1>")
            } else {
                format!("<p>{line}</p>")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_core::{artifact, MemoryWriter, Node};
    use std::sync::Arc;

    #[test]
    fn front_matter_is_split_from_body() {
        let (fields, body) = split_front_matter("---\ntitle: Hello\ndraft: no\n---\n# Hi\n");
        assert_eq!(fields, vec![("title".to_string(), "Hello".to_string()), ("draft".to_string(), "no".to_string())]);
        assert_eq!(body, "# Hi\n");

        let (fields, body) = split_front_matter("plain text");
        assert!(fields.is_empty());
        assert_eq!(body, "plain text");
    }

    #[test]
    fn renders_headings_and_paragraphs() {
        assert_eq!(render("# T\n\nsome text\n## S"), "<h1>T</h1>\n<p>some text</p>\n<h2>S</h2>");
    }

    #[tokio::test]
    async fn renames_md_records_and_keeps_others() {
        let files: Files = Node::default();
        files.insert("posts/a.md", artifact("---\ntitle: A\n---\n# A"));
        files.insert("style.css", artifact("body{}"));
        let ctx = StepCtx::new(files.clone(), Node::default(), Arc::new(MemoryWriter::default()));

        markdown().invoke(ctx).await.expect("markdown");

        assert_eq!(files.keys(), vec!["style.css", "posts/a.html"]);
        let rec = files.get("posts/a.html").expect("html");
        assert_eq!(contents_of(&rec), Some(b"<h1>A</h1>".to_vec()));
        assert_eq!(rec.as_map().and_then(|m| m.get("title")).and_then(|v| v.as_str().map(str::to_string)),
                   Some("A".to_string()));
    }

    #[tokio::test]
    async fn invalid_utf8_fails_the_step() {
        let files: Files = Node::default();
        files.insert("bad.md", artifact(vec![0xff, 0xfe]));
        let ctx = StepCtx::new(files, Node::default(), Arc::new(MemoryWriter::default()));
        let err = markdown().invoke(ctx).await.expect_err("utf8");
        assert_eq!(err, StepError::Failed("bad.md: not valid UTF-8".into()));
    }
}
