//! Hygiene: source-level budgets for patterns the crate does not allow.
//!
//! Scans `src/` (excluding `*_test.rs`) line by line. Every budget is zero:
//! theme handling runs inside host pages and must never take the page down,
//! and every backend failure is logged through `leptos::logging` rather than
//! printed or dropped.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

const BUDGETS: &[Budget] = &[
    Budget { pattern: ".unwrap()", max: 0, why: "panics in the host page" },
    Budget { pattern: ".expect(", max: 0, why: "panics in the host page" },
    Budget { pattern: "panic!(", max: 0, why: "panics in the host page" },
    Budget { pattern: "unreachable!(", max: 0, why: "panics in the host page" },
    Budget { pattern: "todo!(", max: 0, why: "unfinished code" },
    Budget { pattern: "unimplemented!(", max: 0, why: "unfinished code" },
    Budget { pattern: "let _ =", max: 0, why: "discards an error without logging it" },
    Budget { pattern: ".ok()", max: 0, why: "discards an error without logging it" },
    Budget { pattern: "println!(", max: 0, why: "use leptos::logging" },
    Budget { pattern: "eprintln!(", max: 0, why: "use leptos::logging" },
    Budget { pattern: "dbg!(", max: 0, why: "debug leftovers" },
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "delete unused code instead" },
];

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

/// Production lines only: stops at the first `#[cfg(test)]` that opens an
/// inline test module.
fn production_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut lines = content.lines().peekable();
    std::iter::from_fn(move || {
        let line = lines.next()?;
        if line.trim() == "#[cfg(test)]" && lines.peek().is_some_and(|next| next.trim_start().starts_with("mod tests")) {
            return None;
        }
        Some(line)
    })
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = production_lines(&file.content).filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("lib.rs")), "run from the crate root");
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for budget in BUDGETS {
        let hits = hits(&files, budget.pattern);
        let count: usize = hits.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            let detail = hits
                .iter()
                .map(|(path, count)| format!("    {path}: {count}"))
                .collect::<Vec<_>>()
                .join("\n");
            failures.push(format!(
                "`{}` budget exceeded ({}): found {count}, max {}\n{detail}",
                budget.pattern, budget.why, budget.max
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
