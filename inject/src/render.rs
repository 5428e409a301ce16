//! Text renderings of a graph's contents.

use std::fmt::Write;
use std::sync::Arc;

use crate::core::Entry;
use crate::resolver::Store;

pub(crate) fn flat(store: &Store) -> String {
  let items: Vec<String> = store
    .iter()
    .map(|(key, entry)| format!(r#"{{"key":"{}","object":{}}}"#, key, entry))
    .collect();
  format!("[{}]", items.join(","))
}

pub(crate) fn tree(store: &Store) -> String {
  let mut out = String::from("dependence tree:\n");
  let last = store.len().saturating_sub(1);
  let mut path = Vec::new();
  for (i, (_, entry)) in store.iter().enumerate() {
    let head = if i == 0 {
      "┌── "
    } else if i == last {
      "└── "
    } else {
      "├── "
    };
    node(store, head, entry, &mut path, &mut out);
  }
  out
}

fn node(store: &Store, prefix: &str, entry: &Arc<Entry>, path: &mut Vec<String>, out: &mut String) {
  let ty = entry.type_info();
  let _ = if ty.is_component() {
    writeln!(out, "{}{}({}={:p})", prefix, entry.name(), ty, entry.address())
  } else {
    writeln!(out, "{}{}({})", prefix, entry.name(), ty)
  };

  // Self-referencing keys would otherwise recurse forever.
  if path.iter().any(|seen| seen == entry.name()) {
    return;
  }

  let children: Vec<&Arc<Entry>> = entry
    .dependencies()
    .iter()
    .filter_map(|key| store.get(key.as_str()))
    .collect();
  if children.is_empty() {
    return;
  }

  let indent: String = prefix
    .chars()
    .map(|c| match c {
      '└' | '─' => ' ',
      '├' | '┌' => '│',
      other => other,
    })
    .collect();

  path.push(entry.name().to_string());
  let last = children.len() - 1;
  for (i, child) in children.into_iter().enumerate() {
    let corner = if i == last { " └── " } else { " ├── " };
    node(store, &format!("{}{}", indent, corner), child, path, out);
  }
  path.pop();
}
