//! Indented text outline of a key.

use std::collections::HashSet;
use std::fmt::Write;

use super::{KeyStore, Node, StepId};

/// Render the key as an outline: roots in document order, children indented
/// under their parent, gotos shown after an arrow. Nodes whose parent chain
/// does not reach a root are listed at the end.
pub fn outline(store: &KeyStore) -> String {
    let mut out = String::new();
    let mut seen = HashSet::new();

    for root in store.roots() {
        write_subtree(store, root, 0, &mut seen, &mut out);
    }

    let detached: Vec<_> = store.nodes().filter(|n| !seen.contains(&n.id)).collect();
    if !detached.is_empty() {
        out.push_str("(detached)\n");
        for node in detached {
            write_subtree(store, node, 1, &mut seen, &mut out);
        }
    }

    out
}

fn write_subtree<'a>(
    store: &'a KeyStore,
    node: &'a Node,
    depth: usize,
    seen: &mut HashSet<&'a StepId>,
    out: &mut String,
) {
    if !seen.insert(&node.id) {
        return;
    }

    let _ = write!(out, "{:indent$}{}. {}", "", node.id, node.text, indent = depth * 2);
    if let Some(target) = node.goto.step() {
        let _ = write!(out, " → {target}");
        if !store.contains(target) {
            out.push_str(" (missing)");
        }
    }
    out.push('\n');

    for child in store.children(&node.id) {
        write_subtree(store, child, depth + 1, seen, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{build, parse_document};

    #[test]
    fn test_outline() {
        let store = build(parse_document(
            "1. Plant annual 2\n1'. Plant perennial\n1''. Rosette -> 3\n2. Flowers blue\n3. Flowers red 12\n",
        ))
        .store;

        insta::assert_snapshot!(outline(&store).trim_end(), @r"
        1. Plant annual → 2
          1'. Plant perennial
            1''. Rosette → 3
        2. Flowers blue
        3. Flowers red → 12 (missing)
        ");
    }

    #[test]
    fn test_outline_lists_detached_nodes() {
        let store = KeyStore::from_json(
            r#"{"1": {"id": "1", "texte": "A", "goto": "END", "parent": null},
                "2'": {"id": "2'", "texte": "B", "goto": "END", "parent": "9"}}"#,
        )
        .unwrap();

        let text = outline(&store);
        assert!(text.contains("(detached)\n  2'. B\n"));
    }

    #[test]
    fn test_outline_empty() {
        assert_eq!(outline(&KeyStore::default()), "");
    }
}
