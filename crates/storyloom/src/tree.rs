//! Plain-text rendering of a persisted story tree.

use std::collections::HashMap;
use storyloom_core::{SceneletId, SceneletRecord};

const DESCRIPTION_WIDTH: usize = 72;

/// Render a story as an indented outline, children in snapshot order.
///
/// Markers: `*` branch point, `#` terminal, `-` linear, `+` open leaf.
/// Branch points are followed by their choice prompt, choices by their
/// label.
///
/// # Examples
///
/// ```
/// use storyloom::render_tree;
///
/// assert_eq!(render_tree(&[]), "(empty story)\n");
/// ```
pub fn render_tree(records: &[SceneletRecord]) -> String {
    if records.is_empty() {
        return "(empty story)\n".to_string();
    }

    let mut children: HashMap<&SceneletId, Vec<&SceneletRecord>> = HashMap::new();
    let mut roots = Vec::new();
    for record in records {
        match &record.parent_id {
            Some(parent) => children.entry(parent).or_default().push(record),
            None => roots.push(record),
        }
    }

    let mut out = String::new();
    let mut stack: Vec<(&SceneletRecord, usize)> = roots.iter().rev().map(|r| (*r, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        let kids = children.get(&node.id).map(Vec::as_slice).unwrap_or(&[]);
        let marker = if node.is_branch_point {
            '*'
        } else if node.is_terminal_node {
            '#'
        } else if kids.is_empty() {
            '+'
        } else {
            '-'
        };
        let indent = "  ".repeat(depth);
        let label = node
            .choice_label_from_parent
            .as_deref()
            .map(|label| format!("[{}] ", label))
            .unwrap_or_default();

        out.push_str(&format!(
            "{}{} {}{} ({})\n",
            indent,
            marker,
            label,
            truncate(&node.content.description),
            node.id
        ));
        if let Some(prompt) = &node.choice_prompt {
            out.push_str(&format!("{}  ? {}\n", indent, prompt));
        }

        for child in kids.iter().rev() {
            stack.push((*child, depth + 1));
        }
    }
    out
}

fn truncate(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= DESCRIPTION_WIDTH {
        return single_line;
    }
    let cut: String = single_line.chars().take(DESCRIPTION_WIDTH - 3).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_descriptions_are_shortened() {
        let long = "word ".repeat(40);
        let short = truncate(&long);
        assert_eq!(short.chars().count(), DESCRIPTION_WIDTH);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn newlines_are_collapsed() {
        assert_eq!(truncate("a\n  b"), "a b");
    }
}
