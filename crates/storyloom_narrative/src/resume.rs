//! Reconstructing open work from a persisted story.

use std::collections::HashMap;
use storyloom_core::{
    GenerationTask, InterruptedBranch, ResumeState, SceneletId, SceneletRecord,
    ScriptwriterScenelet,
};
use storyloom_error::{IntegrityError, IntegrityErrorKind};

/// Compute the pending generation tasks of a story from a full snapshot of
/// its scenelets.
///
/// * An empty snapshot yields one root task.
/// * Terminal scenelets end their path.
/// * Branch points must already have children; every child is walked.
/// * A linear scenelet with one child continues into it; without children it
///   is an open leaf and yields a task whose path runs from the root down to
///   it, root first.
/// * A scenelet without the branch point flag whose children all carry a
///   choice label, and are themselves unflagged leaves, is an interrupted
///   branch write. It is reported in
///   [`ResumeState::interrupted_branches`] and planned like an open leaf.
///
/// Tasks come out in depth-first order, children visited in snapshot order.
/// The walk uses an explicit stack, so story length does not grow the call
/// stack.
///
/// # Errors
///
/// Fails with an integrity error, and no partial plan, when the story has no
/// root or several, when a branch point has no children, when a linear
/// scenelet has several children, or when a terminal scenelet has children.
///
/// # Examples
///
/// ```
/// use storyloom_narrative::plan_resume;
///
/// let plan = plan_resume("new-story", &[]).unwrap();
/// assert_eq!(plan.pending_tasks.len(), 1);
/// assert!(plan.pending_tasks[0].is_root());
/// ```
#[tracing::instrument(skip(scenelets), fields(scenelets = scenelets.len()))]
pub fn plan_resume(
    story_id: &str,
    scenelets: &[SceneletRecord],
) -> Result<ResumeState, IntegrityError> {
    if scenelets.is_empty() {
        tracing::debug!("Empty story, planning root generation");
        return Ok(ResumeState {
            pending_tasks: vec![GenerationTask::root(story_id)],
            interrupted_branches: Vec::new(),
        });
    }

    let mut roots = Vec::new();
    let mut children: HashMap<&SceneletId, Vec<&SceneletRecord>> = HashMap::new();
    for record in scenelets {
        match &record.parent_id {
            None => roots.push(record),
            Some(parent) => children.entry(parent).or_default().push(record),
        }
    }

    let root = match roots.as_slice() {
        [root] => *root,
        [] => {
            return Err(IntegrityError::new(IntegrityErrorKind::MissingRoot {
                story_id: story_id.to_string(),
            }));
        }
        many => {
            return Err(IntegrityError::new(IntegrityErrorKind::MultipleRoots {
                story_id: story_id.to_string(),
                count: many.len(),
            }));
        }
    };

    let mut pending_tasks = Vec::new();
    let mut interrupted_branches = Vec::new();
    let mut stack: Vec<(&SceneletRecord, Vec<ScriptwriterScenelet>)> =
        vec![(root, vec![root.content.clone()])];

    while let Some((node, path)) = stack.pop() {
        let node_children = children.get(&node.id).map(Vec::as_slice).unwrap_or(&[]);

        if node.is_terminal_node {
            if !node_children.is_empty() {
                return Err(IntegrityError::new(
                    IntegrityErrorKind::TerminalWithChildren {
                        story_id: story_id.to_string(),
                        scenelet_id: node.id.to_string(),
                    },
                ));
            }
            continue;
        }

        if node.is_branch_point {
            if node_children.is_empty() {
                return Err(IntegrityError::new(
                    IntegrityErrorKind::BranchWithoutChildren {
                        story_id: story_id.to_string(),
                        scenelet_id: node.id.to_string(),
                    },
                ));
            }
            // Reverse push keeps the first child on top of the stack.
            for child in node_children.iter().rev() {
                let mut child_path = path.clone();
                child_path.push(child.content.clone());
                stack.push((*child, child_path));
            }
            continue;
        }

        if is_partial_branch(node_children, &children) {
            tracing::warn!(
                scenelet_id = %node.id,
                partial_children = node_children.len(),
                "Branch write was interrupted, planning regeneration"
            );
            interrupted_branches.push(InterruptedBranch {
                parent_scenelet_id: node.id.clone(),
                partial_children: node_children.iter().map(|c| c.id.clone()).collect(),
            });
            pending_tasks.push(GenerationTask::continuation(
                story_id,
                node.id.clone(),
                path,
            ));
            continue;
        }

        match node_children {
            [] => pending_tasks.push(GenerationTask::continuation(
                story_id,
                node.id.clone(),
                path,
            )),
            [child] => {
                let mut child_path = path;
                child_path.push(child.content.clone());
                stack.push((*child, child_path));
            }
            many => {
                return Err(IntegrityError::new(
                    IntegrityErrorKind::AmbiguousContinuation {
                        story_id: story_id.to_string(),
                        scenelet_id: node.id.to_string(),
                        count: many.len(),
                    },
                ));
            }
        }
    }

    tracing::debug!(
        pending = pending_tasks.len(),
        interrupted = interrupted_branches.len(),
        "Resume plan computed"
    );
    Ok(ResumeState {
        pending_tasks,
        interrupted_branches,
    })
}

/// Children left behind by a branch whose parent was never flagged: every
/// child carries a choice label and none was expanded further.
fn is_partial_branch(
    node_children: &[&SceneletRecord],
    children: &HashMap<&SceneletId, Vec<&SceneletRecord>>,
) -> bool {
    !node_children.is_empty()
        && node_children.iter().all(|child| {
            child.choice_label_from_parent.is_some()
                && !child.is_branch_point
                && !child.is_terminal_node
                && !children.contains_key(&child.id)
        })
}
