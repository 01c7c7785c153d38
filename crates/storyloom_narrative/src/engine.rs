//! Story tree generation engine.
//!
//! The engine owns a frontier of [`GenerationTask`]s. Each task is one model
//! call: assemble the prompt from the constitution and the task's path,
//! decode the response completely, and only then write the new scenelets.
//! Children of a branch are stored as one batch before their parent is
//! flagged as a branch point. A concluding scenelet is stored already flagged
//! as terminal. If a run stops between the batch and the flag, the next
//! resume discards the unflagged children and regenerates the parent.

use crate::{
    GenerationConfig, ResponseShape, ScriptwriterResponse, assemble_prompt, plan_resume,
    render_system_instruction,
};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use storyloom_core::{
    GenerationTask, InterruptedBranch, NewScenelet, ResumeState, SceneletId, SceneletRecord,
    ScriptwriterScenelet,
};
use storyloom_error::{
    NarrativeError, NarrativeErrorKind, StoryloomResult, ValidationError, ValidationErrorKind,
};
use storyloom_interface::{
    JsonGenerationOptions, JsonGenerationRequest, SceneletRepository, StoryModelClient,
};
use tracing::{debug, error, info, instrument, warn};

/// How a run obtains its initial frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GenerationMode {
    /// Start a story that has no scenelets yet
    Fresh,
    /// Continue from the persisted tree
    Resume,
}

/// A task that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Parent of the scenelet that was being generated, `None` for the root
    pub parent_scenelet_id: Option<SceneletId>,
    /// Rendered error
    pub message: String,
}

/// Summary of one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Tasks that reached a result, successful or not
    pub tasks_processed: usize,
    /// Scenelets written
    pub scenelets_created: usize,
    /// Parents flagged as branch points
    pub branch_points_marked: usize,
    /// Scenelets flagged as terminal
    pub terminals_marked: usize,
    /// Tasks that failed, in completion order
    pub failures: Vec<TaskFailure>,
    /// Tasks never started because the run stopped early
    pub tasks_remaining: usize,
    /// Whether the run stopped after a failure
    pub aborted: bool,
}

impl GenerationReport {
    /// True when every task succeeded and the frontier drained.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.aborted && self.tasks_remaining == 0
    }

    fn record(&mut self, outcome: &TaskOutcome) {
        self.scenelets_created += outcome.created.len();
        self.branch_points_marked += usize::from(outcome.branch_marked);
        self.terminals_marked += usize::from(outcome.terminal_marked);
    }
}

/// What one successful task wrote.
#[derive(Debug)]
struct TaskOutcome {
    shape: ResponseShape,
    created: Vec<SceneletRecord>,
    branch_marked: bool,
    terminal_marked: bool,
    continuations: Vec<GenerationTask>,
}

/// Drives the expansion of story trees.
///
/// # Example
///
/// ```rust,ignore
/// let engine = StoryGenerationEngine::new(client, repository, system_prompt, config)?;
/// let report = engine
///     .generate("harbor-mystery", &constitution, GenerationMode::Fresh)
///     .await?;
/// println!("{} scenelets written", report.scenelets_created);
/// ```
#[derive(Debug)]
pub struct StoryGenerationEngine<M, R> {
    model: M,
    repository: R,
    system_instruction: String,
    options: JsonGenerationOptions,
    config: GenerationConfig,
}

impl<M, R> StoryGenerationEngine<M, R>
where
    M: StoryModelClient,
    R: SceneletRepository,
{
    /// Create an engine.
    ///
    /// `system_prompt` is the scriptwriter instruction template; the advisory
    /// path length from `config` is filled in here.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        model: M,
        repository: R,
        system_prompt: impl AsRef<str>,
        config: GenerationConfig,
    ) -> StoryloomResult<Self> {
        config.validate()?;
        let system_instruction =
            render_system_instruction(system_prompt.as_ref(), *config.target_scenelets_per_path());
        let options = JsonGenerationOptions {
            timeout_ms: *config.timeout_ms(),
            thinking_budget: *config.thinking_budget(),
        };
        Ok(Self {
            model,
            repository,
            system_instruction,
            options,
            config,
        })
    }

    /// The persistence backend.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The model client.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Settings in effect.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Compute the resume plan of a story without generating anything.
    #[instrument(skip(self))]
    pub async fn plan(&self, story_id: &str) -> StoryloomResult<ResumeState> {
        let records = self.repository.list_scenelets_by_story(story_id).await?;
        Ok(plan_resume(story_id, &records)?)
    }

    /// Expand a story until no open tasks remain.
    ///
    /// A fresh run requires the story to be empty. A resume run starts from
    /// the plan of the persisted tree, which for an empty story is the root
    /// task. Children of interrupted branch writes are deleted before the
    /// run starts.
    ///
    /// Failures of individual tasks land in the report; the returned error is
    /// reserved for problems that prevent the run from starting.
    ///
    /// # Errors
    ///
    /// * Validation error for a blank constitution
    /// * `StoryAlreadyStarted` for a fresh run on a non-empty story
    /// * Integrity error when the persisted tree cannot be resumed
    /// * Storage error when the tree cannot be read or repaired
    #[instrument(skip(self, constitution), fields(mode = %mode))]
    pub async fn generate(
        &self,
        story_id: &str,
        constitution: &str,
        mode: GenerationMode,
    ) -> StoryloomResult<GenerationReport> {
        let constitution = constitution.trim();
        if constitution.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::EmptyConstitution(
                story_id.to_string(),
            ))
            .into());
        }

        let initial = match mode {
            GenerationMode::Fresh => {
                if self.repository.has_scenelets_for_story(story_id).await? {
                    return Err(NarrativeError::new(NarrativeErrorKind::StoryAlreadyStarted(
                        story_id.to_string(),
                    ))
                    .into());
                }
                vec![GenerationTask::root(story_id)]
            }
            GenerationMode::Resume => {
                let plan = self.plan(story_id).await?;
                self.discard_interrupted(&plan.interrupted_branches).await?;
                plan.pending_tasks
            }
        };

        info!(
            initial_tasks = initial.len(),
            max_concurrency = self.config.max_concurrency(),
            "Starting story generation"
        );
        let report = self.drive(constitution, initial).await;
        info!(
            tasks = report.tasks_processed,
            created = report.scenelets_created,
            failures = report.failures.len(),
            aborted = report.aborted,
            "Story generation finished"
        );
        Ok(report)
    }

    /// Delete the leftovers of branch writes that never reached their parent
    /// flag, so the regenerated parent starts without children.
    async fn discard_interrupted(&self, interrupted: &[InterruptedBranch]) -> StoryloomResult<()> {
        for branch in interrupted {
            warn!(
                parent = %branch.parent_scenelet_id,
                partial_children = branch.partial_children.len(),
                "Discarding children of interrupted branch"
            );
            self.repository
                .delete_scenelets(&branch.partial_children)
                .await?;
        }
        Ok(())
    }

    /// Run the frontier with at most `max_concurrency` tasks in flight.
    async fn drive(&self, constitution: &str, initial: Vec<GenerationTask>) -> GenerationReport {
        let max_concurrency = *self.config.max_concurrency();
        let mut queue: VecDeque<GenerationTask> = initial.into();
        let mut in_flight = FuturesUnordered::new();
        let mut report = GenerationReport::default();

        loop {
            while !report.aborted && in_flight.len() < max_concurrency {
                let Some(task) = queue.pop_front() else { break };
                in_flight.push(self.run_task(constitution, task));
            }

            let Some((parent, result)) = in_flight.next().await else {
                break;
            };
            report.tasks_processed += 1;

            match result {
                Ok(outcome) => {
                    debug!(
                        shape = %outcome.shape,
                        continuations = outcome.continuations.len(),
                        "Task completed"
                    );
                    report.record(&outcome);
                    queue.extend(outcome.continuations);
                }
                Err(e) => {
                    error!(parent = ?parent, error = %e, "Generation task failed");
                    report.failures.push(TaskFailure {
                        parent_scenelet_id: parent,
                        message: e.to_string(),
                    });
                    if !*self.config.continue_on_error() && !report.aborted {
                        warn!(
                            in_flight = in_flight.len(),
                            queued = queue.len(),
                            "Stopping after failure, draining in-flight tasks"
                        );
                        report.aborted = true;
                    }
                }
            }
        }

        report.tasks_remaining = queue.len();
        report
    }

    /// Process one task, tagging the result with the task's parent.
    async fn run_task(
        &self,
        constitution: &str,
        task: GenerationTask,
    ) -> (Option<SceneletId>, StoryloomResult<TaskOutcome>) {
        let parent = task.parent_scenelet_id().clone();
        (parent, self.process_task(constitution, task).await)
    }

    #[instrument(
        skip_all,
        fields(story_id = %task.story_id(), parent = ?task.parent_scenelet_id())
    )]
    async fn process_task(
        &self,
        constitution: &str,
        task: GenerationTask,
    ) -> StoryloomResult<TaskOutcome> {
        let length = task.path_context().len();
        let max = *self.config.max_path_length();
        if length >= max {
            let scenelet_id = task
                .parent_scenelet_id()
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(NarrativeError::new(NarrativeErrorKind::PathLengthExceeded {
                scenelet_id,
                length,
                max,
            })
            .into());
        }

        let context = task.label();
        let user_content = assemble_prompt(constitution, task.path_context(), task.is_root())?;
        debug!(
            path_length = length,
            prompt_chars = user_content.len(),
            "Requesting scenelet"
        );

        let request = JsonGenerationRequest::builder()
            .system_instruction(self.system_instruction.as_str())
            .user_content(user_content)
            .build()
            .map_err(|e| NarrativeError::new(NarrativeErrorKind::ConfigurationError(e.to_string())))?;

        let text = self.model.generate_json(&request, &self.options).await?;
        let response = ScriptwriterResponse::parse(&text, &context)?;

        if task.is_root() && response.shape() == ResponseShape::Branch {
            return Err(ValidationError::response(
                context,
                "the opening scenelet cannot be a branch point",
            )
            .into());
        }

        self.persist(&task, response).await
    }

    /// Write a decoded response. Nothing is written before this point.
    async fn persist(
        &self,
        task: &GenerationTask,
        response: ScriptwriterResponse,
    ) -> StoryloomResult<TaskOutcome> {
        let shape = response.shape();
        let parent = task.parent_scenelet_id().clone();

        let outcome = match response {
            ScriptwriterResponse::Branch {
                choice_prompt,
                scenelets,
            } => {
                let children = scenelets
                    .into_iter()
                    .map(|content| {
                        let choice_label = content.choice_label.clone();
                        child_of(task, choice_label, content, false)
                    })
                    .collect();
                let created = self.repository.create_scenelets(children).await?;

                let mut branch_marked = false;
                if let Some(parent) = &parent {
                    self.repository
                        .mark_scenelet_as_branch_point(parent, &choice_prompt)
                        .await?;
                    branch_marked = true;
                }

                let continuations = created
                    .iter()
                    .map(|record| task.descend(record.id.clone(), &record.content))
                    .collect();
                TaskOutcome {
                    shape,
                    created,
                    branch_marked,
                    terminal_marked: false,
                    continuations,
                }
            }
            ScriptwriterResponse::Linear(content) => {
                let record = self
                    .repository
                    .create_scenelet(child_of(task, None, content, false))
                    .await?;
                let continuation = task.descend(record.id.clone(), &record.content);
                TaskOutcome {
                    shape,
                    created: vec![record],
                    branch_marked: false,
                    terminal_marked: false,
                    continuations: vec![continuation],
                }
            }
            ScriptwriterResponse::Concluding(content) => {
                let record = self
                    .repository
                    .create_scenelet(child_of(task, None, content, true))
                    .await?;
                TaskOutcome {
                    shape,
                    created: vec![record],
                    branch_marked: false,
                    terminal_marked: true,
                    continuations: Vec::new(),
                }
            }
        };

        info!(
            shape = %shape,
            created = outcome.created.len(),
            "Persisted scriptwriter response"
        );
        Ok(outcome)
    }
}

/// New scenelet below the task's parent.
fn child_of(
    task: &GenerationTask,
    choice_label_from_parent: Option<String>,
    content: ScriptwriterScenelet,
    is_terminal_node: bool,
) -> NewScenelet {
    NewScenelet {
        story_id: task.story_id().clone(),
        parent_id: task.parent_scenelet_id().clone(),
        choice_label_from_parent,
        content,
        is_terminal_node,
    }
}
