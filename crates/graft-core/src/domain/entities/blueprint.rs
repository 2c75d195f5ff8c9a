//! The Blueprint aggregate: one unit of scaffolding as an ordered action list.

use serde::{Deserialize, Serialize};

use crate::domain::entities::action::Action;
use crate::domain::entities::common::RelativePath;
use crate::domain::error::DomainError;

// ============================================================================
// Blueprint - An Ordered, Declarative Mutation Plan
// ============================================================================

/// A declarative, ordered list of file mutations.
///
/// ## Invariants
///
/// 1. `id` is non-empty
/// 2. `name` is non-empty (human-readable display name)
/// 3. `actions` is non-empty (a blueprint must do something)
/// 4. Every action passes its own shape validation
///
/// ## Lifecycle
///
/// 1. **Definition:** Built via `BlueprintBuilder` or deserialized from JSON
/// 2. **Validation:** `validate()` ensures invariants before execution
/// 3. **Execution:** consumed read-only by `BlueprintExecutor`, once per run
///
/// Action order is execution order and is significant: later actions observe
/// content staged by earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Unique slug, e.g. `"react-router"`.
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Files that must be staged even when no action obviously targets them
    /// (e.g. a manifest a later blueprint in the same recipe will read).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contextual_files: Vec<RelativePath>,

    /// The mutations, in execution order.
    pub actions: Vec<Action>,
}

impl Blueprint {
    /// Start the builder pattern for fluent construction.
    ///
    /// # Example
    /// ```rust,ignore
    /// let blueprint = Blueprint::builder()
    ///     .id("react-router")
    ///     .name("React Router")
    ///     .action(ActionKind::CreateFile { .. }.into())
    ///     .build()?;
    /// ```
    pub fn builder() -> BlueprintBuilder {
        BlueprintBuilder::default()
    }

    /// Validate all invariants.
    ///
    /// Call before execution; the blueprint loader validates at load time.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::InvalidBlueprint(
                "Blueprint id cannot be empty".into(),
            ));
        }

        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidBlueprint(
                "Blueprint name cannot be empty".into(),
            ));
        }

        if self.actions.is_empty() {
            return Err(DomainError::EmptyBlueprint {
                blueprint_id: self.id.clone(),
            });
        }

        for (index, action) in self.actions.iter().enumerate() {
            action.validate(index)?;
        }

        Ok(())
    }
}

/// Builder for constructing blueprints with validation.
///
/// All fields are optional during construction, but `build()` enforces the
/// invariants listed on [`Blueprint`].
#[derive(Default)]
pub struct BlueprintBuilder {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    contextual_files: Vec<RelativePath>,
    actions: Vec<Action>,
}

impl BlueprintBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Declare a contextual file (accumulates).
    pub fn contextual_file(mut self, path: impl Into<RelativePath>) -> Self {
        self.contextual_files.push(path.into());
        self
    }

    /// Add a single action (accumulates).
    pub fn action(mut self, action: impl Into<Action>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Set the entire action list at once (replaces any previous actions).
    pub fn actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Consume builder and construct a validated `Blueprint`.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if id/name not set
    /// - `EmptyBlueprint` if no actions were added
    /// - `InvalidAction` if any action fails shape validation
    pub fn build(self) -> Result<Blueprint, DomainError> {
        let blueprint = Blueprint {
            id: self
                .id
                .ok_or(DomainError::MissingRequiredField { field: "id" })?,
            name: self
                .name
                .ok_or(DomainError::MissingRequiredField { field: "name" })?,
            description: self.description,
            version: self.version,
            contextual_files: self.contextual_files,
            actions: self.actions,
        };
        blueprint.validate()?;
        Ok(blueprint)
    }
}
