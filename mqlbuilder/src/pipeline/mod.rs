//! Ordered sequences of stages, with fluent construction and an optional
//! execution collaborator.

use crate::{
    error::{Error, Result},
    executor::Executor,
    expression::{Express, Expression},
    options::RenderOptions,
    stages::{
        AddFields, Bucket, BucketAuto, Count, FieldSelection, Group, Limit, Lookup, Match, Out,
        Project, ReplaceRoot, ReplaceWith, Sample, Set, Skip, Sort, SortByCount, Stage, UnionWith,
        Unset, Unwind,
    },
};
use bson::Document;
use std::sync::Arc;
use tracing::{debug, error, info};


/// The executor slot of a pipeline that can only be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detached;

/// Pipeline holds stages in the order they were appended. Rendering turns
/// each stage into its statement; nothing is reordered or merged.
#[derive(Debug, Clone)]
pub struct Pipeline<X = Detached> {
    executor: X,
    stages: Vec<Arc<dyn Stage>>,
    options: RenderOptions,
}

impl Default for Pipeline<Detached> {
    fn default() -> Self {
        Pipeline::new()
    }
}

impl Pipeline<Detached> {
    pub fn new() -> Self {
        Pipeline::on(Detached)
    }
}

impl<X> Pipeline<X> {
    /// Creates an empty pipeline that runs against `executor`.
    pub fn on(executor: X) -> Self {
        Pipeline {
            executor,
            stages: Vec::new(),
            options: RenderOptions::default(),
        }
    }

    /// Moves the stages onto another executor.
    pub fn with_executor<Y>(self, executor: Y) -> Pipeline<Y> {
        Pipeline {
            executor,
            stages: self.stages,
            options: self.options,
        }
    }

    pub fn with_options(self, options: RenderOptions) -> Self {
        Pipeline { options, ..self }
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn append<S: Stage + 'static>(self, stage: S) -> Self {
        self.append_shared(Arc::new(stage))
    }

    pub fn append_shared(mut self, stage: Arc<dyn Stage>) -> Self {
        self.push_shared(stage);
        self
    }

    pub fn push<S: Stage + 'static>(&mut self, stage: S) {
        self.push_shared(Arc::new(stage));
    }

    pub fn push_shared(&mut self, stage: Arc<dyn Stage>) {
        debug!(stage = stage.tag(), position = self.stages.len(), "appending stage");
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The statements of every stage, in order.
    pub fn render(&self) -> Result<Vec<Document>> {
        debug!(stages = self.stages.len(), "rendering pipeline");
        self.stages
            .iter()
            .map(|stage| stage.statement_with(&self.options))
            .collect()
    }

    /// The stages as expressions, for nesting inside `$lookup` or
    /// `$unionWith`.
    pub fn into_nodes(self) -> Vec<Expression> {
        self.stages
            .into_iter()
            .map(|stage| Expression::Node(stage.into_node()))
            .collect()
    }

    pub fn match_(self, query: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(Match::new(query)?))
    }

    pub fn project(self, projection: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(Project::new(projection)?))
    }

    pub fn project_fields(
        self,
        include: Option<FieldSelection>,
        exclude: Option<FieldSelection>,
    ) -> Result<Self> {
        Ok(self.append(Project::fields(include, exclude)?))
    }

    pub fn group(self, by: impl Into<Expression>, query: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(Group::new(by, query)?))
    }

    pub fn sort(self, query: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(Sort::new(query)?))
    }

    pub fn bucket<T: Into<Expression>>(
        self,
        group_by: impl Into<Expression>,
        boundaries: impl IntoIterator<Item = T>,
    ) -> Result<Self> {
        Ok(self.append(Bucket::new(group_by, boundaries)?))
    }

    pub fn bucket_auto(self, group_by: impl Into<Expression>, buckets: i64) -> Result<Self> {
        Ok(self.append(BucketAuto::new(group_by, buckets)?))
    }

    pub fn count(self, name: impl Into<String>) -> Result<Self> {
        Ok(self.append(Count::new(name)?))
    }

    pub fn limit(self, value: i64) -> Result<Self> {
        Ok(self.append(Limit::new(value)?))
    }

    pub fn skip(self, value: i64) -> Result<Self> {
        Ok(self.append(Skip::new(value)?))
    }

    pub fn sample(self, value: i64) -> Result<Self> {
        Ok(self.append(Sample::new(value)?))
    }

    pub fn replace_root(self, path: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(ReplaceRoot::new(path)?))
    }

    pub fn replace_with(self, replacement: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(ReplaceWith::new(replacement)?))
    }

    pub fn set(self, document: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(Set::new(document)?))
    }

    pub fn add_fields(self, document: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(AddFields::new(document)?))
    }

    pub fn unset<S: Into<String>>(self, fields: impl IntoIterator<Item = S>) -> Result<Self> {
        Ok(self.append(Unset::new(fields)?))
    }

    pub fn sort_by_count(self, by: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(SortByCount::new(by)?))
    }

    pub fn unwind(self, path: impl Into<Expression>) -> Result<Self> {
        Ok(self.append(Unwind::new(path)?))
    }

    pub fn lookup(
        self,
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Result<Self> {
        Ok(self.append(Lookup::new(from, local_field, foreign_field, as_field)?))
    }

    pub fn union_with(self, coll: impl Into<String>) -> Result<Self> {
        Ok(self.append(UnionWith::new(coll)?))
    }

    pub fn out(self, coll: impl Into<String>) -> Result<Self> {
        Ok(self.append(Out::new(coll)?))
    }
}

impl<X: Executor> Pipeline<X> {
    /// Renders the pipeline and hands it to the executor.
    pub fn run(&self) -> Result<Vec<Document>> {
        let statements = self.render()?;
        info!(stages = statements.len(), "running pipeline");
        let results = self.executor.aggregate(statements).map_err(|e| {
            error!(error = %e, "pipeline execution failed");
            Error::Execution(e.to_string())
        })?;
        info!(documents = results.len(), "pipeline finished");
        Ok(results)
    }
}
