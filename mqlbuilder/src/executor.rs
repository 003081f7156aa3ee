//! The collaborator that runs a rendered pipeline against a database.

use bson::Document;
use std::fmt::Display;

/// Executor runs rendered pipeline stages and returns the result
/// documents in the order the backend produced them.
pub trait Executor {
    type Error: Display;

    fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, Self::Error>;
}

impl<E: Executor + ?Sized> Executor for &E {
    type Error = E::Error;

    fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, Self::Error> {
        (**self).aggregate(pipeline)
    }
}

#[cfg(feature = "mongodb")]
impl Executor for mongodb::sync::Collection<Document> {
    type Error = mongodb::error::Error;

    fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, Self::Error> {
        mongodb::sync::Collection::aggregate(self, pipeline, None)?.collect()
    }
}
