use bson::{Bson, Document};
use mqlbuilder::{operators, resolve, stages, Args, Error as BuildError, Express, Expression};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
enum Error {
    #[error("test `{test}` in {file}: expected {expected}, actual {actual}")]
    Mismatch {
        file: String,
        test: String,
        expected: String,
        actual: String,
    },
    #[error("test `{test}` in {file} names neither a stage nor an operator")]
    NoTarget { file: String, test: String },
    #[error("failed to read directory: {0}")]
    InvalidDirectory(String),
    #[error("failed to read file: {0}")]
    InvalidFile(String),
    #[error("unable to deserialize YAML file: {0}")]
    CannotDeserializeYaml(String),
}

#[derive(Debug, Deserialize)]
struct YamlTestFile {
    tests: Vec<YamlTest>,
}

#[derive(Debug, Deserialize)]
struct YamlTest {
    description: String,
    stage: Option<String>,
    operator: Option<String>,
    #[serde(default)]
    args: Document,
    result: Option<serde_json::Value>,
    error: Option<String>,
    skip_reason: Option<String>,
}

fn load_file_paths(dir: PathBuf) -> Result<Vec<PathBuf>, Error> {
    let mut paths = vec![];
    for entry in fs::read_dir(dir).map_err(|e| Error::InvalidDirectory(format!("{e:?}")))? {
        let path = entry
            .map_err(|e| Error::InvalidDirectory(format!("{e:?}")))?
            .path();
        if path.extension().is_some_and(|ext| ext == "yml") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn parse_yaml(path: &PathBuf) -> Result<YamlTestFile, Error> {
    let contents =
        fs::read_to_string(path).map_err(|e| Error::InvalidFile(format!("{e:?}")))?;
    serde_yaml::from_str(&contents).map_err(|e| Error::CannotDeserializeYaml(format!("{e:?}")))
}

fn error_kind(e: &BuildError) -> &'static str {
    match e {
        BuildError::MissingOperand { .. } => "MissingOperand",
        BuildError::InvalidOperand { .. } => "InvalidOperand",
        BuildError::UnexpectedField { .. } => "UnexpectedField",
        BuildError::CyclicExpression { .. } => "CyclicExpression",
        BuildError::Execution(_) => "Execution",
    }
}

fn build(test: &YamlTest, file: &str) -> Result<Result<Bson, BuildError>, Error> {
    let args: Args = test
        .args
        .clone()
        .into_iter()
        .map(|(k, v)| (k, Expression::from(v)))
        .collect();
    match (&test.stage, &test.operator) {
        (Some(tag), _) => Ok(stages::from_args(tag, args)
            .and_then(|stage| stage.statement())
            .map(Bson::Document)),
        (None, Some(tag)) => Ok(operators::from_args(tag, args).and_then(|expr| resolve(&expr))),
        (None, None) => Err(Error::NoTarget {
            file: file.to_string(),
            test: test.description.clone(),
        }),
    }
}

fn describe(outcome: Result<Bson, BuildError>) -> String {
    match outcome {
        Ok(b) => b.into_relaxed_extjson().to_string(),
        Err(e) => format!("{} ({e})", error_kind(&e)),
    }
}

#[test]
fn run_yaml_tests() -> Result<(), Error> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/spec_tests");
    for path in load_file_paths(dir)? {
        let file = path.display().to_string();
        let yaml = parse_yaml(&path)?;
        for test in yaml.tests {
            if test.skip_reason.is_some() {
                continue;
            }
            let outcome = build(&test, &file)?;
            let expected = match (&test.error, &test.result) {
                (Some(kind), _) => kind.clone(),
                (None, Some(result)) => result.to_string(),
                (None, None) => "null".to_string(),
            };
            let passed = match (&test.error, &outcome) {
                (Some(kind), Err(e)) => error_kind(e) == kind,
                (None, Ok(b)) => test.result.as_ref() == Some(&b.clone().into_relaxed_extjson()),
                _ => false,
            };
            if !passed {
                return Err(Error::Mismatch {
                    file,
                    test: test.description,
                    expected,
                    actual: describe(outcome),
                });
            }
        }
    }
    Ok(())
}
