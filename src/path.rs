//! Key paths addressing values inside a [`TreeNode`].
//!
//! A path is written as a chain of `.field` and `[index]` segments, e.g.
//! `[0].offers[2].price`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::tree::TreeNode;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Field(name) => write!(f, ".{name}"),
            PathStep::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Sequence of steps from a tree root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathStep>);

impl Path {
    #[must_use]
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }

    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    /// Number of steps, i.e. depth of the addressed node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// New path with `step` appended.
    #[must_use]
    pub fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    /// The first step, if it is a field name.
    #[must_use]
    pub fn first_field(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathStep::Field(name)) => Some(name),
            _ => None,
        }
    }

    /// Follow the path from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathResolution`] when a field is missing, an index is
    /// out of bounds, or a step descends into the wrong kind of node.
    pub fn resolve<'a>(&self, root: &'a TreeNode) -> Result<&'a TreeNode> {
        resolve_steps(root, &self.0)
    }
}

/// Follow `steps` from `root`.
///
/// # Errors
///
/// Returns [`Error::PathResolution`] on the first step that does not resolve.
pub fn resolve_steps<'a>(root: &'a TreeNode, steps: &[PathStep]) -> Result<&'a TreeNode> {
    steps.iter().try_fold(root, |node, step| match (step, node) {
        (PathStep::Field(name), TreeNode::Mapping(_)) => node
            .get(name)
            .ok_or_else(|| Error::PathResolution(format!("{name} is not in supplied tree"))),
        (PathStep::Index(i), TreeNode::Sequence(items)) => items.get(*i).ok_or_else(|| {
            Error::PathResolution(format!("array in tree does not have {} elements", i + 1))
        }),
        _ => Err(Error::PathResolution(format!("cannot apply {step} to this node"))),
    })
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|step| write!(f, "{step}"))
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Path {
    type Err = Error;

    /// Parse the `.field[index]` form.
    ///
    /// Field names end at the next `.` or `[`, so names containing those
    /// characters do not survive a display/parse round trip.
    fn from_str(s: &str) -> Result<Self> {
        let mut steps = Vec::new();
        let mut rest = s;
        while let Some(first) = rest.chars().next() {
            match first {
                '.' => {
                    let body = &rest[1..];
                    let end = body.find(['.', '[']).unwrap_or(body.len());
                    steps.push(PathStep::Field(body[..end].to_string()));
                    rest = &body[end..];
                }
                '[' => {
                    let close = rest
                        .find(']')
                        .ok_or_else(|| Error::PathResolution(format!("unclosed index in '{s}'")))?;
                    let index = rest[1..close]
                        .parse()
                        .map_err(|_| Error::PathResolution(format!("bad index in '{s}'")))?;
                    steps.push(PathStep::Index(index));
                    rest = &rest[close + 1..];
                }
                _ => {
                    return Err(Error::PathResolution(format!(
                        "path '{s}' must start steps with '.' or '['"
                    )))
                }
            }
        }
        Ok(Self(steps))
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }
}
