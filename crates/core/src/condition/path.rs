//! Document paths such as `building.rooms[0].size`.

use std::fmt;

use crate::value::{Item, Value};

/// One step of a document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Name(String),
    Index(usize),
}

/// A path to an attribute, possibly nested inside maps and lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    segments: Vec<PathSegment>,
}

impl AttributePath {
    /// Parses a dotted path with optional `[n]` list indexes.
    ///
    /// Parsing never fails: a part whose brackets are not well-formed indexes
    /// is kept as a literal attribute name. Use [`AttributePath::validate`]
    /// to reject empty names.
    pub fn parse(path: &str) -> Self {
        let segments = path.split('.').flat_map(parse_part).collect();
        Self { segments }
    }

    /// A top-level attribute whose name is taken literally, dots included.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Name(name.into())],
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the attribute name when the path is a single top-level name.
    pub fn top_level_name(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [PathSegment::Name(name)] => Some(name),
            _ => None,
        }
    }

    /// The first attribute name of the path.
    pub fn root(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Checks that every name segment is non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.root().is_none() {
            return Err(format!("attribute path '{self}' must start with a name"));
        }
        let has_empty_name = self
            .segments
            .iter()
            .any(|s| matches!(s, PathSegment::Name(name) if name.is_empty()));
        if has_empty_name {
            return Err(format!("attribute path '{self}' contains an empty name"));
        }
        Ok(())
    }

    /// Looks the path up in an item.
    pub fn resolve<'a>(&self, item: &'a Item) -> Option<&'a Value> {
        let mut segments = self.segments.iter();
        let mut current = match segments.next()? {
            PathSegment::Name(name) => item.get(name)?,
            PathSegment::Index(_) => return None,
        };
        for segment in segments {
            current = match (segment, current) {
                (PathSegment::Name(name), Value::M(map)) => map.get(name)?,
                (PathSegment::Index(idx), Value::L(list)) => list.get(*idx)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

fn parse_part(part: &str) -> Vec<PathSegment> {
    let Some(open) = part.find('[') else {
        return vec![PathSegment::Name(part.to_string())];
    };

    let (name, mut rest) = part.split_at(open);
    let mut segments = vec![PathSegment::Name(name.to_string())];
    while !rest.is_empty() {
        let index = rest
            .strip_prefix('[')
            .and_then(|r| r.split_once(']'))
            .and_then(|(digits, tail)| digits.parse::<usize>().ok().map(|idx| (idx, tail)));
        match index {
            Some((idx, tail)) => {
                segments.push(PathSegment::Index(idx));
                rest = tail;
            }
            None => return vec![PathSegment::Name(part.to_string())],
        }
    }
    segments
}

impl From<&str> for AttributePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for AttributePath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<&String> for AttributePath {
    fn from(path: &String) -> Self {
        Self::parse(path)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Name(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Name(name) => write!(f, ".{name}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}
