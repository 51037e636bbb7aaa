//! Subdocument path parsing
//!
//! Paths address a location inside one JSON fragment: dot-separated
//! dictionary keys with bracketed array indices, e.g. `a.b[0].c[-1]`.
//! `-1` addresses the last element of an array. A path may begin with an
//! index (`[2].name`) when the fragment root is an array.
//!
//! Parsing is purely syntactic; whether the addressed location exists is
//! the evaluator's concern.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of components a path may carry.
pub const MAX_PATH_COMPONENTS: usize = 32;

/// One component of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    /// Dictionary key
    Key(String),
    /// Array index; negative counts from the end (`-1` = last)
    Index(i64),
}

/// Error cases for path parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string is empty
    #[error("empty path")]
    Empty,

    /// The path string violates the syntax
    #[error("invalid path syntax at byte {0}")]
    Syntax(usize),

    /// The path has more than [`MAX_PATH_COMPONENTS`] components
    #[error("path has {0} components, limit is {MAX_PATH_COMPONENTS}")]
    TooManyComponents(usize),
}

/// A parsed subdocument path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    components: Vec<PathComponent>,
}

impl Path {
    /// The parsed components, in order.
    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    /// The final component. Parsing rejects empty paths, so one always exists.
    pub fn last(&self) -> &PathComponent {
        &self.components[self.components.len() - 1]
    }

    /// Components up to (excluding) the final one.
    pub fn parent(&self) -> &[PathComponent] {
        &self.components[..self.components.len() - 1]
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let bytes = s.as_bytes();
        let mut components = Vec::new();
        let mut pos = 0;
        // A key is expected at the start and after every '.'; after ']' only
        // '.', '[' or end-of-string may follow.
        let mut expect_key = true;

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let close = s[pos + 1..]
                        .find(']')
                        .map(|off| pos + 1 + off)
                        .ok_or(PathError::Syntax(pos))?;
                    let index: i64 = s[pos + 1..close]
                        .parse()
                        .map_err(|_| PathError::Syntax(pos + 1))?;
                    components.push(PathComponent::Index(index));
                    pos = close + 1;
                    expect_key = false;
                    // After a bracket, a '.' introduces the next key.
                    if pos < bytes.len() && bytes[pos] == b'.' {
                        pos += 1;
                        expect_key = true;
                        if pos == bytes.len() {
                            return Err(PathError::Syntax(pos));
                        }
                    }
                }
                b'.' => return Err(PathError::Syntax(pos)),
                _ => {
                    if !expect_key {
                        return Err(PathError::Syntax(pos));
                    }
                    let end = bytes[pos..]
                        .iter()
                        .position(|&b| b == b'.' || b == b'[')
                        .map(|off| pos + off)
                        .unwrap_or(bytes.len());
                    if end == pos {
                        return Err(PathError::Syntax(pos));
                    }
                    components.push(PathComponent::Key(s[pos..end].to_string()));
                    if end < bytes.len() && bytes[end] == b'.' {
                        pos = end + 1;
                        expect_key = true;
                        if pos == bytes.len() {
                            return Err(PathError::Syntax(pos));
                        }
                    } else {
                        pos = end;
                        expect_key = false;
                    }
                }
            }
        }

        if components.len() > MAX_PATH_COMPONENTS {
            return Err(PathError::TooManyComponents(components.len()));
        }

        Ok(Path { components })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, comp) in self.components.iter().enumerate() {
            match comp {
                PathComponent::Key(k) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", k)?;
                }
                PathComponent::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}
