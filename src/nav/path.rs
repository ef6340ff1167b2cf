//! Absolute paths with an explicit root descriptor
//!
//! A [`NavPath`] is decided once at parse time to be either a drive path
//! (`C:\Music`) or a tree path (`/home/user/Music`). Everything downstream
//! works on the tagged root instead of re-inspecting string prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::NavError;

/// Root of an absolute path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    /// Volume root such as `C:\`. The letter is stored upper-case.
    Drive(char),
    /// POSIX-style `/`
    Tree,
}

impl Root {
    /// Separator used when joining components under this root
    pub fn separator(self) -> char {
        match self {
            Root::Drive(_) => '\\',
            Root::Tree => '/',
        }
    }

    /// Breadcrumb label for the root segment (`C:` or `/`)
    pub fn label(self) -> String {
        match self {
            Root::Drive(letter) => format!("{letter}:"),
            Root::Tree => "/".to_string(),
        }
    }

    /// Resolvable form of the root, always separator-terminated
    pub fn render(self) -> String {
        match self {
            Root::Drive(letter) => format!("{letter}:\\"),
            Root::Tree => "/".to_string(),
        }
    }
}

/// A normalized absolute path
///
/// Components never contain separators, `.` or `..`, and are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NavPath {
    root: Root,
    components: Vec<String>,
}

impl NavPath {
    /// Path consisting of the root only
    pub fn root(root: Root) -> Self {
        Self {
            root,
            components: Vec::new(),
        }
    }

    /// Root of the filesystem this build targets
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::root(Root::Drive('C'))
        } else {
            Self::root(Root::Tree)
        }
    }

    /// Parse and normalize an absolute path string
    ///
    /// Consecutive separators collapse, trailing separators are dropped,
    /// `.` is skipped and `..` pops the previous component (never past the
    /// root). Relative and drive-relative input is rejected.
    pub fn parse(input: &str) -> Result<Self, NavError> {
        let (root, rest) = match input.as_bytes() {
            [] => return Err(NavError::invalid(input, "empty path")),
            [letter, b':', rest @ ..] if letter.is_ascii_alphabetic() => {
                if let Some(first) = rest.first()
                    && !matches!(*first, b'\\' | b'/')
                {
                    return Err(NavError::invalid(input, "drive-relative path"));
                }
                (Root::Drive(letter.to_ascii_uppercase() as char), &input[2..])
            }
            [b'\\', b'\\', ..] => {
                return Err(NavError::invalid(input, "UNC share paths are not supported"));
            }
            [b'/', ..] => (Root::Tree, &input[1..]),
            _ => return Err(NavError::invalid(input, "path is not absolute")),
        };

        let is_drive = matches!(root, Root::Drive(_));
        let mut components: Vec<String> = Vec::new();
        for part in rest.split(|c: char| c == '/' || (is_drive && c == '\\')) {
            match part {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                name => components.push(name.to_string()),
            }
        }

        Ok(Self { root, components })
    }

    /// Convert a native path, which must be absolute and valid UTF-8
    pub fn from_native(path: &Path) -> Result<Self, NavError> {
        let text = path
            .to_str()
            .ok_or_else(|| NavError::invalid(&path.to_string_lossy(), "path is not valid UTF-8"))?;
        Self::parse(text)
    }

    /// Native path for filesystem calls
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(self.to_string())
    }

    pub fn root_kind(&self) -> Root {
        self.root
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of components below the root
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// Last component, `None` for the root
    pub fn file_name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Append a single component
    ///
    /// `name` is taken verbatim; callers pass names that came out of a
    /// directory listing or an existing path.
    pub fn join(&self, name: &str) -> Self {
        let mut components = self.components.clone();
        components.push(name.to_string());
        Self {
            root: self.root,
            components,
        }
    }

    /// Containing directory, `None` for the root
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.components.split_last()?;
        Some(Self {
            root: self.root,
            components: head.to_vec(),
        })
    }

    /// Prefix of this path holding the first `depth` components
    pub fn prefix(&self, depth: usize) -> Self {
        Self {
            root: self.root,
            components: self.components[..depth.min(self.components.len())].to_vec(),
        }
    }

    /// Whether `other` is this path or one of its ancestors
    pub fn starts_with(&self, other: &NavPath) -> bool {
        self.root == other.root && self.components.starts_with(&other.components)
    }
}

impl fmt::Display for NavPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root.render())?;
        let separator = self.root.separator();
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, "{separator}")?;
            }
            f.write_str(component)?;
        }
        Ok(())
    }
}

impl FromStr for NavPath {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NavPath {
    type Error = NavError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NavPath> for String {
    fn from(path: NavPath) -> Self {
        path.to_string()
    }
}
