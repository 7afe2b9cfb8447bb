//! Absolute prim paths.

use std::fmt;

use crate::util::{Error, Result};

/// Absolute, slash-separated path to a prim, e.g. `/World/particles`.
///
/// The root is `/`. Segments are non-empty and contain no `/`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimPath(String);

impl PrimPath {
    /// The absolute root path.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and validate a path string.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path == "/" {
            return Ok(Self(path));
        }
        if !path.starts_with('/') || path.ends_with('/') {
            return Err(Error::InvalidPath(path));
        }
        if path[1..].split('/').any(|seg| seg.is_empty() || !is_valid_segment(seg)) {
            return Err(Error::InvalidPath(path));
        }
        Ok(Self(path))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Last segment, empty for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Parent path, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(pos) => Some(Self(self.0[..pos].to_string())),
            None => None,
        }
    }

    /// Append a child segment.
    pub fn child(&self, name: &str) -> Result<Self> {
        if name.is_empty() || !is_valid_segment(name) {
            return Err(Error::InvalidPath(format!("{}/{}", self.0, name)));
        }
        if self.is_root() {
            Ok(Self(format!("/{name}")))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// True if `self` equals `prefix` or lies beneath it.
    pub fn has_prefix(&self, prefix: &PrimPath) -> bool {
        if prefix.is_root() {
            return true;
        }
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0) && self.0.as_bytes()[prefix.0.len()] == b'/')
    }

    /// Ancestors from the top-most one down to the parent, root excluded.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut cur = self.parent();
        while let Some(p) = cur {
            if p.is_root() {
                break;
            }
            cur = p.parent();
            out.push(p);
        }
        out.reverse();
        out
    }
}

fn is_valid_segment(seg: &str) -> bool {
    seg.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimPath({})", self.0)
    }
}

impl TryFrom<&str> for PrimPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_validation() {
        assert!(PrimPath::new("/").is_ok());
        assert!(PrimPath::new("/World/pts_1").is_ok());
        assert!(PrimPath::new("World").is_err());
        assert!(PrimPath::new("/World/").is_err());
        assert!(PrimPath::new("/a//b").is_err());
        assert!(PrimPath::new("/a b").is_err());
    }

    #[test]
    fn test_path_navigation() {
        let p = PrimPath::new("/World/geo/pts").unwrap();
        assert_eq!(p.name(), "pts");
        assert_eq!(p.parent().unwrap().as_str(), "/World/geo");
        assert_eq!(PrimPath::new("/World").unwrap().parent(), Some(PrimPath::root()));
        assert_eq!(PrimPath::root().parent(), None);
        assert_eq!(PrimPath::root().child("a").unwrap().as_str(), "/a");
        assert_eq!(p.child("x").unwrap().as_str(), "/World/geo/pts/x");
        assert!(p.child("").is_err());

        let anc: Vec<_> = p.ancestors().iter().map(|a| a.to_string()).collect();
        assert_eq!(anc, vec!["/World", "/World/geo"]);
    }

    #[test]
    fn test_path_prefix() {
        let a = PrimPath::new("/World/geo").unwrap();
        assert!(PrimPath::new("/World/geo/pts").unwrap().has_prefix(&a));
        assert!(a.has_prefix(&a));
        assert!(!PrimPath::new("/World/geometry").unwrap().has_prefix(&a));
        assert!(a.has_prefix(&PrimPath::root()));
    }
}
