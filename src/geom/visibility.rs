//! Visibility and purpose tokens.
//!
//! Imageable prims carry a `visibility` token that is either inherited from
//! the parent or explicitly invisible, and a uniform `purpose` token that
//! classifies the geometry for renderers.

use std::fmt;

/// Visibility attribute name.
pub const VISIBILITY_ATTR: &str = "visibility";
/// Purpose attribute name.
pub const PURPOSE_ATTR: &str = "purpose";
/// Foreign detail channel carrying the host's visibility flag.
pub const VISIBLE_CHANNEL: &str = "visible";

/// Prim visibility state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visibility is deferred to the parent.
    #[default]
    Inherited,
    /// Prim is explicitly hidden.
    Invisible,
}

impl Visibility {
    /// Parse from token. Anything but `invisible` reads as inherited.
    pub fn from_token(s: &str) -> Self {
        match s {
            "invisible" => Self::Invisible,
            _ => Self::Inherited,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Inherited => "inherited",
            Self::Invisible => "invisible",
        }
    }

    /// Map the host's integer flag: zero hides, anything else defers.
    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            Self::Invisible
        } else {
            Self::Inherited
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Render purpose of a prim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Purpose {
    #[default]
    Default,
    Render,
    Proxy,
    Guide,
}

impl Purpose {
    /// Parse from token. Unknown tokens read as default.
    pub fn from_token(s: &str) -> Self {
        match s {
            "render" => Self::Render,
            "proxy" => Self::Proxy,
            "guide" => Self::Guide,
            _ => Self::Default,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Render => "render",
            Self::Proxy => "proxy",
            Self::Guide => "guide",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_conversion() {
        assert_eq!(Visibility::from_flag(0), Visibility::Invisible);
        assert_eq!(Visibility::from_flag(1), Visibility::Inherited);
        assert_eq!(Visibility::from_flag(-1), Visibility::Inherited);

        assert_eq!(Visibility::from_token("invisible"), Visibility::Invisible);
        assert_eq!(Visibility::from_token("inherited"), Visibility::Inherited);
        assert_eq!(Visibility::from_token("whatever"), Visibility::Inherited);
    }

    #[test]
    fn test_purpose_tokens() {
        for p in [Purpose::Default, Purpose::Render, Purpose::Proxy, Purpose::Guide] {
            assert_eq!(Purpose::from_token(p.as_token()), p);
        }
        assert_eq!(Purpose::from_token(""), Purpose::Default);
    }
}
