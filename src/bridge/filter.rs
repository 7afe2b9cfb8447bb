//! Pattern-based attribute selection.
//!
//! A pattern is a whitespace-separated list of glob tokens (`*`, `?`). A
//! token starting with `^` excludes what it matches. Tokens are evaluated in
//! order and the last matching one decides; a list holding only exclusions
//! starts from "everything matches".

use smallvec::SmallVec;

use crate::core::Ownership;
use crate::geom::{AttributeHandle, AttributeView};

use super::names;

/// One token of a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternRule {
    pub pattern: String,
    pub exclude: bool,
}

impl PatternRule {
    fn parse(token: &str) -> Self {
        match token.strip_prefix('^') {
            Some(rest) => Self { pattern: rest.to_string(), exclude: true },
            None => Self { pattern: token.to_string(), exclude: false },
        }
    }
}

type RuleList = SmallVec<[PatternRule; 8]>;

/// Per-ownership include/exclude rules plus the set of active ownerships.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeFilter {
    rules: [RuleList; 2],
    active: SmallVec<[Ownership; 2]>,
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self {
            rules: [RuleList::new(), RuleList::new()],
            active: SmallVec::from_slice(&Ownership::ALL),
        }
    }
}

#[inline]
fn slot(ownership: Ownership) -> usize {
    match ownership {
        Ownership::PerPoint => 0,
        Ownership::PerObject => 1,
    }
}

impl AttributeFilter {
    /// Filter with `pattern` applied to every ownership class.
    pub fn new(pattern: &str) -> Self {
        let mut filter = Self::default();
        for own in Ownership::ALL {
            filter.append_pattern(own, pattern);
        }
        filter
    }

    /// Append the tokens of `pattern` to the rules of one ownership class.
    pub fn append_pattern(&mut self, ownership: Ownership, pattern: &str) -> &mut Self {
        self.rules[slot(ownership)].extend(pattern.split_whitespace().map(PatternRule::parse));
        self
    }

    /// Restrict [`apply`](Self::apply) to the given ownership classes.
    pub fn set_active_owners(&mut self, owners: &[Ownership]) -> &mut Self {
        self.active = owners.iter().copied().collect();
        self
    }

    pub fn active_owners(&self) -> &[Ownership] {
        &self.active
    }

    pub fn rules(&self, ownership: Ownership) -> &[PatternRule] {
        &self.rules[slot(ownership)]
    }

    /// Whether `name` under `ownership` passes the rules.
    ///
    /// Canonical foreign channels never pass; they are mapped explicitly.
    pub fn matches(&self, ownership: Ownership, name: &str) -> bool {
        if names::is_reserved_foreign_name(name) {
            return false;
        }
        let rules = &self.rules[slot(ownership)];
        let mut matched = !rules.iter().any(|r| !r.exclude);
        for rule in rules {
            if glob_match(&rule.pattern, name) {
                matched = !rule.exclude;
            }
        }
        matched
    }

    /// Lazily yield the handles of `view` that pass the filter, active
    /// ownerships in order.
    pub fn apply<'a>(
        &'a self,
        view: &'a dyn AttributeView,
    ) -> impl Iterator<Item = AttributeHandle> + 'a {
        self.active.iter().flat_map(move |&own| {
            view.attributes(own)
                .into_iter()
                .filter(move |h| self.matches(own, &h.name))
        })
    }
}

/// Glob match with `*` (any run) and `?` (any one char).
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((sp, sn)) = star {
            // Let the last star swallow one more char.
            pi = sp + 1;
            ni = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{DataArray, PointCloud};
    use crate::util::Vec3;

    fn cloud() -> PointCloud {
        PointCloud::from_positions(&[Vec3::ZERO, Vec3::ONE])
            .with_point("N", DataArray::from_vec3(&[Vec3::Y, Vec3::Y]))
            .with_point("id", DataArray::from_i32(vec![1, 2]))
            .with_point("mass", DataArray::from_f32(vec![1.0, 2.0]))
            .with_point("rest_P", DataArray::from_vec3(&[Vec3::ZERO, Vec3::ONE]))
            .with_detail("name", DataArray::from_strings(vec!["a".into()]))
            .with_detail("Cd", DataArray::from_vec3(&[Vec3::X]))
    }

    fn names(filter: &AttributeFilter, pc: &PointCloud) -> Vec<String> {
        filter.apply(pc).map(|h| h.name).collect()
    }

    #[test]
    fn test_glob() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("m?ss", "mass"));
        assert!(glob_match("rest_*", "rest_P"));
        assert!(glob_match("*_P", "rest_P"));
        assert!(glob_match("a*b*c", "axxbyyc"));
        assert!(!glob_match("a*b*c", "axxbyy"));
        assert!(!glob_match("mass", "mass2"));
        assert!(!glob_match("m?ss", "ms"));
    }

    #[test]
    fn test_default_matches_all_but_canonical() {
        let f = AttributeFilter::default();
        assert_eq!(names(&f, &cloud()), vec!["id", "mass", "rest_P", "name"]);
    }

    #[test]
    fn test_exclusions_only() {
        let f = AttributeFilter::new("^id ^rest_*");
        assert_eq!(names(&f, &cloud()), vec!["mass", "name"]);
    }

    #[test]
    fn test_later_tokens_override() {
        let f = AttributeFilter::new("* ^m* mass");
        assert!(f.matches(Ownership::PerPoint, "mass"));
        assert!(!f.matches(Ownership::PerPoint, "mu"));

        let f = AttributeFilter::new("mass ^*");
        assert!(!f.matches(Ownership::PerPoint, "mass"));
    }

    #[test]
    fn test_inclusions_restrict() {
        let f = AttributeFilter::new("id");
        assert_eq!(names(&f, &cloud()), vec!["id"]);
        assert!(!AttributeFilter::new("").matches(Ownership::PerPoint, "P"));
    }

    #[test]
    fn test_per_owner_rules() {
        let mut f = AttributeFilter::default();
        f.append_pattern(Ownership::PerPoint, "^mass")
            .append_pattern(Ownership::PerObject, "^name");
        assert_eq!(names(&f, &cloud()), vec!["id", "rest_P"]);
        assert_eq!(f.rules(Ownership::PerPoint).len(), 1);
    }

    #[test]
    fn test_active_owners() {
        let mut f = AttributeFilter::default();
        f.set_active_owners(&[Ownership::PerObject]);
        assert_eq!(f.active_owners(), &[Ownership::PerObject]);
        assert_eq!(names(&f, &cloud()), vec!["name"]);
        f.set_active_owners(&[]);
        assert!(names(&f, &cloud()).is_empty());
    }
}
