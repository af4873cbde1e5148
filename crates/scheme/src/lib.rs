//! Group/Version/Kind identity model: dotted-string parsing, composite keys,
//! and resolution of the best concrete Kind for an abstract Group/Version.

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// The one hard parse failure in this crate; every dotted-identity parse is
/// total because a missing separator is a valid "no group" state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized GroupVersion string")]
    UnrecognizedGroupVersion,
}

/// Minimal identity of a resource type. An empty group is the core group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

impl GroupResource {
    pub fn with_version(&self, version: impl Into<String>) -> GroupVersionResource {
        GroupVersionResource {
            group: self.group.clone(),
            version: version.into(),
            resource: self.resource.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.resource.is_empty()
    }
}

impl fmt::Display for GroupResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.resource)
        } else {
            write!(f, "{}.{}", self.resource, self.group)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn group_resource(&self) -> GroupResource {
        GroupResource { group: self.group.clone(), resource: self.resource.clone() }
    }

    pub fn group_version(&self) -> GroupVersion {
        GroupVersion { group: self.group.clone(), version: self.version.clone() }
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.version.is_empty() && self.resource.is_empty()
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Resource:{}", self.group, self.version, self.resource)
    }
}

/// Same shape as [`GroupResource`] but for Kind identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn with_version(&self, version: impl Into<String>) -> GroupVersionKind {
        GroupVersionKind {
            group: self.group.clone(),
            version: version.into(),
            kind: self.kind.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.kind.is_empty()
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.group)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn group_kind(&self) -> GroupKind {
        GroupKind { group: self.group.clone(), kind: self.kind.clone() }
    }

    pub fn group_version(&self) -> GroupVersion {
        GroupVersion { group: self.group.clone(), version: self.version.clone() }
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.version.is_empty() && self.kind.is_empty()
    }

    /// Serialize back into the `apiVersion`/`kind` string pair.
    pub fn to_api_version_and_kind(&self) -> (String, String) {
        (self.group_version().to_string(), self.kind.clone())
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Kind:{}", self.group, self.version, self.kind)
    }
}

/// An API family plus version; can be qualified into a concrete Kind or
/// Resource identity by supplying the missing name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl GroupVersion {
    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.version.is_empty()
    }

    pub fn identifier(&self) -> String {
        self.to_string()
    }

    pub fn with_kind(&self, kind: impl Into<String>) -> GroupVersionKind {
        GroupVersionKind {
            group: self.group.clone(),
            version: self.version.clone(),
            kind: kind.into(),
        }
    }

    pub fn with_resource(&self, resource: impl Into<String>) -> GroupVersionResource {
        GroupVersionResource {
            group: self.group.clone(),
            version: self.version.clone(),
            resource: resource.into(),
        }
    }

    /// Resolve the concrete Kind this GroupVersion should use from a
    /// candidate list. Exact group+version matches win; failing that, a
    /// group-only match is coerced into this version (the candidate's own
    /// version is discarded, its kind preserved).
    pub fn kind_for(&self, gvks: &[GroupVersionKind]) -> Option<GroupVersionKind> {
        for gvk in gvks {
            if gvk.group == self.group && gvk.version == self.version {
                return Some(gvk.clone());
            }
        }

        for gvk in gvks {
            if gvk.group == self.group {
                return Some(self.with_kind(&gvk.kind));
            }
        }

        None
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.version)
    }
}

/// Ordered, preference-ranked sequence of [`GroupVersion`] (earlier = higher
/// priority).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersions(pub Vec<GroupVersion>);

impl GroupVersions {
    pub fn identifier(&self) -> String {
        self.to_string()
    }

    /// Run single-GroupVersion resolution over every preference in order,
    /// then tie-break multiple hits with [`best_match`].
    pub fn kind_for(&self, gvks: &[GroupVersionKind]) -> Option<GroupVersionKind> {
        let mut targets = Vec::new();

        for gv in &self.0 {
            if let Some(target) = gv.kind_for(gvks) {
                targets.push(target);
            }
        }

        if targets.len() == 1 {
            return targets.into_iter().next();
        }

        if targets.len() > 1 {
            return best_match(gvks, &targets);
        }

        None
    }
}

impl fmt::Display for GroupVersions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, gv) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{gv}")?;
        }
        f.write_str("]")
    }
}

/// Tie-break for multi-preference resolution: scan `gvks` (the caller's
/// declared candidate list) in order and return the first one that appears
/// among `targets`. Candidate order is authoritative once multiple versions
/// are viable, not preference order. A coerced target never equals a
/// candidate (its group+version matched no candidate by construction), so
/// exact matches always outrank coerced ones here. `targets.first()` is a
/// fallback for targets not drawn from `gvks`.
pub fn best_match(
    gvks: &[GroupVersionKind],
    targets: &[GroupVersionKind],
) -> Option<GroupVersionKind> {
    for gvk in gvks {
        if targets.contains(gvk) {
            return Some(gvk.clone());
        }
    }

    targets.first().cloned()
}

/// Split `resource.group` on the first dot. No dot means core group.
pub fn parse_group_resource(gr: &str) -> GroupResource {
    match gr.split_once('.') {
        Some((resource, group)) => {
            GroupResource { group: group.to_string(), resource: resource.to_string() }
        }
        None => GroupResource { group: String::new(), resource: gr.to_string() },
    }
}

/// Split `kind.group` on the first dot. No dot means core group.
pub fn parse_group_kind(gk: &str) -> GroupKind {
    match gk.split_once('.') {
        Some((kind, group)) => GroupKind { group: group.to_string(), kind: kind.to_string() },
        None => GroupKind { group: String::new(), kind: gk.to_string() },
    }
}

/// Parse `resource.version.group`. The three-part form is only produced when
/// all three parts are present; the two-part [`GroupResource`] split is
/// always returned alongside, and callers pick whichever they need.
pub fn parse_group_version_resource(gvr: &str) -> (Option<GroupVersionResource>, GroupResource) {
    let parts: Vec<&str> = gvr.splitn(3, '.').collect();

    let gvr_parsed = match parts.as_slice() {
        [resource, version, group] => Some(GroupVersionResource {
            group: (*group).to_string(),
            version: (*version).to_string(),
            resource: (*resource).to_string(),
        }),
        _ => None,
    };

    (gvr_parsed, parse_group_resource(gvr))
}

/// Parse `kind.version.group`; identical structure to
/// [`parse_group_version_resource`].
pub fn parse_group_version_kind(gvk: &str) -> (Option<GroupVersionKind>, GroupKind) {
    let parts: Vec<&str> = gvk.splitn(3, '.').collect();

    let gvk_parsed = match parts.as_slice() {
        [kind, version, group] => Some(GroupVersionKind {
            group: (*group).to_string(),
            version: (*version).to_string(),
            kind: (*kind).to_string(),
        }),
        _ => None,
    };

    (gvk_parsed, parse_group_kind(gvk))
}

/// Parse a `group/version` string. Empty input and the literal `"/"` are the
/// valid "no identity" states; more than one slash is the only hard failure.
pub fn parse_group_version(gv: &str) -> Result<Option<GroupVersion>, ParseError> {
    if gv.is_empty() || gv == "/" {
        return Ok(None);
    }

    match gv.matches('/').count() {
        0 => Ok(Some(GroupVersion { group: String::new(), version: gv.to_string() })),
        1 => {
            let (group, version) = gv.split_once('/').unwrap_or((gv, ""));
            Ok(Some(GroupVersion { group: group.to_string(), version: version.to_string() }))
        }
        _ => Err(ParseError::UnrecognizedGroupVersion),
    }
}

/// Build a [`GroupVersionKind`] from stored `apiVersion`/`kind` strings.
/// An unparseable or empty apiVersion degrades to a kind-only identity.
pub fn from_api_version_and_kind(api_version: &str, kind: &str) -> GroupVersionKind {
    match parse_group_version(api_version) {
        Ok(Some(gv)) => gv.with_kind(kind),
        _ => GroupVersionKind { kind: kind.to_string(), ..Default::default() },
    }
}

/// Capability of carrying a rewritable type identity. Implemented by object
/// metadata that stores `apiVersion`/`kind` strings.
pub trait ObjectKind {
    fn set_group_version_kind(&mut self, gvk: &GroupVersionKind);
    fn group_version_kind(&self) -> Option<GroupVersionKind>;
}

/// Null-object [`ObjectKind`]: reports no identity and silently ignores sets.
/// Used where identity tracking is structurally required but semantically
/// absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyObjectKind;

impl ObjectKind for EmptyObjectKind {
    fn set_group_version_kind(&mut self, _gvk: &GroupVersionKind) {}

    fn group_version_kind(&self) -> Option<GroupVersionKind> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gvk(group: &str, version: &str, kind: &str) -> GroupVersionKind {
        GroupVersionKind {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn parse_group_resource_splits_on_first_dot() {
        let gr = parse_group_resource("deployments.apps");
        assert_eq!(gr.resource, "deployments");
        assert_eq!(gr.group, "apps");

        let gr = parse_group_resource("deployments");
        assert_eq!(gr.resource, "deployments");
        assert_eq!(gr.group, "");
        assert!(!gr.is_empty());
        assert!(parse_group_resource("").is_empty());
    }

    #[test]
    fn parse_gvr_three_parts_positional() {
        let (gvr, gr) = parse_group_version_resource("deployments.v1.apps.example.com");
        let gvr = gvr.unwrap();
        assert_eq!(gvr.resource, "deployments");
        assert_eq!(gvr.version, "v1");
        assert_eq!(gvr.group, "apps.example.com");

        // the two-part split is independent of the three-part result
        assert_eq!(gr.resource, "deployments");
        assert_eq!(gr.group, "v1.apps.example.com");
    }

    #[test]
    fn parse_gvr_two_parts_yields_no_gvr() {
        let (gvr, gr) = parse_group_version_resource("deployments.apps");
        assert!(gvr.is_none());
        assert_eq!(gr.resource, "deployments");
        assert_eq!(gr.group, "apps");
    }

    #[test]
    fn parse_gvk_mirrors_gvr() {
        let (parsed, gk) = parse_group_version_kind("Deployment.v1.apps");
        assert_eq!(parsed, Some(gvk("apps", "v1", "Deployment")));
        assert_eq!(gk.kind, "Deployment");
        assert_eq!(gk.group, "v1.apps");
    }

    #[test]
    fn parse_group_version_edge_cases() {
        assert_eq!(parse_group_version(""), Ok(None));
        assert_eq!(parse_group_version("/"), Ok(None));
        assert_eq!(
            parse_group_version("v1"),
            Ok(Some(GroupVersion { group: String::new(), version: "v1".to_string() }))
        );
        assert_eq!(
            parse_group_version("apps/v1"),
            Ok(Some(GroupVersion { group: "apps".to_string(), version: "v1".to_string() }))
        );
        assert_eq!(parse_group_version("a/b/c"), Err(ParseError::UnrecognizedGroupVersion));
    }

    #[test]
    fn display_forms() {
        assert_eq!(parse_group_resource("deployments.apps").to_string(), "deployments.apps");
        assert_eq!(parse_group_resource("pods").to_string(), "pods");
        assert_eq!(gvk("apps", "v1", "Deployment").to_string(), "apps/v1, Kind:Deployment");
        assert_eq!(
            GroupVersion { group: "apps".into(), version: "v1".into() }.to_string(),
            "apps/v1"
        );
        let gvs = GroupVersions(vec![
            GroupVersion { group: "a".into(), version: "1".into() },
            GroupVersion { group: "a".into(), version: "2".into() },
        ]);
        assert_eq!(gvs.to_string(), "[a/1, a/2]");
        assert_eq!(gvs.identifier(), gvs.to_string());
    }

    #[test]
    fn kind_for_prefers_exact_version() {
        let gv = GroupVersion { group: "apps".into(), version: "v1".into() };
        let candidates = vec![gvk("apps", "v1", "Deployment"), gvk("apps", "v1beta1", "Deployment")];
        assert_eq!(gv.kind_for(&candidates), Some(gvk("apps", "v1", "Deployment")));
    }

    #[test]
    fn kind_for_coerces_version_on_group_match() {
        let gv = GroupVersion { group: "apps".into(), version: "v2".into() };
        let candidates = vec![gvk("apps", "v1", "Deployment")];
        // kind preserved, candidate's version discarded
        assert_eq!(gv.kind_for(&candidates), Some(gvk("apps", "v2", "Deployment")));
    }

    #[test]
    fn kind_for_no_group_match() {
        let gv = GroupVersion { group: "batch".into(), version: "v1".into() };
        assert_eq!(gv.kind_for(&[gvk("apps", "v1", "Deployment")]), None);
    }

    #[test]
    fn group_versions_tie_break_follows_candidate_order() {
        // both preferences match exactly; the target listed first among the
        // candidates wins even though it is second in preference order
        let gvs = GroupVersions(vec![
            GroupVersion { group: "apps".into(), version: "v2".into() },
            GroupVersion { group: "apps".into(), version: "v1".into() },
        ]);
        let candidates = vec![gvk("apps", "v1", "Deployment"), gvk("apps", "v2", "Deployment")];
        assert_eq!(gvs.kind_for(&candidates), Some(gvk("apps", "v1", "Deployment")));
    }

    #[test]
    fn group_versions_single_target() {
        let gvs = GroupVersions(vec![
            GroupVersion { group: "batch".into(), version: "v1".into() },
            GroupVersion { group: "apps".into(), version: "v1".into() },
        ]);
        let candidates = vec![gvk("apps", "v1", "Deployment")];
        assert_eq!(gvs.kind_for(&candidates), Some(gvk("apps", "v1", "Deployment")));
    }

    #[test]
    fn group_versions_no_target() {
        let gvs = GroupVersions(vec![GroupVersion { group: "batch".into(), version: "v1".into() }]);
        assert_eq!(gvs.kind_for(&[gvk("apps", "v1", "Deployment")]), None);
    }

    #[test]
    fn best_match_coerced_targets_fall_back_to_preference_order() {
        // every target is coerced, so none equals a candidate; the first
        // target (highest preference) is returned
        let candidates = vec![gvk("apps", "v1", "Deployment")];
        let targets = vec![gvk("apps", "v3", "Deployment"), gvk("apps", "v2", "Deployment")];
        assert_eq!(best_match(&candidates, &targets), Some(gvk("apps", "v3", "Deployment")));
        assert_eq!(best_match(&candidates, &[]), None);
    }

    #[test]
    fn api_version_round_trip() {
        let identity = gvk("apps", "v1", "Deployment");
        let (api_version, kind) = identity.to_api_version_and_kind();
        assert_eq!(api_version, "apps/v1");
        assert_eq!(kind, "Deployment");
        assert_eq!(from_api_version_and_kind(&api_version, &kind), identity);

        // malformed apiVersion degrades to a kind-only identity
        let degraded = from_api_version_and_kind("a/b/c", "Deployment");
        assert_eq!(degraded, gvk("", "", "Deployment"));
        assert_eq!(from_api_version_and_kind("", "Deployment"), gvk("", "", "Deployment"));
    }

    #[test]
    fn qualification_and_derivation() {
        let gv = GroupVersion { group: "apps".into(), version: "v1".into() };
        let full = gv.with_resource("deployments");
        assert_eq!(full.to_string(), "apps/v1, Resource:deployments");
        assert_eq!(full.group_resource().to_string(), "deployments.apps");
        assert_eq!(full.group_version(), gv);

        let kinded = gv.with_kind("Deployment");
        assert_eq!(kinded.group_kind().with_version("v9"), gvk("apps", "v9", "Deployment"));
    }

    #[test]
    fn empty_object_kind_is_inert() {
        let mut empty = EmptyObjectKind;
        empty.set_group_version_kind(&gvk("apps", "v1", "Deployment"));
        assert_eq!(empty.group_version_kind(), None);
    }
}
