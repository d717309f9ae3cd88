/// A resource collection exposed by the policy manager's config API.
///
/// Determines the API group and the collection segment of the canonical URL
/// `/configs/{group}/v1/tenant/{tenant}/{collection}[/{name}]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Security policies; rules are embedded in these documents.
    NetworkSecurityPolicies,
    /// IPsec tunnels.
    Tunnels,
    /// NAT policies (a list of NAT rules per document).
    NatPolicies,
    /// Roles carrying permission grants.
    Roles,
    /// Named address groups referenced from rules.
    IpCollections,
}

impl Collection {
    /// The API group the collection lives under.
    pub fn api_group(self) -> &'static str {
        match self {
            Self::NetworkSecurityPolicies => "security",
            Self::Tunnels | Self::NatPolicies | Self::IpCollections => "network",
            Self::Roles => "auth",
        }
    }

    /// The collection segment of the URL.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::NetworkSecurityPolicies => "networksecuritypolicies",
            Self::Tunnels => "tunnels",
            Self::NatPolicies => "natpolicies",
            Self::Roles => "roles",
            Self::IpCollections => "ipcollections",
        }
    }

    /// The API version segment.
    pub fn api_version(self) -> &'static str {
        "v1"
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;

    #[test]
    fn groups_match_the_config_api_layout() {
        assert_eq!(Collection::NetworkSecurityPolicies.api_group(), "security");
        assert_eq!(Collection::Tunnels.api_group(), "network");
        assert_eq!(Collection::NatPolicies.api_group(), "network");
        assert_eq!(Collection::Roles.api_group(), "auth");
        assert_eq!(Collection::IpCollections.path_segment(), "ipcollections");
    }
}
