// ── Entity flatteners ──
//
// Wire documents + the previously stored record → desired state.
//
// The server never echoes some fields back (the pre-shared key) and may omit
// others (lifetimes, certificate references). For those, flattening applies
// `convert::prefer_fresh`: a non-empty server value wins, otherwise the stored
// value is carried forward. Tunnel endpoints are matched to stored endpoints
// by position; security and NAT rules by name.

use psm_api::types::{
    AddressCollection, Identifier, IkeSa, IpCollection, IpsecSa, Lifetime, NatPolicy, NatRule,
    NetworkSecurityPolicy, ObjectMeta, Permission, ProtoPort, Role, RuleDetail, Tunnel,
    TunnelEndpoint, TunnelSpec,
};

use crate::convert::{non_empty, prefer_fresh, string_set};
use crate::model::{
    AddressBlock, DEFAULT_SCOPE, EndpointConfig, IdentifierConfig, IkeSaConfig,
    IpCollectionConfig, IpsecSaConfig, LifetimeConfig, NatPolicyConfig, NatRuleConfig,
    PermissionConfig, PolicyConfig, ProtoPortConfig, RoleConfig, RuleConfig, RuleEntryConfig,
    STATIC_NAT, TunnelBlock, TunnelConfig,
};

// ── Shared pieces ───────────────────────────────────────────────────

/// `(name, tenant, namespace)` from server metadata, defaulting blanks.
fn identity(meta: &ObjectMeta) -> (String, String, String) {
    let scope = |value: &str| non_empty(value).unwrap_or_else(|| DEFAULT_SCOPE.to_owned());
    (meta.name.clone(), scope(&meta.tenant), scope(&meta.namespace))
}

/// `None` for a collection that carries nothing (an "any" match).
fn address_block(collection: &AddressCollection) -> Option<AddressBlock> {
    let block = AddressBlock {
        addresses: collection.addresses.clone(),
        ip_collections: collection.ip_collections.clone(),
    };
    (!block.is_any()).then_some(block)
}

/// Like [`address_block`] but keeps a declared-empty block declared.
fn declared_block(collection: &AddressCollection) -> AddressBlock {
    AddressBlock {
        addresses: collection.addresses.clone(),
        ip_collections: collection.ip_collections.clone(),
    }
}

fn merge_lifetime(
    fresh: Option<&Lifetime>,
    previous: Option<&LifetimeConfig>,
) -> Option<LifetimeConfig> {
    let sa_lifetime = prefer_fresh(
        fresh.and_then(|l| l.sa_lifetime.clone()),
        previous.and_then(|p| p.sa_lifetime.as_ref()),
    );
    let ike_lifetime = prefer_fresh(
        fresh.and_then(|l| l.ike_lifetime.clone()),
        previous.and_then(|p| p.ike_lifetime.as_ref()),
    );
    (sa_lifetime.is_some() || ike_lifetime.is_some()).then_some(LifetimeConfig {
        sa_lifetime,
        ike_lifetime,
    })
}

// ── Security policies ───────────────────────────────────────────────

/// Flatten one rule. `disable` is optional upstream, so a missing value
/// falls back to the stored one.
pub fn flatten_rule_detail(
    detail: &RuleDetail,
    previous: Option<&RuleEntryConfig>,
) -> RuleEntryConfig {
    let from = AddressCollection::new(
        detail.from_ip_addresses.clone(),
        detail.from_ip_collections.clone(),
    );
    let to = AddressCollection::new(
        detail.to_ip_addresses.clone(),
        detail.to_ip_collections.clone(),
    );
    RuleEntryConfig {
        name: detail.name.clone(),
        description: detail.description.clone(),
        action: detail.action.clone(),
        from: address_block(&from),
        to: address_block(&to),
        apps: detail.apps.clone(),
        disable: detail.disable.or_else(|| previous.and_then(|p| p.disable)),
    }
}

pub fn flatten_policy(
    policy: &NetworkSecurityPolicy,
    previous: Option<&PolicyConfig>,
) -> PolicyConfig {
    let (name, tenant, namespace) = identity(&policy.meta);
    let rules = policy
        .spec
        .rules
        .iter()
        .map(|detail| {
            let prior = previous.and_then(|p| p.rules.iter().find(|r| r.name == detail.name));
            flatten_rule_detail(detail, prior)
        })
        .collect();

    PolicyConfig {
        name,
        tenant,
        namespace,
        attach_tenant: policy.spec.attach_tenant,
        policy_distribution_targets: string_set(
            policy.spec.policy_distribution_targets.iter().cloned(),
        ),
        rules,
    }
}

/// Flatten the rule a [`RuleConfig`] manages out of its policy document.
///
/// Returns `None` when the policy no longer contains a rule of that name.
pub fn flatten_rule(policy: &NetworkSecurityPolicy, previous: &RuleConfig) -> Option<RuleConfig> {
    let detail = policy
        .spec
        .rules
        .iter()
        .find(|r| r.name == previous.rule.name)?;
    let (name, tenant, namespace) = identity(&policy.meta);

    Some(RuleConfig {
        policy: name,
        tenant,
        namespace,
        policy_distribution_target: previous.policy_distribution_target.clone(),
        rule: flatten_rule_detail(detail, Some(&previous.rule)),
    })
}

// ── Tunnels ─────────────────────────────────────────────────────────

pub fn flatten_tunnel(tunnel: &Tunnel, previous: Option<&TunnelConfig>) -> TunnelConfig {
    let (name, tenant, namespace) = identity(&tunnel.meta);
    let prior = previous.and_then(|p| p.tunnel.as_ref());
    // An empty spec is what an undeclared block expands to.
    let declared = prior.is_some() || tunnel.spec != TunnelSpec::default();
    TunnelConfig {
        name,
        tenant,
        namespace,
        tunnel: declared.then(|| flatten_tunnel_spec(&tunnel.spec, prior)),
    }
}

fn flatten_tunnel_spec(spec: &TunnelSpec, previous: Option<&TunnelBlock>) -> TunnelBlock {
    let tunnel_endpoints = spec
        .tunnel_endpoints
        .iter()
        .enumerate()
        .map(|(i, endpoint)| {
            flatten_endpoint(endpoint, previous.and_then(|p| p.tunnel_endpoints.get(i)))
        })
        .collect();

    TunnelBlock {
        ha_mode: spec.ha_mode.clone(),
        tunnel_endpoints,
        policy_distribution_targets: spec.policy_distribution_targets.clone(),
        disable_tcp_mss_adjust: spec.disable_tcp_mss_adjust,
        lifetime: merge_lifetime(
            spec.config.as_ref(),
            previous.and_then(|p| p.lifetime.as_ref()),
        ),
    }
}

fn flatten_endpoint(endpoint: &TunnelEndpoint, previous: Option<&EndpointConfig>) -> EndpointConfig {
    EndpointConfig {
        interface_name: endpoint.interface_name.clone(),
        dse: endpoint.dse.clone(),
        ike_version: endpoint.ike_version.clone(),
        ike_sa: endpoint
            .ike_sa
            .as_ref()
            .map(|sa| flatten_ike_sa(sa, previous.and_then(|p| p.ike_sa.as_ref()))),
        ipsec_sa: endpoint.ipsec_sa.as_ref().map(flatten_ipsec_sa),
        local_identifier: flatten_identifier(&endpoint.local_identifier),
        remote_identifier: flatten_identifier(&endpoint.remote_identifier),
        lifetime: merge_lifetime(
            endpoint.lifetime.as_ref(),
            previous.and_then(|p| p.lifetime.as_ref()),
        ),
    }
}

fn flatten_ike_sa(sa: &IkeSa, previous: Option<&IkeSaConfig>) -> IkeSaConfig {
    let fresh_cas = (!sa.remote_ca_certificates.is_empty()).then(|| sa.remote_ca_certificates.clone());
    IkeSaConfig {
        encryption_algorithms: sa.encryption_algorithms.clone(),
        hash_algorithms: sa.hash_algorithms.clone(),
        dh_groups: sa.dh_groups.clone(),
        rekey_lifetime: sa.rekey_lifetime.clone(),
        pre_shared_key: prefer_fresh(
            sa.pre_shared_key.clone(),
            previous.and_then(|p| p.pre_shared_key.as_ref()),
        ),
        reauth_lifetime: sa.reauth_lifetime.clone(),
        dpd_delay: sa.dpd_delay.clone(),
        ikev1_dpd_timeout: sa.ikev1_dpd_timeout.clone(),
        ike_initiator: sa.ike_initiator,
        auth_type: sa.auth_type.clone(),
        local_identity_certificates: prefer_fresh(
            sa.local_identity_certificates.clone(),
            previous.and_then(|p| p.local_identity_certificates.as_ref()),
        ),
        remote_ca_certificates: prefer_fresh(
            fresh_cas,
            previous.map(|p| &p.remote_ca_certificates),
        )
        .unwrap_or_default(),
    }
}

fn flatten_ipsec_sa(sa: &IpsecSa) -> IpsecSaConfig {
    IpsecSaConfig {
        encryption_algorithms: sa.encryption_algorithms.clone(),
        dh_groups: sa.dh_groups.clone(),
        rekey_lifetime: sa.rekey_lifetime.clone(),
    }
}

fn flatten_identifier(identifier: &Identifier) -> Option<IdentifierConfig> {
    if identifier.id_type.is_empty() && identifier.value.is_empty() {
        return None;
    }
    Some(IdentifierConfig {
        id_type: identifier.id_type.clone(),
        value: identifier.value.clone(),
    })
}

// ── NAT ─────────────────────────────────────────────────────────────

pub fn flatten_nat_policy(policy: &NatPolicy, previous: Option<&NatPolicyConfig>) -> NatPolicyConfig {
    let (name, tenant, namespace) = identity(&policy.meta);
    let rules = policy
        .spec
        .rules
        .iter()
        .map(|rule| {
            let prior = previous.and_then(|p| p.rules.iter().find(|r| r.name == rule.name));
            flatten_nat_rule(rule, previous.is_some(), prior)
        })
        .collect();

    NatPolicyConfig {
        name,
        tenant,
        namespace,
        policy_distribution_targets: policy.spec.policy_distribution_targets.clone(),
        rules,
    }
}

/// Flatten one NAT rule.
///
/// A translated destination that is just the inferred static default is not
/// surfaced when a stored record exists and did not declare one; otherwise
/// the next expansion would see a diff the user never wrote.
fn flatten_nat_rule(rule: &NatRule, has_snapshot: bool, previous: Option<&NatRuleConfig>) -> NatRuleConfig {
    let destination = address_block(&rule.destination);

    let inferred = rule.rule_type == STATIC_NAT
        && destination.is_some()
        && rule.translated_destination.as_ref().is_some_and(|t| {
            t.addresses == rule.destination.addresses
                && t.ip_collections == rule.destination.ip_collections
        });
    let declared_before = previous.is_some_and(|p| p.translated_destination.is_some());
    let translated_destination = if inferred && has_snapshot && !declared_before {
        None
    } else {
        rule.translated_destination.as_ref().map(declared_block)
    };

    NatRuleConfig {
        name: rule.name.clone(),
        rule_type: rule.rule_type.clone(),
        disable: rule.disable,
        source: address_block(&rule.source),
        destination,
        destination_proto_port: rule
            .destination_proto_port
            .as_ref()
            .and_then(flatten_proto_port),
        translated_source: rule.translated_source.as_ref().map(declared_block),
        translated_destination,
        translated_destination_port: prefer_fresh(
            rule.translated_destination_port.clone(),
            previous.and_then(|p| p.translated_destination_port.as_ref()),
        ),
    }
}

fn flatten_proto_port(proto_port: &ProtoPort) -> Option<ProtoPortConfig> {
    non_empty(&proto_port.protocol).map(|protocol| ProtoPortConfig {
        protocol,
        ports: proto_port.ports.clone(),
    })
}

// ── Roles ───────────────────────────────────────────────────────────

/// `resource_namespace` is never surfaced: it is always `*_ALL_*` upstream.
pub fn flatten_permissions(permissions: &[Permission]) -> Vec<PermissionConfig> {
    permissions
        .iter()
        .map(|p| PermissionConfig {
            resource_group: p.resource_group.clone(),
            resource_kind: p.resource_kind.clone(),
            resource_namespace: None,
            actions: p.actions.clone(),
        })
        .collect()
}

pub fn flatten_role(role: &Role) -> RoleConfig {
    let (name, tenant, namespace) = identity(&role.meta);
    RoleConfig {
        name,
        tenant,
        namespace,
        permissions: flatten_permissions(&role.spec.permissions),
    }
}

// ── IP collections ──────────────────────────────────────────────────

pub fn flatten_ip_collection(collection: &IpCollection) -> IpCollectionConfig {
    let (name, tenant, namespace) = identity(&collection.meta);
    IpCollectionConfig {
        name,
        tenant,
        namespace,
        address_family: collection.spec.address_family.clone(),
        addresses: collection.spec.addresses.clone(),
        ip_collections: collection.spec.ip_collections.clone(),
    }
}
