// ── Entity expanders ──
//
// Desired state → wire documents. Pure functions over already validated
// records; nothing here touches the network.

use psm_api::types::{
    AddressCollection, Identifier, IkeSa, IpCollection, IpCollectionSpec, IpsecSa, Lifetime,
    NatPolicy, NatPolicySpec, NatRule, NetworkSecurityPolicy, ObjectMeta, Permission, ProtoPort,
    Role, RoleSpec, RuleDetail, SecurityPolicySpec, Tunnel, TunnelEndpoint, TunnelSpec,
};

use crate::convert::{non_empty_opt, set_to_list};
use crate::model::{
    ALL_NAMESPACES, AddressBlock, AuthType, EndpointConfig, IdentifierConfig, IkeSaConfig,
    IpCollectionConfig, IpsecSaConfig, LifetimeConfig, NatPolicyConfig, NatRuleConfig,
    PermissionConfig, PolicyConfig, ProtoPortConfig, RoleConfig, RuleEntryConfig, STATIC_NAT,
    TunnelBlock, TunnelConfig,
};

// ── Shared pieces ───────────────────────────────────────────────────

fn address_collection(block: Option<&AddressBlock>) -> AddressCollection {
    let block = block.cloned().unwrap_or_default();
    AddressCollection::new(block.addresses, block.ip_collections)
}

/// `None` when neither lifetime is set, so an empty block is never sent.
fn lifetime(config: &LifetimeConfig) -> Option<Lifetime> {
    let sa_lifetime = non_empty_opt(config.sa_lifetime.as_deref());
    let ike_lifetime = non_empty_opt(config.ike_lifetime.as_deref());
    (sa_lifetime.is_some() || ike_lifetime.is_some()).then_some(Lifetime {
        sa_lifetime,
        ike_lifetime,
    })
}

// ── Security policies ───────────────────────────────────────────────

pub fn expand_rule_entry(entry: &RuleEntryConfig) -> RuleDetail {
    let from = entry.from.clone().unwrap_or_default();
    let to = entry.to.clone().unwrap_or_default();
    RuleDetail {
        name: entry.name.clone(),
        description: entry.description.clone(),
        action: entry.action.clone(),
        apps: entry.apps.clone(),
        from_ip_collections: from.ip_collections,
        to_ip_collections: to.ip_collections,
        from_ip_addresses: from.addresses,
        to_ip_addresses: to.addresses,
        disable: entry.disable,
    }
}

pub fn expand_policy(config: &PolicyConfig) -> NetworkSecurityPolicy {
    NetworkSecurityPolicy::new(
        ObjectMeta::new(&config.name, &config.tenant, &config.namespace),
        SecurityPolicySpec {
            attach_tenant: config.attach_tenant,
            rules: config.rules.iter().map(expand_rule_entry).collect(),
            priority: None,
            policy_distribution_targets: set_to_list(&config.policy_distribution_targets),
        },
    )
}

// ── Tunnels ─────────────────────────────────────────────────────────

pub fn expand_tunnel(config: &TunnelConfig) -> Tunnel {
    let spec = config.tunnel.as_ref().map(expand_tunnel_spec).unwrap_or_default();
    Tunnel::new(
        ObjectMeta::new(&config.name, &config.tenant, &config.namespace),
        spec,
    )
}

fn expand_tunnel_spec(block: &TunnelBlock) -> TunnelSpec {
    TunnelSpec {
        ha_mode: block.ha_mode.clone(),
        tunnel_endpoints: block.tunnel_endpoints.iter().map(expand_endpoint).collect(),
        policy_distribution_targets: block.policy_distribution_targets.clone(),
        disable_tcp_mss_adjust: block.disable_tcp_mss_adjust,
        config: block.lifetime.as_ref().and_then(lifetime),
    }
}

fn expand_endpoint(endpoint: &EndpointConfig) -> TunnelEndpoint {
    TunnelEndpoint {
        interface_name: endpoint.interface_name.clone(),
        dse: endpoint.dse.clone(),
        ike_version: endpoint.ike_version.clone(),
        ike_sa: endpoint.ike_sa.as_ref().map(expand_ike_sa),
        ipsec_sa: endpoint.ipsec_sa.as_ref().map(expand_ipsec_sa),
        local_identifier: expand_identifier(endpoint.local_identifier.as_ref()),
        remote_identifier: expand_identifier(endpoint.remote_identifier.as_ref()),
        lifetime: endpoint.lifetime.as_ref().and_then(lifetime),
    }
}

fn expand_ike_sa(sa: &IkeSaConfig) -> IkeSa {
    let certificates = sa.auth_type == AuthType::Certificates.as_ref();
    IkeSa {
        encryption_algorithms: sa.encryption_algorithms.clone(),
        hash_algorithms: sa.hash_algorithms.clone(),
        dh_groups: sa.dh_groups.clone(),
        rekey_lifetime: sa.rekey_lifetime.clone(),
        pre_shared_key: non_empty_opt(sa.pre_shared_key.as_deref()),
        reauth_lifetime: sa.reauth_lifetime.clone(),
        dpd_delay: sa.dpd_delay.clone(),
        ikev1_dpd_timeout: sa.ikev1_dpd_timeout.clone(),
        ike_initiator: sa.ike_initiator,
        auth_type: sa.auth_type.clone(),
        local_identity_certificates: if certificates {
            non_empty_opt(sa.local_identity_certificates.as_deref())
        } else {
            None
        },
        remote_ca_certificates: if certificates {
            sa.remote_ca_certificates.clone()
        } else {
            Vec::new()
        },
    }
}

fn expand_ipsec_sa(sa: &IpsecSaConfig) -> IpsecSa {
    IpsecSa {
        encryption_algorithms: sa.encryption_algorithms.clone(),
        dh_groups: sa.dh_groups.clone(),
        rekey_lifetime: sa.rekey_lifetime.clone(),
    }
}

fn expand_identifier(identifier: Option<&IdentifierConfig>) -> Identifier {
    identifier
        .map(|id| Identifier {
            id_type: id.id_type.clone(),
            value: id.value.clone(),
        })
        .unwrap_or_default()
}

// ── NAT ─────────────────────────────────────────────────────────────

/// Build one NAT rule.
///
/// A static rule with a concrete destination and no declared translated
/// destination translates the destination to itself.
pub fn expand_nat_rule(rule: &NatRuleConfig) -> NatRule {
    let destination = address_collection(rule.destination.as_ref());

    let translated_destination = match &rule.translated_destination {
        Some(block) => Some(address_collection(Some(block))),
        None if rule.rule_type == STATIC_NAT && !destination.any => Some(destination.clone()),
        None => None,
    };

    NatRule {
        name: rule.name.clone(),
        disable: rule.disable,
        rule_type: rule.rule_type.clone(),
        source: address_collection(rule.source.as_ref()),
        destination,
        destination_proto_port: rule.destination_proto_port.as_ref().map(expand_proto_port),
        translated_source: rule
            .translated_source
            .as_ref()
            .map(|block| address_collection(Some(block))),
        translated_destination,
        translated_destination_port: non_empty_opt(rule.translated_destination_port.as_deref()),
    }
}

fn expand_proto_port(proto_port: &ProtoPortConfig) -> ProtoPort {
    ProtoPort {
        protocol: proto_port.protocol.clone(),
        ports: non_empty_opt(proto_port.ports.as_deref()),
    }
}

pub fn expand_nat_policy(config: &NatPolicyConfig) -> NatPolicy {
    NatPolicy::new(
        ObjectMeta::new(&config.name, &config.tenant, &config.namespace),
        NatPolicySpec {
            rules: config.rules.iter().map(expand_nat_rule).collect(),
            policy_distribution_targets: config.policy_distribution_targets.clone(),
        },
    )
}

// ── Roles ───────────────────────────────────────────────────────────

/// Convert permissions, forcing every namespace to [`ALL_NAMESPACES`].
pub fn expand_permissions(permissions: &[PermissionConfig]) -> Vec<Permission> {
    permissions
        .iter()
        .map(|p| Permission {
            resource_group: p.resource_group.clone(),
            resource_kind: p.resource_kind.clone(),
            resource_namespace: ALL_NAMESPACES.to_owned(),
            actions: p.actions.clone(),
        })
        .collect()
}

pub fn expand_role(config: &RoleConfig) -> Role {
    Role::new(
        ObjectMeta::new(&config.name, &config.tenant, &config.namespace),
        RoleSpec {
            permissions: expand_permissions(&config.permissions),
        },
    )
}

// ── IP collections ──────────────────────────────────────────────────

pub fn expand_ip_collection(config: &IpCollectionConfig) -> IpCollection {
    IpCollection::new(
        ObjectMeta::new(&config.name, &config.tenant, &config.namespace),
        IpCollectionSpec {
            address_family: non_empty_opt(config.address_family.as_deref()),
            addresses: config.addresses.clone(),
            ip_collections: config.ip_collections.clone(),
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::validate::validate_nat_rules;

    fn static_rule() -> NatRuleConfig {
        NatRuleConfig {
            name: "web".into(),
            rule_type: "static".into(),
            source: Some(AddressBlock::from_collections(["inside"])),
            destination: Some(AddressBlock::from_addresses(["198.51.100.7"])),
            translated_source: Some(AddressBlock::from_addresses(["203.0.113.10"])),
            ..NatRuleConfig::default()
        }
    }

    // ── Rules ────────────────────────────────────────────────────────

    #[test]
    fn allow_ssh_rule_maps_collections() {
        let entry = RuleEntryConfig {
            name: "AllowSSH".into(),
            description: String::new(),
            action: "permit".into(),
            from: Some(AddressBlock::from_collections(["net1"])),
            to: Some(AddressBlock::from_collections(["net2"])),
            apps: vec!["SSH".into()],
            disable: None,
        };

        let value = serde_json::to_value(expand_rule_entry(&entry)).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "AllowSSH",
                "description": "",
                "action": "permit",
                "apps": ["SSH"],
                "from-ipcollections": ["net1"],
                "to-ipcollections": ["net2"],
                "from-ip-addresses": [],
                "to-ip-addresses": []
            })
        );
    }

    #[test]
    fn policy_carries_identity_and_sorted_targets() {
        let mut config = PolicyConfig::new("edge");
        config.policy_distribution_targets = ["b".to_owned(), "a".to_owned()].into();
        let doc = expand_policy(&config);
        assert_eq!(doc.kind, "NetworkSecurityPolicy");
        assert_eq!(doc.meta.tenant, "default");
        assert!(doc.spec.attach_tenant);
        assert_eq!(doc.spec.policy_distribution_targets, vec!["a", "b"]);
    }

    #[test]
    fn decoded_records_target_default_scope() {
        let policy: PolicyConfig = crate::decode_config(json!({ "name": "edge" })).unwrap();
        assert_eq!(policy, PolicyConfig::new("edge"));
        assert_eq!(expand_policy(&policy).spec.policy_distribution_targets, vec!["default"]);

        let nat: NatPolicyConfig = crate::decode_config(json!({ "name": "nat" })).unwrap();
        assert_eq!(expand_nat_policy(&nat).spec.policy_distribution_targets, vec!["default"]);

        let tunnel: TunnelConfig =
            crate::decode_config(json!({ "name": "to-dc", "tunnel": [{ "ha_mode": "no_ha" }] }))
                .unwrap();
        assert_eq!(tunnel.tunnel.as_ref().unwrap().policy_distribution_targets, vec!["default"]);
        assert_eq!(expand_tunnel(&tunnel).spec.policy_distribution_targets, vec!["default"]);
    }

    // ── NAT ──────────────────────────────────────────────────────────

    #[test]
    fn static_nat_infers_translated_destination() {
        let rule = expand_nat_rule(&static_rule());
        let translated = rule.translated_destination.unwrap();
        assert_eq!(translated.addresses, vec!["198.51.100.7"]);
        assert!(!translated.any);
        assert_eq!(rule.destination, translated);
    }

    #[test]
    fn declared_translated_destination_wins() {
        let mut config = static_rule();
        config.translated_destination = Some(AddressBlock::from_addresses(["10.1.1.7"]));
        let rule = expand_nat_rule(&config);
        assert_eq!(
            rule.translated_destination.unwrap().addresses,
            vec!["10.1.1.7"]
        );
    }

    #[test]
    fn no_inference_for_any_destination_or_dynamic_rules() {
        let mut config = static_rule();
        config.destination = None;
        let rule = expand_nat_rule(&config);
        assert!(rule.destination.any);
        assert!(rule.translated_destination.is_none());

        let mut config = static_rule();
        config.rule_type = "dynamic".into();
        assert!(expand_nat_rule(&config).translated_destination.is_none());
    }

    #[test]
    fn expanded_rule_stays_consistent_with_validator() {
        let config = static_rule();
        validate_nat_rules(std::slice::from_ref(&config)).unwrap();

        let rule = expand_nat_rule(&config);
        assert!(!rule.source.any);
        assert!(rule.translated_source.is_some() || rule.translated_destination.is_some());
        assert!(rule.translated_destination_port.is_none());
    }

    #[test]
    fn proto_port_drops_empty_ports() {
        let mut config = static_rule();
        config.destination_proto_port = Some(ProtoPortConfig {
            protocol: "tcp".into(),
            ports: Some(String::new()),
        });
        let rule = expand_nat_rule(&config);
        assert_eq!(
            rule.destination_proto_port,
            Some(ProtoPort {
                protocol: "tcp".into(),
                ports: None
            })
        );
    }

    // ── Tunnels ──────────────────────────────────────────────────────

    fn endpoint(auth_type: &str) -> EndpointConfig {
        EndpointConfig {
            interface_name: "ipsec0".into(),
            ike_sa: Some(IkeSaConfig {
                auth_type: auth_type.into(),
                pre_shared_key: Some("s3cret".into()),
                local_identity_certificates: Some("local-cert".into()),
                remote_ca_certificates: vec!["ca-1".into()],
                ..IkeSaConfig::default()
            }),
            lifetime: Some(LifetimeConfig {
                sa_lifetime: Some(String::new()),
                ike_lifetime: None,
            }),
            ..EndpointConfig::default()
        }
    }

    #[test]
    fn certificate_fields_only_for_certificate_auth() {
        let psk = expand_endpoint(&endpoint("psk")).ike_sa.unwrap();
        assert!(psk.local_identity_certificates.is_none());
        assert!(psk.remote_ca_certificates.is_empty());
        assert_eq!(psk.pre_shared_key.as_deref(), Some("s3cret"));

        let certs = expand_endpoint(&endpoint("certificates")).ike_sa.unwrap();
        assert_eq!(certs.local_identity_certificates.as_deref(), Some("local-cert"));
        assert_eq!(certs.remote_ca_certificates, vec!["ca-1"]);
    }

    #[test]
    fn empty_lifetimes_are_omitted() {
        assert!(expand_endpoint(&endpoint("psk")).lifetime.is_none());
    }

    #[test]
    fn tunnel_level_lifetime_goes_to_spec_config() {
        let config = TunnelConfig {
            name: "to-dc".into(),
            tenant: "default".into(),
            namespace: "default".into(),
            tunnel: Some(TunnelBlock {
                ha_mode: "no_ha".into(),
                lifetime: Some(LifetimeConfig {
                    sa_lifetime: Some("3600s".into()),
                    ike_lifetime: Some("28800s".into()),
                }),
                ..TunnelBlock::default()
            }),
        };
        let doc = expand_tunnel(&config);
        assert_eq!(
            doc.spec.config,
            Some(Lifetime {
                sa_lifetime: Some("3600s".into()),
                ike_lifetime: Some("28800s".into()),
            })
        );
    }

    // ── Roles ────────────────────────────────────────────────────────

    #[test]
    fn permission_namespace_is_normalized() {
        let permissions = [PermissionConfig {
            resource_group: "network".into(),
            resource_kind: "Tunnel".into(),
            resource_namespace: Some("prod".into()),
            actions: vec!["read".into()],
        }];
        let expanded = expand_permissions(&permissions);
        assert_eq!(expanded[0].resource_namespace, "*_ALL_*");
        assert_eq!(expanded[0].actions, vec!["read"]);
    }
}
