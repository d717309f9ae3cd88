#![allow(clippy::unwrap_used)]
// Integration tests for resource operations against a mocked policy manager.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use psm_api::{PsmClient, TransportConfig};
use psm_core::model::{
    AddressBlock, EndpointConfig, IkeSaConfig, NatPolicyConfig, NatRuleConfig, PolicyConfig,
    RoleConfig, RuleConfig, RuleEntryConfig, TunnelBlock, TunnelConfig,
};
use psm_core::{CoreError, Reconciler, ResourceState, StateStore, ValidationError};

// ── Helpers ─────────────────────────────────────────────────────────

const POLICY_PATH: &str = "/configs/security/v1/tenant/default/networksecuritypolicies/edge";
const POLICY_UUID: &str = "6f1d2c4e-2b1a-4d9e-8c3f-5a7b9e0d1c2b";

async fn setup() -> (MockServer, Reconciler) {
    let server = MockServer::start().await;
    let session: SecretString = "sid-abc".to_string().into();
    let client = PsmClient::new(&server.uri(), &session, &TransportConfig::default()).unwrap();
    (server, Reconciler::new(client))
}

fn policy_body(rules: &Value) -> Value {
    json!({
        "kind": "NetworkSecurityPolicy",
        "api-version": "v1",
        "meta": {
            "name": "edge",
            "tenant": "default",
            "namespace": "default",
            "uuid": POLICY_UUID,
            "resource-version": "7"
        },
        "spec": {
            "attach-tenant": true,
            "rules": rules,
            "policy-distribution-targets": ["default"]
        }
    })
}

fn allow_ssh_wire() -> Value {
    json!({
        "name": "AllowSSH",
        "description": "",
        "action": "permit",
        "apps": ["SSH"],
        "from-ipcollections": ["net1"],
        "to-ipcollections": ["net2"],
        "from-ip-addresses": null,
        "to-ip-addresses": null
    })
}

fn allow_ssh_config(action: &str) -> RuleConfig {
    RuleConfig {
        policy: "edge".into(),
        tenant: "default".into(),
        namespace: "default".into(),
        policy_distribution_target: "default".into(),
        rule: RuleEntryConfig {
            name: "AllowSSH".into(),
            description: String::new(),
            action: action.into(),
            from: Some(AddressBlock::from_collections(["net1"])),
            to: Some(AddressBlock::from_collections(["net2"])),
            apps: vec!["SSH".into()],
            disable: None,
        },
    }
}

async fn put_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "PUT")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ── Embedded rules ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_rule_appends_and_reads_back() {
    let (server, reconciler) = setup().await;

    Mock::given(method("GET"))
        .and(path(POLICY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(policy_body(&json!(null))))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(POLICY_PATH))
        .and(body_partial_json(json!({
            "meta": { "name": "edge", "resource-version": "7" },
            "spec": { "rules": [{
                "name": "AllowSSH",
                "action": "permit",
                "apps": ["SSH"],
                "from-ipcollections": ["net1"],
                "to-ipcollections": ["net2"]
            }] }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(policy_body(&json!([allow_ssh_wire()]))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POLICY_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(policy_body(&json!([allow_ssh_wire()]))),
        )
        .mount(&server)
        .await;

    let mut state = ResourceState::new(allow_ssh_config("permit"));
    reconciler.create_rule(&mut state).await.unwrap();

    assert_eq!(state.id(), Some(POLICY_UUID));
    assert_eq!(state.config(), &allow_ssh_config("permit"));
    assert_eq!(state.meta().unwrap().resource_version.as_deref(), Some("7"));
}

#[tokio::test]
async fn test_create_rule_twice_keeps_one_copy() {
    let (server, reconciler) = setup().await;

    Mock::given(method("GET"))
        .and(path(POLICY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(policy_body(&json!([]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POLICY_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(policy_body(&json!([allow_ssh_wire()]))),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(POLICY_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(policy_body(&json!([allow_ssh_wire()]))),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut state = ResourceState::new(allow_ssh_config("permit"));
    reconciler.create_rule(&mut state).await.unwrap();
    let first = state.clone();

    reconciler.create_rule(&mut state).await.unwrap();

    let bodies = put_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    let rules = bodies[1]["spec"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["name"], "AllowSSH");
    assert_eq!(state, first);
}

#[tokio::test]
async fn test_create_rule_replaces_same_name() {
    let (server, reconciler) = setup().await;

    let mut stale = allow_ssh_wire();
    stale["action"] = json!("deny");
    let other = json!({ "name": "AllowDNS", "action": "permit", "apps": ["DNS"] });

    Mock::given(method("GET"))
        .and(path(POLICY_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(policy_body(&json!([stale, other]))),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(POLICY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(policy_body(&json!([]))))
        .mount(&server)
        .await;

    let mut state = ResourceState::new(allow_ssh_config("permit"));
    reconciler.create_rule(&mut state).await.unwrap();

    let bodies = put_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let rules = bodies[0]["spec"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["name"], "AllowSSH");
    assert_eq!(rules[0]["action"], "permit");
    assert_eq!(rules[1]["name"], "AllowDNS");
    assert!(bodies[0].get("status").is_none());
}

#[tokio::test]
async fn test_invalid_rule_sends_nothing() {
    let (server, reconciler) = setup().await;

    let mut state = ResourceState::new(allow_ssh_config("allow"));
    let err = reconciler.create_rule(&mut state).await.unwrap_err();

    match err {
        CoreError::Validation(ValidationError::InvalidAction { index, value }) => {
            assert_eq!(index, 0);
            assert_eq!(value, "allow");
        }
        other => panic!("expected Validation error, got: {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(state.id(), None);
}

#[tokio::test]
async fn test_read_rule_missing_from_policy_clears_id() {
    let (server, reconciler) = setup().await;

    Mock::given(method("GET"))
        .and(path(POLICY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(policy_body(&json!([]))))
        .mount(&server)
        .await;

    let mut state = ResourceState::new(allow_ssh_config("permit"));
    state.set_id(Some(POLICY_UUID.into()));
    reconciler.read_rule(&mut state).await.unwrap();

    assert_eq!(state.id(), None);
}

#[tokio::test]
async fn test_delete_rule_rewrites_policy_without_it() {
    let (server, reconciler) = setup().await;

    let other = json!({ "name": "AllowDNS", "action": "permit" });
    Mock::given(method("GET"))
        .and(path(POLICY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(policy_body(&json!([allow_ssh_wire(), other]))),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(POLICY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(policy_body(&json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = ResourceState::new(allow_ssh_config("permit"));
    state.set_id(Some(POLICY_UUID.into()));
    reconciler.delete_rule(&mut state).await.unwrap();

    let bodies = put_bodies(&server).await;
    let rules = bodies[0]["spec"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["name"], "AllowDNS");
    assert_eq!(state.id(), None);
}

// ── Standalone documents ────────────────────────────────────────────

#[tokio::test]
async fn test_create_policy_surfaces_rejection_body() {
    let (server, reconciler) = setup().await;

    Mock::given(method("POST"))
        .and(path("/configs/security/v1/tenant/default/networksecuritypolicies"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("{\"message\":[\"duplicate rule name\"]}"),
        )
        .mount(&server)
        .await;

    let mut state = ResourceState::new(PolicyConfig::new("edge"));
    let err = reconciler.create_policy(&mut state).await.unwrap_err();

    match err {
        CoreError::Rejected {
            status,
            status_text,
            body,
        } => {
            assert_eq!(status, 400);
            assert_eq!(status_text, "Bad Request");
            assert_eq!(body, "{\"message\":[\"duplicate rule name\"]}");
        }
        other => panic!("expected Rejected error, got: {other:?}"),
    }
    assert_eq!(state.id(), None);
}

#[tokio::test]
async fn test_create_tunnel_keeps_pre_shared_key() {
    let (server, reconciler) = setup().await;

    let config = TunnelConfig {
        name: "to-dc".into(),
        tenant: "default".into(),
        namespace: "default".into(),
        tunnel: Some(TunnelBlock {
            ha_mode: "no_ha".into(),
            tunnel_endpoints: vec![EndpointConfig {
                interface_name: "ipsec0".into(),
                ike_sa: Some(IkeSaConfig {
                    auth_type: "psk".into(),
                    pre_shared_key: Some("s3cret".into()),
                    ..IkeSaConfig::default()
                }),
                ..EndpointConfig::default()
            }],
            ..TunnelBlock::default()
        }),
    };

    let echoed = json!({
        "kind": "Tunnel",
        "meta": { "name": "to-dc", "tenant": "default", "namespace": "default", "uuid": "t-1" },
        "spec": {
            "ha-mode": "no_ha",
            "policy-distribution-targets": ["default"],
            "tunnel-endpoints": [{
                "interface-name": "ipsec0",
                "ike-sa": { "auth-type": "psk", "ike-initiator": true }
            }]
        }
    });

    Mock::given(method("POST"))
        .and(path("/configs/network/v1/tenant/default/tunnels"))
        .and(body_partial_json(json!({
            "kind": "Tunnel",
            "spec": { "tunnel-endpoints": [{ "ike-sa": { "pre-shared-key": "s3cret" } }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&echoed))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/configs/network/v1/tenant/default/tunnels/to-dc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&echoed))
        .mount(&server)
        .await;

    let mut state = ResourceState::new(config.clone());
    reconciler.create_tunnel(&mut state).await.unwrap();

    assert_eq!(state.id(), Some("t-1"));
    assert_eq!(state.config(), &config);
}

#[tokio::test]
async fn test_create_nat_policy_infers_static_destination() {
    let (server, reconciler) = setup().await;

    let config = NatPolicyConfig {
        name: "nat".into(),
        tenant: "default".into(),
        namespace: "default".into(),
        policy_distribution_targets: vec!["default".into()],
        rules: vec![NatRuleConfig {
            name: "web".into(),
            rule_type: "static".into(),
            source: Some(AddressBlock::from_collections(["inside"])),
            destination: Some(AddressBlock::from_addresses(["198.51.100.7"])),
            translated_source: Some(AddressBlock::from_addresses(["203.0.113.10"])),
            ..NatRuleConfig::default()
        }],
    };

    let echoed = json!({
        "kind": "NatPolicy",
        "meta": { "name": "nat", "tenant": "default", "namespace": "default", "uuid": "n-1" },
        "spec": {
            "policy-distribution-targets": ["default"],
            "rules": [{
                "name": "web",
                "type": "static",
                "disable": false,
                "source": { "ipcollections": ["inside"], "any": false },
                "destination": { "addresses": ["198.51.100.7"], "any": false },
                "translated-source": { "addresses": ["203.0.113.10"], "any": false },
                "translated-destination": { "addresses": ["198.51.100.7"], "any": false }
            }]
        }
    });

    Mock::given(method("POST"))
        .and(path("/configs/network/v1/tenant/default/natpolicies"))
        .and(body_partial_json(json!({
            "spec": { "rules": [{
                "translated-destination": { "addresses": ["198.51.100.7"], "any": false }
            }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&echoed))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/configs/network/v1/tenant/default/natpolicies/nat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&echoed))
        .mount(&server)
        .await;

    let mut state = ResourceState::new(config.clone());
    reconciler.create_nat_policy(&mut state).await.unwrap();

    assert_eq!(state.id(), Some("n-1"));
    assert_eq!(state.config(), &config);
}

#[tokio::test]
async fn test_invalid_nat_rule_names_index() {
    let (server, reconciler) = setup().await;

    let mut config: NatPolicyConfig =
        psm_core::decode_config(json!({ "name": "nat", "rules": [] })).unwrap();
    config.rules.push(NatRuleConfig {
        name: "no-translation".into(),
        rule_type: "dynamic".into(),
        source: Some(AddressBlock::from_addresses(["10.0.0.0/24"])),
        ..NatRuleConfig::default()
    });

    let mut state = ResourceState::new(config);
    let err = reconciler.create_nat_policy(&mut state).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Validation failed: rule 0: either translated_source or translated_destination must be specified"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_role_accepts_no_content() {
    let (server, reconciler) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/configs/auth/v1/tenant/default/roles/auditor"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config: RoleConfig = psm_core::decode_config(json!({ "name": "auditor" })).unwrap();
    let mut state = ResourceState::new(config);
    state.set_id(Some("r-1".into()));

    reconciler.delete_role(&mut state).await.unwrap();

    assert_eq!(state.id(), None);
    assert!(state.meta().is_none());
}

#[tokio::test]
async fn test_read_role_never_surfaces_namespace() {
    let (server, reconciler) = setup().await;

    Mock::given(method("GET"))
        .and(path("/configs/auth/v1/tenant/default/roles/auditor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Role",
            "meta": { "name": "auditor", "tenant": "default", "namespace": "default", "uuid": "r-1" },
            "spec": { "permissions": [{
                "resource-group": "security",
                "resource-kind": "NetworkSecurityPolicy",
                "resource-namespace": "*_ALL_*",
                "actions": ["read"]
            }] }
        })))
        .mount(&server)
        .await;

    let config: RoleConfig = psm_core::decode_config(json!({ "name": "auditor" })).unwrap();
    let mut state = ResourceState::new(config);
    reconciler.read_role(&mut state).await.unwrap();

    let permission = &state.config().permissions[0];
    assert_eq!(permission.resource_kind, "NetworkSecurityPolicy");
    assert_eq!(permission.resource_namespace, None);
    assert_eq!(state.id(), Some("r-1"));
}
