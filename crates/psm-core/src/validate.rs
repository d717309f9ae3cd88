// ── Structural validators ──
//
// Pure checks run before anything is expanded or sent. Each returns the
// first violated constraint, qualified with the offending item's index.
// Validators never mutate their input.

use std::str::FromStr;

use thiserror::Error;

use crate::model::{
    AddressBlock, AuthType, NatRuleConfig, PermissionConfig, RuleAction, RuleEntryConfig,
    TunnelBlock,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    // ── Rules (security and NAT) ─────────────────────────────────────
    #[error("rule {index}: {field} is required")]
    Required { index: usize, field: &'static str },

    #[error("rule {index}: {field} must have either addresses or ipcollections")]
    NoAddresses { index: usize, field: &'static str },

    #[error(
        "rule {index}: protocol in destination_proto_port is required if destination_proto_port is specified"
    )]
    MissingProtocol { index: usize },

    #[error("rule {index}: either translated_source or translated_destination must be specified")]
    NoTranslation { index: usize },

    #[error(
        "rule {index}: translated_destination is required when translated_destination_port is specified"
    )]
    PortWithoutDestination { index: usize },

    #[error("rule {index}: action must be one of 'permit', 'deny', or 'reject', got {value:?}")]
    InvalidAction { index: usize, value: String },

    // ── Tunnels ──────────────────────────────────────────────────────
    #[error("endpoint {index}: auth_type must be 'psk' or 'certificates', got {value:?}")]
    InvalidAuthType { index: usize, value: String },

    // ── Roles ────────────────────────────────────────────────────────
    #[error("permission {index}: {field} is required")]
    PermissionField { index: usize, field: &'static str },
}

// ── NAT ─────────────────────────────────────────────────────────────

/// Check NAT rules in order; stops at the first failure.
pub fn validate_nat_rules(rules: &[NatRuleConfig]) -> Result<(), ValidationError> {
    rules
        .iter()
        .enumerate()
        .try_for_each(|(index, rule)| validate_nat_rule(index, rule))
}

fn validate_nat_rule(index: usize, rule: &NatRuleConfig) -> Result<(), ValidationError> {
    if rule.name.is_empty() {
        return Err(ValidationError::Required { index, field: "name" });
    }
    if rule.rule_type.is_empty() {
        return Err(ValidationError::Required { index, field: "type" });
    }

    require_addresses(index, "source", rule.source.as_ref())?;
    if let Some(destination) = &rule.destination {
        require_addresses(index, "destination", Some(destination))?;
    }

    let missing_protocol = rule
        .destination_proto_port
        .as_ref()
        .is_some_and(|proto_port| proto_port.protocol.is_empty());
    if missing_protocol {
        return Err(ValidationError::MissingProtocol { index });
    }

    if rule.translated_source.is_none() && rule.translated_destination.is_none() {
        return Err(ValidationError::NoTranslation { index });
    }

    let has_port = rule
        .translated_destination_port
        .as_deref()
        .is_some_and(|port| !port.is_empty());
    if has_port && rule.translated_destination.is_none() {
        return Err(ValidationError::PortWithoutDestination { index });
    }

    Ok(())
}

// ── Security rules ──────────────────────────────────────────────────

pub fn validate_rule_entries(entries: &[RuleEntryConfig]) -> Result<(), ValidationError> {
    for (index, entry) in entries.iter().enumerate() {
        if entry.name.is_empty() {
            return Err(ValidationError::Required { index, field: "name" });
        }
        if RuleAction::from_str(&entry.action).is_err() {
            return Err(ValidationError::InvalidAction {
                index,
                value: entry.action.clone(),
            });
        }
        require_addresses(index, "from", entry.from.as_ref())?;
        require_addresses(index, "to", entry.to.as_ref())?;
    }
    Ok(())
}

fn require_addresses(
    index: usize,
    field: &'static str,
    block: Option<&AddressBlock>,
) -> Result<(), ValidationError> {
    match block {
        None => Err(ValidationError::Required { index, field }),
        Some(block) if block.is_any() => Err(ValidationError::NoAddresses { index, field }),
        Some(_) => Ok(()),
    }
}

// ── Tunnels ─────────────────────────────────────────────────────────

pub fn validate_tunnel(block: &TunnelBlock) -> Result<(), ValidationError> {
    for (index, endpoint) in block.tunnel_endpoints.iter().enumerate() {
        let Some(sa) = &endpoint.ike_sa else {
            continue;
        };
        if AuthType::from_str(&sa.auth_type).is_err() {
            return Err(ValidationError::InvalidAuthType {
                index,
                value: sa.auth_type.clone(),
            });
        }
    }
    Ok(())
}

// ── Roles ───────────────────────────────────────────────────────────

pub fn validate_permissions(permissions: &[PermissionConfig]) -> Result<(), ValidationError> {
    for (index, permission) in permissions.iter().enumerate() {
        if permission.resource_kind.is_empty() {
            return Err(ValidationError::PermissionField {
                index,
                field: "resource_kind",
            });
        }
        if permission.actions.is_empty() {
            return Err(ValidationError::PermissionField {
                index,
                field: "actions",
            });
        }
    }
    Ok(())
}
