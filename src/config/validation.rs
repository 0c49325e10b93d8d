//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check methods and route patterns parse
//! - Validate value ranges and addresses
//! - Detect duplicate routes when the reject policy is active
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MockConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::MockConfig;
use crate::fixtures::resource::resource_routes;
use crate::routing::{DuplicatePolicy, Method, RoutePattern};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("admin.prefix `{0}` must start with '/' and must not end with '/'")]
    InvalidAdminPrefix(String),

    #[error("{location}: unsupported method `{method}`")]
    InvalidMethod { location: String, method: String },

    #[error("{location}: {reason}")]
    InvalidPattern { location: String, reason: String },

    #[error("resources[{index}]: name must not be empty")]
    EmptyResourceName { index: usize },

    #[error("resources[{index}]: duplicate resource name `{name}`")]
    DuplicateResource { index: usize, name: String },

    #[error("resources[{index}]: seed record {record} is not a JSON object")]
    InvalidRecord { index: usize, record: usize },

    #[error("{location}: duplicate route {method} {path}")]
    DuplicateRoute {
        location: String,
        method: Method,
        path: String,
    },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &MockConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }
    if config.http.max_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "http.max_body_bytes",
        });
    }
    let prefix = &config.admin.prefix;
    if config.admin.enabled && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        errors.push(ValidationError::InvalidAdminPrefix(prefix.clone()));
    }

    // Registration order matches fixtures::build_route_table: resources first.
    let mut planned: Vec<(String, Method, RoutePattern)> = Vec::new();
    let mut names = HashSet::new();

    for (index, resource) in config.resources.iter().enumerate() {
        if resource.name.trim().is_empty() {
            errors.push(ValidationError::EmptyResourceName { index });
        } else if !names.insert(resource.name.as_str()) {
            errors.push(ValidationError::DuplicateResource {
                index,
                name: resource.name.clone(),
            });
        }
        for (record, value) in resource.records.iter().enumerate() {
            if !value.is_object() {
                errors.push(ValidationError::InvalidRecord { index, record });
            }
        }

        let location = format!("resources[{}]", index);
        match RoutePattern::parse(&resource.base_path) {
            Ok(_) => {
                for (method, path) in resource_routes(&resource.base_path) {
                    match RoutePattern::parse(&path) {
                        Ok(pattern) => planned.push((location.clone(), method, pattern)),
                        Err(e) => errors.push(ValidationError::InvalidPattern {
                            location: location.clone(),
                            reason: e.to_string(),
                        }),
                    }
                }
            }
            Err(e) => errors.push(ValidationError::InvalidPattern {
                location,
                reason: e.to_string(),
            }),
        }
    }

    for (index, route) in config.routes.iter().enumerate() {
        let location = format!("routes[{}]", index);
        let method = route.method.parse::<Method>();
        let pattern = RoutePattern::parse(&route.path);

        if method.is_err() {
            errors.push(ValidationError::InvalidMethod {
                location: location.clone(),
                method: route.method.clone(),
            });
        }
        if let Err(e) = &pattern {
            errors.push(ValidationError::InvalidPattern {
                location: location.clone(),
                reason: e.to_string(),
            });
        }
        if let (Ok(method), Ok(pattern)) = (method, pattern) {
            planned.push((location, method, pattern));
        }
    }

    if config.dispatch.duplicate_policy == DuplicatePolicy::Reject {
        for (i, (location, method, pattern)) in planned.iter().enumerate() {
            let duplicate = planned[..i]
                .iter()
                .any(|(_, m, p)| m == method && p.same_shape(pattern));
            if duplicate {
                errors.push(ValidationError::DuplicateRoute {
                    location: location.clone(),
                    method: *method,
                    path: pattern.as_str().to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
