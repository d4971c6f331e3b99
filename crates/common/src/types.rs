//! Enumerated order attributes shared across services.

use serde::{Deserialize, Serialize};

/// Sales channel an order came in through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    #[default]
    InStore,
    Web,
    Mobile,
    Pos,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Channel::InStore => "IN_STORE",
            Channel::Web => "WEB",
            Channel::Mobile => "MOBILE",
            Channel::Pos => "POS",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_STORE" => Ok(Channel::InStore),
            "WEB" => Ok(Channel::Web),
            "MOBILE" => Ok(Channel::Mobile),
            "POS" => Ok(Channel::Pos),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// Order lifecycle status.
///
/// PAID is the only status produced by order intake; further lifecycle is
/// owned by downstream services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Paid,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Paid => write!(f, "PAID"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAID" => Ok(OrderStatus::Paid),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}
