// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::keys;
use crate::keys::values::UNKNOWN;
use crate::map::AttributeMap;
use crate::processor::AttributeProcessor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkType {
    NoNetwork,
    Cellular,
    Wifi,
    Vpn,
    Unknown,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::NoNetwork => keys::values::NO_NETWORK,
            NetworkType::Cellular => keys::values::CELLULAR,
            NetworkType::Wifi => keys::values::WIFI,
            NetworkType::Vpn => keys::values::VPN,
            NetworkType::Unknown => UNKNOWN,
        }
    }
}

/// Cellular technology generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkGeneration {
    Second,
    Third,
    Fourth,
    Fifth,
}

impl NetworkGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkGeneration::Second => keys::values::GENERATION_2G,
            NetworkGeneration::Third => keys::values::GENERATION_3G,
            NetworkGeneration::Fourth => keys::values::GENERATION_4G,
            NetworkGeneration::Fifth => keys::values::GENERATION_5G,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkState {
    pub network_type: NetworkType,
    /// Only meaningful on cellular networks.
    pub generation: Option<NetworkGeneration>,
    /// Carrier name, only meaningful on cellular networks.
    pub provider: Option<String>,
}

/// Reports the current connectivity. Must answer from locally cached
/// platform state, never by probing the network.
pub trait NetworkStateProvider: Send + Sync {
    fn network_state(&self) -> Option<NetworkState>;
}

impl<F> NetworkStateProvider for F
where
    F: Fn() -> Option<NetworkState> + Send + Sync,
{
    fn network_state(&self) -> Option<NetworkState> {
        self()
    }
}

/// Network type, generation and carrier. Connectivity changes during a
/// session, so the provider is consulted on every append.
pub struct NetworkAttributeProcessor<P> {
    provider: P,
}

impl<P: NetworkStateProvider> NetworkAttributeProcessor<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: NetworkStateProvider> AttributeProcessor for NetworkAttributeProcessor<P> {
    fn append_attributes(&self, attributes: &mut AttributeMap) {
        let state = self.provider.network_state();
        let network_type = state
            .as_ref()
            .map_or(NetworkType::Unknown, |s| s.network_type);
        let (generation, provider) = match state {
            Some(NetworkState {
                network_type: NetworkType::Cellular,
                generation,
                provider,
            }) => (
                generation.map_or(UNKNOWN, |g| g.as_str()).to_owned(),
                provider
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN.to_owned()),
            ),
            _ => (UNKNOWN.to_owned(), UNKNOWN.to_owned()),
        };

        attributes.insert(keys::NETWORK_TYPE, network_type.as_str());
        attributes.insert(keys::NETWORK_GENERATION, generation);
        attributes.insert(keys::NETWORK_PROVIDER, provider);
    }
}
