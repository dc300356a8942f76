//! Per-connection protocol state: alias tables, origin preferences,
//! on-demand gating, and ticket correlation.
//!
//! The codec itself is stateless; these helpers hold the state the
//! endpoints keep per connection and apply the semantic contracts of the
//! world-model protocols.

use std::collections::{HashMap, HashSet};

use grail_types::{AliasedWorldData, Attribute, U16String, WorldData};

use crate::world_model::client::{AliasDefinition, OriginWeight};
use crate::world_model::solver::{OnDemandRequest, TypeAlias};

/// One direction's alias table: `u32` aliases for UTF-16 strings, defined
/// for the lifetime of a connection. Attribute names and origins use
/// separate tables.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<u32, U16String>,
}

impl AliasTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines one alias. A redefinition replaces the previous string.
    pub fn insert(&mut self, alias: u32, name: U16String) {
        self.entries.insert(alias, name);
    }

    /// Applies an alias-announcement message.
    pub fn apply(&mut self, definitions: &[AliasDefinition]) {
        for def in definitions {
            self.insert(def.alias, def.name.clone());
        }
    }

    /// Looks up the string behind an alias.
    #[must_use]
    pub fn lookup(&self, alias: u32) -> Option<&U16String> {
        self.entries.get(&alias)
    }

    /// Number of aliases defined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no alias has been defined yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Expands an alias-compressed data response back into full attribute
/// records using the connection's name and origin tables. Returns `None`
/// if any alias is undefined.
#[must_use]
pub fn resolve_world_data(
    names: &AliasTable,
    origins: &AliasTable,
    data: &AliasedWorldData,
) -> Option<WorldData> {
    let mut attributes = Vec::with_capacity(data.attributes.len());
    for attr in &data.attributes {
        attributes.push(Attribute {
            name: names.lookup(attr.name_alias)?.clone(),
            creation_date: attr.creation_date,
            expiration_date: attr.expiration_date,
            origin: origins.lookup(attr.origin_alias)?.clone(),
            data: attr.data.clone(),
        });
    }
    Some(WorldData {
        object_uri: data.object_uri.clone(),
        attributes,
    })
}

/// A client's preference weights over origins.
///
/// The default weight is 1. Origins with negative weights are never
/// returned; among the rest, only attributes from the highest-weighted
/// origins present are kept. Preferences apply to snapshot and stream
/// requests only; range requests return every origin.
#[derive(Debug, Clone, Default)]
pub struct OriginPreferences {
    weights: HashMap<U16String, i32>,
}

impl OriginPreferences {
    /// Creates an empty preference set (every origin at the default 1).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the weight for one origin.
    pub fn set(&mut self, origin: U16String, weight: i32) {
        self.weights.insert(origin, weight);
    }

    /// The weight of an origin, defaulting to 1.
    #[must_use]
    pub fn weight(&self, origin: &U16String) -> i32 {
        self.weights.get(origin).copied().unwrap_or(1)
    }

    /// The preference entries as an origin-preference message body.
    #[must_use]
    pub fn to_weights(&self) -> Vec<OriginWeight> {
        self.weights
            .iter()
            .map(|(origin, &weight)| OriginWeight {
                origin: origin.clone(),
                weight,
            })
            .collect()
    }

    /// Keeps only the attributes from the highest-weighted origins present,
    /// dropping attributes from negatively-weighted origins entirely.
    #[must_use]
    pub fn filter<'a>(&self, attributes: &'a [Attribute]) -> Vec<&'a Attribute> {
        let best = attributes
            .iter()
            .map(|a| self.weight(&a.origin))
            .filter(|&w| w >= 0)
            .max();
        match best {
            None => Vec::new(),
            Some(best) => attributes
                .iter()
                .filter(|a| self.weight(&a.origin) == best)
                .collect(),
        }
    }
}

/// Solver-side record of announced types and which of them the world model
/// has switched on.
///
/// Types announced with `on_demand == false` always flow. On-demand types
/// flow only between a `start_on_demand` and the matching
/// `stop_on_demand`.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<u32, TypeAlias>,
    active: HashSet<u32>,
    patterns: HashMap<u32, Vec<U16String>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the types this solver announced.
    pub fn announce(&mut self, types: &[TypeAlias]) {
        for entry in types {
            self.types.insert(entry.alias, entry.clone());
        }
    }

    /// Applies a `start_on_demand` message.
    pub fn start(&mut self, requests: &[OnDemandRequest]) {
        for request in requests {
            self.active.insert(request.type_alias);
            self.patterns
                .insert(request.type_alias, request.patterns.clone());
        }
    }

    /// Applies a `stop_on_demand` message.
    pub fn stop(&mut self, requests: &[OnDemandRequest]) {
        for request in requests {
            self.active.remove(&request.type_alias);
            self.patterns.remove(&request.type_alias);
        }
    }

    /// The URI patterns clients asked about for an active type alias.
    #[must_use]
    pub fn active_patterns(&self, alias: u32) -> Option<&[U16String]> {
        self.patterns.get(&alias).map(Vec::as_slice)
    }

    /// Returns true if the solver should currently produce data for this
    /// alias: always for ordinary types, only while started for on-demand
    /// types, never for unannounced aliases.
    #[must_use]
    pub fn should_send(&self, alias: u32) -> bool {
        match self.types.get(&alias) {
            None => false,
            Some(entry) if entry.on_demand => self.active.contains(&alias),
            Some(_) => true,
        }
    }
}

/// Issues client request tickets. Zero is never issued; decoders use a zero
/// ticket as their failure sentinel.
#[derive(Debug, Clone)]
pub struct TicketDispenser {
    next: u32,
}

impl TicketDispenser {
    /// Creates a dispenser starting at ticket 1.
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issues the next ticket, wrapping around and skipping zero.
    pub fn issue(&mut self) -> u32 {
        let ticket = self.next;
        self.next = self.next.checked_add(1).unwrap_or(1);
        ticket
    }
}

impl Default for TicketDispenser {
    fn default() -> Self {
        Self::new()
    }
}
