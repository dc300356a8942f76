//! Cross-message protocol flows: the exchanges each GRAIL tier actually
//! performs, plus the invariants every encoded frame must satisfy.

use bytes::Bytes;
use grail_proto::world_model::{client, solver};
use grail_proto::{aggregator, alias, sensor, AliasTable, OriginPreferences, TypeRegistry};
use grail_types::{
    AliasedAttribute, AliasedWorldData, Rule, SampleData, Subscription, TxMask, U16String,
    Uint128, Uri,
};

fn sample() -> SampleData {
    SampleData {
        physical_layer: 3,
        tx_id: Uint128::from(0x0123_4567_89AB_CDEFu64),
        rx_id: Uint128::from(42u64),
        rx_timestamp: 1_700_000_000_000,
        rss: -72.5,
        sense_data: vec![0xDE, 0xAD, 0xBE, 0xEF],
        valid: true,
    }
}

/// Every frame any codec emits satisfies the length invariant: the first
/// four bytes, read big-endian, equal the total size minus four.
fn assert_length_invariant(frame: &Bytes) {
    let prefix = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    assert_eq!(prefix, frame.len() - 4);
}

fn representative_aggregator_messages() -> Vec<aggregator::Message> {
    vec![
        aggregator::Message::KeepAlive,
        aggregator::Message::Certificate(vec![9, 9, 9]),
        aggregator::Message::AckCertificate(Vec::new()),
        aggregator::Message::SubscriptionRequest(Subscription {
            rules: vec![Rule {
                physical_layer: 1,
                txers: vec![TxMask {
                    base_id: Uint128::from(10u64),
                    mask: Uint128::from(0xFFFFu64),
                }],
                update_interval: 500,
            }],
        }),
        aggregator::Message::SubscriptionResponse(Subscription::default()),
        aggregator::Message::ServerSample(sample()),
        aggregator::Message::BufferOverrun,
    ]
}

fn representative_client_messages() -> Vec<client::Message> {
    vec![
        client::Message::KeepAlive,
        client::Message::SnapshotRequest {
            ticket: 1,
            request: client::Request {
                object_uri: Uri::from("node.*"),
                attributes: vec![U16String::from("location.x")],
                start: 0,
                stop_period: 1_700_000_000_000,
            },
        },
        client::Message::AttributeAlias(vec![client::AliasDefinition {
            alias: 1,
            name: U16String::from("location.x"),
        }]),
        client::Message::RequestComplete { ticket: 1 },
        client::Message::CancelRequest { ticket: 1 },
        client::Message::DataResponse {
            ticket: 1,
            data: AliasedWorldData {
                object_uri: Uri::from("node.5"),
                attributes: vec![AliasedAttribute {
                    name_alias: 1,
                    creation_date: 5,
                    expiration_date: 0,
                    origin_alias: 10,
                    data: vec![1, 2, 3],
                }],
            },
        },
        client::Message::UriSearch(Uri::from("shelf\\..*")),
        client::Message::UriResponse(vec![Uri::from("shelf.1")]),
        client::Message::OriginPreference(vec![client::OriginWeight {
            origin: U16String::from("solver.kalman"),
            weight: 2,
        }]),
    ]
}

fn representative_solver_messages() -> Vec<solver::Message> {
    vec![
        solver::Message::KeepAlive,
        solver::Message::TypeAnnounce {
            types: vec![solver::TypeAlias {
                alias: 5,
                name: U16String::from("gesture"),
                on_demand: true,
            }],
            origin: U16String::from("solver.gesture"),
        },
        solver::Message::StartOnDemand(vec![solver::OnDemandRequest {
            type_alias: 5,
            patterns: vec![U16String::from("room.*")],
        }]),
        solver::Message::SolverData {
            create_uris: false,
            solutions: vec![solver::SolutionData {
                type_alias: 5,
                time: 77,
                target: Uri::from("room.12"),
                data: vec![4, 5, 6],
            }],
        },
        solver::Message::ExpireAttribute {
            uri: Uri::from("cart.9"),
            attribute: U16String::from("location.x"),
            expiration: 99,
            origin: U16String::from("solver.admin"),
        },
    ]
}

#[test]
fn every_message_kind_satisfies_the_length_invariant() {
    for msg in representative_aggregator_messages() {
        assert_length_invariant(&msg.encode());
    }
    for msg in representative_client_messages() {
        assert_length_invariant(&msg.encode());
    }
    for msg in representative_solver_messages() {
        assert_length_invariant(&msg.encode());
    }
    assert_length_invariant(&sensor::encode_sample(&sample()));
    for protocol in [
        grail_proto::ProtocolId::Sensor,
        grail_proto::ProtocolId::Solver,
        grail_proto::ProtocolId::Client,
        grail_proto::ProtocolId::WorldModel,
    ] {
        assert_length_invariant(&protocol.encode_handshake());
    }
}

#[test]
fn every_truncation_decodes_gracefully() {
    for msg in representative_aggregator_messages() {
        let frame = msg.encode();
        for k in 0..frame.len() {
            assert!(aggregator::Message::decode(&frame[..k]).is_none());
        }
    }
    for msg in representative_client_messages() {
        let frame = msg.encode();
        for k in 0..frame.len() {
            assert!(client::Message::decode(&frame[..k]).is_none());
        }
    }
    for msg in representative_solver_messages() {
        let frame = msg.encode();
        for k in 0..frame.len() {
            assert!(solver::Message::decode(&frame[..k]).is_none());
        }
    }
}

#[test]
fn every_tag_flip_decodes_gracefully() {
    for msg in representative_client_messages() {
        let mut frame = msg.encode().to_vec();
        for tag in 0..=255u8 {
            frame[4] = tag;
            // A flip may decode as another kind sharing the body shape, or
            // as nothing; it must never panic or read out of bounds.
            let _ = client::Message::decode(&frame);
        }
    }
}

// Scenario: a sensor reports an observation and the aggregator relays it
// to a subscribed solver.
#[test]
fn sample_flows_from_sensor_to_solver() {
    let observed = sample();

    // Sensor -> aggregator, no tag byte. Body is 45 fixed bytes plus the
    // sense data.
    let sensor_frame = sensor::encode_sample(&observed);
    assert_eq!(&sensor_frame[..4], &[0, 0, 0, 49]);
    let at_aggregator = sensor::decode_sample(&sensor_frame);
    assert!(at_aggregator.valid);
    assert_eq!(at_aggregator, observed);

    // The solver's subscription admits the transmitter.
    let subscription = Subscription {
        rules: vec![Rule {
            physical_layer: 3,
            txers: vec![TxMask {
                base_id: observed.tx_id,
                mask: Uint128::MAX,
            }],
            update_interval: 500,
        }],
    };
    assert!(subscription.matches(observed.physical_layer, observed.tx_id));

    // Aggregator -> solver, same body behind the server_sample tag.
    let relay = aggregator::Message::ServerSample(at_aggregator).encode();
    assert_eq!(&relay[..4], &[0, 0, 0, 50]);
    let at_solver = aggregator::decode_server_sample(&relay);
    assert!(at_solver.valid);
    assert_eq!(at_solver, observed);
}

// Scenario: subscription request and response with mask semantics.
#[test]
fn subscription_exchange_round_trips() {
    let requested = Subscription {
        rules: vec![Rule {
            physical_layer: 1,
            txers: vec![
                TxMask {
                    base_id: Uint128::from(10u64),
                    mask: Uint128::from(0xFFFFu64),
                },
                TxMask {
                    base_id: Uint128::from(20u64),
                    mask: Uint128::ZERO,
                },
            ],
            update_interval: 500,
        }],
    };

    let frame = aggregator::Message::SubscriptionRequest(requested.clone()).encode();
    let Some(aggregator::Message::SubscriptionRequest(received)) =
        aggregator::Message::decode(&frame)
    else {
        panic!("subscription request did not decode");
    };
    assert_eq!(received.rules.len(), 1);
    assert_eq!(received.rules[0].txers.len(), 2);
    assert_eq!(received.rules[0].update_interval, 500);
    assert_eq!(received, requested);

    // The aggregator echoes what it honors; here, everything.
    let echo = aggregator::Message::SubscriptionResponse(received).encode();
    assert!(matches!(
        aggregator::Message::decode(&echo),
        Some(aggregator::Message::SubscriptionResponse(_))
    ));
}

// Scenario: stream request, alias announcements, data response, and alias
// resolution back to full attribute names.
#[test]
fn stream_request_and_aliased_data_response() {
    let request = client::Message::StreamRequest {
        ticket: 7,
        request: client::Request {
            object_uri: Uri::from("node.*"),
            attributes: vec![
                U16String::from("location.x"),
                U16String::from("location.y"),
            ],
            start: 0,
            stop_period: 100,
        },
    };
    let Some(client::Message::StreamRequest { ticket, .. }) =
        client::Message::decode(&request.encode())
    else {
        panic!("stream request did not decode");
    };
    assert_eq!(ticket, 7);

    // The world model announces aliases before using them.
    let mut names = AliasTable::new();
    let mut origins = AliasTable::new();
    let attr_alias = client::Message::AttributeAlias(vec![
        client::AliasDefinition {
            alias: 1,
            name: U16String::from("location.x"),
        },
        client::AliasDefinition {
            alias: 2,
            name: U16String::from("location.y"),
        },
    ]);
    let Some(client::Message::AttributeAlias(defs)) =
        client::Message::decode(&attr_alias.encode())
    else {
        panic!("attribute alias did not decode");
    };
    names.apply(&defs);

    let origin_alias = client::Message::OriginAlias(vec![client::AliasDefinition {
        alias: 10,
        name: U16String::from("solver.kalman"),
    }]);
    let Some(client::Message::OriginAlias(defs)) =
        client::Message::decode(&origin_alias.encode())
    else {
        panic!("origin alias did not decode");
    };
    origins.apply(&defs);

    // Data for the stream, compressed with the announced aliases.
    let response = client::Message::DataResponse {
        ticket: 7,
        data: AliasedWorldData {
            object_uri: Uri::from("node.5"),
            attributes: vec![AliasedAttribute {
                name_alias: 1,
                creation_date: 1_700_000_000_000,
                expiration_date: 0,
                origin_alias: 10,
                data: 3.25f64.to_be_bytes().to_vec(),
            }],
        },
    };
    let Some(client::Message::DataResponse { ticket, data }) =
        client::Message::decode(&response.encode())
    else {
        panic!("data response did not decode");
    };
    assert_eq!(ticket, 7);

    let resolved = alias::resolve_world_data(&names, &origins, &data).unwrap();
    assert_eq!(resolved.object_uri.to_string(), "node.5");
    assert_eq!(resolved.attributes[0].name.to_string(), "location.x");
    assert_eq!(resolved.attributes[0].origin.to_string(), "solver.kalman");
    assert_eq!(resolved.attributes[0].data, 3.25f64.to_be_bytes().to_vec());
}

// Scenario: cancelling ticket 7 is answered by request_complete for the
// same ticket.
#[test]
fn cancel_is_answered_with_request_complete() {
    let cancel = client::Message::CancelRequest { ticket: 7 };
    let Some(client::Message::CancelRequest { ticket }) =
        client::Message::decode(&cancel.encode())
    else {
        panic!("cancel did not decode");
    };

    let complete = client::Message::RequestComplete { ticket };
    assert_eq!(
        client::Message::decode(&complete.encode()),
        Some(client::Message::RequestComplete { ticket: 7 })
    );
}

// Scenario: URI search round trip, byte for byte.
#[test]
fn uri_search_round_trips_byte_for_byte() {
    let search = client::Message::UriSearch(Uri::from("shelf\\..*"));
    let Some(client::Message::UriSearch(pattern)) = client::Message::decode(&search.encode())
    else {
        panic!("uri search did not decode");
    };
    assert_eq!(pattern.units(), Uri::from("shelf\\..*").units());

    let response = client::Message::UriResponse(vec![
        Uri::from("shelf.1"),
        Uri::from("shelf.2"),
    ]);
    let Some(client::Message::UriResponse(uris)) = client::Message::decode(&response.encode())
    else {
        panic!("uri response did not decode");
    };
    assert_eq!(uris[0].units(), Uri::from("shelf.1").units());
    assert_eq!(uris[1].units(), Uri::from("shelf.2").units());
}

// Scenario: an on-demand type flows only between start and stop.
#[test]
fn on_demand_type_gates_solver_data() {
    let mut registry = TypeRegistry::new();

    let announce = solver::Message::TypeAnnounce {
        types: vec![solver::TypeAlias {
            alias: 5,
            name: U16String::from("gesture"),
            on_demand: true,
        }],
        origin: U16String::from("solver.gesture"),
    };
    let Some(solver::Message::TypeAnnounce { types, origin }) =
        solver::Message::decode(&announce.encode())
    else {
        panic!("type announce did not decode");
    };
    assert_eq!(origin.to_string(), "solver.gesture");
    registry.announce(&types);
    assert!(!registry.should_send(5));

    let start = solver::Message::StartOnDemand(vec![solver::OnDemandRequest {
        type_alias: 5,
        patterns: vec![U16String::from("room.*")],
    }]);
    let Some(solver::Message::StartOnDemand(requests)) =
        solver::Message::decode(&start.encode())
    else {
        panic!("start did not decode");
    };
    registry.start(&requests);
    assert!(registry.should_send(5));

    // While active, the solver produces data for the alias.
    let data = solver::Message::SolverData {
        create_uris: true,
        solutions: vec![solver::SolutionData {
            type_alias: 5,
            time: 1_700_000_000_000,
            target: Uri::from("room.12"),
            data: vec![1],
        }],
    };
    assert!(solver::Message::decode(&data.encode()).is_some());

    let stop = solver::Message::StopOnDemand(requests);
    let Some(solver::Message::StopOnDemand(requests)) = solver::Message::decode(&stop.encode())
    else {
        panic!("stop did not decode");
    };
    registry.stop(&requests);
    assert!(!registry.should_send(5));
}

// Origin preferences pick the highest-weighted origins present.
#[test]
fn origin_preferences_filter_data_responses() {
    let mut prefs = OriginPreferences::new();
    let msg = client::Message::OriginPreference(vec![
        client::OriginWeight {
            origin: U16String::from("solver.a"),
            weight: 1,
        },
        client::OriginWeight {
            origin: U16String::from("solver.b"),
            weight: 1,
        },
        client::OriginWeight {
            origin: U16String::from("solver.c"),
            weight: 0,
        },
        client::OriginWeight {
            origin: U16String::from("solver.never"),
            weight: -1,
        },
    ]);
    let Some(client::Message::OriginPreference(weights)) = client::Message::decode(&msg.encode())
    else {
        panic!("origin preference did not decode");
    };
    for entry in weights {
        prefs.set(entry.origin, entry.weight);
    }

    let attrs: Vec<grail_types::Attribute> =
        ["solver.a", "solver.b", "solver.c", "solver.never"]
            .into_iter()
            .map(|origin| grail_types::Attribute {
                name: U16String::from("location"),
                origin: U16String::from(origin),
                ..grail_types::Attribute::default()
            })
            .collect();
    let kept = prefs.filter(&attrs);
    let origins: Vec<String> = kept.iter().map(|a| a.origin.to_string()).collect();
    assert_eq!(origins, ["solver.a", "solver.b"]);
}

// UTF-16 payloads survive with arbitrary code units, surrogates included.
#[test]
fn non_ascii_uris_round_trip() {
    let units = vec![0x0041, 0xD83D, 0xDE00, 0x0000, 0x6F22];
    let uri = Uri::from_units(units.clone());
    let msg = client::Message::UriResponse(vec![uri]);
    let Some(client::Message::UriResponse(uris)) = client::Message::decode(&msg.encode()) else {
        panic!("uri response did not decode");
    };
    assert_eq!(uris[0].units(), &units[..]);
}
