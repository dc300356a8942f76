//! Basic usage example for the GRAIL protocol codecs.

use grail_proto::world_model::client::{AliasDefinition, Message, Request};
use grail_proto::{AliasTable, ProtocolId, TicketDispenser};
use grail_types::{AliasedAttribute, AliasedWorldData, Uri, U16String};

fn main() {
    println!("=== GRAIL Protocol Example ===\n");

    // 1. Handshake frames
    println!("1. Encoding handshake frames...");
    for protocol in [
        ProtocolId::Sensor,
        ProtocolId::Solver,
        ProtocolId::Client,
        ProtocolId::WorldModel,
    ] {
        let frame = protocol.encode_handshake();
        println!("   \"{}\": {} bytes", protocol, frame.len());
    }

    // 2. A client stream request
    println!("\n2. Encoding a stream request...");
    let mut tickets = TicketDispenser::new();
    let ticket = tickets.issue();
    let request = Message::StreamRequest {
        ticket,
        request: Request {
            object_uri: Uri::from("node.*"),
            attributes: vec![
                U16String::from("location.x"),
                U16String::from("location.y"),
            ],
            start: 0,
            stop_period: 100,
        },
    };
    let frame = request.encode();
    println!("   Encoded frame size: {} bytes", frame.len());

    // 3. Decode it back
    println!("\n3. Decoding the frame...");
    match Message::decode(&frame) {
        Some(Message::StreamRequest { ticket, request }) => {
            println!("   Ticket: {}", ticket);
            println!("   Object URI pattern: {}", request.object_uri);
            println!("   Attributes requested: {}", request.attributes.len());
        }
        other => println!("   Unexpected decode result: {:?}", other),
    }

    // 4. Alias-compressed data and its resolution
    println!("\n4. Resolving an aliased data response...");
    let mut names = AliasTable::new();
    names.apply(&[AliasDefinition {
        alias: 1,
        name: U16String::from("location.x"),
    }]);
    let mut origins = AliasTable::new();
    origins.insert(10, U16String::from("solver.kalman"));

    let data = AliasedWorldData {
        object_uri: Uri::from("node.5"),
        attributes: vec![AliasedAttribute {
            name_alias: 1,
            creation_date: grail_types::now_grail_time(),
            expiration_date: 0,
            origin_alias: 10,
            data: 12.75f64.to_be_bytes().to_vec(),
        }],
    };
    if let Some(world_data) = grail_proto::alias::resolve_world_data(&names, &origins, &data) {
        println!("   Object: {}", world_data.object_uri);
        println!(
            "   Attribute \"{}\" from \"{}\"",
            world_data.attributes[0].name, world_data.attributes[0].origin
        );
    }

    println!("\n=== Example completed successfully! ===");
}
