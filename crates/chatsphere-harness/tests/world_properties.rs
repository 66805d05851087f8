//! Property tests over the synchronous simulation world.
//!
//! Random operation sequences drive several sessions against one service
//! with arbitrary delivery interleavings. Every client's snapshot history
//! must satisfy the standard invariants, and clients that end up in the same
//! room must agree on message order.

use chatsphere_core::{ConnectionState, OwnedSnapshot, SessionConfig};
use chatsphere_harness::{ClientId, InvariantRegistry, SimWorld};
use chatsphere_proto::Intent;
use proptest::prelude::*;

const CLIENTS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Connect(ClientId),
    Disconnect(ClientId),
    Create(ClientId),
    /// Join the n-th known room, or an unknown one if there are fewer rooms
    Join(ClientId, usize),
    Send(ClientId, String),
    Deliver(ClientId),
    DeliverAll,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let client = 0..CLIENTS;
    prop_oneof![
        2 => client.clone().prop_map(Op::Connect),
        1 => client.clone().prop_map(Op::Disconnect),
        2 => client.clone().prop_map(Op::Create),
        3 => (client.clone(), 0usize..4).prop_map(|(c, n)| Op::Join(c, n)),
        4 => (client.clone(), "[a-z]{1,8}").prop_map(|(c, text)| Op::Send(c, text)),
        4 => client.prop_map(Op::Deliver),
        1 => Just(Op::DeliverAll),
    ]
}

fn known_rooms(world: &SimWorld) -> Vec<String> {
    let mut rooms: Vec<_> = world.server().rooms().map(str::to_string).collect();
    rooms.sort();
    rooms
}

fn apply(world: &mut SimWorld, op: Op) {
    match op {
        Op::Connect(c) => world.connect(c),
        Op::Disconnect(c) => world.disconnect(c),
        Op::Create(c) => {
            let _ = world.submit(c, Intent::Create);
        },
        Op::Join(c, n) => {
            let room_id = known_rooms(world).get(n).cloned().unwrap_or_else(|| "????".to_string());
            let _ = world.submit(c, Intent::Join { room_id, username: format!("user{c}") });
        },
        Op::Send(c, text) => {
            let _ = world.submit(c, Intent::Send { text });
        },
        Op::Deliver(c) => {
            world.deliver(c);
        },
        Op::DeliverAll => world.deliver_all(),
    }
}

fn record(world: &SimWorld, histories: &mut [Vec<OwnedSnapshot>]) {
    for (client, history) in histories.iter_mut().enumerate() {
        if let Some(session) = world.session(client) {
            history.push(session.snapshot().to_owned());
        }
    }
}

proptest! {
    #[test]
    fn prop_histories_satisfy_invariants(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut world = SimWorld::new(seed, CLIENTS, &SessionConfig::default());
        let mut histories = vec![Vec::new(); CLIENTS];
        let registry = InvariantRegistry::standard();

        record(&world, &mut histories);
        for op in ops {
            apply(&mut world, op);
            record(&world, &mut histories);
        }
        world.deliver_all();
        record(&world, &mut histories);

        for history in &histories {
            prop_assert_eq!(registry.check_all(history), Ok(()));
        }
    }

    #[test]
    fn prop_room_members_agree_on_order(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut world = SimWorld::new(seed, CLIENTS, &SessionConfig::default());
        for op in ops {
            apply(&mut world, op);
        }
        world.deliver_all();

        for a in 0..CLIENTS {
            for b in 0..CLIENTS {
                let (Some(sa), Some(sb)) = (world.session(a), world.session(b)) else {
                    continue;
                };
                if sa.state() != ConnectionState::Joined
                    || sb.state() != ConnectionState::Joined
                    || sa.room_id() != sb.room_id()
                {
                    continue;
                }

                // The later joiner saw a suffix of what the earlier one saw
                let la: Vec<_> = sa.messages().iter().cloned().collect();
                let lb: Vec<_> = sb.messages().iter().cloned().collect();
                let (short, long) = if la.len() <= lb.len() { (&la, &lb) } else { (&lb, &la) };
                prop_assert!(long.ends_with(short), "{:?} vs {:?}", la, lb);
            }
        }
    }

    #[test]
    fn prop_every_send_reaches_sender(
        seed in any::<u64>(),
        texts in prop::collection::vec("[a-z]{1,8}", 1..10),
    ) {
        let mut world = SimWorld::new(seed, 1, &SessionConfig::default());
        world.connect(0);
        world.submit(0, Intent::Create).unwrap();
        world.deliver_all();
        let room_id = world.session(0).and_then(|s| s.room_id()).unwrap().to_string();
        world.submit(0, Intent::Join { room_id, username: "solo".into() }).unwrap();
        world.deliver_all();

        for text in &texts {
            world.submit(0, Intent::Send { text: text.clone() }).unwrap();
        }
        world.deliver_all();

        let received: Vec<_> = world.session(0).unwrap().messages().iter().map(|m| m.text.clone()).collect();
        prop_assert_eq!(received, texts);
    }
}
