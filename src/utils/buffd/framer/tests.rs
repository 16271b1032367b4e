use {
    crate::{
        object::ObjectId,
        utils::buffd::{
            BufFdError,
            framer::{Message, MsgFramer},
        },
    },
    rand::{Rng, SeedableRng, rngs::StdRng},
};

fn random_messages(rng: &mut StdRng, n: usize, max_payload: usize) -> Vec<Message> {
    (0..n)
        .map(|_| {
            let len = rng.gen_range(0..=max_payload);
            let payload: Vec<u8> = (0..len).map(|_| rng.r#gen()).collect();
            Message {
                id: ObjectId::from_raw(rng.r#gen()),
                opcode: rng.r#gen(),
                size: (8 + len) as u16,
                payload,
            }
        })
        .collect()
}

fn encode_all(msgs: &[Message]) -> Vec<u8> {
    let mut bytes = vec![];
    for msg in msgs {
        MsgFramer::encode(msg.id, msg.opcode, &msg.payload, &mut bytes).unwrap();
    }
    bytes
}

#[test]
fn round_trip_random_chunks() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let msgs = random_messages(&mut rng, 20, 64);
        let bytes = encode_all(&msgs);
        let mut framer = MsgFramer::new();
        let mut decoded = vec![];
        let mut pos = 0;
        while pos < bytes.len() {
            let chunk = rng.gen_range(1..=32).min(bytes.len() - pos);
            decoded.extend(framer.consume(&bytes[pos..pos + chunk]));
            pos += chunk;
        }
        assert_eq!(decoded, msgs);
    }
}

#[test]
fn round_trip_one_byte_at_a_time() {
    let mut rng = StdRng::seed_from_u64(7);
    let msgs = random_messages(&mut rng, 10, 16);
    let bytes = encode_all(&msgs);
    let mut framer = MsgFramer::new();
    let mut decoded = vec![];
    for b in &bytes {
        decoded.extend(framer.consume(std::slice::from_ref(b)));
    }
    assert_eq!(decoded, msgs);
}

#[test]
fn single_chunk() {
    let mut rng = StdRng::seed_from_u64(99);
    let msgs = random_messages(&mut rng, 30, 100);
    let bytes = encode_all(&msgs);
    let mut framer = MsgFramer::new();
    assert_eq!(framer.consume(&bytes), msgs);
}

#[test]
fn zero_payload_is_emitted_with_the_size_field() {
    let mut bytes = vec![];
    MsgFramer::encode(ObjectId::from_raw(3), 6, &[], &mut bytes).unwrap();
    assert_eq!(bytes.len(), 8);
    let mut framer = MsgFramer::new();
    assert!(framer.consume(&bytes[..7]).is_empty());
    let msgs = framer.consume(&bytes[7..]);
    assert_eq!(
        msgs,
        vec![Message {
            id: ObjectId::from_raw(3),
            opcode: 6,
            size: 8,
            payload: vec![],
        }]
    );
}

#[test]
fn partial_message_stays_buffered() {
    let mut bytes = vec![];
    MsgFramer::encode(ObjectId::from_raw(1), 0, &[1, 2, 3, 4], &mut bytes).unwrap();
    MsgFramer::encode(ObjectId::from_raw(2), 1, &[5, 6, 7, 8], &mut bytes).unwrap();
    let mut framer = MsgFramer::new();
    let first = framer.consume(&bytes[..14]);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].payload, vec![1, 2, 3, 4]);
    let second = framer.consume(&bytes[14..]);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, ObjectId::from_raw(2));
    assert_eq!(second[0].payload, vec![5, 6, 7, 8]);
}

#[test]
fn header_is_little_endian() {
    let mut bytes = vec![];
    MsgFramer::encode(ObjectId::from_raw(0x04030201), 0x0605, &[0; 4], &mut bytes).unwrap();
    assert_eq!(&bytes[..8], &[1, 2, 3, 4, 5, 6, 12, 0]);
}

#[test]
fn oversized_messages_are_not_encoded() {
    let mut bytes = vec![1, 2, 3];
    let payload = vec![0; u16::MAX as usize - 7];
    let res = MsgFramer::encode(ObjectId::from_raw(1), 0, &payload, &mut bytes);
    assert!(matches!(res, Err(BufFdError::MessageTooLarge(65536))));
    assert_eq!(bytes, [1, 2, 3]);
    let payload = vec![0; u16::MAX as usize - 8];
    MsgFramer::encode(ObjectId::from_raw(1), 0, &payload, &mut bytes).unwrap();
    assert_eq!(bytes.len(), 3 + u16::MAX as usize);
}

#[test]
fn undersized_message_is_forwarded() {
    let bytes = [1, 0, 0, 0, 2, 0, 4, 0, 9, 0, 0, 0, 0, 0, 8, 0];
    let mut framer = MsgFramer::new();
    let msgs = framer.consume(&bytes);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].size, 4);
    assert!(msgs[0].payload.is_empty());
    assert_eq!(msgs[1].id, ObjectId::from_raw(9));
}
