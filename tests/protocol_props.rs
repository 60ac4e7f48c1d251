use letter_battleship::{ActorId, Coordinate, Envelope, GameError, Message, PROTOCOL_VERSION};
use proptest::prelude::*;

fn message() -> impl Strategy<Value = Message> {
    prop_oneof![
        any::<u64>().prop_map(|turn| Message::TurnGranted { turn }),
        (any::<u64>(), 0u8..=10, 0u8..=10).prop_map(|(turn, x, y)| Message::Attack {
            turn,
            target: Coordinate::new(x, y),
        }),
        (any::<u64>(), proptest::option::of(proptest::char::range('A', 'Z')))
            .prop_map(|(turn, hit)| Message::AttackResult { turn, hit }),
        Just(Message::GameOver),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn decoding_garbage_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = Envelope::decode(&bytes);
    }

    #[test]
    fn truncated_frames_are_rejected(msg in message(), cut in 1usize..8) {
        let frame = Envelope::new(ActorId::from("g-player1"), msg).encode().unwrap();
        let cut = cut.min(frame.len());
        prop_assert!(Envelope::decode(&frame[..frame.len() - cut]).is_err());
    }

    #[test]
    fn foreign_versions_are_rejected(msg in message(), version in any::<u8>()) {
        prop_assume!(version != PROTOCOL_VERSION);
        let mut env = Envelope::new(ActorId::from("g-player2"), msg);
        env.version = version;
        let frame = bincode::serialize(&env).unwrap();
        let err = Envelope::decode(&frame).unwrap_err();
        prop_assert_eq!(
            err.downcast_ref::<GameError>(),
            Some(&GameError::ProtocolVersion { expected: PROTOCOL_VERSION, got: version })
        );
    }
}
