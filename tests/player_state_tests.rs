use letter_battleship::{Coordinate, Handled, Message, PlayerState, PlayerStatus};
use proptest::prelude::*;

mod common;

use common::alphabet_board;

fn attack(turn: u64) -> Message {
    Message::Attack {
        turn,
        target: Coordinate::new(0, 0),
    }
}

fn defender() -> PlayerState {
    let mut state = PlayerState::new(PlayerStatus::Waiting, 26);
    state.install_board(alphabet_board());
    state
}

fn attacker() -> PlayerState {
    let mut state = PlayerState::new(PlayerStatus::Playing, 26);
    state.install_board(alphabet_board());
    state
}

#[test]
fn duplicate_turn_grant_is_ignored() {
    let mut state = defender();
    assert_eq!(state.apply(&Message::TurnGranted { turn: 2 }), Handled::Applied);
    assert_eq!(state.status(), PlayerStatus::Playing);
    assert!(matches!(
        state.apply(&Message::TurnGranted { turn: 2 }),
        Handled::Ignored(_)
    ));

    state.launch_attack(Coordinate::new(4, 4));
    assert_eq!(state.status(), PlayerStatus::Attacking);
    assert!(matches!(
        state.apply(&Message::TurnGranted { turn: 2 }),
        Handled::Ignored(_)
    ));
    assert_eq!(state.status(), PlayerStatus::Attacking);
    assert_eq!(state.attack_history().len(), 1);
}

#[test]
fn duplicate_attack_is_answered_once() {
    let mut state = defender();
    assert_eq!(state.apply(&attack(1)), Handled::Applied);
    assert_eq!(state.status(), PlayerStatus::UnderAttack);
    assert!(matches!(state.apply(&attack(1)), Handled::Ignored(_)));

    assert_eq!(state.answer_attack(Some('A')), Handled::Applied);
    assert_eq!(
        state.outbox(),
        &[Message::AttackResult {
            turn: 1,
            hit: Some('A')
        }]
    );
    state.clear_outbox();

    assert!(matches!(state.apply(&attack(1)), Handled::Ignored(_)));
    assert!(matches!(state.answer_attack(None), Handled::Ignored(_)));
    assert!(state.outbox().is_empty());
    assert_eq!(state.status(), PlayerStatus::Waiting);
    assert_eq!(state.letters_lost().as_slice(), &['A']);
}

#[test]
fn stray_results_leave_a_defender_alone() {
    let mut state = defender();
    state.apply(&attack(1));
    state.answer_attack(Some('A'));
    state.clear_outbox();

    let result = Message::AttackResult { turn: 1, hit: None };
    for _ in 0..2 {
        assert!(matches!(state.apply(&result), Handled::Ignored(_)));
        assert_eq!(state.status(), PlayerStatus::Waiting);
        assert_eq!(state.letters_lost().as_slice(), &['A']);
        assert!(state.received_attack().is_none());
    }
}

#[test]
fn duplicate_result_is_recorded_once() {
    let mut state = attacker();
    state.launch_attack(Coordinate::new(0, 0));
    let result = Message::AttackResult {
        turn: 1,
        hit: Some('B'),
    };
    assert_eq!(state.apply(&result), Handled::Applied);
    assert_eq!(state.status(), PlayerStatus::Waiting);
    assert_eq!(
        state.outbox(),
        &[
            Message::Attack {
                turn: 1,
                target: Coordinate::new(0, 0)
            },
            Message::TurnGranted { turn: 2 },
        ]
    );

    assert!(matches!(state.apply(&result), Handled::Ignored(_)));
    assert_eq!(state.letters_won().as_slice(), &['B']);
    assert_eq!(state.outbox().len(), 2);
}

#[test]
fn last_letter_ends_the_match() {
    let mut state = PlayerState::new(PlayerStatus::Playing, 2);
    let mut turn = 1;
    for letter in ['X', 'Y'] {
        state.launch_attack(Coordinate::new(turn as u8, 0));
        state.apply(&Message::AttackResult {
            turn,
            hit: Some(letter),
        });
        if !state.status().is_terminal() {
            // competitor's half-round
            state.apply(&attack(turn + 1));
            state.answer_attack(None);
            state.apply(&Message::TurnGranted { turn: turn + 2 });
        }
        turn += 2;
    }
    assert_eq!(state.status(), PlayerStatus::GameOver);
    assert_eq!(state.outbox().last(), Some(&Message::GameOver));
    assert_eq!(state.output().collected_letters, vec!['X', 'Y']);
}

#[test]
fn unexpected_messages_are_applied_leniently() {
    let mut state = attacker();
    match state.apply(&attack(1)) {
        Handled::Lenient(mismatch) => {
            assert_eq!(mismatch.from, PlayerStatus::Playing);
            assert_eq!(mismatch.to, PlayerStatus::UnderAttack);
        }
        other => panic!("expected a lenient transition, got {:?}", other),
    }
    assert_eq!(state.status(), PlayerStatus::UnderAttack);
}

#[test]
fn game_over_is_final() {
    let mut state = defender();
    assert_eq!(state.apply(&Message::GameOver), Handled::Applied);
    assert!(matches!(state.apply(&Message::GameOver), Handled::Ignored(_)));
    assert!(matches!(
        state.apply(&Message::TurnGranted { turn: 9 }),
        Handled::Ignored(_)
    ));
    assert!(matches!(state.apply(&attack(9)), Handled::Ignored(_)));
    assert_eq!(state.status(), PlayerStatus::GameOver);
}

fn message() -> impl Strategy<Value = Message> {
    prop_oneof![
        (0u64..12).prop_map(|turn| Message::TurnGranted { turn }),
        (0u64..12, 0u8..=10, 0u8..=10).prop_map(|(turn, x, y)| Message::Attack {
            turn,
            target: Coordinate::new(x, y),
        }),
        (0u64..12, proptest::option::of(proptest::char::range('A', 'F')))
            .prop_map(|(turn, hit)| Message::AttackResult { turn, hit }),
        Just(Message::GameOver),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn letters_stay_unique_and_bounded(
        start_playing in any::<bool>(),
        messages in proptest::collection::vec(message(), 0..60),
    ) {
        let initial = if start_playing { PlayerStatus::Playing } else { PlayerStatus::Waiting };
        let mut state = PlayerState::new(initial, 4);
        let mut seen_game_over = false;
        for message in &messages {
            match state.status() {
                PlayerStatus::Playing => {
                    let target = Coordinate::new(state.attack_history().len() as u8 % 11, 0);
                    state.launch_attack(target);
                }
                PlayerStatus::UnderAttack => {
                    state.answer_attack(Some('C'));
                }
                _ => {}
            }
            state.apply(message);
            seen_game_over |= state.status().is_terminal();
            prop_assert_eq!(state.status().is_terminal(), seen_game_over);

            for letters in [state.letters_won(), state.letters_lost()] {
                prop_assert!(letters.len() <= 4);
                let mut sorted = letters.to_vec();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(sorted.len(), letters.len());
            }
        }
    }

    #[test]
    fn replaying_a_message_changes_nothing(messages in proptest::collection::vec(message(), 1..30)) {
        let mut state = PlayerState::new(PlayerStatus::Waiting, 26);
        for message in &messages {
            state.apply(message);
            let snapshot = state.clone();
            let replay = state.apply(message);
            prop_assert!(matches!(replay, Handled::Ignored(_)), "{:?} was applied twice", message);
            prop_assert_eq!(&state, &snapshot);
        }
    }
}
