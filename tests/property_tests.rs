//! Property tests for legality and card conservation.

use proptest::prelude::*;

use whot_engine::ai::choose_ai_action;
use whot_engine::cards::{new_deck, shuffle, Shape, DECK_SIZE};
use whot_engine::core::{MatchConfig, MatchRng, Phase, SeatConfig};
use whot_engine::lifecycle::{play_turn, start_match, start_next_round};
use whot_engine::rules::{is_legal_play, legal_actions, validate};

fn playable_shape() -> impl Strategy<Value = Shape> {
    prop::sample::select(Shape::ALL_PLAYABLE.to_vec())
}

proptest! {
    #[test]
    fn prop_legal_iff_shape_number_or_wildcard(a in 0..DECK_SIZE, b in 0..DECK_SIZE) {
        let deck = new_deck();
        let (card, top) = (deck[a], deck[b]);

        let expected = card.is_wildcard() || card.shape == top.shape || card.number == top.number;
        prop_assert_eq!(is_legal_play(&card, Some(&top), None), expected);
    }

    #[test]
    fn prop_chosen_shape_overrides(a in 0..DECK_SIZE, b in 0..DECK_SIZE, shape in playable_shape()) {
        let deck = new_deck();
        let (card, top) = (deck[a], deck[b]);

        let expected = card.is_wildcard() || card.shape == shape;
        prop_assert_eq!(is_legal_play(&card, Some(&top), Some(shape)), expected);
    }

    #[test]
    fn prop_shuffle_is_permutation(seed in any::<u64>()) {
        let deck = new_deck();
        let mut shuffled = shuffle(&deck, &mut MatchRng::new(seed));
        shuffled.sort_by_key(|c| c.id);
        prop_assert_eq!(shuffled, deck);
    }

    #[test]
    fn prop_cards_are_conserved(
        seed in any::<u64>(),
        ai_seed in any::<u64>(),
        seats in 2usize..=4,
        steps in 1usize..300,
    ) {
        let config = (0..seats)
            .fold(MatchConfig::new(), |c, i| c.seat(SeatConfig::computer(format!("Bot {i}"))))
            .seed(seed);
        let mut state = start_match(&config).unwrap();
        let mut rng = MatchRng::new(ai_seed);
        prop_assert!(state.check_conservation().is_ok());

        for _ in 0..steps {
            match state.phase {
                Phase::Playing => {
                    let current = state.current_seat;
                    let action = choose_ai_action(&state, current, &mut rng);
                    prop_assert!(validate(&state, current, &action).is_ok());
                    prop_assert!(legal_actions(&state, current).contains(&action));
                    play_turn(&mut state, current, &action).unwrap();
                }
                Phase::RoundEnd => state = start_next_round(&state),
                Phase::GameEnd | Phase::Dealing => break,
            }
            prop_assert!(state.check_conservation().is_ok());
        }
    }
}
