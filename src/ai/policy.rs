//! Move policies for computer-controlled seats.
//!
//! Policies are trait-based so hosts and tests can swap in scripted play:
//! - `SeatPolicy`: choose an action for a seat whose turn it is
//! - `RandomPolicy`: uniform choice among legal cards

use crate::cards::{Shape, Special};
use crate::core::{Action, MatchRng, MatchState, PenaltyRule, SeatId};
use crate::rules::{legal_cards, owed_draw};

/// Policy for choosing a computer seat's action.
pub trait SeatPolicy: Send + Sync {
    /// Choose an action for `seat`. Only called on that seat's turn.
    fn choose(&self, state: &MatchState, seat: SeatId, rng: &mut MatchRng) -> Action;
}

/// Uniform random policy: every legal card is equally likely.
#[derive(Clone, Debug, Default)]
pub struct RandomPolicy;

impl SeatPolicy for RandomPolicy {
    fn choose(&self, state: &MatchState, seat: SeatId, rng: &mut MatchRng) -> Action {
        choose_ai_action(state, seat, rng)
    }
}

/// Pick an action for a computer seat.
///
/// 1. Owing a forced draw: draw it. Under [`PenaltyRule::StackPick2`] a held
///    Pick2 is played instead when the debt is Pick2 debt.
/// 2. Otherwise a uniformly random legal card; a Wildcard also gets a
///    uniformly random shape.
/// 3. Otherwise draw one card.
#[must_use]
pub fn choose_ai_action(state: &MatchState, seat: SeatId, rng: &mut MatchRng) -> Action {
    let legal = legal_cards(state, seat);

    if owed_draw(state, seat).is_some() {
        let stackable = state.penalty_rule == PenaltyRule::StackPick2 && state.pending_draw_count > 0;
        let pick2s: Vec<_> = legal.iter().filter(|c| c.special == Special::Pick2).collect();
        return match rng.choose(&pick2s) {
            Some(card) if stackable => Action::play(card.id),
            _ => Action::Draw,
        };
    }

    match rng.choose(&legal) {
        Some(card) if card.is_wildcard() => {
            let shape = rng.choose(&Shape::ALL_PLAYABLE).copied().unwrap_or(Shape::Circle);
            Action::play_wildcard(card.id, shape)
        }
        Some(card) => Action::play(card.id),
        None => Action::Draw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardId};
    use crate::core::{Phase, Seat};
    use crate::rules::validate;
    use rustc_hash::FxHashMap;

    fn card(id: u8, shape: Shape, number: u8) -> Card {
        Card::new(CardId::new(id), shape, number)
    }

    fn state_with(top: Card, hand: Vec<Card>, rule: PenaltyRule) -> MatchState {
        let mut seats: Vec<Seat> = SeatId::all(2)
            .map(|id| Seat::new(id, format!("Bot {}", id.0), true))
            .collect();
        seats[0].hand = hand.into_iter().collect();
        let mut state = MatchState::new(seats, MatchRng::new(1), rule);
        state.play_pile.push_back(top);
        state.draw_pile.push_back(card(90, Shape::Star, 8));
        state.phase = Phase::Playing;
        state
    }

    #[test]
    fn test_draws_without_legal_card() {
        let state = state_with(
            card(0, Shape::Circle, 5),
            vec![card(1, Shape::Star, 7)],
            PenaltyRule::MustDraw,
        );
        let mut rng = MatchRng::new(2);
        assert_eq!(choose_ai_action(&state, SeatId::new(0), &mut rng), Action::Draw);
    }

    #[test]
    fn test_draws_when_penalty_owed() {
        let mut state = state_with(
            card(0, Shape::Circle, 2),
            vec![card(1, Shape::Circle, 7), card(2, Shape::Star, 2)],
            PenaltyRule::MustDraw,
        );
        state.pending_draw_count = 2;
        let mut rng = MatchRng::new(2);

        for _ in 0..20 {
            assert_eq!(choose_ai_action(&state, SeatId::new(0), &mut rng), Action::Draw);
        }
    }

    #[test]
    fn test_stacks_pick2_under_stacking_rule() {
        let mut state = state_with(
            card(0, Shape::Circle, 2),
            vec![card(1, Shape::Circle, 7), card(2, Shape::Star, 2)],
            PenaltyRule::StackPick2,
        );
        state.pending_draw_count = 2;
        let mut rng = MatchRng::new(2);

        assert_eq!(
            choose_ai_action(&state, SeatId::new(0), &mut rng),
            Action::play(CardId::new(2))
        );
    }

    #[test]
    fn test_only_legal_cards_chosen() {
        let hand = vec![
            card(1, Shape::Circle, 7),
            card(2, Shape::Star, 5),
            card(3, Shape::Square, 9),
            Card::wildcard(CardId::new(50)),
        ];
        let state = state_with(card(0, Shape::Circle, 5), hand, PenaltyRule::MustDraw);
        let mut rng = MatchRng::new(11);
        let mut counts: FxHashMap<CardId, usize> = FxHashMap::default();

        for _ in 0..600 {
            let action = choose_ai_action(&state, SeatId::new(0), &mut rng);
            assert!(validate(&state, SeatId::new(0), &action).is_ok());
            *counts.entry(action.card().unwrap()).or_default() += 1;
        }

        assert!(!counts.contains_key(&CardId::new(3)));
        // roughly uniform over the three legal cards
        for id in [1, 2, 50] {
            let n = counts[&CardId::new(id)];
            assert!((120..=280).contains(&n), "card {id} chosen {n} times");
        }
    }

    #[test]
    fn test_wildcard_gets_playable_shape() {
        let state = state_with(
            card(0, Shape::Circle, 5),
            vec![Card::wildcard(CardId::new(50))],
            PenaltyRule::MustDraw,
        );
        let mut rng = MatchRng::new(4);

        for _ in 0..20 {
            match RandomPolicy.choose(&state, SeatId::new(0), &mut rng) {
                Action::Play { shape: Some(shape), .. } => assert_ne!(shape, Shape::Wildcard),
                other => panic!("unexpected action {other:?}"),
            }
        }
    }
}
