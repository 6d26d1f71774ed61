use crate::view::{Node, View};

use super::{Blackjack, BlackjackState, Card, Phase, BET_AMOUNTS};

const CARD_IMAGE_ROOT: &str = "/static/cards";

fn card_image(card: &Card) -> Node {
    Node::element("img")
        .attr("class", "card")
        .attr("src", format!("{}/{}", CARD_IMAGE_ROOT, card.image_name()))
        .attr("alt", format!("{} of {}", card.rank.symbol(), card.suit.name()))
}

fn hand(id: &str, title: &str, cards: &[Card], value: u32) -> Node {
    Node::element("div")
        .attr("id", id)
        .attr("class", "hand")
        .child(Node::element("h2").with_text(title))
        .child(
            Node::element("div")
                .attr("class", "cards")
                .children(cards.iter().map(card_image)),
        )
        .child(
            Node::element("p")
                .attr("id", format!("{}-value", id))
                .with_text(format!("Value: {}", value)),
        )
}

fn button(id: &str, action: &str, label: &str, enabled: bool) -> Node {
    Node::element("button")
        .attr("id", id)
        .attr("onClick", action)
        .attr_if(!enabled, "disabled", "true")
        .with_text(label)
}

impl View<BlackjackState> for Blackjack {
    fn view(&self, state: &BlackjackState) -> Node {
        let betting = state.phase == Phase::Initial;
        let playing = state.phase == Phase::PlayerTurn;

        let bets = BET_AMOUNTS.iter().map(|&amount| {
            Node::element("button")
                .attr("id", format!("bet-{}", amount))
                .attr("onClick", "PlaceBet")
                .attr("value", amount.to_string())
                .attr_if(!betting || amount > state.balance, "disabled", "true")
                .with_text(format!("Bet {}", amount))
        });

        let mut root = Node::element("div")
            .attr("id", "blackjack")
            .child(Node::element("h1").with_text("Blackjack"))
            .child(
                Node::element("p")
                    .attr("id", "balance")
                    .with_text(format!("Balance: {}", state.balance)),
            )
            .child(
                Node::element("p")
                    .attr("id", "bet")
                    .with_text(format!("Bet: {}", state.bet)),
            )
            .child(Node::element("div").attr("id", "bets").children(bets))
            .child(hand("dealer", "Dealer", &state.dealer_hand, state.dealer_value()))
            .child(hand("player", "Player", &state.player_hand, state.player_value()))
            .child(
                Node::element("div").attr("id", "controls").children([
                    button("deal", "Deal", "Deal", state.can_deal()),
                    button("hit", "Hit", "Hit", playing),
                    button("stand", "Stand", "Stand", playing),
                    button(
                        "restart",
                        "Restart",
                        "New Round",
                        state.phase == Phase::GameOver,
                    ),
                ]),
            );

        if let Some(outcome) = state.outcome {
            root = root.child(
                Node::element("p")
                    .attr("id", "outcome")
                    .with_text(outcome.describe()),
            );
        }
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::blackjack::{Outcome, Rank, Suit};

    #[test]
    fn initial_table_only_allows_betting() {
        let tree = Blackjack.view(&BlackjackState::new(1000));
        assert_eq!(tree.find_by_id("balance").unwrap().text_content(), "Balance: 1000");
        assert_eq!(tree.find_by_id("deal").unwrap().get_attr("disabled"), Some("true"));
        assert_eq!(tree.find_by_id("hit").unwrap().get_attr("disabled"), Some("true"));
        assert_eq!(tree.find_by_id("bet-25").unwrap().get_attr("disabled"), None);
        assert_eq!(tree.find_by_id("bet-25").unwrap().get_attr("value"), Some("25"));
        assert!(tree.find_by_id("outcome").is_none());
    }

    #[test]
    fn deal_waits_for_bet_and_shuffle() {
        let mut state = BlackjackState::new(1000);
        state.bet = 25;
        let tree = Blackjack.view(&state);
        assert_eq!(tree.find_by_id("deal").unwrap().get_attr("disabled"), Some("true"));

        state.shuffled = true;
        let tree = Blackjack.view(&state);
        assert_eq!(tree.find_by_id("deal").unwrap().get_attr("disabled"), None);
    }

    #[test]
    fn unaffordable_bets_are_disabled() {
        let tree = Blackjack.view(&BlackjackState::new(20));
        assert_eq!(tree.find_by_id("bet-10").unwrap().get_attr("disabled"), None);
        assert_eq!(tree.find_by_id("bet-50").unwrap().get_attr("disabled"), Some("true"));
    }

    #[test]
    fn hands_render_card_images_and_outcome() {
        let mut state = BlackjackState::new(90);
        state.phase = Phase::GameOver;
        state.player_hand = vec![Card::new(Rank::Ace, Suit::Spades)];
        state.outcome = Some(Outcome::DealerWins);

        let tree = Blackjack.view(&state);
        let player = tree.find_by_id("player").unwrap();
        let Node::Element { children, .. } = player else {
            panic!("player hand is not an element");
        };
        let Node::Element { children: cards, .. } = &children[1] else {
            panic!("cards container is not an element");
        };
        assert_eq!(
            cards[0].get_attr("src"),
            Some("/static/cards/card_spades_A.png")
        );
        assert_eq!(tree.find_by_id("player-value").unwrap().text_content(), "Value: 11");
        assert_eq!(tree.find_by_id("outcome").unwrap().text_content(), "Dealer wins.");
        assert_eq!(tree.find_by_id("restart").unwrap().get_attr("disabled"), None);
    }
}
