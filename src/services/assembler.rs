//! Final response assembly.

use crate::models::{CardRecord, SearchExpression};

/// Merges the strategy narrative and fetched cards into one reply.
///
/// Cards are grouped under the expression that found them, in first-seen
/// order; within a group the fetch order is preserved. The output is a pure
/// function of its inputs. With no cards, the narrative is returned
/// unadorned.
#[must_use]
pub fn assemble(strategy: &str, cards: &[CardRecord]) -> String {
    if cards.is_empty() {
        return strategy.to_string();
    }

    let mut groups: Vec<(&SearchExpression, Vec<&CardRecord>)> = Vec::new();
    for card in cards {
        match groups.iter_mut().find(|(expr, _)| **expr == card.expression) {
            Some((_, members)) => members.push(card),
            None => groups.push((&card.expression, vec![card])),
        }
    }

    let mut response = format!("{strategy}\n\n## Cards That Match This Strategy:\n\n");

    for (expression, members) in groups {
        response.push_str(&format!("### Search: `{expression}`\n\n"));
        for card in members {
            response.push_str(&format!(
                "- **{}** ({}) - {}\n  {}\n\n",
                card.name, card.mana_cost, card.type_line, card.oracle_text
            ));
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawCard;

    fn card(name: &str, expression: &str) -> CardRecord {
        let raw = RawCard {
            name: name.to_string(),
            mana_cost: "{R}".to_string(),
            type_line: "Creature — Goblin".to_string(),
            oracle_text: "Haste".to_string(),
            ..RawCard::default()
        };
        CardRecord::from_raw(&raw, SearchExpression::parse(expression).unwrap())
    }

    #[test]
    fn test_no_cards_returns_narrative_verbatim() {
        let response = assemble("Play aggressively.", &[]);
        assert_eq!(response, "Play aggressively.");
    }

    #[test]
    fn test_groups_by_expression_in_first_seen_order() {
        let cards = vec![
            card("Goblin Guide", "c:r t:goblin"),
            card("Monastery Swiftspear", "c:r kw:haste"),
            card("Goblin Bushwhacker", "c:r t:goblin"),
        ];

        let response = assemble("Go fast.", &cards);

        let goblin_section = response.find("### Search: `c:r t:goblin`").unwrap();
        let haste_section = response.find("### Search: `c:r kw:haste`").unwrap();
        assert!(goblin_section < haste_section);

        // Both goblins landed in the first group.
        let haste_tail = &response[haste_section..];
        assert!(!haste_tail.contains("Goblin Bushwhacker"));
        assert_eq!(response.matches("### Search:").count(), 2);
    }

    #[test]
    fn test_card_line_layout() {
        let cards = vec![card("Goblin Guide", "c:r t:goblin")];
        let response = assemble("Go fast.", &cards);

        assert!(response.starts_with("Go fast.\n\n## Cards That Match This Strategy:"));
        assert!(response.contains("- **Goblin Guide** ({R}) - Creature — Goblin\n  Haste"));
    }

    #[test]
    fn test_deterministic() {
        let cards = vec![
            card("Goblin Guide", "c:r t:goblin"),
            card("Monastery Swiftspear", "c:r kw:haste"),
        ];
        assert_eq!(assemble("Go fast.", &cards), assemble("Go fast.", &cards));
    }
}
