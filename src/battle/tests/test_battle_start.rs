#[cfg(test)]
mod tests {
    use crate::battle::state::GameState;
    use crate::battle::tests::common::{create_test_battle, test_set};
    use crate::side::SideId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_start_records_in_order() {
        let battle = create_test_battle(vec![test_set("Mew", &["Psychic"])], vec![test_set("Mew", &["Psychic"])]);

        assert_eq!(
            battle.sink().lines(),
            vec![
                "|gametype|singles",
                "|gen|9",
                "|tier|gen9customgame",
                "|player|p1|Alice||",
                "|player|p2|Bob||",
                "|teamsize|p1|1",
                "|teamsize|p2|1",
                "|rule|Sleep Clause Mod: Limit one foe put to sleep",
                "|start",
                "|switch|p1a: Mew|Mew, L100|341/341",
                "|switch|p2a: Mew|Mew, L100|341/341",
                "|turn|1",
            ]
        );
        assert_eq!(battle.state().game_state, GameState::AwaitingChoices);
        assert_eq!(battle.turn(), 1);
    }

    #[test]
    fn test_intimidate_fires_after_both_leads_are_out() {
        let battle = create_test_battle(
            vec![test_set("Gyarados", &["Bite"])],
            vec![test_set("Mew", &["Psychic"]), test_set("Snorlax", &["Tackle"])],
        );

        let lines = battle.sink().lines();
        let tail: Vec<&str> = lines.iter().rev().take(5).rev().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "|switch|p1a: Gyarados|Gyarados, L100|331/331",
                "|switch|p2a: Mew|Mew, L100|341/341",
                "|-ability|p1a: Gyarados|Intimidate",
                "|-unboost|p2a: Mew|atk|1",
                "|turn|1",
            ]
        );
        assert!(lines.contains(&"|teamsize|p2|2".to_string()));
    }

    #[test]
    fn test_updates_flushed_before_first_requests() {
        let battle = create_test_battle(vec![test_set("Mew", &["Psychic"])], vec![test_set("Mew", &["Psychic"])]);
        let sink = battle.sink();

        assert_eq!(sink.updates.len(), 1, "start records should be one flush unit");
        assert_eq!(sink.side_updates.len(), 2);
        for side in [SideId::P1, SideId::P2] {
            let request = sink.last_request(side).unwrap_or_default();
            assert!(request.starts_with("|request|{"), "unexpected request: {}", request);
            assert!(request.contains("\"requestType\":\"move\""));
            assert!(request.contains(&format!("\"id\":\"{}\"", side)));
        }
    }

    #[test]
    fn test_side_update_never_leaks_other_roster() {
        let battle = create_test_battle(vec![test_set("Pikachu", &["Thunderbolt"])], vec![test_set("Lapras", &["Surf"])]);
        let p1_request = battle.sink().last_request(SideId::P1).unwrap_or_default();
        assert!(p1_request.contains("Pikachu"));
        assert!(!p1_request.contains("Lapras"));
    }
}
