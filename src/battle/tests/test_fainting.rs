#[cfg(test)]
mod tests {
    use crate::battle::state::GameState;
    use crate::battle::tests::common::{assert_ok, create_test_battle, play_turn, test_set};
    use crate::errors::BattleError;
    use crate::pokemon::StatusCondition;
    use crate::side::SideId;
    use pretty_assertions::assert_eq;

    fn position_of(lines: &[String], needle: &str) -> usize {
        match lines.iter().position(|line| line == needle) {
            Some(index) => index,
            None => panic!("missing record {:?} in {:#?}", needle, lines),
        }
    }

    #[test]
    fn test_knockout_of_last_pokemon_ends_battle_mid_turn() {
        // Arrange: Shedinja has 1 HP and Mew outspeeds it.
        let mut battle = create_test_battle(
            vec![test_set("Mew", &["Flamethrower"])],
            vec![test_set("Shedinja", &["Tackle"])],
        );

        // Act
        play_turn(&mut battle, "move 1", "move 1");

        // Assert
        let lines = battle.sink().lines();
        let used = position_of(&lines, "|move|p1a: Mew|Flamethrower");
        let damaged = position_of(&lines, "|-damage|p2a: Shedinja|0/1");
        let fainted = position_of(&lines, "|faint|p2a: Shedinja");
        let won = position_of(&lines, "|win|Alice");
        assert!(used < damaged && damaged < fainted && fainted < won);

        assert!(!lines.iter().any(|line| line.starts_with("|move|p2a: Shedinja")), "a fainted Pokemon never acts");
        assert!(!lines.contains(&"|turn|2".to_string()), "the turn is abandoned once a side has lost");
        assert_eq!(battle.winner(), Some(SideId::P1));
        assert_eq!(battle.state().game_state, GameState::Ended);
        assert!(battle.sink().ended.is_some());
    }

    #[test]
    fn test_fainted_active_gets_a_switch_request() {
        // Arrange
        let mut battle = create_test_battle(
            vec![test_set("Mew", &["Flamethrower"])],
            vec![test_set("Shedinja", &["Tackle"]), test_set("Snorlax", &["Tackle"])],
        );

        // Act
        play_turn(&mut battle, "move 1", "move 1");

        // Assert
        assert!(!battle.is_ended());
        assert!(battle.sink().lines().contains(&"|turn|2".to_string()));
        let p2_request = battle.sink().last_request(SideId::P2).unwrap_or_default();
        assert!(p2_request.contains("\"requestType\":\"switch\""), "got {}", p2_request);
        assert!(p2_request.contains("\"forceSwitch\":[true]"));
        let p1_request = battle.sink().last_request(SideId::P1).unwrap_or_default();
        assert!(p1_request.contains("\"requestType\":\"move\""));

        let p2 = battle.state().side(SideId::P2).map(|side| side.fainted_last_turn);
        assert_eq!(p2, Some(true));
    }

    #[test]
    fn test_switch_request_rejects_moves_and_fainted_targets() {
        let mut battle = create_test_battle(
            vec![test_set("Mew", &["Flamethrower"])],
            vec![test_set("Shedinja", &["Tackle"]), test_set("Snorlax", &["Tackle"])],
        );
        play_turn(&mut battle, "move 1", "move 1");

        assert_eq!(battle.choose(SideId::P2, "move 1"), Err(BattleError::MustSwitch { side: SideId::P2 }));
        assert_eq!(
            battle.choose(SideId::P2, "switch 1"),
            Err(BattleError::InvalidSwitchTarget {
                name: "Shedinja".to_string(),
                reason: "it has fainted",
            })
        );

        play_turn(&mut battle, "move 1", "switch 2");

        let lines = battle.sink().lines();
        let switched = position_of(&lines, "|switch|p2a: Snorlax|Snorlax, L100|461/461");
        let attacked = lines
            .iter()
            .rposition(|line| line == "|move|p1a: Mew|Flamethrower")
            .unwrap_or_default();
        assert!(switched < attacked, "the replacement arrives before the foe's move");
        assert!(battle.sink().lines().contains(&"|turn|3".to_string()));
    }

    #[test]
    fn test_default_choice_sends_in_first_standing_pokemon() {
        let mut battle = create_test_battle(
            vec![test_set("Mew", &["Flamethrower"])],
            vec![
                test_set("Shedinja", &["Tackle"]),
                test_set("Lapras", &["Surf"]),
                test_set("Snorlax", &["Tackle"]),
            ],
        );
        play_turn(&mut battle, "move 1", "move 1");

        assert_ok(battle.choose(SideId::P1, "move 1"));
        assert_ok(battle.choose(SideId::P2, "default"));

        assert!(battle
            .sink()
            .lines()
            .iter()
            .any(|line| line.starts_with("|switch|p2a: Lapras|")));
        assert!(battle.input_log().contains(&">p2 default".to_string()));
    }

    #[test]
    fn test_residual_knockout_ends_battle() {
        // Arrange: a burned Pikachu on 1 HP.
        let mut battle = create_test_battle(
            vec![test_set("Mew", &["Swords Dance"])],
            vec![test_set("Pikachu", &["Swords Dance"])],
        );
        if let Some(pikachu) = battle.state_mut().side_mut(SideId::P2).and_then(|s| s.active_pokemon_mut()) {
            pikachu.status = Some(StatusCondition::Burn);
            pikachu.set_hp(1);
        }

        // Act
        play_turn(&mut battle, "move 1", "move 1");

        // Assert
        let lines = battle.sink().lines();
        let residual = lines
            .iter()
            .position(|line| line.starts_with("|-damage|p2a: Pikachu|0/211") && line.ends_with("|[from] brn"));
        assert!(residual.is_some(), "expected burn damage in {:#?}", lines);
        let tail: Vec<&str> = lines.iter().rev().take(2).rev().map(String::as_str).collect();
        assert_eq!(tail, vec!["|faint|p2a: Pikachu", "|win|Alice"]);
    }
}
