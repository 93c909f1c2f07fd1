#[cfg(test)]
mod tests {
    use crate::battle::engine::Battle;
    use crate::battle::state::{BattleOptions, PlayerOptions};
    use crate::battle::tests::common::{assert_ok, test_dex, test_set, RecordingSink, TEST_SEED};
    use crate::dex::{to_id, AbilityData, DataLookup, Dex, Entry, ItemData, MoveData, NatureData, SpeciesData};
    use crate::errors::BattleError;
    use crate::side::SideId;
    use crate::teams::PokemonSet;
    use pretty_assertions::assert_eq;
    use schema::{PokemonType, TypeRelation};
    use std::sync::Arc;

    /// The bundled data, but nothing can hit anything.
    struct ImmuneDex(Dex);

    impl DataLookup for ImmuneDex {
        fn species(&self, name: &str) -> Entry<SpeciesData> {
            self.0.species(name)
        }
        fn move_data(&self, name: &str) -> Entry<MoveData> {
            self.0.move_data(name)
        }
        fn ability(&self, name: &str) -> Entry<AbilityData> {
            self.0.ability(name)
        }
        fn item(&self, name: &str) -> Entry<ItemData> {
            self.0.item(name)
        }
        fn nature(&self, name: &str) -> Entry<NatureData> {
            self.0.nature(name)
        }
        fn type_relation(&self, _attacking: PokemonType, _defending: PokemonType) -> TypeRelation {
            TypeRelation::Immune
        }
    }

    /// Knows nothing at all.
    struct EmptyDex;

    fn missing<T: Default>(name: &str) -> Entry<T> {
        Entry {
            id: to_id(name),
            exists: false,
            data: T::default(),
        }
    }

    impl DataLookup for EmptyDex {
        fn species(&self, name: &str) -> Entry<SpeciesData> {
            missing(name)
        }
        fn move_data(&self, name: &str) -> Entry<MoveData> {
            missing(name)
        }
        fn ability(&self, name: &str) -> Entry<AbilityData> {
            missing(name)
        }
        fn item(&self, name: &str) -> Entry<ItemData> {
            missing(name)
        }
        fn nature(&self, name: &str) -> Entry<NatureData> {
            missing(name)
        }
    }

    fn battle_with(dex: Arc<dyn DataLookup>, p1: Vec<PokemonSet>, p2: Vec<PokemonSet>) -> Battle<RecordingSink> {
        let mut battle = Battle::new(BattleOptions::default().with_seed(TEST_SEED), dex, RecordingSink::default());
        assert_ok(battle.set_player(SideId::P1, PlayerOptions::new("Alice", p1)));
        assert_ok(battle.set_player(SideId::P2, PlayerOptions::new("Bob", p2)));
        battle
    }

    #[test]
    fn test_injected_type_chart_decides_immunity() {
        // Arrange
        let dex = Arc::new(ImmuneDex(test_dex()));
        let mut battle = battle_with(
            dex,
            vec![test_set("Mew", &["Swift"])],
            vec![test_set("Snorlax", &["Swift"])],
        );

        // Act
        assert_ok(battle.choose(SideId::P1, "move 1"));
        assert_ok(battle.choose(SideId::P2, "move 1"));

        // Assert
        let lines = battle.sink().lines();
        let turn: Vec<&str> = lines
            .iter()
            .map(String::as_str)
            .skip_while(|line| *line != "|turn|1")
            .skip(1)
            .collect();
        assert_eq!(
            turn,
            vec![
                "|move|p1a: Mew|Swift",
                "|-immune|p2a: Snorlax",
                "|move|p2a: Snorlax|Swift",
                "|-immune|p1a: Mew",
                "|turn|2",
            ]
        );
    }

    #[test]
    fn test_unknown_data_falls_back_to_defaults() {
        // Arrange: unknown species become Normal with base 100 stats.
        let mut battle = battle_with(
            Arc::new(EmptyDex),
            vec![test_set("Missingno", &["Tackle"])],
            vec![test_set("Missingno", &["Tackle"])],
        );

        // Assert
        let lines = battle.sink().lines();
        assert!(lines.contains(&"|switch|p1a: Missingno|Missingno, L100|341/341".to_string()));
        let request = battle.sink().last_request(SideId::P1).unwrap_or_default();
        assert!(request.contains("\"pp\":0,\"maxpp\":0,\"target\":\"normal\",\"disabled\":true"), "got {}", request);
        assert_eq!(
            battle.choose(SideId::P1, "move 1"),
            Err(BattleError::NoPpLeft {
                name: "Tackle".to_string()
            })
        );

        // Act: the default choice still uses the unknown move, to no effect.
        assert_ok(battle.choose(SideId::P1, "default"));
        assert_ok(battle.choose(SideId::P2, "default"));

        let lines = battle.sink().lines();
        assert!(lines.contains(&"|move|p1a: Missingno|Tackle".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("|-damage|")));
        assert!(lines.contains(&"|turn|2".to_string()));
    }
}
