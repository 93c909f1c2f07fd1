// Battle simulator schema - shared closed enums and data tables
// used by the engine and by its bundled game data.

pub use battle_data::*;
pub use pokemon_types::*;

pub mod battle_data;
pub mod pokemon_types;
