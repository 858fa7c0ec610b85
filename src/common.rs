//! Level types shared across the schema tree, shredder and assembler.

/// Number of optional or repeated fields in a path which are defined.
pub type DefinitionLevel = u8;

/// Repetition depth at which a value starts a new repeated run.
pub type RepetitionLevel = u8;
