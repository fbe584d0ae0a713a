/// What an upsert did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    Updated,
    /// The key changed scheme; carries the migrated row plus every
    /// dependent row whose foreign key was rewritten.
    Migrated(usize),
}

impl Outcome {
    pub fn rows_affected(self) -> usize {
        match self {
            Outcome::Inserted | Outcome::Updated => 1,
            Outcome::Migrated(n) => n,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Inserted => f.write_str("inserted"),
            Outcome::Updated => f.write_str("updated"),
            Outcome::Migrated(n) => write!(f, "migrated ({n} rows)"),
        }
    }
}
