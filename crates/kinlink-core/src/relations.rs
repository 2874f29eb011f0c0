//! Link-type tags and role labels used by the built-in recipes.
//! Callers may use any other strings; these are only the shared vocabulary.

pub mod link_types {
    /// Two births with the same parents.
    pub const SIBLING: &str = "SIBLING";
    /// Two records describing the same person.
    pub const IDENTITY: &str = "IDENTITY";
    /// A parent's own birth linked to their child's birth.
    pub const PARENT: &str = "PARENT";

    pub fn all() -> Vec<&'static str> {
        vec![SIBLING, IDENTITY, PARENT]
    }
}

pub mod roles {
    pub const BABY: &str = "baby";
    pub const DECEASED: &str = "deceased";
    pub const FATHER: &str = "father";
    pub const MOTHER: &str = "mother";
    pub const BRIDE: &str = "bride";
    pub const GROOM: &str = "groom";
}
