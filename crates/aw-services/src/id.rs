/// Helpers for resource ids.
///
/// ```rust
/// use appwrite_services::ID;
///
/// assert_eq!(ID::unique(), "unique()");
/// assert_eq!(ID::custom("avatar"), "avatar");
/// ```
pub struct ID;

impl ID {
    /// The id the server replaces with a freshly generated one.
    pub const UNIQUE: &'static str = "unique()";

    /// Ask the server to generate the id.
    pub fn unique() -> String {
        Self::UNIQUE.to_string()
    }

    /// Use a caller-chosen id.
    pub fn custom(id: impl Into<String>) -> String {
        id.into()
    }

    /// Returns true for the server-generated id marker.
    pub fn is_unique(id: &str) -> bool {
        id == Self::UNIQUE
    }
}
