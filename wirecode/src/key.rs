/// A closed set of wire keys, generated as an enum per coded type.
pub trait CodingKey: Copy + 'static {
    /// The key as it appears on the wire.
    fn as_str(&self) -> &'static str;

    /// The member a wire key belongs to, if any.
    fn from_key(key: &str) -> Option<Self>;
}
