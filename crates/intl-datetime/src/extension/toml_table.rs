use crate::TomlTable;

/// Extension trait for [`Table`](toml::Table).
pub trait TomlTableExt {
    /// Extracts the string corresponding to the key.
    fn get_str(&self, key: &str) -> Option<&str>;

    /// Extracts the table value corresponding to the key.
    fn get_table(&self, key: &str) -> Option<&TomlTable>;
}

impl TomlTableExt for TomlTable {
    #[inline]
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    #[inline]
    fn get_table(&self, key: &str) -> Option<&TomlTable> {
        self.get(key).and_then(|v| v.as_table())
    }
}
