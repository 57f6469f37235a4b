//! Deterministic temporary names.

/// Prefix shared by every generated identifier and prelude helper.
pub const RESERVED_PREFIX: &str = "__tg_";

/// Hands out `__tg_v1`, `__tg_i2`, ... from one counter per compilation
/// unit, so the same input always produces the same output.
#[derive(Debug, Default)]
pub struct NameGenerator {
    counter: u32,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh name. `kind` is a short mnemonic: `v` value, `i` index,
    /// `k` key, `p` parameter, `r` return value.
    pub fn next(&mut self, kind: &str) -> String {
        self.counter += 1;
        format!("{}{}{}", RESERVED_PREFIX, kind, self.counter)
    }

    pub fn count(&self) -> u32 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_sequential() {
        let mut names = NameGenerator::new();
        assert_eq!(names.next("v"), "__tg_v1");
        assert_eq!(names.next("i"), "__tg_i2");
        assert_eq!(names.count(), 2);
    }
}
