//! Approved postcode reference data

use std::collections::HashSet;

/// Lookup of postcodes in which loans may be written
pub trait PostcodeLookup: Send + Sync {
    fn is_eligible_postcode(&self, code: &str) -> bool;
}

/// In-memory set of approved postcodes
#[derive(Debug, Clone, Default)]
pub struct PostcodeSet {
    codes: HashSet<String>,
}

impl PostcodeSet {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|code| normalize(code.as_ref()))
                .filter(|code| !code.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl PostcodeLookup for PostcodeSet {
    fn is_eligible_postcode(&self, code: &str) -> bool {
        self.codes.contains(&normalize(code))
    }
}

/// Plain functions can serve as lookups
impl<F> PostcodeLookup for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_eligible_postcode(&self, code: &str) -> bool {
        self(code)
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_ignores_whitespace() {
        let set = PostcodeSet::new(["2000", " 3000 ", ""]);
        assert_eq!(set.len(), 2);
        assert!(set.is_eligible_postcode("2000"));
        assert!(set.is_eligible_postcode("3000 "));
        assert!(!set.is_eligible_postcode("4000"));
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |code: &str| code.starts_with('2');
        assert!(lookup.is_eligible_postcode("2100"));
        assert!(!lookup.is_eligible_postcode("6000"));
    }
}
