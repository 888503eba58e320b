//! Which capabilities a macro invocation still has to generate.

use std::fmt;

/// One generated capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Conformance {
    Decode,
    Encode,
}

impl Conformance {
    pub const ALL: [Conformance; 2] = [Conformance::Decode, Conformance::Encode];

    /// Name of the runtime trait implementing this capability.
    pub fn trait_name(self) -> &'static str {
        match self {
            Self::Decode => "Decode",
            Self::Encode => "Encode",
        }
    }
}

impl fmt::Display for Conformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.trait_name())
    }
}

/// A set of capabilities. `BOTH` is the `Codable` alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ConformanceSet {
    decode: bool,
    encode: bool,
}

impl ConformanceSet {
    pub const EMPTY: Self = Self {
        decode: false,
        encode: false,
    };
    pub const DECODE: Self = Self {
        decode: true,
        encode: false,
    };
    pub const ENCODE: Self = Self {
        decode: false,
        encode: true,
    };
    pub const BOTH: Self = Self {
        decode: true,
        encode: true,
    };

    /// Expand a trait name into the capabilities it stands for.
    ///
    /// `Codable` is the alias for both directions.
    pub fn from_trait_name(name: &str) -> Option<Self> {
        match name {
            "Decode" => Some(Self::DECODE),
            "Encode" => Some(Self::ENCODE),
            "Codable" => Some(Self::BOTH),
            _ => None,
        }
    }

    pub fn contains(self, conformance: Conformance) -> bool {
        match conformance {
            Conformance::Decode => self.decode,
            Conformance::Encode => self.encode,
        }
    }

    pub fn insert(&mut self, conformance: Conformance) {
        match conformance {
            Conformance::Decode => self.decode = true,
            Conformance::Encode => self.encode = true,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.decode && !self.encode
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            decode: self.decode || other.decode,
            encode: self.encode || other.encode,
        }
    }

    pub fn difference(self, other: Self) -> Self {
        Self {
            decode: self.decode && !other.decode,
            encode: self.encode && !other.encode,
        }
    }

    pub fn intersection(self, other: Self) -> Self {
        Self {
            decode: self.decode && other.decode,
            encode: self.encode && other.encode,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Conformance> {
        Conformance::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Conformance> for ConformanceSet {
    fn from_iter<I: IntoIterator<Item = Conformance>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for conformance in iter {
            set.insert(conformance);
        }
        set
    }
}

impl fmt::Display for ConformanceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Conformance::trait_name).collect();
        f.write_str(&names.join(", "))
    }
}

/// How much of the request survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConformanceOutcome {
    /// Nothing requested was already present.
    Full,
    /// Some capabilities already exist; the rest is generated.
    Partial { redundant: ConformanceSet },
    /// Everything requested already exists.
    NoOp,
}

/// `to_generate = requested - existing`, computed once per declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConformancePlan {
    pub requested: ConformanceSet,
    pub existing: ConformanceSet,
    pub to_generate: ConformanceSet,
    pub outcome: ConformanceOutcome,
}

impl ConformancePlan {
    pub fn new(requested: ConformanceSet, existing: ConformanceSet) -> Self {
        let to_generate = requested.difference(existing);
        let outcome = if to_generate == requested {
            ConformanceOutcome::Full
        } else if to_generate.is_empty() {
            ConformanceOutcome::NoOp
        } else {
            ConformanceOutcome::Partial {
                redundant: requested.intersection(existing),
            }
        };
        Self {
            requested,
            existing,
            to_generate,
            outcome,
        }
    }

    pub fn generates(&self, conformance: Conformance) -> bool {
        self.to_generate.contains(conformance)
    }
}
