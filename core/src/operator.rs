//! Operators and predicates that can be enabled on a domain type.

use std::fmt;

/// A symbolic operator that may be applied to values of a domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DomainOperator {
    /// The unary `+` operator.
    UnaryPlus,
    /// The unary `-` operator.
    UnaryMinus,
    /// The `+` operator.
    Plus,
    /// The `-` operator.
    Minus,
    /// The `*` operator.
    Multiplication,
    /// The `/` operator.
    Division,
    /// The `%` operator.
    Modulo,
    /// The `!` operator.
    Not,
}

impl DomainOperator {
    /// All operators, in declaration order.
    pub const ALL: [DomainOperator; 8] = [
        DomainOperator::UnaryPlus,
        DomainOperator::UnaryMinus,
        DomainOperator::Plus,
        DomainOperator::Minus,
        DomainOperator::Multiplication,
        DomainOperator::Division,
        DomainOperator::Modulo,
        DomainOperator::Not,
    ];

    /// Arithmetic operators enabled on numeric types.
    pub const ARITHMETIC: [DomainOperator; 7] = [
        DomainOperator::UnaryPlus,
        DomainOperator::UnaryMinus,
        DomainOperator::Plus,
        DomainOperator::Minus,
        DomainOperator::Multiplication,
        DomainOperator::Division,
        DomainOperator::Modulo,
    ];

    /// Single character code used by compact model formats.
    pub fn code(self) -> char {
        match self {
            DomainOperator::UnaryPlus => 'P',
            DomainOperator::UnaryMinus => 'M',
            DomainOperator::Plus => '+',
            DomainOperator::Minus => '-',
            DomainOperator::Multiplication => '*',
            DomainOperator::Division => '/',
            DomainOperator::Modulo => '%',
            DomainOperator::Not => '!',
        }
    }

    /// Parse a compact code.
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Check if this operator takes a single operand.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            DomainOperator::UnaryPlus | DomainOperator::UnaryMinus | DomainOperator::Not
        )
    }
}

impl fmt::Display for DomainOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DomainOperator::UnaryPlus => "UNARY_PLUS",
            DomainOperator::UnaryMinus => "UNARY_MINUS",
            DomainOperator::Plus => "PLUS",
            DomainOperator::Minus => "MINUS",
            DomainOperator::Multiplication => "MULTIPLICATION",
            DomainOperator::Division => "DIVISION",
            DomainOperator::Modulo => "MODULO",
            DomainOperator::Not => "NOT",
        };
        f.write_str(name)
    }
}

/// A predicate family that may be applied to values of a domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DomainPredicate {
    /// `IS NULL` / `IS NOT NULL`.
    Nullness,
    /// `IS EMPTY`, `MEMBER OF` and other collection predicates.
    Collection,
    /// `<`, `<=`, `>`, `>=`.
    Relational,
    /// `=`, `<>`, `IN`.
    Equality,
}

impl DomainPredicate {
    /// All predicates, in declaration order.
    pub const ALL: [DomainPredicate; 4] = [
        DomainPredicate::Nullness,
        DomainPredicate::Collection,
        DomainPredicate::Relational,
        DomainPredicate::Equality,
    ];

    /// Predicates that make sense for every comparable type.
    pub const COMPARABLE: [DomainPredicate; 3] = [
        DomainPredicate::Nullness,
        DomainPredicate::Relational,
        DomainPredicate::Equality,
    ];

    /// Predicates that make sense for types that can only be tested for identity.
    pub const DISTINGUISHABLE: [DomainPredicate; 2] =
        [DomainPredicate::Nullness, DomainPredicate::Equality];

    /// Single character code used by compact model formats.
    pub fn code(self) -> char {
        match self {
            DomainPredicate::Nullness => 'N',
            DomainPredicate::Collection => 'C',
            DomainPredicate::Relational => 'R',
            DomainPredicate::Equality => 'E',
        }
    }

    /// Parse a compact code.
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|pred| pred.code() == code)
    }
}

impl fmt::Display for DomainPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DomainPredicate::Nullness => "NULLNESS",
            DomainPredicate::Collection => "COLLECTION",
            DomainPredicate::Relational => "RELATIONAL",
            DomainPredicate::Equality => "EQUALITY",
        };
        f.write_str(name)
    }
}
